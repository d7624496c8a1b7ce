//! KPI name normalization and the fixed KPI tables.

use itertools::Itertools;
use lazy_static::lazy_static;
use std::collections::HashMap;

use crate::dataset::canonical;

/// KPIs examined when explaining a movement in a headline KPI.
pub const CAUSAL_KPIS: &[&str] = &[
    "NET SALES",
    "NUMBER OF BILLS",
    "AVERAGE BILL VALUE",
    "AVAILABILITY",
];

const SALES_SIGNALS: &[&str] = &[
    "NET SALES",
    "NUMBER OF BILLS",
    "AVERAGE BILL VALUE",
    "DAILY ACHIEVEMENT %",
    "AVAILABILITY",
];
const ABV_SIGNALS: &[&str] = &["AVERAGE BILL VALUE", "NUMBER OF BILLS"];
const NOB_SIGNALS: &[&str] = &["NUMBER OF BILLS", "AVERAGE BILL VALUE"];

lazy_static! {
    /// Loose KPI aliases → canonical KPI identifiers.
    static ref KPI_ALIASES: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("SALES", "NET SALES");
        m.insert("NET SALES", "NET SALES");
        m.insert("NOB", "NUMBER OF BILLS");
        m.insert("NO OF BILLS", "NUMBER OF BILLS");
        m.insert("ABV", "AVERAGE BILL VALUE");
        m.insert("AVERAGE BILL VALUE", "AVERAGE BILL VALUE");
        m
    };

    /// KPI mention → supporting signals, used when the classifier omits
    /// `required_signals`. Keys are upper-cased mentions as the classifier
    /// emits them, not normalized identifiers.
    static ref SIGNAL_EXPANSION: HashMap<&'static str, &'static [&'static str]> = {
        let mut m = HashMap::new();
        m.insert("NET SALES", SALES_SIGNALS);
        m.insert("SALES", SALES_SIGNALS);
        m.insert("ABV", ABV_SIGNALS);
        m.insert("NOB", NOB_SIGNALS);
        m
    };
}

/// Map a loose KPI mention to its canonical identifier.
///
/// Unknown names pass through trimmed and upper-cased, so this is total
/// over strings.
pub fn normalize_kpi(name: &str) -> String {
    let clean = canonical(name);
    match KPI_ALIASES.get(clean.as_str()) {
        Some(kpi) => (*kpi).to_string(),
        None => clean,
    }
}

pub fn normalize_kpis(names: &[String]) -> Vec<String> {
    names.iter().map(|n| normalize_kpi(n)).collect()
}

/// Derive `required_signals` from the mentioned KPIs.
///
/// Total: a mention with no expansion contributes itself. Output is sorted
/// and deduped so equal inputs always yield equal queries.
pub fn required_signals(mentioned_kpis: &[String]) -> Vec<String> {
    mentioned_kpis
        .iter()
        .map(|k| canonical(k))
        .flat_map(|k| match SIGNAL_EXPANSION.get(k.as_str()) {
            Some(signals) => signals.iter().map(|s| (*s).to_string()).collect::<Vec<_>>(),
            None => vec![k],
        })
        .sorted()
        .dedup()
        .collect()
}
