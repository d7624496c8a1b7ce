//! Retrieval engine: turns a structured query into a deterministic,
//! reproducible slice of the KPI table.

use std::collections::HashSet;
use std::fmt::Write as _;

use tracing::{debug, warn};

use crate::dataset::{KpiDataset, KpiRecord};
use crate::query::StructuredQuery;
use crate::store_matcher::StoreMatcher;
use crate::strategy::{RetrievalStrategy, StrategyFilter};

/// Filtered slice of the KPI table, sorted by (store, date).
///
/// Freshly constructed per request. Empty is a valid outcome, never an
/// error; the responder turns it into a "no data" reply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextTable {
    rows: Vec<KpiRecord>,
}

impl ContextTable {
    pub fn from_rows(rows: Vec<KpiRecord>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[KpiRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render the first `limit` rows as a markdown table for the response
    /// prompt. An absent achievement renders as an empty cell.
    pub fn to_markdown(&self, limit: usize) -> String {
        let mut out = String::from(
            "| Store Name | KPI Name | Date | Plan | Actual | Daily Plan | Daily Actual | Daily Achievement % |\n",
        );
        out.push_str("| --- | --- | --- | --- | --- | --- | --- | --- |\n");
        for row in self.rows.iter().take(limit) {
            let achievement = row
                .daily_achievement_pct
                .map(|v| format!("{:.2}", v))
                .unwrap_or_default();
            let _ = writeln!(
                out,
                "| {} | {} | {} | {:.2} | {:.2} | {:.2} | {:.2} | {} |",
                row.store_name,
                row.kpi_name,
                row.date,
                row.plan,
                row.actual,
                row.daily_plan,
                row.daily_actual,
                achievement,
            );
        }
        out
    }
}

/// Composes name canonicalization, store resolution, strategy windowing and
/// ordering over a read-only dataset snapshot. Stateless across requests.
pub struct RetrievalEngine {
    matcher: StoreMatcher,
}

impl Default for RetrievalEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RetrievalEngine {
    pub fn new() -> Self {
        Self { matcher: StoreMatcher::default() }
    }

    pub fn with_matcher(matcher: StoreMatcher) -> Self {
        Self { matcher }
    }

    /// Filter the dataset down to the rows the query asks about.
    ///
    /// Each step is a filter over the previous one; row values are never
    /// mutated and the source dataset is left untouched.
    pub fn retrieve(&self, dataset: &KpiDataset, query: &StructuredQuery) -> ContextTable {
        let mut rows: Vec<KpiRecord> =
            dataset.records().iter().map(KpiRecord::canonicalized).collect();
        debug!(rows = rows.len(), "retrieval start");

        if !query.store_names.is_empty() {
            let roster = dataset.store_roster();
            let resolved = self.matcher.resolve(&query.store_names, &roster);
            // Set membership: a store resolved twice must not double count.
            let keep: HashSet<String> = resolved.into_iter().collect();
            rows.retain(|r| keep.contains(&r.store_name));
            debug!(rows = rows.len(), "after store filter");
        }

        if let RetrievalStrategy::Unrecognized(tag) = &query.retrieval_strategy {
            warn!(strategy = %tag, "unrecognized retrieval strategy, applying no date filter");
        }
        let filter = StrategyFilter::for_query(query);
        rows.retain(|r| filter.matches(r));

        rows.sort_by(|a, b| {
            (a.store_name.as_str(), a.date).cmp(&(b.store_name.as_str(), b.date))
        });
        debug!(rows = rows.len(), "retrieval done");

        ContextTable { rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::RetrievalStrategy;

    fn record(store: &str, kpi: &str, date: &str) -> KpiRecord {
        KpiRecord {
            store_name: store.to_string(),
            kpi_name: kpi.to_string(),
            date: date.parse().unwrap(),
            plan: 100.0,
            actual: 95.0,
            daily_plan: 0.0,
            daily_actual: 5.0,
            daily_achievement_pct: None,
        }
    }

    fn query(strategy: RetrievalStrategy) -> StructuredQuery {
        StructuredQuery {
            user_query: String::new(),
            mentioned_kpis: Vec::new(),
            mtd_mode: false,
            start_date: None,
            end_date: None,
            important_dates: Vec::new(),
            retrieval_strategy: strategy,
            days_back: None,
            store_names: Vec::new(),
            required_signals: Vec::new(),
        }
    }

    #[test]
    fn unresolvable_store_yields_empty_table() {
        let dataset = KpiDataset::from_records(vec![record("DELHI SAKET", "NET SALES", "2025-02-26")]);
        let mut q = query(RetrievalStrategy::FullRange);
        q.store_names = vec!["ZZZQQQ".to_string()];
        let table = RetrievalEngine::new().retrieve(&dataset, &q);
        assert!(table.is_empty());
    }

    #[test]
    fn source_dataset_is_not_mutated() {
        let dataset = KpiDataset::from_records(vec![record(" saket ", "net sales", "2025-02-26")]);
        let q = query(RetrievalStrategy::FullRange);
        let _ = RetrievalEngine::new().retrieve(&dataset, &q);
        assert_eq!(dataset.records()[0].store_name, " saket ");
    }

    #[test]
    fn rows_come_back_canonicalized() {
        let dataset = KpiDataset::from_records(vec![record(" saket ", " net sales ", "2025-02-26")]);
        let table = RetrievalEngine::new().retrieve(&dataset, &query(RetrievalStrategy::FullRange));
        assert_eq!(table.rows()[0].store_name, "SAKET");
        assert_eq!(table.rows()[0].kpi_name, "NET SALES");
    }

    #[test]
    fn markdown_renders_absent_achievement_as_empty_cell() {
        let table = ContextTable::from_rows(vec![record("SAKET", "NET SALES", "2025-02-26")]);
        let rendered = table.to_markdown(20);
        assert!(rendered.contains("| SAKET | NET SALES | 2025-02-26 | 100.00 | 95.00 | 0.00 | 5.00 |  |"));
    }

    #[test]
    fn markdown_caps_at_limit() {
        let rows = (1..=25)
            .map(|day| record("SAKET", "NET SALES", &format!("2025-01-{:02}", day)))
            .collect();
        let table = ContextTable::from_rows(rows);
        let rendered = table.to_markdown(20);
        // header + separator + 20 data rows
        assert_eq!(rendered.trim_end().lines().count(), 22);
    }
}
