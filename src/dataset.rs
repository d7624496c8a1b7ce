//! Precomputed KPI table: one row per (store, KPI, date).

use crate::error::Result;
use chrono::NaiveDate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Trim + upper-case, the canonical form for store and KPI names.
pub fn canonical(name: &str) -> String {
    name.trim().to_uppercase()
}

/// One row of the precomputed KPI table.
///
/// `plan`/`actual` are cumulative month-to-date values; the `daily_*`
/// columns are derived by the precompute step. `daily_achievement_pct` is
/// absent when the daily plan is zero (not computable, never zero).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiRecord {
    #[serde(rename = "Store Name")]
    pub store_name: String,

    #[serde(rename = "KPI Name")]
    pub kpi_name: String,

    #[serde(rename = "Date")]
    pub date: NaiveDate,

    #[serde(rename = "Plan")]
    pub plan: f64,

    #[serde(rename = "Actual")]
    pub actual: f64,

    #[serde(rename = "Daily Plan")]
    pub daily_plan: f64,

    #[serde(rename = "Daily Actual")]
    pub daily_actual: f64,

    #[serde(rename = "Daily Achievement %")]
    pub daily_achievement_pct: Option<f64>,
}

impl KpiRecord {
    /// Copy of this row with store and KPI names in canonical form.
    pub fn canonicalized(&self) -> KpiRecord {
        KpiRecord {
            store_name: canonical(&self.store_name),
            kpi_name: canonical(&self.kpi_name),
            ..self.clone()
        }
    }
}

/// Immutable snapshot of the precomputed KPI table, loaded once per process
/// and shared read-only across requests.
#[derive(Debug, Clone, Default)]
pub struct KpiDataset {
    records: Vec<KpiRecord>,
}

impl KpiDataset {
    pub fn from_records(records: Vec<KpiRecord>) -> Self {
        Self { records }
    }

    /// Load the precomputed table from a CSV file with the external column
    /// headers (`Store Name, KPI Name, Date, Plan, Actual, Daily Plan,
    /// Daily Actual, Daily Achievement %`).
    pub fn load_csv(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut records = Vec::new();
        for row in reader.deserialize() {
            records.push(row?);
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[KpiRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct canonical store names, in first-seen order.
    pub fn store_roster(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| canonical(&r.store_name))
            .unique()
            .collect()
    }
}

/// Write records to a CSV file with the external column headers.
pub fn write_csv(path: &Path, records: &[KpiRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(store: &str, kpi: &str, date: &str) -> KpiRecord {
        KpiRecord {
            store_name: store.to_string(),
            kpi_name: kpi.to_string(),
            date: date.parse().unwrap(),
            plan: 100.0,
            actual: 90.0,
            daily_plan: 10.0,
            daily_actual: 9.0,
            daily_achievement_pct: Some(90.0),
        }
    }

    #[test]
    fn canonical_trims_and_uppercases() {
        assert_eq!(canonical("  gurugram ambi mall "), "GURUGRAM AMBI MALL");
    }

    #[test]
    fn canonicalized_row_keeps_values() {
        let row = record(" saket ", " net sales ", "2025-02-26").canonicalized();
        assert_eq!(row.store_name, "SAKET");
        assert_eq!(row.kpi_name, "NET SALES");
        assert_eq!(row.plan, 100.0);
    }

    #[test]
    fn store_roster_is_distinct_and_canonical() {
        let dataset = KpiDataset::from_records(vec![
            record("saket", "NET SALES", "2025-02-25"),
            record("SAKET ", "NET SALES", "2025-02-26"),
            record("Ambi Mall", "NET SALES", "2025-02-26"),
        ]);
        assert_eq!(dataset.store_roster(), vec!["SAKET", "AMBI MALL"]);
    }
}
