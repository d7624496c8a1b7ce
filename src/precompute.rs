//! One-time batch transform deriving daily deltas from the cumulative
//! plan/actual columns.

use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::dataset::KpiRecord;
use crate::error::Result;

/// Raw input row: cumulative plan/actual only, no daily columns yet.
#[derive(Debug, Clone, Deserialize)]
pub struct CumulativeRow {
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
}

pub fn load_cumulative_csv(path: &Path) -> Result<Vec<CumulativeRow>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

/// Derive `Daily Plan`, `Daily Actual` and `Daily Achievement %` within
/// each (store, KPI) run ordered by date.
///
/// The first row of a run has no predecessor, so its daily values fall back
/// to the cumulative ones. A zero daily plan leaves the achievement absent
/// rather than zero or infinite.
pub fn precompute(mut rows: Vec<CumulativeRow>) -> Vec<KpiRecord> {
    rows.sort_by(|a, b| {
        (a.store_name.as_str(), a.kpi_name.as_str(), a.date)
            .cmp(&(b.store_name.as_str(), b.kpi_name.as_str(), b.date))
    });

    let mut records = Vec::with_capacity(rows.len());
    let mut prev: Option<(String, String, f64, f64)> = None;
    for row in rows {
        let (daily_plan, daily_actual) = match &prev {
            Some((store, kpi, prev_plan, prev_actual))
                if *store == row.store_name && *kpi == row.kpi_name =>
            {
                (row.plan - prev_plan, row.actual - prev_actual)
            }
            _ => (row.plan, row.actual),
        };
        let daily_achievement_pct = if daily_plan == 0.0 {
            None
        } else {
            Some(round2(daily_actual / daily_plan * 100.0))
        };

        prev = Some((row.store_name.clone(), row.kpi_name.clone(), row.plan, row.actual));
        records.push(KpiRecord {
            store_name: row.store_name,
            kpi_name: row.kpi_name,
            date: row.date,
            plan: row.plan,
            actual: row.actual,
            daily_plan,
            daily_actual,
            daily_achievement_pct,
        });
    }
    records
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
