//! Strategy-dependent windowing over the KPI table.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::dataset::KpiRecord;
use crate::kpi::{self, CAUSAL_KPIS};
use crate::query::StructuredQuery;

/// Which date-window/filter logic a query selects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RetrievalStrategy {
    SingleDateAnalysis,
    CompareDates,
    TrendAnalysis,
    FullRange,
    CausalAnalysis,
    /// Any other tag. Defined behavior: no date filter, warn-level log.
    Unrecognized(String),
}

impl RetrievalStrategy {
    pub fn parse(tag: &str) -> Self {
        match tag.trim() {
            "single_date_analysis" => Self::SingleDateAnalysis,
            "compare_dates" => Self::CompareDates,
            "trend_analysis" => Self::TrendAnalysis,
            "full_range" => Self::FullRange,
            "causal_analysis" => Self::CausalAnalysis,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::SingleDateAnalysis => "single_date_analysis",
            Self::CompareDates => "compare_dates",
            Self::TrendAnalysis => "trend_analysis",
            Self::FullRange => "full_range",
            Self::CausalAnalysis => "causal_analysis",
            Self::Unrecognized(tag) => tag,
        }
    }
}

impl From<String> for RetrievalStrategy {
    fn from(tag: String) -> Self {
        Self::parse(&tag)
    }
}

impl From<RetrievalStrategy> for String {
    fn from(strategy: RetrievalStrategy) -> Self {
        strategy.as_str().to_string()
    }
}

impl fmt::Display for RetrievalStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Date predicate computed from the strategy table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateWindow {
    /// No date filter.
    All,
    /// Inclusive range.
    Between(NaiveDate, NaiveDate),
    /// Exact membership.
    OneOf(BTreeSet<NaiveDate>),
}

impl DateWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        match self {
            Self::All => true,
            Self::Between(start, end) => date >= *start && date <= *end,
            Self::OneOf(dates) => dates.contains(&date),
        }
    }
}

/// Row filter derived from a structured query: a date window plus an
/// optional KPI-name restriction. Expects canonical KPI names in the rows
/// it is matched against.
#[derive(Debug, Clone)]
pub struct StrategyFilter {
    pub window: DateWindow,
    pub kpi_names: Option<HashSet<String>>,
}

impl StrategyFilter {
    pub fn for_query(query: &StructuredQuery) -> Self {
        let (window, mut kpi_names) = match &query.retrieval_strategy {
            RetrievalStrategy::SingleDateAnalysis => match query.important_dates.first() {
                Some(&target) => (DateWindow::Between(target - Duration::days(2), target), None),
                None => (DateWindow::All, None),
            },
            RetrievalStrategy::CompareDates if query.important_dates.len() >= 2 => (
                DateWindow::OneOf(query.important_dates.iter().copied().collect()),
                None,
            ),
            RetrievalStrategy::TrendAnalysis | RetrievalStrategy::FullRange => {
                match (query.start_date, query.end_date) {
                    (Some(start), Some(end)) => (DateWindow::Between(start, end), None),
                    _ => (DateWindow::All, None),
                }
            }
            RetrievalStrategy::CausalAnalysis => {
                let causal: HashSet<String> =
                    CAUSAL_KPIS.iter().map(|k| (*k).to_string()).collect();
                match query.important_dates.first() {
                    Some(&target) => (
                        DateWindow::Between(target - Duration::days(7), target),
                        Some(causal),
                    ),
                    None => (DateWindow::All, Some(causal)),
                }
            }
            _ => (DateWindow::All, None),
        };

        // The trend KPI restriction composes with the window above instead
        // of replacing it.
        if matches!(query.retrieval_strategy, RetrievalStrategy::TrendAnalysis)
            && !query.mentioned_kpis.is_empty()
        {
            kpi_names = Some(kpi::normalize_kpis(&query.mentioned_kpis).into_iter().collect());
        }

        Self { window, kpi_names }
    }

    pub fn matches(&self, record: &KpiRecord) -> bool {
        if !self.window.contains(record.date) {
            return false;
        }
        match &self.kpi_names {
            Some(names) => names.contains(&record.kpi_name),
            None => true,
        }
    }
}
