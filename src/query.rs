//! Structured query: the classifier's output record, validated and typed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{KpiError, Result};
use crate::kpi;
use crate::strategy::RetrievalStrategy;

/// Classifier JSON as it arrives over the wire. Lenient by design: every
/// field but the strategy may be missing or null.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawQuery {
    #[serde(default)]
    pub mentioned_kpis: Option<Vec<String>>,

    #[serde(default)]
    pub mtd_mode: Option<MtdFlag>,

    #[serde(default)]
    pub start_date: Option<String>,

    #[serde(default)]
    pub end_date: Option<String>,

    #[serde(default)]
    pub important_dates: Option<Vec<String>>,

    #[serde(default)]
    pub retrieval_strategy: Option<String>,

    #[serde(default)]
    pub days_back: Option<i64>,

    #[serde(default)]
    pub store_names: Option<Vec<String>>,

    #[serde(default)]
    pub required_signals: Option<Vec<String>>,
}

/// `mtd_mode` arrives either as a boolean or as "yes"/"no".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MtdFlag {
    Bool(bool),
    Text(String),
}

impl MtdFlag {
    fn as_bool(&self) -> bool {
        match self {
            MtdFlag::Bool(b) => *b,
            MtdFlag::Text(s) => s.trim().eq_ignore_ascii_case("yes"),
        }
    }
}

/// Validated, typed form of the classifier output.
///
/// Construction is the only place defaults are invented: `mtd_mode` falls
/// back to false, and a missing `required_signals` is derived from the
/// mentioned KPIs through the fixed expansion table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredQuery {
    pub user_query: String,
    pub mentioned_kpis: Vec<String>,
    pub mtd_mode: bool,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub important_dates: Vec<NaiveDate>,
    pub retrieval_strategy: RetrievalStrategy,
    pub days_back: Option<i64>,
    pub store_names: Vec<String>,
    pub required_signals: Vec<String>,
}

impl StructuredQuery {
    /// Validate and type a raw classifier record.
    ///
    /// Fails fast: a missing `retrieval_strategy` or an unparseable date is
    /// an error, never a silently-dropped filter.
    pub fn from_raw(raw: RawQuery, user_query: &str) -> Result<Self> {
        let strategy_tag = raw
            .retrieval_strategy
            .ok_or_else(|| KpiError::MissingRequiredField("retrieval_strategy".to_string()))?;

        let mentioned_kpis = raw.mentioned_kpis.unwrap_or_default();
        let required_signals = match raw.required_signals {
            Some(signals) => signals,
            None => kpi::required_signals(&mentioned_kpis),
        };

        let important_dates = raw
            .important_dates
            .unwrap_or_default()
            .iter()
            .filter(|d| !d.trim().is_empty())
            .map(|d| parse_date(d))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            user_query: user_query.to_string(),
            mtd_mode: raw.mtd_mode.map(|f| f.as_bool()).unwrap_or(false),
            start_date: opt_date(raw.start_date.as_deref())?,
            end_date: opt_date(raw.end_date.as_deref())?,
            important_dates,
            retrieval_strategy: RetrievalStrategy::parse(&strategy_tag),
            days_back: raw.days_back,
            store_names: raw.store_names.unwrap_or_default(),
            required_signals,
            mentioned_kpis,
        })
    }
}

/// Parse an ISO `YYYY-MM-DD` date field.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| KpiError::MalformedDate(value.to_string()))
}

// Classifiers emit null or "" interchangeably for absent dates.
fn opt_date(value: Option<&str>) -> Result<Option<NaiveDate>> {
    match value {
        Some(s) if !s.trim().is_empty() => parse_date(s).map(Some),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_with_strategy(strategy: &str) -> RawQuery {
        RawQuery {
            retrieval_strategy: Some(strategy.to_string()),
            ..RawQuery::default()
        }
    }

    #[test]
    fn missing_strategy_is_an_error() {
        let err = StructuredQuery::from_raw(RawQuery::default(), "q").unwrap_err();
        assert!(matches!(err, KpiError::MissingRequiredField(_)));
    }

    #[test]
    fn malformed_date_is_an_error() {
        let mut raw = raw_with_strategy("trend_analysis");
        raw.start_date = Some("26th Feb".to_string());
        let err = StructuredQuery::from_raw(raw, "q").unwrap_err();
        assert!(matches!(err, KpiError::MalformedDate(_)));
    }

    #[test]
    fn malformed_important_date_is_an_error() {
        let mut raw = raw_with_strategy("compare_dates");
        raw.important_dates = Some(vec!["2025-02-26".to_string(), "not-a-date".to_string()]);
        let err = StructuredQuery::from_raw(raw, "q").unwrap_err();
        assert!(matches!(err, KpiError::MalformedDate(_)));
    }

    #[test]
    fn empty_date_strings_are_treated_as_absent() {
        let mut raw = raw_with_strategy("trend_analysis");
        raw.start_date = Some(String::new());
        raw.end_date = Some("  ".to_string());
        let query = StructuredQuery::from_raw(raw, "q").unwrap();
        assert!(query.start_date.is_none());
        assert!(query.end_date.is_none());
    }

    #[test]
    fn mtd_mode_accepts_text_and_bool() {
        for (flag, expected) in [
            (MtdFlag::Text("yes".to_string()), true),
            (MtdFlag::Text("Yes ".to_string()), true),
            (MtdFlag::Text("no".to_string()), false),
            (MtdFlag::Bool(true), true),
            (MtdFlag::Bool(false), false),
        ] {
            let mut raw = raw_with_strategy("full_range");
            raw.mtd_mode = Some(flag);
            let query = StructuredQuery::from_raw(raw, "q").unwrap();
            assert_eq!(query.mtd_mode, expected);
        }
    }

    #[test]
    fn mtd_mode_defaults_to_false() {
        let query = StructuredQuery::from_raw(raw_with_strategy("full_range"), "q").unwrap();
        assert!(!query.mtd_mode);
    }

    #[test]
    fn required_signals_derived_when_absent() {
        let mut raw = raw_with_strategy("trend_analysis");
        raw.mentioned_kpis = Some(vec!["abv".to_string()]);
        let query = StructuredQuery::from_raw(raw, "q").unwrap();
        assert_eq!(query.required_signals, vec!["AVERAGE BILL VALUE", "NUMBER OF BILLS"]);
    }

    #[test]
    fn explicit_required_signals_are_kept() {
        let mut raw = raw_with_strategy("trend_analysis");
        raw.mentioned_kpis = Some(vec!["abv".to_string()]);
        raw.required_signals = Some(vec!["NET SALES".to_string()]);
        let query = StructuredQuery::from_raw(raw, "q").unwrap();
        assert_eq!(query.required_signals, vec!["NET SALES"]);
    }

    #[test]
    fn parses_classifier_wire_json() {
        let json = r#"{
            "mentioned_kpis": ["Net Sales"],
            "mtd_mode": "no",
            "start_date": "2025-02-01",
            "end_date": "2025-02-27",
            "important_dates": [],
            "retrieval_strategy": "trend_analysis",
            "days_back": null,
            "store_names": ["Gurugram Ambi Mall"]
        }"#;
        let raw: RawQuery = serde_json::from_str(json).unwrap();
        let query = StructuredQuery::from_raw(raw, "net sales trend").unwrap();
        assert_eq!(query.retrieval_strategy, RetrievalStrategy::TrendAnalysis);
        assert_eq!(query.start_date, Some("2025-02-01".parse().unwrap()));
        assert_eq!(query.store_names, vec!["Gurugram Ambi Mall"]);
        assert!(!query.mtd_mode);
    }
}
