//! In-process interaction log for an assistant session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::query::StructuredQuery;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub user_query: String,
    pub structured: StructuredQuery,
    pub rows_retrieved: usize,
    pub answer: String,
}

/// Session-scoped log of question/answer rounds. Lives and dies with the
/// process; nothing is persisted.
#[derive(Debug, Default)]
pub struct InteractionLog {
    entries: Vec<InteractionEntry>,
}

impl InteractionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        user_query: &str,
        structured: &StructuredQuery,
        rows_retrieved: usize,
        answer: &str,
    ) {
        self.entries.push(InteractionEntry {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            user_query: user_query.to_string(),
            structured: structured.clone(),
            rows_retrieved,
            answer: answer.to_string(),
        });
    }

    /// The last `n` entries, oldest first.
    pub fn recent(&self, n: usize) -> &[InteractionEntry] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    /// Entries whose question contains the keyword, case-insensitive.
    pub fn search(&self, keyword: &str) -> Vec<&InteractionEntry> {
        let keyword = keyword.to_lowercase();
        self.entries
            .iter()
            .filter(|e| e.user_query.to_lowercase().contains(&keyword))
            .collect()
    }

    pub fn entries(&self) -> &[InteractionEntry] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::RetrievalStrategy;

    fn structured() -> StructuredQuery {
        StructuredQuery {
            user_query: String::new(),
            mentioned_kpis: Vec::new(),
            mtd_mode: false,
            start_date: None,
            end_date: None,
            important_dates: Vec::new(),
            retrieval_strategy: RetrievalStrategy::FullRange,
            days_back: None,
            store_names: Vec::new(),
            required_signals: Vec::new(),
        }
    }

    fn log_with(questions: &[&str]) -> InteractionLog {
        let mut log = InteractionLog::new();
        for q in questions {
            log.record(q, &structured(), 0, "answer");
        }
        log
    }

    #[test]
    fn recent_returns_last_entries_oldest_first() {
        let log = log_with(&["q1", "q2", "q3"]);
        let recent: Vec<_> = log.recent(2).iter().map(|e| e.user_query.as_str()).collect();
        assert_eq!(recent, vec!["q2", "q3"]);
    }

    #[test]
    fn recent_with_large_n_returns_everything() {
        let log = log_with(&["q1"]);
        assert_eq!(log.recent(10).len(), 1);
    }

    #[test]
    fn search_is_case_insensitive() {
        let log = log_with(&["Net Sales trend", "availability yesterday"]);
        let hits = log.search("NET SALES");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].user_query, "Net Sales trend");
    }

    #[test]
    fn clear_empties_the_log() {
        let mut log = log_with(&["q1", "q2"]);
        log.clear();
        assert!(log.entries().is_empty());
    }
}
