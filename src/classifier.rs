//! Query classifier: natural-language question → structured query.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::error::{KpiError, Result};
use crate::llm::LlmClient;
use crate::query::{RawQuery, StructuredQuery};

lazy_static! {
    static ref JSON_OBJECT: Regex = Regex::new(r"(?s)\{.*\}").unwrap();
}

pub struct QueryClassifier {
    llm: LlmClient,
    /// Anchor date injected into the prompt so relative phrases like
    /// "yesterday" resolve reproducibly.
    today: NaiveDate,
}

impl QueryClassifier {
    pub fn new(llm: LlmClient, today: NaiveDate) -> Self {
        Self { llm, today }
    }

    pub async fn classify(&self, user_query: &str) -> Result<StructuredQuery> {
        let prompt = self.build_prompt(user_query);
        let reply = self.llm.chat(None, &prompt, 0.0, 512).await?;

        let json_text = extract_json(&reply).ok_or_else(|| {
            KpiError::MalformedResponse("no JSON object in classifier reply".to_string())
        })?;
        let raw: RawQuery = serde_json::from_str(json_text)?;

        let query = StructuredQuery::from_raw(raw, user_query)?;
        debug!(
            strategy = %query.retrieval_strategy,
            stores = ?query.store_names,
            kpis = ?query.mentioned_kpis,
            "classified query"
        );
        Ok(query)
    }

    fn build_prompt(&self, user_query: &str) -> String {
        format!(
            r#"You are a query classification assistant for a retail KPI chatbot.

Convert the user query into structured JSON with these fields:
1. mentioned_kpis
2. start_date (YYYY-MM-DD or null)
3. end_date (YYYY-MM-DD or null)
4. days_back
5. important_dates (list of YYYY-MM-DD)
6. retrieval_strategy (one of: single_date_analysis, compare_dates, trend_analysis, full_range, causal_analysis)
7. store_names
8. mtd_mode -> "yes" if the user wants month-to-date metrics, else "no"

Rules:
- If the user says "MTD", "month to date", or "till date" -> mtd_mode = "yes"
- If not mentioned -> mtd_mode = "no"
- If the user is asking "why was KPI down" -> retrieval_strategy = causal_analysis
- If the user is asking for a trend -> retrieval_strategy = trend_analysis

Today is: {}

User query:
"""{}"""

Convert this into JSON only:"#,
            self.today, user_query
        )
    }
}

/// First JSON object embedded in a possibly chatty model reply.
fn extract_json(text: &str) -> Option<&str> {
    JSON_OBJECT.find(text).map(|m| m.as_str())
}
