//! Response generation: narrative answer grounded in the filtered table.

use crate::error::Result;
use crate::llm::LlmClient;
use crate::query::StructuredQuery;
use crate::retrieval::ContextTable;

/// Reply used whenever retrieval produced no rows.
pub const NO_DATA_ANSWER: &str = "No data available to answer this query.";

const TABLE_HEAD_ROWS: usize = 20;

const SYSTEM_PROMPT: &str = "You are a retail KPI analytics expert.\n\
- Your answer must be based only on the provided table. Never invent values.\n\
- Net Sales: reason from Daily Actual and Daily Achievement %; use the cumulative Plan and Actual columns only when the user asks for MTD.\n\
- Other KPIs (Average Bill Value, Number of Bills, Availability and the rest): reason from Plan and Actual; the daily columns do not apply to them.\n\
- Analyze the entire date range, comparing days to explain trends, and say whether a drop or rise is gradual or sharp.\n\
- For root-cause questions, find the days with weak Daily Achievement %, then examine the supporting KPIs over the preceding week.\n\
- If the data covers multiple stores, analyze each store separately and name it.\n\
- Use cautious wording (\"data suggests\", \"possibly due to\") and finish with a clear summary for decision-making.";

pub struct ResponseGenerator {
    llm: LlmClient,
}

impl ResponseGenerator {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }

    /// Generate the narrative answer for a retrieved context table.
    ///
    /// An empty table short-circuits to the fixed no-data reply without an
    /// LLM call; downstream must not attempt to summarize nothing.
    pub async fn respond(&self, query: &StructuredQuery, table: &ContextTable) -> Result<String> {
        if table.is_empty() {
            return Ok(NO_DATA_ANSWER.to_string());
        }

        let user_message = build_user_message(query, table);
        let answer = self.llm.chat(Some(SYSTEM_PROMPT), &user_message, 0.2, 1500).await?;
        Ok(answer.trim().to_string())
    }
}

fn build_user_message(query: &StructuredQuery, table: &ContextTable) -> String {
    let kpis = query.mentioned_kpis.join(", ");
    let dates = if query.important_dates.is_empty() {
        format!(
            "{} to {}",
            format_date(query.start_date),
            format_date(query.end_date)
        )
    } else {
        query
            .important_dates
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        "The user asked: \"{}\"\n\n\
KPI(s): {}\n\
Strategy: {}\n\
Relevant dates: {}\n\n\
Here is the relevant data (first {} rows):\n\n{}\n\
Analyze carefully and explain the trends across all days. Avoid speculation outside the data.",
        query.user_query,
        kpis,
        query.retrieval_strategy,
        dates,
        TABLE_HEAD_ROWS,
        table.to_markdown(TABLE_HEAD_ROWS),
    )
}

fn format_date(date: Option<chrono::NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_default()
}
