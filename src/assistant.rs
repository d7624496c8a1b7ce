//! Assistant pipeline: classify → retrieve → respond.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use crate::classifier::QueryClassifier;
use crate::dataset::KpiDataset;
use crate::error::Result;
use crate::llm::LlmClient;
use crate::memory::InteractionLog;
use crate::query::StructuredQuery;
use crate::responder::ResponseGenerator;
use crate::retrieval::{ContextTable, RetrievalEngine};

/// One answered question: the narrative plus the evidence it is grounded in.
#[derive(Debug, Clone)]
pub struct Answer {
    pub answer: String,
    pub query: StructuredQuery,
    pub context: ContextTable,
}

/// Owns the pipeline stages and the shared read-only dataset snapshot.
pub struct KpiAssistant {
    classifier: QueryClassifier,
    responder: ResponseGenerator,
    engine: RetrievalEngine,
    dataset: Arc<KpiDataset>,
    memory: InteractionLog,
}

impl KpiAssistant {
    pub fn new(llm: LlmClient, dataset: Arc<KpiDataset>, today: NaiveDate) -> Self {
        Self {
            classifier: QueryClassifier::new(llm.clone(), today),
            responder: ResponseGenerator::new(llm),
            engine: RetrievalEngine::new(),
            dataset,
            memory: InteractionLog::new(),
        }
    }

    /// Answer one question.
    ///
    /// Each stage consumes the previous stage's output plus the shared
    /// read-only dataset; no stage mutates shared state, so concurrent
    /// assistants over one dataset snapshot stay independent.
    pub async fn ask(&mut self, user_query: &str) -> Result<Answer> {
        info!(query = user_query, "classifying");
        let structured = self.classifier.classify(user_query).await?;

        info!(strategy = %structured.retrieval_strategy, "retrieving context");
        let context = self.engine.retrieve(&self.dataset, &structured);

        info!(rows = context.len(), "generating response");
        let answer = self.responder.respond(&structured, &context).await?;

        self.memory.record(user_query, &structured, context.len(), &answer);
        Ok(Answer {
            answer,
            query: structured,
            context,
        })
    }

    pub fn memory(&self) -> &InteractionLog {
        &self.memory
    }
}
