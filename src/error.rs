use thiserror::Error;

#[derive(Error, Debug)]
pub enum KpiError {
    #[error("Malformed date: {0}")]
    MalformedDate(String),

    #[error("Missing required field: {0}")]
    MissingRequiredField(String),

    #[error("Malformed classifier response: {0}")]
    MalformedResponse(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, KpiError>;
