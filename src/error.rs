use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Knowledge error: {0}")]
    Knowledge(String),

    #[error("SQL validation error: {0}")]
    Validation(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Execution error: {0}")]
    Execution(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, AgentError>;
