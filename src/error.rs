use thiserror::Error;

#[derive(Error, Debug)]
pub enum GcovhtmlError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Ledger write failed: {0}")]
    Ledger(String),
}

pub type Result<T> = std::result::Result<T, GcovhtmlError>;
