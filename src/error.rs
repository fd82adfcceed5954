use thiserror::Error;

#[derive(Error, Debug)]
pub enum FieldOpsError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Farm API unavailable: {0}")]
    ApiUnavailable(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, FieldOpsError>;
