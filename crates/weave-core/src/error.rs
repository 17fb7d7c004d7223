//! Error types for weave

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Dataset store unavailable. Retryable; the pipeline surfaces this
    /// instead of masking it as "no data".
    #[error("Store error: {0}")]
    Store(String),

    #[error("Model backend error: {0}")]
    Model(String),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Import error: {0}")]
    Import(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
