use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PortalError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("dataframe conversion error: {0}")]
    DataFrame(#[from] PolarsError),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("route requires {0}")]
    EmptyRoute(&'static str),
}

pub type PortalResult<T> = Result<T, PortalError>;
