use thiserror::Error;

#[derive(Error, Debug)]
pub enum CountrysplitError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Empty feature set: no entity had a complete window ({rejected} rejected)")]
    EmptyFeatureSet { rejected: usize },

    #[error("Alignment error: {features} feature rows, {labels} labels, {ids} ids")]
    Alignment {
        features: usize,
        labels: usize,
        ids: usize,
    },

    #[error("Data loading error: {0}")]
    DataLoading(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CountrysplitError>;
