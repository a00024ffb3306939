use thiserror::Error;

#[derive(Error, Debug)]
pub enum CohortError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid month key '{raw}'")]
    InvalidMonthKey { raw: String },

    #[error("Unknown {field} value '{raw}'")]
    UnknownValue { field: &'static str, raw: String },

    #[error("Invalid currency rate {rate}: must be finite and positive")]
    InvalidRate { rate: f64 },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type CohortResult<T> = Result<T, CohortError>;
