use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid period code '{code}': {reason}")]
    InvalidPeriod { code: String, reason: String },

    #[error("Unknown entity '{code}'")]
    UnknownEntity { code: String },

    #[error("No report profile configured for entity '{entity}'")]
    ProfileNotFound { entity: String },

    #[error("Cannot load {dataset}: tried {}", tried.join(", "))]
    DataUnavailable { dataset: String, tried: Vec<String> },

    #[error("File '{name}' not found in source '{source_name}'")]
    FileNotFound { source_name: String, name: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type ReportResult<T> = Result<T, ReportError>;
