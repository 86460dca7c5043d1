use thiserror::Error;

/// Failures surfaced while fetching and normalizing dashboard data.
///
/// Every variant is fatal for the render that produced it: callers show an
/// error state instead of a partial chart. A missing sentiment field is not
/// represented here because it normalizes to zero.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The object store or document store could not be reached.
    #[error("Store unreachable: {0}")]
    Connectivity(String),

    #[error("Object '{key}' not found in '{container}'")]
    ObjectNotFound { container: String, key: String },

    /// The payload is not UTF-8 JSON of the expected top-level shape.
    #[error("Failed to decode payload: {0}")]
    Decode(String),

    #[error("Malformed record {record}: {reason}")]
    MalformedRecord { record: String, reason: String },

    #[error("Malformed timestamp '{value}' in document '{document_id}'")]
    MalformedTimestamp { document_id: String, value: String },
}

impl LoadError {
    pub fn malformed(record: impl Into<String>, reason: impl Into<String>) -> Self {
        LoadError::MalformedRecord {
            record: record.into(),
            reason: reason.into(),
        }
    }
}

/// Failures while resolving the process configuration at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Failed to read config file {path}: {reason}")]
    File { path: String, reason: String },

    #[error("Secret store error: {0}")]
    SecretStore(String),

    #[error("Invalid setting {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}
