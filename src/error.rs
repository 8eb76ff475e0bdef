use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExporterError {
    #[error("Missing required configuration: {0}")]
    ConfigMissing(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Value type error: {0}")]
    ValueType(String),

    #[error("Invalid metric descriptor '{metric}': {reason}")]
    InvalidDescriptor { metric: String, reason: String },
}

pub type Result<T> = std::result::Result<T, ExporterError>;
