use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Review feed returned HTTP {status}: {message}")]
    SourceError { status: u16, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

impl EtlError {
    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::ApiError(e) => format!("Could not reach the review feed: {}", e),
            EtlError::SourceError { status, .. } => {
                format!("The review feed rejected the request (HTTP {})", status)
            }
            EtlError::IoError(e) => format!("File operation failed: {}", e),
            EtlError::SerializationError(e) => format!("Could not serialize data: {}", e),
            EtlError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration problem with '{}': {}", field, reason)
            }
            EtlError::ProcessingError { message } => message.clone(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::ApiError(_) | EtlError::SourceError { .. } => {
                "Check the feed endpoint and your network connection"
            }
            EtlError::IoError(_) => "Check that the output path exists and is writable",
            EtlError::SerializationError(_) => {
                "Re-run with --verbose and inspect the offending record"
            }
            EtlError::InvalidConfigValueError { .. } => "Run with --help to see the accepted values",
            EtlError::ProcessingError { .. } => "Re-run with --verbose for more detail",
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
