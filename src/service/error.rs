/// Message shown when no more specific explanation is available
pub const GENERIC_FAILURE_MESSAGE: &str = "Translation failed. Please try again.";

/// Error types for the translation service boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The service answered with a non-success status
    Rejected {
        status: u16,
        /// The `error` field of the JSON body, when one could be parsed
        message: Option<String>,
    },
    /// Connection failure, timeout or I/O error while talking to the service
    Network(String),
    /// A success response whose body could not be decoded into an image
    MalformedResponse(String),
    /// Invalid endpoint or HTTP client setup
    Config(String),
}

impl ServiceError {
    /// The message to surface to the user
    pub fn user_message(&self) -> &str {
        match self {
            ServiceError::Rejected {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.as_str(),
            _ => GENERIC_FAILURE_MESSAGE,
        }
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::Rejected {
                status,
                message: Some(msg),
            } => write!(f, "Service rejected request ({}): {}", status, msg),
            ServiceError::Rejected {
                status,
                message: None,
            } => write!(f, "Service rejected request ({})", status),
            ServiceError::Network(msg) => write!(f, "Network error: {}", msg),
            ServiceError::MalformedResponse(msg) => write!(f, "Malformed response: {}", msg),
            ServiceError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ServiceError::Network(format!("request timed out: {}", err))
        } else if err.is_decode() || err.is_body() {
            ServiceError::MalformedResponse(err.to_string())
        } else if err.is_builder() {
            ServiceError::Config(err.to_string())
        } else {
            ServiceError::Network(err.to_string())
        }
    }
}

/// Result type for translation service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
