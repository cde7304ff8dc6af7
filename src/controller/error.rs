use crate::service::ServiceError;

/// Message recorded when an upload isn't a PNG or JPEG
pub const VALIDATION_MESSAGE: &str = "Please upload a PNG or JPG file.";

/// Errors returned by controller operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    /// The upload candidate declared an unsupported media type
    Validation { media_type: String },
    /// `submit()` while a request is already in flight
    Busy,
    /// `submit()` without an image
    NoImage,
    /// The service answered with a non-success status
    Service { status: u16, message: Option<String> },
    /// Network failure or undecodable response
    Transport(String),
    /// The submission was replaced by a newer operation before it settled
    Superseded,
    /// No bundled sample at this index
    UnknownSample(usize),
}

/// Broad category of an [`ErrorRecord`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Service,
    Transport,
}

/// The error shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorRecord {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn validation() -> Self {
        Self::new(ErrorKind::Validation, VALIDATION_MESSAGE)
    }
}

impl From<ServiceError> for ControllerError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Rejected { status, message } => ControllerError::Service { status, message },
            other => ControllerError::Transport(other.to_string()),
        }
    }
}

impl From<&ServiceError> for ErrorRecord {
    fn from(err: &ServiceError) -> Self {
        let kind = match err {
            ServiceError::Rejected { .. } => ErrorKind::Service,
            _ => ErrorKind::Transport,
        };
        ErrorRecord::new(kind, err.user_message())
    }
}

impl std::fmt::Display for ControllerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControllerError::Validation { media_type } => {
                write!(f, "{} (got '{}')", VALIDATION_MESSAGE, media_type)
            }
            ControllerError::Busy => write!(f, "A translation is already in progress"),
            ControllerError::NoImage => write!(f, "No image selected"),
            ControllerError::Service {
                status,
                message: Some(msg),
            } => write!(f, "Translation service error ({}): {}", status, msg),
            ControllerError::Service {
                status,
                message: None,
            } => write!(f, "Translation service error ({})", status),
            ControllerError::Transport(msg) => write!(f, "Transport error: {}", msg),
            ControllerError::Superseded => write!(f, "Submission was superseded"),
            ControllerError::UnknownSample(index) => write!(f, "No sample image at index {}", index),
        }
    }
}

impl std::error::Error for ControllerError {}
