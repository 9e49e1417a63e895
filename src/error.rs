use http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum DocsyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported operation '{0}' encountered")]
    UnsupportedOperator(String),

    #[error("Unsupported path '{0}': positional '$' segments cannot be translated")]
    UnsupportedPath(String),

    #[error("Invalid mutator: {0}")]
    InvalidMutator(String),

    #[error("Invalid operand for {operator} on field '{field}': {reason}")]
    InvalidOperand {
        operator: String,
        field: String,
        reason: String,
    },

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Update of document '{id}' failed: {message}")]
    WriteFailure { id: String, message: String },

    #[error("Index returned {status}: {body}")]
    Http { status: StatusCode, body: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("JSON error: {0}")]
    Json(String),
}

pub type Result<T> = std::result::Result<T, DocsyncError>;

impl From<serde_json::Error> for DocsyncError {
    fn from(e: serde_json::Error) -> Self {
        DocsyncError::Json(e.to_string())
    }
}

impl From<reqwest::Error> for DocsyncError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => DocsyncError::Http {
                status,
                body: e.to_string(),
            },
            None => DocsyncError::Transport(e.to_string()),
        }
    }
}

impl DocsyncError {
    /// Whether a caller may reasonably retry the failed call unchanged.
    ///
    /// Only transport-level faults and throttling / server errors qualify.
    /// Compile and configuration errors are input errors and never do.
    pub fn is_retryable(&self) -> bool {
        match self {
            DocsyncError::Transport(_) => true,
            DocsyncError::Http { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            DocsyncError::WriteFailure { .. } => false,
            DocsyncError::Config(_)
            | DocsyncError::UnsupportedOperator(_)
            | DocsyncError::UnsupportedPath(_)
            | DocsyncError::InvalidMutator(_)
            | DocsyncError::InvalidOperand { .. }
            | DocsyncError::MissingField(_)
            | DocsyncError::InvalidDocument(_)
            | DocsyncError::Json(_) => false,
        }
    }
}
