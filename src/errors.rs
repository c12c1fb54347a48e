use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Authentication failed: {reason}")]
    AuthFailure { reason: String },

    #[error("Could not provision metadata schema: {reason}")]
    SchemaFailure { reason: String },

    #[error("IFC export failed: {reason}")]
    ExportFailure { reason: String },

    #[error("Upload rejected (HTTP {status}): {reason}")]
    UploadFailure { status: u16, reason: String },

    #[error("Upload cancelled by user")]
    UserCancelled,

    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convert to string for the host's message slot
impl From<AppError> for String {
    fn from(error: AppError) -> Self {
        error.to_string()
    }
}

/// Custom result type
pub type AppResult<T> = Result<T, AppError>;

/// Coarse outcome reported back to the invoking host. The host only sees this
/// plus the message text; no structured error detail crosses the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Succeeded,
    Cancelled,
    Failed(String),
}

impl AppError {
    pub fn auth_failure(reason: impl Into<String>) -> Self {
        Self::AuthFailure {
            reason: reason.into(),
        }
    }

    pub fn schema_failure(reason: impl Into<String>) -> Self {
        Self::SchemaFailure {
            reason: reason.into(),
        }
    }

    pub fn export_failure(reason: impl Into<String>) -> Self {
        Self::ExportFailure {
            reason: reason.into(),
        }
    }

    pub fn upload_failure(status: u16, reason: impl Into<String>) -> Self {
        Self::UploadFailure {
            status,
            reason: reason.into(),
        }
    }

    pub fn validation(field: &str, message: &str) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    pub fn is_cancellation(&self) -> bool {
        matches!(self, AppError::UserCancelled)
    }
}

impl From<AppError> for CommandOutcome {
    fn from(error: AppError) -> Self {
        if error.is_cancellation() {
            CommandOutcome::Cancelled
        } else {
            CommandOutcome::Failed(error.to_string())
        }
    }
}
