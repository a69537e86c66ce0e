use indicatif::style::TemplateError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Cancelled by user")]
    UserCancelled,
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
    #[error("Precondition failed: {message}")]
    PreconditionFailed { message: String },
    #[error("External tool '{tool}' failed:\n{message}")]
    ExternalToolFailure { tool: String, message: String },
    #[error("Another conversion is already running")]
    ConversionInProgress,
    #[error("Config error: {message}")]
    ConfigError { message: String },
    #[error("Input/output error")]
    InputOutputError(#[from] std::io::Error),
    #[error("JSON error:\n{0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Template error: {0}")]
    TemplateError(#[from] TemplateError),
    #[error("Background task error: {0}")]
    JoinError(#[from] tokio::task::JoinError),
    #[error("System error: {message}")]
    SystemError { message: String },
}

impl AppError {
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        AppError::InvalidInput {
            message: message.into(),
        }
    }

    /// Errors that put the application back to idle without being reported as failures.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, AppError::UserCancelled)
    }
}
