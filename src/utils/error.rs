use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Unauthorized(String),
    InvalidRequest(String),
    StorageError(String),
    WorkbookError(String),
    DatabaseError(String),
    OAuthError(String),
    ConfigError(String),
}

impl AppError {
    /// Message safe to hand back to a client. Internal causes stay in the logs.
    pub fn public_message(&self) -> &str {
        match self {
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::InvalidRequest(msg) => msg,
            _ => "Failed to save data",
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            AppError::StorageError(msg) => write!(f, "Storage error: {}", msg),
            AppError::WorkbookError(msg) => write!(f, "Workbook error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppError::OAuthError(msg) => write!(f, "OAuth error: {}", msg),
            AppError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
