//! Error taxonomy shared by the dashboard components

use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, DashboardError>;

/// Errors surfaced by dashboard components
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Malformed caller input (empty service name, non-finite value, ...)
    #[error("validation failed: {0}")]
    Validation(String),

    /// A requested record does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// The document store failed or could not be reached
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// A document could not be converted to or from its typed form
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DashboardError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::StoreUnavailable(message.into())
    }

    /// Stable machine-readable code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            DashboardError::Validation(_) => "VALIDATION_ERROR",
            DashboardError::NotFound(_) => "NOT_FOUND",
            DashboardError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            DashboardError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }
}
