use std::io;
use thiserror::Error;

/// Custom error type for hwreport
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Metric collection failed: {0}")]
    MetricCollection(String),

    #[error("Chart rendering failed: {0}")]
    Chart(String),

    #[error("Document error: {0}")]
    Document(String),

    #[error("Logo download failed: {0}")]
    Logo(#[from] reqwest::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for hwreport
pub type Result<T> = std::result::Result<T, ReportError>;

impl ReportError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        ReportError::Config(msg.into())
    }

    /// Create a permission denied error
    pub fn permission_denied<S: Into<String>>(msg: S) -> Self {
        ReportError::PermissionDenied(msg.into())
    }

    pub fn metric_collection<S: Into<String>>(msg: S) -> Self {
        ReportError::MetricCollection(msg.into())
    }

    pub fn chart<S: Into<String>>(msg: S) -> Self {
        ReportError::Chart(msg.into())
    }

    pub fn document<S: Into<String>>(msg: S) -> Self {
        ReportError::Document(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        ReportError::Other(msg.into())
    }

    pub fn is_permission_denied(&self) -> bool {
        match self {
            ReportError::PermissionDenied(_) => true,
            ReportError::Io(e) => e.kind() == io::ErrorKind::PermissionDenied,
            _ => false,
        }
    }
}
