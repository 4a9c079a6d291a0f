//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent index-level violations.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("not an absolute url: {input}: {reason}")]
    InvalidUrl { input: String, reason: String },

    #[error("url has no host: {0}")]
    MissingHost(String),

    #[error("node not found: {0}")]
    NodeNotFound(String),

    #[error("node does not carry a url: {0}")]
    NotLeafBearing(String),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
