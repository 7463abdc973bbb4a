//! Error types for Mochi adapter operations

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Result type for Mochi adapter operations
pub type Result<T> = std::result::Result<T, MochiError>;

/// A single offending field, reported by request or response validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// Field path (e.g., "deck-id" or "fields.abc.value")
    pub field: String,

    /// Human-readable reason
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// `field 'x' is missing`
    pub fn missing(field: impl Into<String>) -> Self {
        let field = field.into();
        let message = format!("field '{}' is missing", field);
        Self { field, message }
    }

    /// `field 'x' must not be empty`
    pub fn empty(field: impl Into<String>) -> Self {
        let field = field.into();
        let message = format!("field '{}' must not be empty", field);
        Self { field, message }
    }

    /// `field 'x' must be <expected>`
    pub fn invalid(field: impl Into<String>, expected: &str) -> Self {
        let field = field.into();
        let message = format!("field '{}' must be {}", field, expected);
        Self { field, message }
    }
}

impl std::fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| v.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Error types for the Mochi adapter
#[derive(Debug, thiserror::Error)]
pub enum MochiError {
    /// Inbound tool arguments failed their request schema
    #[error("Validation failed: {}", join_violations(.0))]
    Validation(Vec<FieldViolation>),

    /// A Mochi API payload failed its response schema
    #[error("Response schema violation in {context}: {}", join_violations(.violations))]
    SchemaViolation {
        context: String,
        violations: Vec<FieldViolation>,
    },

    /// The Mochi API answered with a non-2xx status
    #[error("Mochi API error ({status}): {message}")]
    RemoteApi { status: u16, message: String },

    /// The request did not complete within the configured timeout
    #[error("Mochi API request timed out after {0:?}")]
    Timeout(Duration),

    /// Network-level failure talking to the Mochi API
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Resource URI not served by any provider
    #[error("Invalid resource URI: {0}")]
    InvalidResource(String),

    /// Tool name not present in the registry
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Transport I/O or framing error
    #[error("Transport error: {0}")]
    Transport(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Classification used when reporting a failure back to the MCP caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Inbound arguments failed validation
    Validation,
    /// Remote payload failed its response schema
    SchemaViolation,
    /// Non-2xx answer (or timeout) from the Mochi API
    RemoteApi,
    /// Anything else
    Unknown,
}

impl MochiError {
    /// Build a validation error from a single violation
    pub fn validation(violation: FieldViolation) -> Self {
        MochiError::Validation(vec![violation])
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            MochiError::Validation(_) => ErrorKind::Validation,
            MochiError::SchemaViolation { .. } => ErrorKind::SchemaViolation,
            MochiError::RemoteApi { .. } | MochiError::Timeout(_) => ErrorKind::RemoteApi,
            _ => ErrorKind::Unknown,
        }
    }

    /// HTTP status attached to a remote failure, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            MochiError::RemoteApi { status, .. } => Some(*status),
            MochiError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Field violations carried by validation-class errors
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            MochiError::Validation(violations) => violations,
            MochiError::SchemaViolation { violations, .. } => violations,
            _ => &[],
        }
    }
}

impl From<String> for MochiError {
    fn from(s: String) -> Self {
        MochiError::Other(s)
    }
}

impl From<&str> for MochiError {
    fn from(s: &str) -> Self {
        MochiError::Other(s.to_string())
    }
}
