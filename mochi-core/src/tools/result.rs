//! Tool error model and call provenance
//!
//! `ToolError` is the serializable form of a failed call: the
//! [`ErrorKind`] tag picks the message prefix, and the optional status code
//! and field violations travel alongside for structured consumers.

use crate::error::{ErrorKind, FieldViolation, MochiError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Structured tool error with taxonomy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolError {
    /// Error kind
    pub kind: ErrorKind,

    /// Human-readable error message
    pub message: String,

    /// HTTP status for remote failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,

    /// Offending fields for validation-class failures
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<FieldViolation>,
}

impl ToolError {
    /// Create a new tool error
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            violations: Vec::new(),
        }
    }

    /// Create a validation error
    pub fn validation(violations: Vec<FieldViolation>) -> Self {
        MochiError::Validation(violations).into()
    }

    /// Text shown to the MCP caller
    pub fn display_text(&self) -> String {
        match self.kind {
            ErrorKind::Validation => format!("Validation error: {}", self.message),
            ErrorKind::SchemaViolation => format!("Schema violation: {}", self.message),
            ErrorKind::RemoteApi => match self.status {
                Some(status) => format!("Mochi API error (HTTP {}): {}", status, self.message),
                None => format!("Mochi API error: {}", self.message),
            },
            ErrorKind::Unknown => format!("Error: {}", self.message),
        }
    }
}

impl From<MochiError> for ToolError {
    fn from(err: MochiError) -> Self {
        let kind = err.kind();
        let status = err.status();
        let violations = err.violations().to_vec();

        let message = match &err {
            MochiError::Validation(v) => join(v),
            MochiError::SchemaViolation {
                context,
                violations,
            } => format!("{} response: {}", context, join(violations)),
            MochiError::RemoteApi { message, .. } => message.clone(),
            other => other.to_string(),
        };

        Self {
            kind,
            message,
            status,
            violations,
        }
    }
}

fn join(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| v.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Serialize a validated response as the tool's output value
pub(crate) fn to_output<T: Serialize>(value: &T) -> Result<Value, ToolError> {
    serde_json::to_value(value).map_err(|e| MochiError::from(e).into())
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display_text())
    }
}

impl std::error::Error for ToolError {}

/// Provenance of one tool call, for tracing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolProvenance {
    /// Tool name
    pub tool_name: String,

    /// Truncated SHA-256 of the serialized arguments
    pub args_hash: String,

    /// Timestamp when execution started
    pub started_at: DateTime<Utc>,

    /// Execution duration
    #[serde(with = "duration_millis")]
    pub duration: Duration,

    /// Request/trace ID for correlation
    pub trace_id: String,
}

impl ToolProvenance {
    /// Start recording a call of `tool_name` with `args`
    pub fn start(tool_name: impl Into<String>, args: &Value, trace_id: impl Into<String>) -> Self {
        use sha2::{Digest, Sha256};

        let args_json = serde_json::to_string(args).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(args_json.as_bytes());
        let args_hash = format!("{:x}", hasher.finalize());

        Self {
            tool_name: tool_name.into(),
            args_hash: args_hash[..16].to_string(),
            started_at: Utc::now(),
            duration: Duration::ZERO,
            trace_id: trace_id.into(),
        }
    }

    /// Stamp the elapsed time since `started_at`
    pub fn finish(mut self) -> Self {
        self.duration = (Utc::now() - self.started_at).to_std().unwrap_or_default();
        self
    }
}

// Serde helpers for Duration serialization as milliseconds
mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod result_tests {
    use super::*;

    #[test]
    fn test_validation_error_text() {
        let error = ToolError::validation(vec![
            FieldViolation::missing("content"),
            FieldViolation::missing("deck-id"),
        ]);

        assert_eq!(error.kind, ErrorKind::Validation);
        assert_eq!(
            error.display_text(),
            "Validation error: field 'content' is missing; field 'deck-id' is missing"
        );
        assert_eq!(error.violations.len(), 2);
    }

    #[test]
    fn test_remote_error_keeps_status() {
        let error = ToolError::from(MochiError::RemoteApi {
            status: 422,
            message: "deck-id: is required".into(),
        });
        assert_eq!(error.kind, ErrorKind::RemoteApi);
        assert_eq!(error.status, Some(422));
        assert_eq!(
            error.display_text(),
            "Mochi API error (HTTP 422): deck-id: is required"
        );
    }

    #[test]
    fn test_schema_violation_not_masked() {
        let error = ToolError::from(MochiError::SchemaViolation {
            context: "card".into(),
            violations: vec![FieldViolation::missing("id")],
        });
        assert_eq!(error.kind, ErrorKind::SchemaViolation);
        assert!(error.display_text().starts_with("Schema violation: card response"));
    }

    #[test]
    fn test_timeout_reported_as_remote() {
        let error = ToolError::from(MochiError::Timeout(Duration::from_secs(30)));
        assert_eq!(error.kind, ErrorKind::RemoteApi);
        assert!(error.display_text().starts_with("Mochi API error: "));
    }

    #[test]
    fn test_unknown_failure_stringified() {
        let error = ToolError::from(MochiError::Other("connection reset".into()));
        assert_eq!(error.kind, ErrorKind::Unknown);
        assert_eq!(error.display_text(), "Error: connection reset");
    }

    #[test]
    fn test_provenance_hash_is_stable() {
        let args = serde_json::json!({ "deck-id": "d1" });
        let a = ToolProvenance::start("list-cards", &args, "t1");
        let b = ToolProvenance::start("list-cards", &args, "t2").finish();
        assert_eq!(a.args_hash, b.args_hash);
        assert_eq!(a.args_hash.len(), 16);
    }
}
