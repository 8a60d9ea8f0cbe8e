//! The uniform response envelope.
//!
//! Every operation resolves to `{status: "success", data}` or
//! `{status: "error", message, code}`. Handlers return domain values; only
//! the dispatcher builds envelopes.

use serde::Serialize;
use serde_json::Value;

use crate::domain::foundation::{DomainError, ErrorCode};

/// The envelope the HTTP surface serializes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Envelope {
    Success {
        data: Value,
    },
    Error {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        code: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        details: Option<Value>,
    },
}

impl Envelope {
    pub fn success(data: Value) -> Self {
        Envelope::Success { data }
    }

    /// Builds the error envelope for a domain error. `Internal` details are
    /// for the log only; the envelope carries a generic message.
    pub fn from_error(err: &DomainError) -> Self {
        if err.code == ErrorCode::Internal {
            return Envelope::Error {
                message: "Internal server error".to_string(),
                code: Some(err.code.as_str().to_string()),
                details: None,
            };
        }
        let details = if err.details.is_empty() {
            None
        } else {
            Some(Value::Object(
                err.details
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            ))
        };
        Envelope::Error {
            message: err.message.clone(),
            code: Some(err.code.as_str().to_string()),
            details,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Envelope::Success { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_envelope_shape() {
        let env = Envelope::success(json!({"flights": []}));
        let v = serde_json::to_value(&env).unwrap();
        assert_eq!(v["status"], "success");
        assert_eq!(v["data"]["flights"], json!([]));
    }

    #[test]
    fn error_envelope_carries_code_and_details() {
        let err = DomainError::new(ErrorCode::CheckInUnavailable, "Check-in not open")
            .with_detail("opens_at", "2025-08-09T12:00:00Z");
        let v = serde_json::to_value(Envelope::from_error(&err)).unwrap();
        assert_eq!(v["status"], "error");
        assert_eq!(v["code"], "CheckInUnavailable");
        assert_eq!(v["message"], "Check-in not open");
        assert_eq!(v["details"]["opens_at"], "2025-08-09T12:00:00Z");
    }

    #[test]
    fn internal_errors_are_scrubbed() {
        let err = DomainError::internal("connection refused to db.internal:5432");
        let v = serde_json::to_value(Envelope::from_error(&err)).unwrap();
        assert_eq!(v["message"], "Internal server error");
        assert_eq!(v["code"], "Internal");
        assert!(v.get("details").is_none());
    }
}
