//! Error types for the domain layer.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;

/// Error codes carried in the error envelope.
///
/// Each renders as the single-word code clients switch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Missing required field, bad format, unparseable date.
    InvalidParameter,
    /// Reference lookup miss or passenger mismatch.
    BookingNotFound,
    /// Flight number + date yields no row.
    FlightNotFound,
    /// Identifier fallback chain exhausted.
    PassengerNotFound,
    /// Cancel attempted on an already-cancelled booking.
    AlreadyCancelled,
    /// Refund attempted on an already-refunded booking.
    AlreadyRefunded,
    /// Outside the check-in window.
    CheckInUnavailable,
    /// Target seat occupied, blocked, or wrong class.
    SeatUnavailable,
    /// Business-rule refusal (e.g. cancelling a departed flight).
    PolicyViolation,
    /// An open refund already exists for the booking.
    DuplicateRefund,
    /// Operation name not present in the registry.
    UnknownOperation,
    /// Soft request budget exceeded.
    DeadlineExceeded,
    /// Anything else; details are logged, never returned.
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidParameter => "InvalidParameter",
            ErrorCode::BookingNotFound => "BookingNotFound",
            ErrorCode::FlightNotFound => "FlightNotFound",
            ErrorCode::PassengerNotFound => "PassengerNotFound",
            ErrorCode::AlreadyCancelled => "AlreadyCancelled",
            ErrorCode::AlreadyRefunded => "AlreadyRefunded",
            ErrorCode::CheckInUnavailable => "CheckInUnavailable",
            ErrorCode::SeatUnavailable => "SeatUnavailable",
            ErrorCode::PolicyViolation => "PolicyViolation",
            ErrorCode::DuplicateRefund => "DuplicateRefund",
            ErrorCode::UnknownOperation => "UnknownOperation",
            ErrorCode::DeadlineExceeded => "DeadlineExceeded",
            ErrorCode::Internal => "Internal",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Standard domain error with code, message, and structured details.
///
/// Details for `CheckInUnavailable` carry the window boundaries; details for
/// `Internal` are logged by the dispatcher and stripped from the envelope.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, serde_json::Value>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Creates an `InvalidParameter` error for a specific field.
    pub fn invalid_parameter(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidParameter, message).with_detail("field", field.into())
    }

    /// Creates an `Internal` error from an infrastructure failure.
    pub fn internal(message: impl fmt::Display) -> Self {
        Self::new(ErrorCode::Internal, message.to_string())
    }

    /// Adds a structured detail to the error.
    pub fn with_detail(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::internal(format!("database error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_renders_single_word() {
        assert_eq!(ErrorCode::CheckInUnavailable.to_string(), "CheckInUnavailable");
        assert_eq!(ErrorCode::Internal.to_string(), "Internal");
    }

    #[test]
    fn domain_error_displays_code_and_message() {
        let err = DomainError::new(ErrorCode::BookingNotFound, "No booking for reference ABC123");
        assert_eq!(err.to_string(), "[BookingNotFound] No booking for reference ABC123");
    }

    #[test]
    fn with_detail_accepts_json_values() {
        let err = DomainError::new(ErrorCode::CheckInUnavailable, "Check-in not open")
            .with_detail("opens_at", "2025-08-10T08:00:00Z")
            .with_detail("segment_id", 7);

        assert_eq!(
            err.details.get("opens_at"),
            Some(&serde_json::json!("2025-08-10T08:00:00Z"))
        );
        assert_eq!(err.details.get("segment_id"), Some(&serde_json::json!(7)));
    }

    #[test]
    fn invalid_parameter_names_the_field() {
        let err = DomainError::invalid_parameter("departure_date", "Dates must be YYYY-MM-DD");
        assert_eq!(err.code, ErrorCode::InvalidParameter);
        assert_eq!(err.details.get("field"), Some(&serde_json::json!("departure_date")));
    }
}
