//! Customer-service interaction audit trail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of interaction recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    Escalation,
    Callback,
    Complaint,
}

impl InteractionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionKind::Escalation => "escalation",
            InteractionKind::Callback => "callback",
            InteractionKind::Complaint => "complaint",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "escalation" => Some(InteractionKind::Escalation),
            "callback" => Some(InteractionKind::Callback),
            "complaint" => Some(InteractionKind::Complaint),
            _ => None,
        }
    }
}

/// Append-only audit row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerServiceLog {
    pub id: i64,
    /// CS/CB case identifier handed to the caller.
    pub case_number: String,
    pub kind: InteractionKind,
    pub passenger_id: Option<i64>,
    pub booking_reference: Option<String>,
    pub reason: String,
    pub priority: String,
    pub contact_phone: Option<String>,
    pub preferred_time: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Write model for appending an interaction.
#[derive(Debug, Clone)]
pub struct NewServiceLog {
    pub case_number: String,
    pub kind: InteractionKind,
    pub passenger_id: Option<i64>,
    pub booking_reference: Option<String>,
    pub reason: String,
    pub priority: String,
    pub contact_phone: Option<String>,
    pub preferred_time: Option<String>,
}
