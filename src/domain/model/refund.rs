//! Refund records.
//!
//! A refund attaches to a booking or a trip booking, exactly one. At most
//! one non-terminal refund may exist per booking; the stores enforce it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundType {
    Full,
    Partial,
    Compensation,
}

impl RefundType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefundType::Full => "full",
            RefundType::Partial => "partial",
            RefundType::Compensation => "compensation",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "full" => Some(RefundType::Full),
            "partial" => Some(RefundType::Partial),
            "compensation" => Some(RefundType::Compensation),
            _ => None,
        }
    }
}

/// `Pending` and `Approved` are the open states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundStatus {
    Pending,
    Approved,
    Processed,
    Rejected,
}

impl RefundStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefundStatus::Pending => "pending",
            RefundStatus::Approved => "approved",
            RefundStatus::Processed => "processed",
            RefundStatus::Rejected => "rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(RefundStatus::Pending),
            "approved" => Some(RefundStatus::Approved),
            "processed" => Some(RefundStatus::Processed),
            "rejected" => Some(RefundStatus::Rejected),
            _ => None,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, RefundStatus::Pending | RefundStatus::Approved)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundMethod {
    CreditCard,
    BankTransfer,
    TravelCredit,
}

impl RefundMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefundMethod::CreditCard => "credit_card",
            RefundMethod::BankTransfer => "bank_transfer",
            RefundMethod::TravelCredit => "travel_credit",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "credit_card" => Some(RefundMethod::CreditCard),
            "bank_transfer" => Some(RefundMethod::BankTransfer),
            "travel_credit" => Some(RefundMethod::TravelCredit),
            _ => None,
        }
    }
}

/// A refund row; `reference` is `RF` + 6 digits, unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Refund {
    pub id: i64,
    pub reference: String,
    pub booking_id: Option<i64>,
    pub trip_booking_id: Option<i64>,
    pub refund_type: RefundType,
    pub amount: Money,
    pub reason: String,
    pub status: RefundStatus,
    pub method: RefundMethod,
    pub requested_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

/// Write model for creating a refund.
#[derive(Debug, Clone)]
pub struct NewRefund {
    pub reference: String,
    pub refund_type: RefundType,
    pub amount: Money,
    pub reason: String,
    pub method: RefundMethod,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_states_are_pending_and_approved() {
        assert!(RefundStatus::Pending.is_open());
        assert!(RefundStatus::Approved.is_open());
        assert!(!RefundStatus::Processed.is_open());
        assert!(!RefundStatus::Rejected.is_open());
    }
}
