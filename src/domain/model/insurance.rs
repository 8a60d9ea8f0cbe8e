//! Travel insurance policies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsuranceType {
    Flight,
    Trip,
    Comprehensive,
    Premium,
}

impl InsuranceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsuranceType::Flight => "flight",
            InsuranceType::Trip => "trip",
            InsuranceType::Comprehensive => "comprehensive",
            InsuranceType::Premium => "premium",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "flight" => Some(InsuranceType::Flight),
            "trip" => Some(InsuranceType::Trip),
            "comprehensive" => Some(InsuranceType::Comprehensive),
            "premium" => Some(InsuranceType::Premium),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsuranceStatus {
    Active,
    Expired,
    Cancelled,
    Claimed,
}

impl InsuranceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsuranceStatus::Active => "active",
            InsuranceStatus::Expired => "expired",
            InsuranceStatus::Cancelled => "cancelled",
            InsuranceStatus::Claimed => "claimed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(InsuranceStatus::Active),
            "expired" => Some(InsuranceStatus::Expired),
            "cancelled" => Some(InsuranceStatus::Cancelled),
            "claimed" => Some(InsuranceStatus::Claimed),
            _ => None,
        }
    }
}

/// A policy attached to a booking; policy numbers are `HJ` + 6 digits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsurancePolicy {
    pub id: i64,
    pub policy_number: String,
    pub booking_id: i64,
    pub passenger_id: i64,
    pub insurance_type: InsuranceType,
    pub coverage_amount: Money,
    pub premium: Money,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub status: InsuranceStatus,
    pub provider: String,
}

/// Write model for purchasing a policy.
#[derive(Debug, Clone)]
pub struct NewInsurancePolicy {
    pub policy_number: String,
    pub booking_id: i64,
    pub passenger_id: i64,
    pub insurance_type: InsuranceType,
    pub coverage_amount: Money,
    pub premium: Money,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub provider: String,
}
