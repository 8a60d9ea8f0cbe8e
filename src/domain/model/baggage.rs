//! Baggage pieces attached to booking segments.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaggageType {
    CarryOn,
    Checked,
    Excess,
}

impl BaggageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BaggageType::CarryOn => "carry_on",
            BaggageType::Checked => "checked",
            BaggageType::Excess => "excess",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "carry_on" => Some(BaggageType::CarryOn),
            "checked" => Some(BaggageType::Checked),
            "excess" => Some(BaggageType::Excess),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaggageStatus {
    Registered,
    Loaded,
    InTransit,
    Delivered,
    Lost,
}

impl BaggageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BaggageStatus::Registered => "registered",
            BaggageStatus::Loaded => "loaded",
            BaggageStatus::InTransit => "in_transit",
            BaggageStatus::Delivered => "delivered",
            BaggageStatus::Lost => "lost",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "registered" => Some(BaggageStatus::Registered),
            "loaded" => Some(BaggageStatus::Loaded),
            "in_transit" => Some(BaggageStatus::InTransit),
            "delivered" => Some(BaggageStatus::Delivered),
            "lost" => Some(BaggageStatus::Lost),
            _ => None,
        }
    }
}

/// One piece of baggage on a segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Baggage {
    pub id: i64,
    pub segment_id: i64,
    pub baggage_type: BaggageType,
    pub weight_kg: Decimal,
    pub fee: Money,
    pub tag_number: Option<String>,
    pub status: BaggageStatus,
}

/// Write model for registering baggage.
#[derive(Debug, Clone)]
pub struct NewBaggage {
    pub segment_id: i64,
    pub baggage_type: BaggageType,
    pub weight_kg: Decimal,
    pub fee: Money,
    pub tag_number: Option<String>,
}
