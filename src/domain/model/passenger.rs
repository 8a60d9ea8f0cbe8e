//! Passengers and loyalty tiers.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Loyalty tier; influences baggage and seat perks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassengerTier {
    Basic,
    Silver,
    Gold,
    Platinum,
}

impl PassengerTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            PassengerTier::Basic => "basic",
            PassengerTier::Silver => "silver",
            PassengerTier::Gold => "gold",
            PassengerTier::Platinum => "platinum",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "basic" => Some(PassengerTier::Basic),
            "silver" => Some(PassengerTier::Silver),
            "gold" => Some(PassengerTier::Gold),
            "platinum" => Some(PassengerTier::Platinum),
            _ => None,
        }
    }

    /// Checked-baggage allowance multiplier.
    pub fn baggage_multiplier(&self) -> Decimal {
        match self {
            PassengerTier::Basic => Decimal::new(10, 1),
            PassengerTier::Silver => Decimal::new(12, 1),
            PassengerTier::Gold => Decimal::new(15, 1),
            PassengerTier::Platinum => Decimal::new(20, 1),
        }
    }
}

/// A traveler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passenger {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub nationality: Option<String>,
    pub passport_number: Option<String>,
    pub frequent_flyer_number: Option<String>,
    pub tier: PassengerTier,
}

impl Passenger {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_multipliers_are_ordered() {
        let tiers = [
            PassengerTier::Basic,
            PassengerTier::Silver,
            PassengerTier::Gold,
            PassengerTier::Platinum,
        ];
        for pair in tiers.windows(2) {
            assert!(pair[0].baggage_multiplier() < pair[1].baggage_multiplier());
        }
    }
}
