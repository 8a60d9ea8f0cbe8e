//! Baggage allowance resolution.
//!
//! A two-axis table keyed by (class, route type) gives the base allowance;
//! a loyalty-tier multiplier scales the checked allowance, after which
//! checked pieces cap at 3 and per-piece weight caps at 45 kg.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::foundation::Money;
use crate::domain::model::{CabinClass, PassengerTier, RouteType};

const MAX_CHECKED_PIECES: i32 = 3;
const MAX_PIECE_WEIGHT_KG: i32 = 45;

/// Resolved allowance plus the fees for exceeding it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaggageAllowance {
    pub carry_on_pieces: i32,
    pub carry_on_weight_kg: Decimal,
    pub checked_pieces: i32,
    pub checked_weight_kg_per_piece: Decimal,
    pub personal_item: bool,
    pub extra_piece_fee: Money,
    pub excess_weight_fee_per_kg: Money,
}

struct BaseRow {
    carry_on_pieces: i32,
    carry_on_kg: i64,
    checked_pieces: i32,
    checked_kg: i64,
    extra_piece_fee: i64,
    excess_per_kg: i64,
}

fn base_row(class: CabinClass, route_type: RouteType) -> BaseRow {
    use CabinClass::*;
    use RouteType::*;
    match (class, route_type) {
        (Economy, Domestic) => BaseRow { carry_on_pieces: 1, carry_on_kg: 7, checked_pieces: 1, checked_kg: 23, extra_piece_fee: 50, excess_per_kg: 10 },
        (Economy, International) => BaseRow { carry_on_pieces: 1, carry_on_kg: 7, checked_pieces: 1, checked_kg: 23, extra_piece_fee: 75, excess_per_kg: 12 },
        (PremiumEconomy, Domestic) => BaseRow { carry_on_pieces: 1, carry_on_kg: 10, checked_pieces: 2, checked_kg: 23, extra_piece_fee: 50, excess_per_kg: 10 },
        (PremiumEconomy, International) => BaseRow { carry_on_pieces: 1, carry_on_kg: 10, checked_pieces: 2, checked_kg: 23, extra_piece_fee: 75, excess_per_kg: 12 },
        (Business, Domestic) => BaseRow { carry_on_pieces: 2, carry_on_kg: 10, checked_pieces: 2, checked_kg: 32, extra_piece_fee: 40, excess_per_kg: 8 },
        (Business, International) => BaseRow { carry_on_pieces: 2, carry_on_kg: 10, checked_pieces: 2, checked_kg: 32, extra_piece_fee: 60, excess_per_kg: 10 },
        (First, Domestic) => BaseRow { carry_on_pieces: 2, carry_on_kg: 12, checked_pieces: 3, checked_kg: 32, extra_piece_fee: 0, excess_per_kg: 8 },
        (First, International) => BaseRow { carry_on_pieces: 2, carry_on_kg: 12, checked_pieces: 3, checked_kg: 32, extra_piece_fee: 0, excess_per_kg: 10 },
    }
}

/// Resolves the allowance for a class/route pair, applying the tier bonus
/// when the traveler's tier is known.
pub fn baggage_allowance(
    class: CabinClass,
    route_type: RouteType,
    tier: Option<PassengerTier>,
    currency: &str,
) -> BaggageAllowance {
    let row = base_row(class, route_type);
    let multiplier = tier
        .map(|t| t.baggage_multiplier())
        .unwrap_or(Decimal::ONE);

    let scaled_pieces = (Decimal::from(row.checked_pieces) * multiplier)
        .floor()
        .to_i32()
        .unwrap_or(row.checked_pieces);
    let checked_pieces = scaled_pieces.min(MAX_CHECKED_PIECES);

    let scaled_weight = (Decimal::from(row.checked_kg) * multiplier).round_dp(1);
    let checked_weight = scaled_weight.min(Decimal::from(MAX_PIECE_WEIGHT_KG));

    BaggageAllowance {
        carry_on_pieces: row.carry_on_pieces,
        carry_on_weight_kg: Decimal::from(row.carry_on_kg),
        checked_pieces,
        checked_weight_kg_per_piece: checked_weight,
        personal_item: true,
        extra_piece_fee: Money::new(Decimal::from(row.extra_piece_fee), currency),
        excess_weight_fee_per_kg: Money::new(Decimal::from(row.excess_per_kg), currency),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn economy_international_base_allowance() {
        let a = baggage_allowance(CabinClass::Economy, RouteType::International, None, "USD");
        assert_eq!(a.checked_pieces, 1);
        assert_eq!(a.checked_weight_kg_per_piece, d("23"));
        assert_eq!(a.extra_piece_fee.amount, d("75"));
    }

    #[test]
    fn gold_tier_scales_checked_weight() {
        let a = baggage_allowance(
            CabinClass::Economy,
            RouteType::International,
            Some(PassengerTier::Gold),
            "USD",
        );
        // 23 kg * 1.5 = 34.5 kg; 1 piece * 1.5 floors back to 1
        assert_eq!(a.checked_weight_kg_per_piece, d("34.5"));
        assert_eq!(a.checked_pieces, 1);
    }

    #[test]
    fn platinum_weight_caps_at_45_kg() {
        let a = baggage_allowance(
            CabinClass::Business,
            RouteType::International,
            Some(PassengerTier::Platinum),
            "USD",
        );
        // 32 kg * 2.0 = 64 kg, capped
        assert_eq!(a.checked_weight_kg_per_piece, d("45"));
    }

    #[test]
    fn platinum_pieces_cap_at_three() {
        let a = baggage_allowance(
            CabinClass::First,
            RouteType::Domestic,
            Some(PassengerTier::Platinum),
            "USD",
        );
        // 3 pieces * 2.0 = 6, capped
        assert_eq!(a.checked_pieces, 3);
    }

    #[test]
    fn basic_tier_matches_no_tier() {
        let with = baggage_allowance(
            CabinClass::Economy,
            RouteType::Domestic,
            Some(PassengerTier::Basic),
            "USD",
        );
        let without = baggage_allowance(CabinClass::Economy, RouteType::Domestic, None, "USD");
        assert_eq!(with, without);
    }

    proptest! {
        #[test]
        fn caps_always_hold(class_ix in 0usize..4, route_ix in 0usize..2, tier_ix in 0usize..4) {
            let class = [CabinClass::Economy, CabinClass::PremiumEconomy, CabinClass::Business, CabinClass::First][class_ix];
            let route = [RouteType::Domestic, RouteType::International][route_ix];
            let tier = [PassengerTier::Basic, PassengerTier::Silver, PassengerTier::Gold, PassengerTier::Platinum][tier_ix];
            let a = baggage_allowance(class, route, Some(tier), "USD");
            prop_assert!(a.checked_pieces <= MAX_CHECKED_PIECES);
            prop_assert!(a.checked_weight_kg_per_piece <= Decimal::from(MAX_PIECE_WEIGHT_KG));
            prop_assert!(a.checked_pieces >= 1);
        }
    }
}
