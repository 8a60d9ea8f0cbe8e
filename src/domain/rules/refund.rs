//! Refund amount and processing-time rules.

use crate::domain::foundation::{DomainError, Money};
use crate::domain::model::{RefundMethod, RefundType};

/// Refund = total minus the cancellation fee. Full refund iff the fee is
/// zero, partial otherwise.
pub fn refund_amount(
    total: &Money,
    cancellation_fee: &Money,
) -> Result<(Money, RefundType), DomainError> {
    let amount = total.sub(cancellation_fee)?;
    let refund_type = if cancellation_fee.is_zero() {
        RefundType::Full
    } else {
        RefundType::Partial
    };
    Ok((amount, refund_type))
}

/// Expected processing time for a refund method, in business days.
pub fn processing_time(method: RefundMethod) -> &'static str {
    match method {
        RefundMethod::CreditCard => "3-5 business days",
        RefundMethod::BankTransfer => "7-10 business days",
        RefundMethod::TravelCredit => "1-2 business days",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd(s: &str) -> Money {
        Money::new(s.parse().unwrap(), "USD")
    }

    #[test]
    fn zero_fee_yields_full_refund() {
        let (amount, kind) = refund_amount(&usd("1000.00"), &usd("0")).unwrap();
        assert_eq!(amount, usd("1000.00"));
        assert_eq!(kind, RefundType::Full);
    }

    #[test]
    fn nonzero_fee_yields_partial_refund() {
        let (amount, kind) = refund_amount(&usd("1000.00"), &usd("500.00")).unwrap();
        assert_eq!(amount, usd("500.00"));
        assert_eq!(kind, RefundType::Partial);
    }

    #[test]
    fn processing_times_by_method() {
        assert_eq!(processing_time(RefundMethod::CreditCard), "3-5 business days");
        assert_eq!(processing_time(RefundMethod::BankTransfer), "7-10 business days");
        assert_eq!(processing_time(RefundMethod::TravelCredit), "1-2 business days");
    }
}
