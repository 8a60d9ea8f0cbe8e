//! Customer-facing identifier formats and generators.
//!
//! Booking and trip references are 6 chars from `[A-Z0-9]`; the remaining
//! identifiers are prefixed digit runs. Generation is uniform sampling;
//! collision handling (regenerate until unique) is the caller's loop since
//! only the store can observe existing references.

use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;

const REFERENCE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

static BOOKING_REF_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z0-9]{6}$").unwrap());
static LOOKUP_REF_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z0-9]{4,10}$").unwrap());
static REFUND_REF_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^RF[0-9]{6}$").unwrap());
static POLICY_NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^HJ[0-9]{6}$").unwrap());
static TICKET_NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{10}$").unwrap());

/// Samples a 6-char booking/trip reference uniformly from `[A-Z0-9]`.
pub fn generate_booking_reference<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..6)
        .map(|_| REFERENCE_ALPHABET[rng.gen_range(0..REFERENCE_ALPHABET.len())] as char)
        .collect()
}

/// `RF` + 6 digits.
pub fn generate_refund_reference<R: Rng + ?Sized>(rng: &mut R) -> String {
    prefixed_digits(rng, "RF")
}

/// `HJ` + 6 digits.
pub fn generate_policy_number<R: Rng + ?Sized>(rng: &mut R) -> String {
    prefixed_digits(rng, "HJ")
}

/// `CB` + 6 digits.
pub fn generate_callback_reference<R: Rng + ?Sized>(rng: &mut R) -> String {
    prefixed_digits(rng, "CB")
}

/// `CS` + 6 digits.
pub fn generate_case_number<R: Rng + ?Sized>(rng: &mut R) -> String {
    prefixed_digits(rng, "CS")
}

/// 10-digit ticket number.
pub fn generate_ticket_number<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..10)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

fn prefixed_digits<R: Rng + ?Sized>(rng: &mut R, prefix: &str) -> String {
    let digits: String = (0..6)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect();
    format!("{}{}", prefix, digits)
}

/// Strict booking/trip reference shape as stored.
pub fn is_booking_reference(s: &str) -> bool {
    BOOKING_REF_RE.is_match(s)
}

/// Relaxed shape accepted on input (sources disagree on length).
pub fn is_lookup_reference(s: &str) -> bool {
    LOOKUP_REF_RE.is_match(s)
}

pub fn is_refund_reference(s: &str) -> bool {
    REFUND_REF_RE.is_match(s)
}

pub fn is_policy_number(s: &str) -> bool {
    POLICY_NUMBER_RE.is_match(s)
}

pub fn is_ticket_number(s: &str) -> bool {
    TICKET_NUMBER_RE.is_match(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn generated_references_match_their_formats() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(is_booking_reference(&generate_booking_reference(&mut rng)));
        assert!(is_refund_reference(&generate_refund_reference(&mut rng)));
        assert!(is_policy_number(&generate_policy_number(&mut rng)));
        assert!(is_ticket_number(&generate_ticket_number(&mut rng)));
        assert!(generate_callback_reference(&mut rng).starts_with("CB"));
        assert!(generate_case_number(&mut rng).starts_with("CS"));
    }

    #[test]
    fn lookup_reference_accepts_four_to_ten_chars() {
        assert!(is_lookup_reference("ABCD"));
        assert!(is_lookup_reference("ABC123"));
        assert!(is_lookup_reference("ABCDEF1234"));
        assert!(!is_lookup_reference("abc123"));
        assert!(!is_lookup_reference("ABC"));
        assert!(!is_lookup_reference("ABCDEF12345"));
    }

    proptest! {
        #[test]
        fn booking_reference_is_six_uppercase_alphanumerics(seed in any::<u64>()) {
            let mut rng = StdRng::seed_from_u64(seed);
            let r = generate_booking_reference(&mut rng);
            prop_assert_eq!(r.len(), 6);
            prop_assert!(r.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));
        }
    }
}
