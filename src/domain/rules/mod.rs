//! Pure business rules shared across operation handlers.
//!
//! Everything here is table-driven and side-effect free; handlers pass in
//! the clock and get values back.

pub mod baggage;
pub mod checkin;
pub mod escalation;
pub mod fees;
pub mod packages;
pub mod pricing;
pub mod refund;
pub mod seating;
