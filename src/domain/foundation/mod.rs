//! Foundation types shared across the domain: errors, money, identifiers.

mod errors;
mod money;
pub mod refs;

pub use errors::{DomainError, ErrorCode};
pub use money::Money;
