//! Domain layer: entities, value objects, and pure business rules.

pub mod foundation;
pub mod model;
pub mod rules;
