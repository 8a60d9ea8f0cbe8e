//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between the
//! domain and the outside world. Adapters implement these ports.
//!
//! Every store read returns pre-joined read models; every store mutation is
//! one atomic unit of work. Touching a relationship a method does not
//! materialize is impossible by construction.

mod booking_store;
mod flight_store;
mod health;
mod insurance_store;
mod passenger_store;
mod policy_store;
mod reference_data;
mod refund_store;
mod secret_store;
mod service_log_store;
mod trip_store;

pub use booking_store::BookingStore;
pub use flight_store::FlightStore;
pub use health::HealthProbe;
pub use insurance_store::InsuranceStore;
pub use passenger_store::PassengerStore;
pub use policy_store::PolicyStore;
pub use reference_data::ReferenceDataStore;
pub use refund_store::RefundStore;
pub use secret_store::{DbCredentials, SecretStore, SecretStoreError};
pub use service_log_store::ServiceLogStore;
pub use trip_store::TripStore;
