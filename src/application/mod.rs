//! Application layer: parameter reconciliation, the operation registry, and
//! the handlers the registry dispatches to.

pub mod envelope;
pub mod handlers;
pub mod reconcile;
pub mod registry;

pub use envelope::Envelope;
pub use registry::{OperationCategory, OperationRegistry};

use std::sync::Arc;

use crate::ports::{
    BookingStore, FlightStore, InsuranceStore, PassengerStore, PolicyStore, ReferenceDataStore,
    RefundStore, ServiceLogStore, TripStore,
};

/// Every store a handler can reach, wired once at startup and passed into
/// the dispatcher. Read-only after construction.
#[derive(Clone)]
pub struct Services {
    pub reference_data: Arc<dyn ReferenceDataStore>,
    pub flights: Arc<dyn FlightStore>,
    pub bookings: Arc<dyn BookingStore>,
    pub passengers: Arc<dyn PassengerStore>,
    pub refunds: Arc<dyn RefundStore>,
    pub insurance: Arc<dyn InsuranceStore>,
    pub trips: Arc<dyn TripStore>,
    pub policies: Arc<dyn PolicyStore>,
    pub service_log: Arc<dyn ServiceLogStore>,
}
