//! Domain entities and read/write models.

mod airline;
mod baggage;
mod booking;
mod flight;
mod insurance;
mod passenger;
mod policy;
mod refund;
mod seat;
mod service_log;
mod trip;

pub use airline::{Aircraft, AircraftStatus, AircraftType, Airline, Airport, Route, RouteType};
pub use baggage::{Baggage, BaggageStatus, BaggageType, NewBaggage};
pub use booking::{
    Booking, BookingDetail, BookingSegment, BookingStatus, CabinClass, CheckInStatus, NewBooking,
    NewSegment, SegmentDetail, TripType,
};
pub use flight::{Flight, FlightDetail, FlightStatus, FlightStatusUpdate};
pub use insurance::{InsurancePolicy, InsuranceStatus, InsuranceType, NewInsurancePolicy};
pub use passenger::{Passenger, PassengerTier};
pub use policy::AirlinePolicy;
pub use refund::{NewRefund, Refund, RefundMethod, RefundStatus, RefundType};
pub use seat::{FlightSeat, SeatMapRow, SeatStatus, SeatType};
pub use service_log::{CustomerServiceLog, InteractionKind, NewServiceLog};
pub use trip::{
    Excursion, ExcursionBooking, NewExcursionBooking, NewTripBooking, TripBooking,
    TripBookingDetail, TripBookingStatus, TripPackage,
};
