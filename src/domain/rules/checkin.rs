//! Check-in window calculation.
//!
//! The window opens exactly 24 hours before scheduled departure. It closes
//! 2 hours before departure for flights over 2000 km, 1 hour otherwise.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

const LONG_HAUL_KM: i32 = 2000;

/// The interval during which a passenger may self-check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckInWindow {
    pub opens_at: DateTime<Utc>,
    pub closes_at: DateTime<Utc>,
}

/// Where `now` falls relative to a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowPosition {
    BeforeOpen,
    Open,
    Closed,
}

/// Computes the check-in window for a departure at the given route distance.
pub fn check_in_window(scheduled_departure: DateTime<Utc>, distance_km: i32) -> CheckInWindow {
    let close_margin = if distance_km > LONG_HAUL_KM {
        Duration::hours(2)
    } else {
        Duration::hours(1)
    };
    CheckInWindow {
        opens_at: scheduled_departure - Duration::hours(24),
        closes_at: scheduled_departure - close_margin,
    }
}

impl CheckInWindow {
    pub fn position(&self, now: DateTime<Utc>) -> WindowPosition {
        if now < self.opens_at {
            WindowPosition::BeforeOpen
        } else if now > self.closes_at {
            WindowPosition::Closed
        } else {
            WindowPosition::Open
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn departure() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn window_opens_24_hours_before_departure() {
        let w = check_in_window(departure(), 1000);
        assert_eq!(w.opens_at, departure() - Duration::hours(24));
    }

    #[test]
    fn short_haul_closes_one_hour_before() {
        let w = check_in_window(departure(), 1999);
        assert_eq!(w.closes_at, departure() - Duration::hours(1));
    }

    #[test]
    fn long_haul_closes_two_hours_before() {
        let w = check_in_window(departure(), 3000);
        assert_eq!(w.closes_at, departure() - Duration::hours(2));
    }

    #[test]
    fn exactly_2000_km_counts_as_short_haul() {
        let w = check_in_window(departure(), 2000);
        assert_eq!(w.closes_at, departure() - Duration::hours(1));
    }

    #[test]
    fn position_tracks_the_boundaries() {
        let w = check_in_window(departure(), 3000);
        assert_eq!(w.position(departure() - Duration::hours(36)), WindowPosition::BeforeOpen);
        assert_eq!(w.position(departure() - Duration::hours(24)), WindowPosition::Open);
        assert_eq!(w.position(departure() - Duration::hours(10)), WindowPosition::Open);
        assert_eq!(w.position(departure() - Duration::minutes(90)), WindowPosition::Closed);
    }
}
