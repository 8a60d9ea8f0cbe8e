//! Static airline policy rows.

use serde::{Deserialize, Serialize};

use super::airline::RouteType;
use super::booking::CabinClass;

/// One static fee/rule row, filtered by category, route type, and class.
/// A `None` filter column means the row applies to all values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirlinePolicy {
    pub id: i64,
    pub category: String,
    pub route_type: Option<RouteType>,
    pub cabin_class: Option<CabinClass>,
    pub title: String,
    pub body: String,
}

impl AirlinePolicy {
    /// Whether this row survives the given filters.
    pub fn matches(
        &self,
        category: Option<&str>,
        route_type: Option<RouteType>,
        cabin_class: Option<CabinClass>,
    ) -> bool {
        if let Some(cat) = category {
            if !self.category.eq_ignore_ascii_case(cat) {
                return false;
            }
        }
        if let (Some(want), Some(have)) = (route_type, self.route_type) {
            if want != have {
                return false;
            }
        }
        if let (Some(want), Some(have)) = (cabin_class, self.cabin_class) {
            if want != have {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(category: &str, route_type: Option<RouteType>, class: Option<CabinClass>) -> AirlinePolicy {
        AirlinePolicy {
            id: 1,
            category: category.to_string(),
            route_type,
            cabin_class: class,
            title: "t".to_string(),
            body: "b".to_string(),
        }
    }

    #[test]
    fn unfiltered_rows_match_everything() {
        let p = policy("baggage", None, None);
        assert!(p.matches(Some("baggage"), Some(RouteType::Domestic), Some(CabinClass::First)));
        assert!(p.matches(None, None, None));
    }

    #[test]
    fn category_filter_is_case_insensitive() {
        let p = policy("Baggage", None, None);
        assert!(p.matches(Some("baggage"), None, None));
        assert!(!p.matches(Some("refund"), None, None));
    }

    #[test]
    fn typed_columns_must_agree_when_both_present() {
        let p = policy("baggage", Some(RouteType::International), Some(CabinClass::Economy));
        assert!(p.matches(None, Some(RouteType::International), None));
        assert!(!p.matches(None, Some(RouteType::Domestic), None));
        assert!(!p.matches(None, None, Some(CabinClass::Business)));
    }
}
