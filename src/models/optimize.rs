use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::{itinerary::Itinerary, review::ReviewComment, trip::TripRequest};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizeRequest {
    #[serde(alias = "itinerary_json")]
    pub itinerary: Itinerary,
    #[serde(alias = "parsed_input")]
    pub trip_request: TripRequest,
    pub start_day: i64,
    pub city: String,
}

/// Pipeline output: merged itinerary plus the reasons attached to each optimized day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct OptimizationResult {
    pub itinerary: Itinerary,
    pub reasons: BTreeMap<u32, Vec<String>>,
}

impl OptimizationResult {
    pub fn unchanged(itinerary: Itinerary) -> Self {
        Self {
            itinerary,
            reasons: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotateRequest {
    #[serde(alias = "itinerary_json")]
    pub itinerary: Itinerary,
    pub city: String,
    #[serde(default)]
    pub place_reviews: HashMap<String, Vec<String>>,
    /// Raw traveller comments; mined for place reviews and local tips.
    #[serde(default)]
    pub review_comments: Vec<ReviewComment>,
    /// Places to look for in `review_comments`; capitalised words are used when absent.
    #[serde(default)]
    pub places: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AnnotationResult {
    pub itinerary: Itinerary,
    #[serde(default)]
    pub local_tips: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub message: String,
    pub response: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(message: impl Into<String>, response: T) -> Self {
        Self {
            message: message.into(),
            response,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_legacy_field_names() {
        let request: OptimizeRequest = serde_json::from_value(serde_json::json!({
            "itinerary_json": {"itinerary": [], "total_estimated_cost": 0},
            "parsed_input": {"location": "Goa", "duration_days": 3, "budget": 30000, "themes": ["beach"]},
            "start_day": 2,
            "city": "Goa"
        }))
        .unwrap();

        assert_eq!(request.start_day, 2);
        assert_eq!(request.trip_request.location, "Goa");
        assert!(request.itinerary.is_empty());
    }

    #[test]
    fn test_negative_start_day_deserializes() {
        let request: OptimizeRequest = serde_json::from_value(serde_json::json!({
            "itinerary": {"itinerary": []},
            "trip_request": {"location": "Goa", "duration_days": 1, "budget": 100},
            "start_day": -2,
            "city": "Goa"
        }))
        .unwrap();

        assert_eq!(request.start_day, -2);
    }
}
