use std::collections::HashMap;
use std::sync::Arc;

use log::{info, warn};

use crate::models::forecast::ForecastDay;
use crate::models::itinerary::{Itinerary, TimeSlot};
use crate::models::optimize::{AnnotateRequest, AnnotationResult};
use crate::services::review_insights::{build_place_reviews_map, extract_local_tips};
use crate::services::weather_service::ForecastProvider;

pub const RAIN_ADVISORY: &str = "(Consider indoor alternative due to rain)";
pub const OUTDOOR_ADVISORY: &str = "(Great time for outdoor activities)";

/// Advisory for a forecast condition. Rain is checked first, so "clear, rain later" is rain.
pub fn advisory_for(condition: &str) -> Option<&'static str> {
    let condition = condition.to_lowercase();
    if condition.contains("rain") {
        Some(RAIN_ADVISORY)
    } else if condition.contains("sunny") || condition.contains("clear") {
        Some(OUTDOOR_ADVISORY)
    } else {
        None
    }
}

/// Appends the day's weather advisory to every non-empty slot. Forecast entries are
/// matched to days by position; extra days or extra forecast entries are left alone.
pub fn apply_weather_advisories(itinerary: &mut Itinerary, forecast: &[ForecastDay]) {
    for (day, weather) in itinerary.itinerary.iter_mut().zip(forecast) {
        let Some(advisory) = advisory_for(&weather.condition) else {
            continue;
        };
        for slot in TimeSlot::ALL {
            let value = day.slot_mut(slot);
            if !value.trim().is_empty() {
                value.push(' ');
                value.push_str(advisory);
            }
        }
    }
}

/// "morning" when more reviews mention mornings than afternoons, otherwise "afternoon".
pub fn predict_best_time(reviews: &[String]) -> &'static str {
    let mentions = |word: &str| {
        reviews
            .iter()
            .filter(|review| review.to_lowercase().contains(word))
            .count()
    };
    if mentions("morning") > mentions("afternoon") {
        "morning"
    } else {
        "afternoon"
    }
}

/// Appends a best-time hint to slots whose text exactly names a reviewed place.
pub fn apply_crowd_hints(itinerary: &mut Itinerary, place_reviews: &HashMap<String, Vec<String>>) {
    if place_reviews.is_empty() {
        return;
    }
    for day in itinerary.itinerary.iter_mut() {
        for slot in TimeSlot::ALL {
            let value = day.slot_mut(slot);
            if let Some(reviews) = place_reviews.get(value.as_str()) {
                let best_time = predict_best_time(reviews);
                value.push_str(&format!(" (Best time: {})", best_time));
            }
        }
    }
}

pub struct AnnotationService {
    forecasts: Arc<dyn ForecastProvider>,
}

impl AnnotationService {
    pub fn new(forecasts: Arc<dyn ForecastProvider>) -> Self {
        Self { forecasts }
    }

    /// Crowd hints first, then weather advisories. A forecast failure only skips advisories.
    pub async fn annotate(
        &self,
        mut itinerary: Itinerary,
        city: &str,
        place_reviews: &HashMap<String, Vec<String>>,
    ) -> Itinerary {
        apply_crowd_hints(&mut itinerary, place_reviews);

        if itinerary.is_empty() {
            return itinerary;
        }

        match self
            .forecasts
            .forecast(city, itinerary.day_count() as u32)
            .await
        {
            Ok(forecast) => {
                info!(
                    "Applying {} forecast days to {}-day itinerary for {}",
                    forecast.len(),
                    itinerary.day_count(),
                    city
                );
                apply_weather_advisories(&mut itinerary, &forecast);
            }
            Err(e) => warn!("Skipping weather advisories for {}: {}", city, e),
        }
        itinerary
    }

    /// Folds sentences mined from raw comments into the review map, then annotates.
    pub async fn annotate_request(&self, request: AnnotateRequest) -> AnnotationResult {
        let AnnotateRequest {
            itinerary,
            city,
            mut place_reviews,
            review_comments,
            places,
        } = request;

        if !review_comments.is_empty() {
            for (place, sentences) in build_place_reviews_map(&review_comments, places.as_deref()) {
                place_reviews.entry(place).or_default().extend(sentences);
            }
        }
        let local_tips = extract_local_tips(&review_comments);

        AnnotationResult {
            itinerary: self.annotate(itinerary, &city, &place_reviews).await,
            local_tips,
        }
    }
}
