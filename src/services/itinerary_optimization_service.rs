//! Itinerary Optimization Service
//!
//! Rewrites an itinerary from a given day onward:
//! 1. days before `start_day` are kept as they are,
//! 2. the remaining days are regenerated by the narrative generator with the weather
//!    forecast in the prompt (falling back to the current days when that fails),
//! 3. each regenerated day is resequenced to cut travel time,
//! 4. every rewritten day gets human-readable reasons for what changed,
//! 5. the total cost is recomputed from the merged days.
//!
//! Collaborator failures never abort the run; only a malformed input itinerary does.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use log::{debug, info, warn};

use crate::error::{GenerationError, OptimizeError, ValidationError};
use crate::models::forecast::ForecastOutlook;
use crate::models::itinerary::{Itinerary, ItineraryDay};
use crate::models::optimize::OptimizationResult;
use crate::models::trip::TripRequest;
use crate::services::distance_service::TravelTimeProvider;
use crate::services::narrative_service::{
    parse_regenerated_days, NarrativeGenerator, RegeneratedWindow, RegenerationRequest,
};
use crate::services::route_optimization_service::{OptimizationConfig, RouteOptimizationService};
use crate::services::weather_service::ForecastProvider;

pub const SEQUENCE_REASON: &str = "Adjusted sequence to reduce travel time between activities.";

pub fn weather_change_reason(forecast: &str) -> String {
    format!("Changed due to weather forecast ({}).", forecast)
}

/// `start_day` must name an existing day of a non-empty itinerary; returns it as a day index.
pub fn validate_window(itinerary: &Itinerary, start_day: i64) -> Result<u32, ValidationError> {
    if itinerary.is_empty() {
        return Err(ValidationError::EmptyItinerary);
    }
    let out_of_range = ValidationError::StartDayOutOfRange {
        start_day,
        day_count: itinerary.day_count(),
    };
    match u32::try_from(start_day) {
        Ok(day) if day >= 1 && day as usize <= itinerary.day_count() => Ok(day),
        _ => Err(out_of_range),
    }
}

pub struct ItineraryOptimizer {
    forecasts: Arc<dyn ForecastProvider>,
    narrator: Arc<dyn NarrativeGenerator>,
    router: RouteOptimizationService,
}

impl ItineraryOptimizer {
    pub fn new(
        forecasts: Arc<dyn ForecastProvider>,
        narrator: Arc<dyn NarrativeGenerator>,
        travel_times: Arc<dyn TravelTimeProvider>,
        config: OptimizationConfig,
    ) -> Self {
        Self {
            forecasts,
            narrator,
            router: RouteOptimizationService::with_config(travel_times, config),
        }
    }

    pub async fn optimize(
        &self,
        itinerary: Itinerary,
        trip: &TripRequest,
        start_day: i64,
        city: &str,
    ) -> Result<OptimizationResult, OptimizeError> {
        let start_day = match validate_window(&itinerary, start_day) {
            Ok(day) => day,
            Err(e) => {
                info!("Nothing to optimize: {}", e);
                return Ok(OptimizationResult::unchanged(itinerary));
            }
        };
        if let Err(reason) = itinerary.check_sequence() {
            return Err(OptimizeError::MalformedItinerary { reason, itinerary });
        }

        let mut prefix = itinerary.itinerary;
        let window = prefix.split_off(start_day as usize - 1);
        info!(
            "Optimizing days {}-{} of {} for {} ({} untouched)",
            start_day,
            start_day as usize + window.len() - 1,
            prefix.len() + window.len(),
            city,
            prefix.len()
        );

        let outlook = self.fetch_outlook(city, window.len()).await;
        let forecast_summary = outlook.summary_text();

        let prefix_cost: f64 = prefix.iter().map(|d| d.estimated_cost).sum();
        let request = RegenerationRequest {
            trip,
            forecast_summary: &forecast_summary,
            day_count: window.len(),
            start_day,
            remaining_budget: (trip.budget as f64 - prefix_cost).max(0.0),
            current_days: &window,
        };

        let regenerated = match self.regenerate_window(&request).await {
            Ok(regenerated) => {
                let sum: f64 = regenerated.days.iter().map(|d| d.estimated_cost).sum();
                if let Some(reported) = regenerated.reported_total {
                    if (reported - sum).abs() > f64::EPSILON {
                        debug!(
                            "Generator reported total {} but its days sum to {}",
                            reported, sum
                        );
                    }
                }
                regenerated.days
            }
            Err(e) => {
                warn!("Keeping current days {}+ after regeneration failed: {}", start_day, e);
                window.clone()
            }
        };

        let trip_start = trip.start_date.unwrap_or_else(|| Utc::now().date_naive());
        let mut reasons = BTreeMap::new();
        let mut optimized = Vec::with_capacity(window.len());

        for (offset, (original, regenerated)) in window.iter().zip(regenerated).enumerate() {
            let mut day_reasons = Vec::new();
            if !original.same_slots(&regenerated) {
                day_reasons.push(weather_change_reason(&outlook.describe(offset)));
            }

            let (mut day, reordered) = self.resequence(regenerated, trip_start).await;
            if reordered {
                day_reasons.push(SEQUENCE_REASON.to_string());
            }

            day.reasons = day_reasons.clone();
            reasons.insert(day.day, day_reasons);
            optimized.push(day);
        }

        prefix.extend(optimized);
        Ok(OptimizationResult {
            itinerary: Itinerary::new(prefix),
            reasons,
        })
    }

    async fn fetch_outlook(&self, city: &str, days: usize) -> ForecastOutlook {
        match self.forecasts.forecast(city, days as u32).await {
            Ok(forecast) => ForecastOutlook::Days(forecast),
            Err(e) => {
                warn!("Forecast for {} unavailable, continuing without it: {}", city, e);
                ForecastOutlook::Unavailable {
                    note: e.to_string(),
                }
            }
        }
    }

    async fn regenerate_window(
        &self,
        request: &RegenerationRequest<'_>,
    ) -> Result<RegeneratedWindow, GenerationError> {
        let raw = self.narrator.regenerate(request).await?;
        parse_regenerated_days(&raw, request.day_count, request.start_day)
    }

    /// Returns the day to keep and whether its slots were reordered.
    async fn resequence(
        &self,
        day: ItineraryDay,
        trip_start: chrono::NaiveDate,
    ) -> (ItineraryDay, bool) {
        let Some(departure) = self.router.departure_for_day(trip_start, day.day) else {
            warn!(
                "Keeping day {} order, no departure time after {}",
                day.day, trip_start
            );
            return (day, false);
        };
        match self.router.optimize_day(&day, departure).await {
            Ok((resequenced, outcome)) => {
                for decision in &outcome.decisions {
                    debug!("Day {}: {}", day.day, decision);
                }
                let changed = !resequenced.same_slots(&day);
                (resequenced, changed)
            }
            Err(e) => {
                warn!("Keeping day {} order, travel times unavailable: {}", day.day, e);
                (day, false)
            }
        }
    }
}
