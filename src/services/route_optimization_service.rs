//! Route Optimization Service
//!
//! Reorders the activities of a single day so that each next stop is the one with the
//! shortest travel time from where the traveller currently is.
//!
//! ## Algorithm
//! - The first non-empty slot is always the anchor; the user's first activity is kept.
//! - At every step the travel-time provider is asked for the minutes from the anchor to
//!   each unvisited activity at the current simulated departure time.
//! - The cheapest candidate wins (ties go to the earlier slot), the clock advances by
//!   travel time plus dwell time, and the chosen activity becomes the next anchor.
//! - Days with fewer than two activities are returned untouched.

use std::sync::Arc;

use chrono::{DateTime, Days, Duration, NaiveDate, NaiveTime, Utc};
use log::debug;

use crate::error::ProviderError;
use crate::models::itinerary::ItineraryDay;
use crate::services::distance_service::TravelTimeProvider;

const DEFAULT_DWELL_MINUTES: i64 = 120;

#[derive(Debug, Clone)]
pub struct OptimizationConfig {
    pub dwell_minutes: i64,
    pub day_start_time: NaiveTime,
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            dwell_minutes: DEFAULT_DWELL_MINUTES,
            day_start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SequenceOutcome {
    pub ordered: Vec<String>,
    pub decisions: Vec<String>,
    pub total_travel_minutes: u32,
}

pub struct RouteOptimizationService {
    travel_times: Arc<dyn TravelTimeProvider>,
    config: OptimizationConfig,
}

impl RouteOptimizationService {
    pub fn new(travel_times: Arc<dyn TravelTimeProvider>) -> Self {
        Self {
            travel_times,
            config: OptimizationConfig::default(),
        }
    }

    pub fn with_config(travel_times: Arc<dyn TravelTimeProvider>, config: OptimizationConfig) -> Self {
        Self {
            travel_times,
            config,
        }
    }

    pub fn config(&self) -> &OptimizationConfig {
        &self.config
    }

    /// Simulated departure for day `day` (1-based) of a trip starting on `trip_start`.
    /// `None` when the date falls outside the supported calendar.
    pub fn departure_for_day(&self, trip_start: NaiveDate, day: u32) -> Option<DateTime<Utc>> {
        let date = trip_start.checked_add_days(Days::new(u64::from(day.saturating_sub(1))))?;
        Some(date.and_time(self.config.day_start_time).and_utc())
    }

    /// Greedy nearest-next ordering of `places`, anchored on the first entry.
    pub async fn optimize_sequence(
        &self,
        places: Vec<String>,
        start: DateTime<Utc>,
    ) -> Result<SequenceOutcome, ProviderError> {
        if places.len() <= 1 {
            return Ok(SequenceOutcome {
                ordered: places,
                decisions: Vec::new(),
                total_travel_minutes: 0,
            });
        }

        let mut remaining = places;
        let mut ordered = vec![remaining.remove(0)];
        let mut decisions = Vec::new();
        let mut departure = start;
        let mut total_travel_minutes = 0u32;

        while !remaining.is_empty() {
            let anchor = ordered.last().cloned().unwrap_or_default();
            let travel_times = self
                .travel_times
                .travel_times_from(&anchor, &remaining, departure)
                .await?;

            if travel_times.len() != remaining.len() {
                return Err(ProviderError::malformed(
                    self.travel_times.name(),
                    format!(
                        "asked for {} travel times, got {}",
                        remaining.len(),
                        travel_times.len()
                    ),
                ));
            }

            let mut next_idx = 0;
            for (idx, &minutes) in travel_times.iter().enumerate() {
                if minutes < travel_times[next_idx] {
                    next_idx = idx;
                }
            }
            let chosen_minutes = travel_times[next_idx];

            let alternatives = remaining
                .iter()
                .zip(&travel_times)
                .enumerate()
                .filter(|(idx, _)| *idx != next_idx)
                .map(|(_, (place, minutes))| format!("{}: {} mins", place, minutes))
                .collect::<Vec<_>>();
            let decision = if alternatives.is_empty() {
                format!(
                    "From {} → {} was chosen because travel time = {} mins and it was the only remaining stop",
                    anchor, remaining[next_idx], chosen_minutes
                )
            } else {
                format!(
                    "From {} → {} was chosen because travel time = {} mins, shorter than alternatives {{{}}}",
                    anchor,
                    remaining[next_idx],
                    chosen_minutes,
                    alternatives.join(", ")
                )
            };
            debug!("{}", decision);
            decisions.push(decision);

            // Saturates at the end of the calendar; only the ordering matters past that point.
            departure = departure
                .checked_add_signed(Duration::minutes(
                    i64::from(chosen_minutes).saturating_add(self.config.dwell_minutes),
                ))
                .unwrap_or(DateTime::<Utc>::MAX_UTC);
            total_travel_minutes += chosen_minutes;
            ordered.push(remaining.remove(next_idx));
        }

        Ok(SequenceOutcome {
            ordered,
            decisions,
            total_travel_minutes,
        })
    }

    /// Returns a copy of `day` with its slots reordered; empty slots are dropped before
    /// sequencing and padded back at the end.
    pub async fn optimize_day(
        &self,
        day: &ItineraryDay,
        start: DateTime<Utc>,
    ) -> Result<(ItineraryDay, SequenceOutcome), ProviderError> {
        let places = day.filled_slots();
        if places.len() <= 1 {
            return Ok((
                day.clone(),
                SequenceOutcome {
                    ordered: places,
                    decisions: Vec::new(),
                    total_travel_minutes: 0,
                },
            ));
        }

        let outcome = self.optimize_sequence(places, start).await?;
        let mut resequenced = day.clone();
        resequenced.set_sequence(outcome.ordered.clone());
        Ok((resequenced, outcome))
    }
}
