#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use trip_optimizer_api::error::ProviderError;
use trip_optimizer_api::models::forecast::ForecastDay;
use trip_optimizer_api::models::itinerary::{Itinerary, ItineraryDay};
use trip_optimizer_api::models::trip::TripRequest;
use trip_optimizer_api::routes::{self, AppState};
use trip_optimizer_api::services::distance_service::TravelTimeProvider;
use trip_optimizer_api::services::itinerary_optimization_service::ItineraryOptimizer;
use trip_optimizer_api::services::narrative_service::{NarrativeGenerator, RegenerationRequest};
use trip_optimizer_api::services::route_optimization_service::OptimizationConfig;
use trip_optimizer_api::services::weather_service::ForecastProvider;
use trip_optimizer_api::services::Providers;

/// Forecast stub: fixed conditions, or a failure when constructed with `failing`.
pub struct StubForecast {
    conditions: Vec<&'static str>,
    fail: bool,
    pub calls: Mutex<Vec<(String, u32)>>,
}

impl StubForecast {
    pub fn with_conditions(conditions: &[&'static str]) -> Self {
        Self {
            conditions: conditions.to_vec(),
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            conditions: Vec::new(),
            fail: true,
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ForecastProvider for StubForecast {
    fn name(&self) -> &'static str {
        "stub-forecast"
    }

    async fn forecast(&self, location: &str, days: u32) -> Result<Vec<ForecastDay>, ProviderError> {
        self.calls.lock().unwrap().push((location.to_string(), days));
        if self.fail {
            return Err(ProviderError::malformed("stub-forecast", "service down"));
        }
        Ok((0..days as usize)
            .map(|i| ForecastDay {
                day: i as u32 + 1,
                condition: self.conditions[i % self.conditions.len()].to_string(),
                max_temp_c: 30.0,
                min_temp_c: 20.0,
                rain_chance: if self.conditions[i % self.conditions.len()]
                    .to_lowercase()
                    .contains("rain")
                {
                    80
                } else {
                    10
                },
            })
            .collect())
    }
}

/// Symmetric table of travel minutes; unknown pairs fail.
pub struct TableTravelTimes {
    minutes: HashMap<(String, String), u32>,
}

impl TableTravelTimes {
    pub fn new(pairs: &[(&str, &str, u32)]) -> Self {
        let mut minutes = HashMap::new();
        for (a, b, m) in pairs {
            minutes.insert((a.to_string(), b.to_string()), *m);
            minutes.insert((b.to_string(), a.to_string()), *m);
        }
        Self { minutes }
    }
}

#[async_trait]
impl TravelTimeProvider for TableTravelTimes {
    fn name(&self) -> &'static str {
        "table"
    }

    async fn travel_minutes(
        &self,
        origin: &str,
        destination: &str,
        _departure: DateTime<Utc>,
    ) -> Result<u32, ProviderError> {
        self.minutes
            .get(&(origin.to_string(), destination.to_string()))
            .copied()
            .ok_or_else(|| {
                ProviderError::malformed("table", format!("no route {} -> {}", origin, destination))
            })
    }
}

/// Narrative stub returning canned raw text and recording what it was asked for.
pub struct CannedNarrative {
    output: Result<String, String>,
    pub requests: Mutex<Vec<(usize, u32, f64, String)>>,
}

impl CannedNarrative {
    pub fn returning(output: impl Into<String>) -> Self {
        Self {
            output: Ok(output.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            output: Err(message.into()),
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl NarrativeGenerator for CannedNarrative {
    fn name(&self) -> &'static str {
        "canned-narrative"
    }

    async fn regenerate(&self, request: &RegenerationRequest<'_>) -> Result<String, ProviderError> {
        self.requests.lock().unwrap().push((
            request.day_count,
            request.start_day,
            request.remaining_budget,
            request.forecast_summary.to_string(),
        ));
        match &self.output {
            Ok(text) => Ok(text.clone()),
            Err(message) => Err(ProviderError::malformed("canned-narrative", message.clone())),
        }
    }
}

pub fn optimizer(
    forecasts: Arc<dyn ForecastProvider>,
    narrator: Arc<dyn NarrativeGenerator>,
    travel_times: Arc<dyn TravelTimeProvider>,
) -> ItineraryOptimizer {
    ItineraryOptimizer::new(forecasts, narrator, travel_times, OptimizationConfig::default())
}

pub fn jaipur_trip() -> TripRequest {
    let mut trip = TripRequest::new("Jaipur", 3, 20000).with_themes(["heritage", "food"]);
    trip.start_date = NaiveDate::from_ymd_opt(2031, 1, 10);
    trip
}

pub fn three_day_itinerary() -> Itinerary {
    Itinerary {
        itinerary: vec![
            ItineraryDay::new(1, "Amber Fort", "City Palace", "Chokhi Dhani", 4000.0),
            ItineraryDay::new(2, "A", "C", "B", 3000.0),
            ItineraryDay::new(3, "Jal Mahal", "Hawa Mahal", "Johari Bazaar", 2500.0),
        ],
        total_estimated_cost: 1.0,
    }
}

pub fn test_app_state(providers: Providers) -> web::Data<AppState> {
    web::Data::new(AppState::new(providers, OptimizationConfig::default(), "test"))
}

pub fn create_app(
    state: web::Data<AppState>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(state)
        .wrap(
            Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600),
        )
        .wrap(Logger::default())
        .configure(routes::configure)
}
