//! Travel-time lookups between named places.
//!
//! Two variants sit behind [`TravelTimeProvider`]:
//! - [`GoogleDistanceService`] calls the Google Distance Matrix API with address strings.
//!   All candidates from one origin are fetched in a single batched request, and
//!   traffic-aware durations are preferred for driving when enabled.
//! - [`MockDistanceService`] returns deterministic minutes derived from the place names,
//!   so local runs and tests need no API key.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use serde::Deserialize;

use crate::config::RoutingConfig;
use crate::error::ProviderError;

const PROVIDER: &str = "Google Maps";

// Google Maps API limits: 25 origins, 25 destinations per request
const MAX_MATRIX_LOCATIONS: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelMode {
    Driving,
    Walking,
    Transit,
    Bicycling,
}

impl TravelMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelMode::Driving => "driving",
            TravelMode::Walking => "walking",
            TravelMode::Transit => "transit",
            TravelMode::Bicycling => "bicycling",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "driving" => Some(TravelMode::Driving),
            "walking" => Some(TravelMode::Walking),
            "transit" => Some(TravelMode::Transit),
            "bicycling" => Some(TravelMode::Bicycling),
            _ => None,
        }
    }
}

#[async_trait]
pub trait TravelTimeProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Estimated minutes from `origin` to `destination` leaving at `departure`.
    async fn travel_minutes(
        &self,
        origin: &str,
        destination: &str,
        departure: DateTime<Utc>,
    ) -> Result<u32, ProviderError>;

    /// Minutes from `origin` to each of `destinations`, in the same order.
    async fn travel_times_from(
        &self,
        origin: &str,
        destinations: &[String],
        departure: DateTime<Utc>,
    ) -> Result<Vec<u32>, ProviderError> {
        let mut minutes = Vec::with_capacity(destinations.len());
        for destination in destinations {
            minutes.push(self.travel_minutes(origin, destination, departure).await?);
        }
        Ok(minutes)
    }
}

#[derive(Debug, Deserialize)]
struct GoogleMapsResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    rows: Vec<GoogleMapsRow>,
}

#[derive(Debug, Deserialize)]
struct GoogleMapsRow {
    elements: Vec<GoogleMapsElement>,
}

#[derive(Debug, Deserialize)]
struct GoogleMapsElement {
    status: String,
    duration: Option<GoogleMapsDuration>,
    duration_in_traffic: Option<GoogleMapsDuration>,
}

#[derive(Debug, Deserialize)]
struct GoogleMapsDuration {
    value: u32, // seconds
}

pub struct GoogleDistanceService {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
    travel_mode: TravelMode,
    with_traffic: bool,
}

impl GoogleDistanceService {
    pub fn new(config: &RoutingConfig) -> Result<Self, ProviderError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(ProviderError::MissingApiKey { provider: PROVIDER })?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|source| ProviderError::Http {
                provider: PROVIDER,
                source,
            })?;

        Ok(Self {
            http_client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            travel_mode: config.travel_mode,
            with_traffic: config.with_traffic,
        })
    }

    /// One Distance Matrix request; returns the row-major minutes grid.
    async fn fetch_matrix(
        &self,
        origins: &[String],
        destinations: &[String],
        departure: DateTime<Utc>,
    ) -> Result<Vec<Vec<u32>>, ProviderError> {
        if origins.len() > MAX_MATRIX_LOCATIONS || destinations.len() > MAX_MATRIX_LOCATIONS {
            return Err(ProviderError::malformed(
                PROVIDER,
                "too many origins or destinations for a single request",
            ));
        }

        // The API rejects departure times in the past.
        let departure_secs = departure.max(Utc::now()).timestamp().to_string();
        let url = format!("{}/maps/api/distancematrix/json", self.base_url);
        let origins_param = origins.join("|");
        let destinations_param = destinations.join("|");

        let mut query = vec![
            ("origins", origins_param.as_str()),
            ("destinations", destinations_param.as_str()),
            ("mode", self.travel_mode.as_str()),
            ("departure_time", departure_secs.as_str()),
            ("key", self.api_key.as_str()),
        ];
        if self.traffic_aware() {
            query.push(("traffic_model", "best_guess"));
        }

        debug!(
            "Fetching {}x{} travel times from Google Maps",
            origins.len(),
            destinations.len()
        );

        let response = self
            .http_client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|source| ProviderError::Http {
                provider: PROVIDER,
                source,
            })?;

        let status = response.status();
        let response_text = response.text().await.map_err(|source| ProviderError::Http {
            provider: PROVIDER,
            source,
        })?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                provider: PROVIDER,
                status: status.as_u16(),
                body: response_text,
            });
        }

        let google_response: GoogleMapsResponse = serde_json::from_str(&response_text)
            .map_err(|e| ProviderError::malformed(PROVIDER, e.to_string()))?;

        if google_response.status != "OK" {
            return Err(ProviderError::malformed(
                PROVIDER,
                format!(
                    "API status {}{}",
                    google_response.status,
                    google_response
                        .error_message
                        .map(|m| format!(": {}", m))
                        .unwrap_or_default()
                ),
            ));
        }

        if google_response.rows.len() != origins.len() {
            return Err(ProviderError::malformed(
                PROVIDER,
                format!(
                    "expected {} rows, got {}",
                    origins.len(),
                    google_response.rows.len()
                ),
            ));
        }

        google_response
            .rows
            .into_iter()
            .map(|row| -> Result<Vec<u32>, ProviderError> {
                if row.elements.len() != destinations.len() {
                    return Err(ProviderError::malformed(PROVIDER, "row has wrong element count"));
                }
                row.elements
                    .into_iter()
                    .map(|element| self.element_minutes(element))
                    .collect()
            })
            .collect()
    }

    fn element_minutes(&self, element: GoogleMapsElement) -> Result<u32, ProviderError> {
        if element.status != "OK" {
            return Err(ProviderError::malformed(
                PROVIDER,
                format!("element status {}", element.status),
            ));
        }
        let duration = match (self.traffic_aware(), element.duration_in_traffic) {
            (true, Some(in_traffic)) => in_traffic,
            _ => element
                .duration
                .ok_or_else(|| ProviderError::malformed(PROVIDER, "duration not available"))?,
        };
        Ok(duration.value / 60)
    }

    fn traffic_aware(&self) -> bool {
        self.with_traffic && self.travel_mode == TravelMode::Driving
    }
}

#[async_trait]
impl TravelTimeProvider for GoogleDistanceService {
    fn name(&self) -> &'static str {
        "google-distance-matrix"
    }

    async fn travel_minutes(
        &self,
        origin: &str,
        destination: &str,
        departure: DateTime<Utc>,
    ) -> Result<u32, ProviderError> {
        let grid = self
            .fetch_matrix(&[origin.to_string()], &[destination.to_string()], departure)
            .await?;
        grid.first()
            .and_then(|row| row.first())
            .copied()
            .ok_or_else(|| ProviderError::malformed(PROVIDER, "no distance data returned"))
    }

    async fn travel_times_from(
        &self,
        origin: &str,
        destinations: &[String],
        departure: DateTime<Utc>,
    ) -> Result<Vec<u32>, ProviderError> {
        if destinations.is_empty() {
            return Ok(Vec::new());
        }
        let grid = self
            .fetch_matrix(&[origin.to_string()], destinations, departure)
            .await?;
        grid.into_iter()
            .next()
            .ok_or_else(|| ProviderError::malformed(PROVIDER, "no distance data returned"))
    }
}

/// Deterministic stand-in: identical names are 0 minutes apart, others 5..=59.
#[derive(Debug, Default)]
pub struct MockDistanceService;

impl MockDistanceService {
    pub fn new() -> Self {
        Self
    }

    fn minutes_between(origin: &str, destination: &str) -> u32 {
        if origin.trim().eq_ignore_ascii_case(destination.trim()) {
            return 0;
        }
        let seed = origin
            .to_lowercase()
            .bytes()
            .chain(std::iter::once(b'>'))
            .chain(destination.to_lowercase().bytes())
            .fold(17u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32));
        5 + seed % 55
    }
}

#[async_trait]
impl TravelTimeProvider for MockDistanceService {
    fn name(&self) -> &'static str {
        "mock-distance"
    }

    async fn travel_minutes(
        &self,
        origin: &str,
        destination: &str,
        _departure: DateTime<Utc>,
    ) -> Result<u32, ProviderError> {
        Ok(Self::minutes_between(origin, destination))
    }
}
