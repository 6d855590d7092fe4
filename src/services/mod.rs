pub mod annotation_service;
pub mod distance_service;
pub mod itinerary_optimization_service;
pub mod narrative_service;
pub mod review_insights;
pub mod route_optimization_service;
pub mod weather_service;

use std::sync::Arc;

use log::info;

use crate::config::{AppConfig, ProviderMode};
use crate::error::ProviderError;
use distance_service::{GoogleDistanceService, MockDistanceService, TravelTimeProvider};
use narrative_service::{GeminiGenerator, MockNarrativeGenerator, NarrativeGenerator};
use weather_service::{ForecastProvider, MockWeatherService, WeatherApiService};

/// The external collaborators, each picked once from configuration.
#[derive(Clone)]
pub struct Providers {
    pub forecasts: Arc<dyn ForecastProvider>,
    pub travel_times: Arc<dyn TravelTimeProvider>,
    pub narrator: Arc<dyn NarrativeGenerator>,
}

impl Providers {
    pub fn mock() -> Self {
        Self {
            forecasts: Arc::new(MockWeatherService::new()),
            travel_times: Arc::new(MockDistanceService::new()),
            narrator: Arc::new(MockNarrativeGenerator::new()),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ProviderError> {
        let forecasts: Arc<dyn ForecastProvider> = match config.weather.mode {
            ProviderMode::Mock => Arc::new(MockWeatherService::new()),
            ProviderMode::Live => Arc::new(WeatherApiService::new(&config.weather)?),
        };
        let travel_times: Arc<dyn TravelTimeProvider> = match config.routing.mode {
            ProviderMode::Mock => Arc::new(MockDistanceService::new()),
            ProviderMode::Live => Arc::new(GoogleDistanceService::new(&config.routing)?),
        };
        let narrator: Arc<dyn NarrativeGenerator> = match config.generation.mode {
            ProviderMode::Mock => Arc::new(MockNarrativeGenerator::new()),
            ProviderMode::Live => Arc::new(GeminiGenerator::new(&config.generation)?),
        };

        let providers = Self {
            forecasts,
            travel_times,
            narrator,
        };
        info!(
            "Providers: forecast={}, travel={}, narrative={}",
            providers.forecasts.name(),
            providers.travel_times.name(),
            providers.narrator.name()
        );
        Ok(providers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config_selects_mocks() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        let providers = Providers::from_config(&config).unwrap();

        assert_eq!(providers.forecasts.name(), "mock-weather");
        assert_eq!(providers.travel_times.name(), "mock-distance");
    }

    #[test]
    fn test_live_weather_is_selected_with_key() {
        let env: HashMap<&str, &str> = [("WEATHER_PROVIDER", "live"), ("WEATHER_API_KEY", "k")]
            .into_iter()
            .collect();
        let config = AppConfig::from_lookup(|key| env.get(key).map(|v| v.to_string())).unwrap();
        let providers = Providers::from_config(&config).unwrap();

        assert_eq!(providers.forecasts.name(), "weatherapi");
        assert_eq!(providers.narrator.name(), "mock-narrative");
    }

    #[test]
    fn test_live_provider_without_key_reports_missing_key() {
        let defaults = AppConfig::from_lookup(|_| None).unwrap();

        let mut config = defaults.clone();
        config.weather.mode = ProviderMode::Live;
        assert!(matches!(
            Providers::from_config(&config),
            Err(ProviderError::MissingApiKey { provider: "WeatherAPI" })
        ));

        let mut config = defaults.clone();
        config.routing.mode = ProviderMode::Live;
        assert!(matches!(
            Providers::from_config(&config),
            Err(ProviderError::MissingApiKey { provider: "Google Maps" })
        ));

        let mut config = defaults;
        config.generation.mode = ProviderMode::Live;
        let err = match Providers::from_config(&config) {
            Ok(_) => panic!("live generation without a key should fail"),
            Err(err) => err,
        };
        assert_eq!(err.to_string(), "Gemini API key is not configured");
    }
}
