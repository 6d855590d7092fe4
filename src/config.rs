//! Process configuration, read once at startup and injected into every provider.

use std::env;

use chrono::NaiveTime;

use crate::error::ConfigError;
use crate::services::distance_service::TravelMode;
use crate::services::route_optimization_service::OptimizationConfig;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;

const WEATHER_API_BASE_URL: &str = "http://api.weatherapi.com";
const GOOGLE_MAPS_BASE_URL: &str = "https://maps.googleapis.com";
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const GEMINI_MODEL: &str = "gemini-2.5-flash";
const GENERATION_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderMode {
    Mock,
    Live,
}

impl ProviderMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderMode::Mock => "mock",
            ProviderMode::Live => "live",
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeatherConfig {
    pub mode: ProviderMode,
    pub api_key: Option<String>,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct RoutingConfig {
    pub mode: ProviderMode,
    pub api_key: Option<String>,
    pub base_url: String,
    pub travel_mode: TravelMode,
    pub with_traffic: bool,
}

#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub mode: ProviderMode,
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub weather: WeatherConfig,
    pub routing: RoutingConfig,
    pub generation: GenerationConfig,
    pub optimizer: OptimizationConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(raw) => parse_value("PORT", &raw)?,
            None => PORT,
        };

        let weather_mode = provider_mode("WEATHER_PROVIDER", get("WEATHER_PROVIDER"))?;
        let weather = WeatherConfig {
            mode: weather_mode,
            api_key: required_for_live(weather_mode, "WEATHER_API_KEY", get("WEATHER_API_KEY"))?,
            base_url: get("WEATHER_API_BASE_URL").unwrap_or_else(|| WEATHER_API_BASE_URL.to_string()),
        };

        let routing_mode = provider_mode("ROUTING_PROVIDER", get("ROUTING_PROVIDER"))?;
        let travel_mode = match get("ROUTING_TRAVEL_MODE") {
            Some(raw) => TravelMode::parse(&raw).ok_or(ConfigError::InvalidValue {
                key: "ROUTING_TRAVEL_MODE",
                value: raw,
            })?,
            None => TravelMode::Driving,
        };
        let with_traffic = match get("ROUTING_WITH_TRAFFIC") {
            Some(raw) => parse_value("ROUTING_WITH_TRAFFIC", &raw)?,
            None => true,
        };
        let routing = RoutingConfig {
            mode: routing_mode,
            api_key: required_for_live(
                routing_mode,
                "GOOGLE_MAPS_API_KEY",
                get("GOOGLE_MAPS_API_KEY"),
            )?,
            base_url: get("GOOGLE_MAPS_BASE_URL").unwrap_or_else(|| GOOGLE_MAPS_BASE_URL.to_string()),
            travel_mode,
            with_traffic,
        };

        let generation_mode = provider_mode("GENERATION_PROVIDER", get("GENERATION_PROVIDER"))?;
        let generation = GenerationConfig {
            mode: generation_mode,
            api_key: required_for_live(generation_mode, "GEMINI_API_KEY", get("GEMINI_API_KEY"))?,
            model: get("GEMINI_MODEL").unwrap_or_else(|| GEMINI_MODEL.to_string()),
            base_url: get("GEMINI_BASE_URL").unwrap_or_else(|| GEMINI_BASE_URL.to_string()),
            timeout_secs: match get("GENERATION_TIMEOUT_SECS") {
                Some(raw) => parse_value("GENERATION_TIMEOUT_SECS", &raw)?,
                None => GENERATION_TIMEOUT_SECS,
            },
        };

        let mut optimizer = OptimizationConfig::default();
        if let Some(raw) = get("OPTIMIZER_DWELL_MINUTES") {
            optimizer.dwell_minutes = parse_value("OPTIMIZER_DWELL_MINUTES", &raw)?;
        }
        if let Some(raw) = get("OPTIMIZER_DAY_START") {
            optimizer.day_start_time = NaiveTime::parse_from_str(raw.trim(), "%H:%M").map_err(|_| {
                ConfigError::InvalidValue {
                    key: "OPTIMIZER_DAY_START",
                    value: raw.clone(),
                }
            })?;
        }

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| HOST.to_string()),
            port,
            environment: get("RUST_ENV").unwrap_or_else(|| "development".to_string()),
            weather,
            routing,
            generation,
            optimizer,
        })
    }
}

fn provider_mode(key: &'static str, raw: Option<String>) -> Result<ProviderMode, ConfigError> {
    let normalized = raw.as_deref().map(|v| v.trim().to_lowercase());
    match normalized.as_deref() {
        None | Some("mock") => Ok(ProviderMode::Mock),
        Some("live") => Ok(ProviderMode::Live),
        Some(_) => Err(ConfigError::InvalidValue {
            key,
            value: raw.unwrap_or_default(),
        }),
    }
}

fn required_for_live(
    mode: ProviderMode,
    key: &'static str,
    value: Option<String>,
) -> Result<Option<String>, ConfigError> {
    match (mode, value) {
        (ProviderMode::Live, None) => Err(ConfigError::MissingKey(key)),
        (_, value) => Ok(value),
    }
}

fn parse_value<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
    })
}
