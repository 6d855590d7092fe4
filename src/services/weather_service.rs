use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use serde::Deserialize;

use crate::config::WeatherConfig;
use crate::error::ProviderError;
use crate::models::forecast::ForecastDay;

const PROVIDER: &str = "WeatherAPI";

#[async_trait]
pub trait ForecastProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Forecast for the next `days` days, ordered by day index starting at 1.
    async fn forecast(&self, location: &str, days: u32) -> Result<Vec<ForecastDay>, ProviderError>;
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    forecast: ForecastBlock,
}

#[derive(Debug, Deserialize)]
struct ForecastBlock {
    forecastday: Vec<ForecastDayEntry>,
}

#[derive(Debug, Deserialize)]
struct ForecastDayEntry {
    day: DaySummary,
}

#[derive(Debug, Deserialize)]
struct DaySummary {
    maxtemp_c: f64,
    mintemp_c: f64,
    #[serde(default)]
    daily_chance_of_rain: f64,
    condition: Condition,
}

#[derive(Debug, Deserialize)]
struct Condition {
    text: String,
}

pub struct WeatherApiService {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl WeatherApiService {
    pub fn new(config: &WeatherConfig) -> Result<Self, ProviderError> {
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
        })
    }
}

#[async_trait]
impl ForecastProvider for WeatherApiService {
    fn name(&self) -> &'static str {
        "weatherapi"
    }

    async fn forecast(&self, location: &str, days: u32) -> Result<Vec<ForecastDay>, ProviderError> {
        let url = format!("{}/v1/forecast.json", self.base_url);
        let days_param = days.to_string();
        debug!("Fetching {}-day forecast for {}", days, location);

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", location),
                ("days", days_param.as_str()),
                ("aqi", "no"),
                ("alerts", "no"),
            ])
            .send()
            .await
            .map_err(|source| ProviderError::Http {
                provider: PROVIDER,
                source,
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|source| ProviderError::Http {
            provider: PROVIDER,
            source,
        })?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                provider: PROVIDER,
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ForecastResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::malformed(PROVIDER, e.to_string()))?;

        Ok(parsed
            .forecast
            .forecastday
            .into_iter()
            .enumerate()
            .map(|(i, entry)| ForecastDay {
                day: i as u32 + 1,
                condition: entry.day.condition.text,
                max_temp_c: entry.day.maxtemp_c,
                min_temp_c: entry.day.mintemp_c,
                rain_chance: entry.day.daily_chance_of_rain.clamp(0.0, 100.0).round() as u8,
            })
            .collect())
    }
}

const MOCK_CONDITIONS: [(&str, u8); 5] = [
    ("Sunny", 5),
    ("Partly cloudy", 20),
    ("Moderate rain", 85),
    ("Clear", 0),
    ("Patchy rain possible", 60),
];

/// Rotating canned forecast, one entry per requested day.
#[derive(Debug, Default)]
pub struct MockWeatherService;

impl MockWeatherService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ForecastProvider for MockWeatherService {
    fn name(&self) -> &'static str {
        "mock-weather"
    }

    async fn forecast(&self, _location: &str, days: u32) -> Result<Vec<ForecastDay>, ProviderError> {
        Ok((0..days)
            .map(|i| {
                let (condition, rain_chance) = MOCK_CONDITIONS[i as usize % MOCK_CONDITIONS.len()];
                ForecastDay {
                    day: i + 1,
                    condition: condition.to_string(),
                    max_temp_c: 30.0 - (i % 3) as f64,
                    min_temp_c: 22.0 - (i % 2) as f64,
                    rain_chance,
                }
            })
            .collect())
    }
}
