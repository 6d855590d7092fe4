//! Itinerary regeneration through a language model.
//!
//! The generator only produces raw text. Turning that text into day plans is done by
//! [`parse_regenerated_days`], which accepts the day-keyed mapping the prompt asks for
//! (plus the list form older prompts produced), sorts keys numerically and refuses
//! anything that does not cover the requested window exactly.

use std::collections::BTreeMap;
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::config::GenerationConfig;
use crate::error::{GenerationError, ProviderError};
use crate::models::itinerary::ItineraryDay;
use crate::models::trip::TripRequest;

const PROVIDER: &str = "Gemini";

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(?:json|JSON)?").expect("code fence pattern is valid"));

static DAY_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*Day\s+(\d+):\s*([^,]*)").expect("day line pattern is valid"));

/// Everything the generator needs to rewrite a window of days.
#[derive(Debug, Clone)]
pub struct RegenerationRequest<'a> {
    pub trip: &'a TripRequest,
    pub forecast_summary: &'a str,
    pub day_count: usize,
    pub start_day: u32,
    pub remaining_budget: f64,
    pub current_days: &'a [ItineraryDay],
}

#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    fn name(&self) -> &'static str;

    /// Raw model output; see [`parse_regenerated_days`].
    async fn regenerate(&self, request: &RegenerationRequest<'_>) -> Result<String, ProviderError>;
}

/// Parsed generator output. `reported_total` is kept for logging only.
#[derive(Debug, Clone, PartialEq)]
pub struct RegeneratedWindow {
    pub days: Vec<ItineraryDay>,
    pub reported_total: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct GeneratedDay {
    #[serde(default)]
    morning: Option<String>,
    #[serde(default)]
    afternoon: Option<String>,
    #[serde(default)]
    evening: Option<String>,
    #[serde(default)]
    estimated_cost: Option<Value>,
}

pub fn build_regeneration_prompt(request: &RegenerationRequest<'_>) -> String {
    let trip = request.trip;
    let current = serde_json::to_string_pretty(request.current_days).unwrap_or_else(|_| "[]".to_string());
    let last_day = request.start_day as usize + request.day_count - 1;

    let mut preferences = Vec::new();
    if let Some(travelers) = trip.travelers {
        preferences.push(format!("Travelers: {}", travelers));
    }
    if let Some(accommodation) = &trip.accommodation {
        preferences.push(format!("Accommodation style: {}", accommodation));
    }
    if let Some(pace) = &trip.pace {
        preferences.push(format!("Pace: {}", pace));
    }
    if let Some(transport) = &trip.transport {
        preferences.push(format!("Transport: {}", transport));
    }
    let preferences = if preferences.is_empty() {
        String::new()
    } else {
        format!("\n{}", preferences.join("\n"))
    };

    format!(
        r#"You are an AI trip planner.
Rewrite days {start}-{last} ({count} days) of a {duration}-day trip to {location}.
Remaining budget for these days: {budget:.0} {currency}.
Interests: {themes}.{preferences}

Weather forecast for these days:
{forecast}

Current plan for these days (JSON):
{current}

Rules:
- Prefer indoor activities on rainy days and outdoor activities on clear or sunny days.
- Consider temperature ranges when planning activities.
- Each day must have morning, afternoon and evening activities.
- Keep the sum of estimated_cost within the remaining budget.
- Number the days 1 to {count}.

Return ONLY valid JSON in this format:
{{
  "itinerary": {{
    "1": {{"morning": "...", "afternoon": "...", "evening": "...", "estimated_cost": <number>}},
    ...
  }},
  "total_estimated_cost": <number>
}}"#,
        start = request.start_day,
        last = last_day,
        count = request.day_count,
        duration = trip.duration_days,
        location = trip.location,
        budget = request.remaining_budget,
        currency = trip.currency(),
        themes = trip.themes_label(),
        preferences = preferences,
        forecast = request.forecast_summary,
        current = current,
    )
}

/// Removes markdown code fences a model tends to wrap JSON in.
pub fn strip_code_fences(raw: &str) -> String {
    CODE_FENCE.replace_all(raw, "").trim().to_string()
}

/// Parses generator output into exactly `expected_days` days numbered from `start_day`.
pub fn parse_regenerated_days(
    raw: &str,
    expected_days: usize,
    start_day: u32,
) -> Result<RegeneratedWindow, GenerationError> {
    let cleaned = strip_code_fences(raw);
    let value: Value = serde_json::from_str(&cleaned)?;

    let (days_value, reported_total) = match value {
        Value::Object(mut map) if map.contains_key("itinerary") => {
            let total = map.get("total_estimated_cost").and_then(number_value);
            (map.remove("itinerary").unwrap_or(Value::Null), total)
        }
        other @ (Value::Object(_) | Value::Array(_)) => (other, None),
        _ => return Err(GenerationError::MissingItinerary),
    };

    let mut by_day: BTreeMap<u32, GeneratedDay> = BTreeMap::new();
    match days_value {
        Value::Object(map) => {
            for (key, day) in map {
                let index = parse_day_key(&key).ok_or(GenerationError::InvalidDayKey(key))?;
                insert_day(&mut by_day, index, day)?;
            }
        }
        Value::Array(items) => {
            for item in items {
                let index = item
                    .get("day")
                    .and_then(day_index)
                    .ok_or_else(|| {
                        GenerationError::InvalidDayKey(
                            item.get("day")
                                .map(|d| d.to_string())
                                .unwrap_or_else(|| "<missing>".to_string()),
                        )
                    })?;
                insert_day(&mut by_day, index, item)?;
            }
        }
        _ => return Err(GenerationError::MissingItinerary),
    }

    if by_day.is_empty() {
        return Err(GenerationError::MissingItinerary);
    }
    if by_day.len() != expected_days {
        return Err(GenerationError::DayCountMismatch {
            expected: expected_days,
            found: by_day.len(),
        });
    }

    let keys: Vec<u32> = by_day.keys().copied().collect();
    let contiguous = keys.windows(2).all(|pair| pair[1] == pair[0] + 1);
    if !contiguous {
        return Err(GenerationError::NonContiguousDays { found: keys });
    }

    let days = by_day
        .into_iter()
        .enumerate()
        .map(|(offset, (index, generated))| -> Result<ItineraryDay, GenerationError> {
            let estimated_cost = match generated.estimated_cost {
                None | Some(Value::Null) => 0.0,
                Some(ref raw) => number_value(raw).ok_or_else(|| GenerationError::InvalidDay {
                    day: index,
                    reason: format!("estimated_cost {} is not a number", raw),
                })?,
            };
            if !estimated_cost.is_finite() || estimated_cost < 0.0 {
                return Err(GenerationError::InvalidDay {
                    day: index,
                    reason: format!("estimated_cost {} is negative", estimated_cost),
                });
            }
            Ok(ItineraryDay::new(
                start_day + offset as u32,
                generated.morning.unwrap_or_default(),
                generated.afternoon.unwrap_or_default(),
                generated.evening.unwrap_or_default(),
                estimated_cost,
            ))
        })
        .collect::<Result<Vec<_>, GenerationError>>()?;

    Ok(RegeneratedWindow {
        days,
        reported_total,
    })
}

fn insert_day(
    by_day: &mut BTreeMap<u32, GeneratedDay>,
    index: u32,
    raw: Value,
) -> Result<(), GenerationError> {
    let day: GeneratedDay = serde_json::from_value(raw).map_err(|e| GenerationError::InvalidDay {
        day: index,
        reason: e.to_string(),
    })?;
    if by_day.insert(index, day).is_some() {
        return Err(GenerationError::DuplicateDay(index));
    }
    Ok(())
}

/// Accepts "3", "day3", "day_3", "Day 3".
fn parse_day_key(key: &str) -> Option<u32> {
    let trimmed = key.trim();
    let lowered = trimmed.to_lowercase();
    let digits = lowered
        .strip_prefix("day")
        .unwrap_or(&lowered)
        .trim_start_matches(|c: char| c == '_' || c == '-' || c.is_whitespace());
    digits.parse().ok()
}

fn day_index(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => parse_day_key(s),
        _ => None,
    }
}

fn number_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse().ok(),
        _ => None,
    }
}

#[derive(Debug, Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: Value,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    role: &'static str,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidatePart {
    #[serde(default)]
    text: Option<String>,
}

pub struct GeminiGenerator {
    http_client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiGenerator {
    pub fn new(config: &GenerationConfig) -> Result<Self, ProviderError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(ProviderError::MissingApiKey { provider: PROVIDER })?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|source| ProviderError::Http {
                provider: PROVIDER,
                source,
            })?;

        Ok(Self {
            http_client,
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl NarrativeGenerator for GeminiGenerator {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn regenerate(&self, request: &RegenerationRequest<'_>) -> Result<String, ProviderError> {
        let prompt = build_regeneration_prompt(request);
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model);
        let body = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user",
                parts: vec![GeminiPart { text: &prompt }],
            }],
            generation_config: json!({ "responseMimeType": "application/json" }),
        };

        debug!(
            "Requesting {} regenerated days from {}",
            request.day_count, self.model
        );

        let response = self
            .http_client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|source| ProviderError::Http {
                provider: PROVIDER,
                source,
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|source| ProviderError::Http {
            provider: PROVIDER,
            source,
        })?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                provider: PROVIDER,
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: GeminiResponse = serde_json::from_str(&text)
            .map_err(|e| ProviderError::malformed(PROVIDER, e.to_string()))?;

        let output: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<Vec<_>>()
                    .concat()
            })
            .unwrap_or_default();

        if output.trim().is_empty() {
            return Err(ProviderError::malformed(PROVIDER, "response has no text candidates"));
        }
        Ok(output)
    }
}

const OUTDOOR_PLANS: [[&str; 3]; 3] = [
    ["Sunrise walk through {} old town", "Heritage fort tour in {}", "Street food trail at the {} night bazaar"],
    ["Botanical garden visit in {}", "Lakeside cycling around {}", "Rooftop dinner overlooking {}"],
    ["Guided nature trail outside {}", "Open-air market crawl in {}", "Sunset viewpoint above {}"],
];

const INDOOR_PLANS: [[&str; 3]; 2] = [
    ["{} city museum", "Covered market food tasting in {}", "Cooking class with a local family in {}"],
    ["Art gallery hop in {}", "Handicraft workshop in {}", "Live music cafe in {}"],
];

/// Offline generator: day-keyed JSON with indoor plans on days whose forecast line mentions rain.
#[derive(Debug, Default)]
pub struct MockNarrativeGenerator;

impl MockNarrativeGenerator {
    pub fn new() -> Self {
        Self
    }

    fn rainy_days(forecast_summary: &str) -> Vec<u32> {
        forecast_summary
            .lines()
            .filter_map(|line| DAY_LINE.captures(line))
            .filter(|caps| {
                caps.get(2)
                    .is_some_and(|condition| condition.as_str().to_lowercase().contains("rain"))
            })
            .filter_map(|caps| caps.get(1)?.as_str().parse().ok())
            .collect()
    }
}

#[async_trait]
impl NarrativeGenerator for MockNarrativeGenerator {
    fn name(&self) -> &'static str {
        "mock-narrative"
    }

    async fn regenerate(&self, request: &RegenerationRequest<'_>) -> Result<String, ProviderError> {
        let rainy = Self::rainy_days(request.forecast_summary);
        let per_day = if request.day_count == 0 {
            0.0
        } else {
            (request.remaining_budget / request.day_count as f64).floor()
        };
        let location = request.trip.location.as_str();

        let mut days = Map::new();
        for offset in 0..request.day_count {
            let day = offset as u32 + 1;
            let plan = if rainy.contains(&day) {
                INDOOR_PLANS[offset % INDOOR_PLANS.len()]
            } else {
                OUTDOOR_PLANS[offset % OUTDOOR_PLANS.len()]
            };
            days.insert(
                day.to_string(),
                json!({
                    "morning": plan[0].replace("{}", location),
                    "afternoon": plan[1].replace("{}", location),
                    "evening": plan[2].replace("{}", location),
                    "estimated_cost": per_day,
                }),
            );
        }

        let body = json!({
            "itinerary": days,
            "total_estimated_cost": request.trip.budget,
        });
        let pretty = serde_json::to_string_pretty(&body)
            .map_err(|e| ProviderError::malformed("mock narrative", e.to_string()))?;
        Ok(format!("```json\n{}\n```", pretty))
    }
}
