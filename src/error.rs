use thiserror::Error;

use crate::models::itinerary::Itinerary;

/// Failure of an external collaborator call (weather, routing, language model).
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("{provider} request failed: {source}")]
    Http {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} returned HTTP {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("{provider} API key is not configured")]
    MissingApiKey { provider: &'static str },

    #[error("malformed {provider} response: {message}")]
    MalformedResponse {
        provider: &'static str,
        message: String,
    },
}

impl ProviderError {
    pub fn malformed(provider: &'static str, message: impl Into<String>) -> Self {
        ProviderError::MalformedResponse {
            provider,
            message: message.into(),
        }
    }
}

/// Regenerated itinerary text could not be turned into the expected day-keyed shape.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("generated itinerary is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("generated output has no itinerary days")]
    MissingItinerary,

    #[error("unrecognised day key '{0}'")]
    InvalidDayKey(String),

    #[error("day {0} appears more than once")]
    DuplicateDay(u32),

    #[error("expected {expected} days, got {found}")]
    DayCountMismatch { expected: usize, found: usize },

    #[error("day keys are not contiguous: {found:?}")]
    NonContiguousDays { found: Vec<u32> },

    #[error("day {day} is invalid: {reason}")]
    InvalidDay { day: u32, reason: String },
}

/// Requested optimization window does not exist; handled as a no-op.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("itinerary has no days")]
    EmptyItinerary,

    #[error("start day {start_day} is outside 1..={day_count}")]
    StartDayOutOfRange { start_day: i64, day_count: usize },
}

/// The only failure the optimization pipeline surfaces to its caller.
#[derive(Error, Debug)]
pub enum OptimizeError {
    #[error("malformed itinerary: {reason}")]
    MalformedItinerary {
        reason: String,
        itinerary: Itinerary,
    },
}

impl OptimizeError {
    /// The untouched input, so the caller can decide whether to serve stale data.
    pub fn into_original(self) -> Itinerary {
        match self {
            OptimizeError::MalformedItinerary { itinerary, .. } => itinerary,
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    MissingKey(&'static str),

    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: &'static str, value: String },
}
