use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const DEFAULT_CURRENCY: &str = "INR";

/// Structured trip parameters produced by the request parser.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TripRequest {
    pub location: String,
    #[serde(alias = "duration")]
    pub duration_days: u32,
    pub budget: u64,
    #[serde(default)]
    pub themes: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travelers: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accommodation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<String>,
}

impl TripRequest {
    pub fn new(location: impl Into<String>, duration_days: u32, budget: u64) -> Self {
        Self {
            location: location.into(),
            duration_days,
            budget,
            themes: BTreeSet::new(),
            currency: None,
            start_date: None,
            travelers: None,
            accommodation: None,
            pace: None,
            transport: None,
        }
    }

    pub fn with_themes<I, S>(mut self, themes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.themes = themes.into_iter().map(Into::into).collect();
        self
    }

    pub fn currency(&self) -> &str {
        self.currency.as_deref().unwrap_or(DEFAULT_CURRENCY)
    }

    /// Comma separated themes, or "general sightseeing" when none were given.
    pub fn themes_label(&self) -> String {
        if self.themes.is_empty() {
            "general sightseeing".to_string()
        } else {
            self.themes.iter().cloned().collect::<Vec<_>>().join(", ")
        }
    }
}
