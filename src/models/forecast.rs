use serde::{Deserialize, Serialize};

/// Daily weather summary, day 1 being the first day of the requested window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastDay {
    pub day: u32,
    pub condition: String,
    pub max_temp_c: f64,
    pub min_temp_c: f64,
    pub rain_chance: u8,
}

impl ForecastDay {
    pub fn summary_line(&self) -> String {
        format!(
            "Day {}: {}, max {:.1}°C, min {:.1}°C, {}% chance of rain",
            self.day, self.condition, self.max_temp_c, self.min_temp_c, self.rain_chance
        )
    }
}

/// Forecast as seen by the pipeline: real days, or a placeholder when the provider failed.
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastOutlook {
    Days(Vec<ForecastDay>),
    Unavailable { note: String },
}

impl ForecastOutlook {
    /// Compact per-day text handed to the narrative generator.
    pub fn summary_text(&self) -> String {
        match self {
            ForecastOutlook::Days(days) if !days.is_empty() => days
                .iter()
                .map(ForecastDay::summary_line)
                .collect::<Vec<_>>()
                .join("\n"),
            ForecastOutlook::Days(_) => {
                "Weather forecast unavailable (no forecast days returned); plan for unknown weather."
                    .to_string()
            }
            ForecastOutlook::Unavailable { note } => format!(
                "Weather forecast unavailable ({}); plan for unknown weather.",
                note
            ),
        }
    }

    /// Short description for the given window offset (0-based), used in change reasons.
    pub fn describe(&self, offset: usize) -> String {
        match self {
            ForecastOutlook::Days(days) => match days.get(offset) {
                Some(day) => format!("{}, {}% chance of rain", day.condition, day.rain_chance),
                None => "no forecast for this day".to_string(),
            },
            ForecastOutlook::Unavailable { .. } => "forecast unavailable".to_string(),
        }
    }
}
