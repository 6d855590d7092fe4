use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSlot {
    Morning,
    Afternoon,
    Evening,
}

impl TimeSlot {
    pub const ALL: [TimeSlot; 3] = [TimeSlot::Morning, TimeSlot::Afternoon, TimeSlot::Evening];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeSlot::Morning => "morning",
            TimeSlot::Afternoon => "afternoon",
            TimeSlot::Evening => "evening",
        }
    }
}

/// One day's plan: three free-text activity slots, a cost estimate and change reasons.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ItineraryDay {
    pub day: u32,
    #[serde(default)]
    pub morning: String,
    #[serde(default)]
    pub afternoon: String,
    #[serde(default)]
    pub evening: String,
    #[serde(default)]
    pub estimated_cost: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<String>,
}

impl ItineraryDay {
    pub fn new(
        day: u32,
        morning: impl Into<String>,
        afternoon: impl Into<String>,
        evening: impl Into<String>,
        estimated_cost: f64,
    ) -> Self {
        Self {
            day,
            morning: morning.into(),
            afternoon: afternoon.into(),
            evening: evening.into(),
            estimated_cost,
            reasons: Vec::new(),
        }
    }

    pub fn slot(&self, slot: TimeSlot) -> &str {
        match slot {
            TimeSlot::Morning => &self.morning,
            TimeSlot::Afternoon => &self.afternoon,
            TimeSlot::Evening => &self.evening,
        }
    }

    pub fn slot_mut(&mut self, slot: TimeSlot) -> &mut String {
        match slot {
            TimeSlot::Morning => &mut self.morning,
            TimeSlot::Afternoon => &mut self.afternoon,
            TimeSlot::Evening => &mut self.evening,
        }
    }

    pub fn slots(&self) -> [&str; 3] {
        [&self.morning, &self.afternoon, &self.evening]
    }

    /// Non-empty slot values in morning, afternoon, evening order.
    pub fn filled_slots(&self) -> Vec<String> {
        self.slots()
            .iter()
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.to_string())
            .collect()
    }

    /// Writes `ordered` back into morning/afternoon/evening, padding with empty slots.
    pub fn set_sequence(&mut self, ordered: Vec<String>) {
        let mut values = ordered.into_iter();
        for slot in TimeSlot::ALL {
            *self.slot_mut(slot) = values.next().unwrap_or_default();
        }
    }

    pub fn same_slots(&self, other: &ItineraryDay) -> bool {
        self.slots() == other.slots()
    }
}

/// Ordered day plans (1..N) plus a total that is always recomputed, never trusted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Itinerary {
    #[serde(default)]
    pub itinerary: Vec<ItineraryDay>,
    #[serde(default)]
    pub total_estimated_cost: f64,
}

impl Itinerary {
    pub fn new(days: Vec<ItineraryDay>) -> Self {
        let mut itinerary = Self {
            itinerary: days,
            total_estimated_cost: 0.0,
        };
        itinerary.recompute_total();
        itinerary
    }

    pub fn days(&self) -> &[ItineraryDay] {
        &self.itinerary
    }

    pub fn day_count(&self) -> usize {
        self.itinerary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.itinerary.is_empty()
    }

    pub fn recompute_total(&mut self) {
        self.total_estimated_cost = self.itinerary.iter().map(|d| d.estimated_cost).sum();
    }

    /// Checks that day indices run 1..N in order with no gaps or repeats.
    pub fn check_sequence(&self) -> Result<(), String> {
        for (position, day) in self.itinerary.iter().enumerate() {
            let expected = position as u32 + 1;
            if day.day != expected {
                return Err(format!(
                    "expected day {} at position {}, found day {}",
                    expected, position, day.day
                ));
            }
            if !day.estimated_cost.is_finite() || day.estimated_cost < 0.0 {
                return Err(format!(
                    "day {} has an invalid estimated cost {}",
                    day.day, day.estimated_cost
                ));
            }
        }
        Ok(())
    }
}
