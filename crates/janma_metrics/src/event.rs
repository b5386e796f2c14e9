//! Life events supplied by the questionnaire collaborator.

use chrono::{DateTime, Utc};
use janma_base::{Amsha, Graha};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Event category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Career,
    Relationship,
    Health,
    Education,
    Finance,
    Children,
    Relocation,
    Family,
    Spiritual,
    Loss,
    Accident,
    #[serde(other)]
    Other,
}

pub const ALL_EVENT_CATEGORIES: [EventCategory; 12] = [
    EventCategory::Career,
    EventCategory::Relationship,
    EventCategory::Health,
    EventCategory::Education,
    EventCategory::Finance,
    EventCategory::Children,
    EventCategory::Relocation,
    EventCategory::Family,
    EventCategory::Spiritual,
    EventCategory::Loss,
    EventCategory::Accident,
    EventCategory::Other,
];

impl EventCategory {
    pub const fn key(self) -> &'static str {
        match self {
            Self::Career => "career",
            Self::Relationship => "relationship",
            Self::Health => "health",
            Self::Education => "education",
            Self::Finance => "finance",
            Self::Children => "children",
            Self::Relocation => "relocation",
            Self::Family => "family",
            Self::Spiritual => "spiritual",
            Self::Loss => "loss",
            Self::Accident => "accident",
            Self::Other => "other",
        }
    }

    /// Parse a category key; unknown keys map to `Other`.
    pub fn from_key(key: &str) -> Self {
        let key = key.trim().to_ascii_lowercase();
        match key.as_str() {
            "marriage" | "divorce" => Self::Relationship,
            "job" | "promotion" => Self::Career,
            "move" => Self::Relocation,
            "death" => Self::Loss,
            "birth" | "child" => Self::Children,
            _ => ALL_EVENT_CATEGORIES
                .into_iter()
                .find(|c| c.key() == key)
                .unwrap_or(Self::Other),
        }
    }

    /// Significator grahas (karakas) of the category.
    pub const fn significators(self) -> &'static [Graha] {
        use Graha::*;
        match self {
            Self::Career => &[Surya, Shani, Buddh, Guru],
            Self::Relationship => &[Shukra, Guru, Chandra],
            Self::Health => &[Surya, Mangal, Shani],
            Self::Education => &[Buddh, Guru],
            Self::Finance => &[Guru, Shukra, Buddh],
            Self::Children => &[Guru, Chandra],
            Self::Relocation => &[Chandra, Rahu, Shani],
            Self::Family => &[Chandra, Guru, Shukra],
            Self::Spiritual => &[Guru, Ketu, Shani],
            Self::Loss => &[Shani, Rahu, Ketu, Mangal],
            Self::Accident => &[Mangal, Rahu, Shani],
            Self::Other => &[Surya, Chandra, Guru],
        }
    }

    /// Houses (1-based) signifying the category.
    pub const fn houses(self) -> &'static [u8] {
        match self {
            Self::Career => &[10, 6],
            Self::Relationship => &[7, 5],
            Self::Health => &[1, 6, 8],
            Self::Education => &[4, 5, 9],
            Self::Finance => &[2, 11],
            Self::Children => &[5],
            Self::Relocation => &[4, 12],
            Self::Family => &[2, 4],
            Self::Spiritual => &[9, 12],
            Self::Loss => &[8, 12],
            Self::Accident => &[8, 6],
            Self::Other => &[1],
        }
    }

    /// Divisional charts examined for the category.
    pub const fn divisional_charts(self) -> &'static [Amsha] {
        use Amsha::*;
        match self {
            Self::Career => &[D1, D10],
            Self::Relationship => &[D1, D9],
            Self::Health => &[D1, D30],
            Self::Education => &[D4, D24],
            Self::Finance => &[D2, D10],
            Self::Children => &[D7],
            Self::Relocation => &[D4, D12],
            Self::Family => &[D4, D12],
            Self::Spiritual => &[D9, D20],
            Self::Loss => &[D30, D60],
            Self::Accident => &[D1, D30],
            Self::Other => &[D1],
        }
    }

    /// 1.0 for the same category, 0.5 when the two share a significator.
    pub fn similarity(self, other: Self) -> f64 {
        if self == other {
            1.0
        } else if self
            .significators()
            .iter()
            .any(|g| other.significators().contains(g))
        {
            0.5
        } else {
            0.0
        }
    }
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// A dated life event. Read-only to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub category: EventCategory,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: String,
    /// Salience in [0, 1].
    pub intensity: f64,
}

impl Event {
    pub fn new(
        category: EventCategory,
        timestamp: DateTime<Utc>,
        intensity: f64,
    ) -> Result<Self, ModelError> {
        if !intensity.is_finite() {
            return Err(ModelError::NonFinite { field: "intensity" });
        }
        if !(0.0..=1.0).contains(&intensity) {
            return Err(ModelError::IntensityOutOfRange(intensity));
        }
        Ok(Self {
            category,
            timestamp: Some(timestamp),
            description: String::new(),
            intensity,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Timestamp present and intensity a finite value in [0, 1].
    pub fn is_well_formed(&self) -> bool {
        self.timestamp.is_some() && self.intensity.is_finite() && (0.0..=1.0).contains(&self.intensity)
    }

    /// Averaging weight: intense events count more, none counts zero.
    pub fn weight(&self) -> f64 {
        let i = if self.intensity.is_finite() {
            self.intensity.clamp(0.0, 1.0)
        } else {
            0.0
        };
        0.25 + 0.75 * i
    }
}
