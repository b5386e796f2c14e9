//! Birth data as supplied by the caller and after preprocessing.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Optional free-text physical descriptors.
///
/// Any subset of fields may be present; correlation runs on whatever text
/// is supplied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalTraits {
    pub height: Option<String>,
    pub build: Option<String>,
    pub complexion: Option<String>,
    pub face: Option<String>,
    pub eyes: Option<String>,
    pub hair: Option<String>,
    pub other: Vec<String>,
}

impl PhysicalTraits {
    /// Non-blank descriptors as (field, lower-cased text).
    pub fn descriptors(&self) -> Vec<(&'static str, String)> {
        let named = [
            ("height", &self.height),
            ("build", &self.build),
            ("complexion", &self.complexion),
            ("face", &self.face),
            ("eyes", &self.eyes),
            ("hair", &self.hair),
        ];
        let mut out: Vec<(&'static str, String)> = named
            .into_iter()
            .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
            .chain(self.other.iter().map(|v| ("other", v.as_str())))
            .map(|(field, v)| (field, v.trim().to_lowercase()))
            .collect();
        out.retain(|(_, v)| !v.is_empty());
        out
    }

    /// True when no descriptor carries text.
    pub fn is_empty(&self) -> bool {
        self.descriptors().is_empty()
    }
}

/// Raw birth data: recorded date and clock time as text plus coordinates.
///
/// Immutable once built; validation happens in preprocessing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BirthData {
    date: String,
    time: String,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    timezone: Option<String>,
    #[serde(default)]
    altitude: Option<f64>,
    #[serde(default)]
    traits: Option<PhysicalTraits>,
}

impl BirthData {
    /// `date` as `YYYY-MM-DD`, `time` as `HH:MM` or `HH:MM:SS`.
    pub fn new(
        date: impl Into<String>,
        time: impl Into<String>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            date: date.into(),
            time: time.into(),
            latitude,
            longitude,
            timezone: None,
            altitude: None,
            traits: None,
        }
    }

    /// Timezone as `+HH:MM`, `-HH:MM`, `Z` or `UTC`.
    pub fn with_timezone(mut self, tz: impl Into<String>) -> Self {
        self.timezone = Some(tz.into());
        self
    }

    /// Altitude in meters.
    pub fn with_altitude(mut self, altitude: f64) -> Self {
        self.altitude = Some(altitude);
        self
    }

    pub fn with_traits(mut self, traits: PhysicalTraits) -> Self {
        self.traits = Some(traits);
        self
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn time(&self) -> &str {
        &self.time
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn timezone(&self) -> Option<&str> {
        self.timezone.as_deref()
    }

    pub fn altitude(&self) -> Option<f64> {
        self.altitude
    }

    pub fn traits(&self) -> Option<&PhysicalTraits> {
        self.traits.as_ref()
    }
}

/// Validated birth data with the recorded instant resolved to UTC.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedBirthData {
    local_time: NaiveDateTime,
    offset: FixedOffset,
    utc: DateTime<Utc>,
    latitude: f64,
    longitude: f64,
    altitude: f64,
    traits: Option<PhysicalTraits>,
}

impl ProcessedBirthData {
    /// Assemble from already-validated parts.
    pub fn new(
        local_time: NaiveDateTime,
        offset: FixedOffset,
        utc: DateTime<Utc>,
        latitude: f64,
        longitude: f64,
        altitude: f64,
        traits: Option<PhysicalTraits>,
    ) -> Self {
        Self {
            local_time,
            offset,
            utc,
            latitude,
            longitude,
            altitude,
            traits,
        }
    }

    /// Recorded wall-clock time.
    pub fn local_time(&self) -> NaiveDateTime {
        self.local_time
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Recorded instant in UTC.
    pub fn utc(&self) -> DateTime<Utc> {
        self.utc
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn altitude(&self) -> f64 {
        self.altitude
    }

    /// Traits, or None when absent or blank.
    pub fn traits(&self) -> Option<&PhysicalTraits> {
        self.traits.as_ref().filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptors_skip_blank_fields() {
        let traits = PhysicalTraits {
            height: Some("  Tall ".into()),
            eyes: Some("".into()),
            other: vec!["Curly hair".into()],
            ..Default::default()
        };
        let d = traits.descriptors();
        assert_eq!(d, vec![("height", "tall".to_string()), ("other", "curly hair".to_string())]);
        assert!(PhysicalTraits::default().is_empty());
    }

    #[test]
    fn builder_keeps_inputs() {
        let b = BirthData::new("1990-01-01", "12:00", 40.7, -74.0)
            .with_timezone("-05:00")
            .with_altitude(10.0);
        assert_eq!(b.timezone(), Some("-05:00"));
        assert_eq!(b.altitude(), Some(10.0));
        assert!(b.traits().is_none());
    }

    #[test]
    fn processed_keeps_offset_and_hides_blank_traits() {
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let local = NaiveDateTime::parse_from_str("1990-01-01 12:00", "%Y-%m-%d %H:%M").unwrap();
        let utc = local.and_local_timezone(offset).unwrap().with_timezone(&Utc);
        let blank = PhysicalTraits {
            height: Some("  ".into()),
            ..Default::default()
        };
        let p = ProcessedBirthData::new(local, offset, utc, 40.7, -74.0, 0.0, Some(blank));
        assert_eq!(p.offset(), offset);
        assert_eq!(p.utc().with_timezone(&p.offset()).naive_local(), p.local_time());
        assert!(p.traits().is_none());
        assert_eq!(p.clone(), p);
    }
}
