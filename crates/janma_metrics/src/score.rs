//! Metric identities and score values.

use std::collections::BTreeMap;

use janma_base::util::clamp_unit;
use serde::{Deserialize, Serialize};

/// The six metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricName {
    ElementalBalance,
    QualityBalance,
    PeriodVerification,
    RelativeStrength,
    PhysicalCorrelation,
    EventTiming,
}

pub const ALL_METRICS: [MetricName; 6] = [
    MetricName::ElementalBalance,
    MetricName::QualityBalance,
    MetricName::PeriodVerification,
    MetricName::RelativeStrength,
    MetricName::PhysicalCorrelation,
    MetricName::EventTiming,
];

impl MetricName {
    pub const fn key(self) -> &'static str {
        match self {
            Self::ElementalBalance => "elemental_balance",
            Self::QualityBalance => "quality_balance",
            Self::PeriodVerification => "period_verification",
            Self::RelativeStrength => "relative_strength",
            Self::PhysicalCorrelation => "physical_correlation",
            Self::EventTiming => "event_timing",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        ALL_METRICS.into_iter().find(|m| m.key() == key)
    }
}

impl std::fmt::Display for MetricName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// A bounded score with its explanation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricScore {
    /// Always in [0, 1].
    pub value: f64,
    pub sub_scores: BTreeMap<String, f64>,
    pub factors: Vec<String>,
    pub detail: serde_json::Value,
}

impl MetricScore {
    /// New score; the value is clamped and NaN becomes 0.
    pub fn new(value: f64) -> Self {
        Self {
            value: clamp_unit(value),
            sub_scores: BTreeMap::new(),
            factors: Vec::new(),
            detail: serde_json::Value::Null,
        }
    }

    pub fn with_sub_score(mut self, name: impl Into<String>, value: f64) -> Self {
        self.sub_scores.insert(name.into(), clamp_unit(value));
        self
    }

    pub fn with_factor(mut self, factor: impl Into<String>) -> Self {
        self.factors.push(factor.into());
        self
    }

    pub fn with_factors(mut self, factors: impl IntoIterator<Item = String>) -> Self {
        self.factors.extend(factors);
        self
    }

    /// Attach a typed report as the detail block.
    pub fn with_detail<T: Serialize>(mut self, report: &T) -> Self {
        self.detail = serde_json::to_value(report).unwrap_or(serde_json::Value::Null);
        self
    }
}

/// A calculator either scores or declares it cannot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MetricOutcome {
    Scored(MetricScore),
    Unavailable { reason: String },
}

impl MetricOutcome {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn score(&self) -> Option<&MetricScore> {
        match self {
            Self::Scored(s) => Some(s),
            Self::Unavailable { .. } => None,
        }
    }

    pub fn into_score(self) -> Option<MetricScore> {
        match self {
            Self::Scored(s) => Some(s),
            Self::Unavailable { .. } => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Scored(_))
    }
}

/// Weighted mean over the components that are present.
///
/// Returns None when no component carries positive weight.
pub fn weighted_mean(components: &[(f64, Option<f64>)]) -> Option<f64> {
    let (num, den) = components
        .iter()
        .filter_map(|(w, v)| v.map(|v| (*w, v)))
        .filter(|(w, v)| *w > 0.0 && v.is_finite())
        .fold((0.0, 0.0), |(n, d), (w, v)| (n + w * v, d + w));
    (den > 0.0).then(|| num / den)
}
