//! Rectification configuration, loadable from TOML.

use std::collections::BTreeMap;
use std::path::Path;

use janma_metrics::{MetricName, MetricSettings};
use serde::{Deserialize, Serialize};

use crate::error::{RectifyError, RectifyResult};

/// Widest half-window accepted: one day either side of the recorded time.
pub const MAX_WINDOW_MINUTES: f64 = 1440.0;

/// Candidate grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Half-width of the window around the recorded time.
    pub window_minutes: f64,
    pub coarse_step_minutes: f64,
    /// Step of the refinement pass; None disables it.
    pub fine_step_minutes: Option<f64>,
    /// Confidences this close to the best count as tied.
    pub tie_epsilon: f64,
    /// Evaluate the candidates of a pass on the rayon pool.
    pub parallel: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            window_minutes: 120.0,
            coarse_step_minutes: 5.0,
            fine_step_minutes: Some(1.0),
            tie_epsilon: 1e-3,
            parallel: true,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<(), &'static str> {
        if !self.window_minutes.is_finite() || self.window_minutes < 0.0 {
            return Err("window_minutes must be finite and non-negative");
        }
        if self.window_minutes > MAX_WINDOW_MINUTES {
            return Err("window_minutes must not exceed 1440");
        }
        if !self.coarse_step_minutes.is_finite() || self.coarse_step_minutes <= 0.0 {
            return Err("coarse_step_minutes must be positive");
        }
        if let Some(fine) = self.fine_step_minutes {
            if !fine.is_finite() || fine <= 0.0 {
                return Err("fine_step_minutes must be positive");
            }
            if fine >= self.coarse_step_minutes {
                return Err("fine_step_minutes must be smaller than coarse_step_minutes");
            }
        }
        if !self.tie_epsilon.is_finite() || self.tie_epsilon < 0.0 {
            return Err("tie_epsilon must be finite and non-negative");
        }
        Ok(())
    }
}

/// Everything a [`crate::Rectifier`] needs besides its chart provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RectificationConfig {
    pub search: SearchConfig,
    /// Per-metric weight overrides, re-normalized at build time.
    #[serde(deserialize_with = "weights_by_key")]
    pub weights: BTreeMap<MetricName, f64>,
    pub dasha_max_level: u8,
    pub cluster_gap_days: f64,
}

fn weights_by_key<'de, D>(d: D) -> Result<BTreeMap<MetricName, f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = BTreeMap::<String, f64>::deserialize(d)?;
    raw.into_iter()
        .map(|(key, w)| {
            MetricName::from_key(&key)
                .map(|m| (m, w))
                .ok_or_else(|| serde::de::Error::custom(format!("unknown metric {key:?}")))
        })
        .collect()
}

impl Default for RectificationConfig {
    fn default() -> Self {
        let metrics = MetricSettings::default();
        Self {
            search: SearchConfig::default(),
            weights: BTreeMap::new(),
            dasha_max_level: metrics.dasha_max_level,
            cluster_gap_days: metrics.cluster_gap_days,
        }
    }
}

impl RectificationConfig {
    pub fn from_toml_str(s: &str) -> RectifyResult<Self> {
        let config: Self =
            toml::from_str(s).map_err(|e| RectifyError::InvalidConfig(e.to_string()))?;
        config.validate().map_err(|e| RectifyError::InvalidConfig(e.to_string()))?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> RectifyResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| RectifyError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        self.search.validate()?;
        if self.dasha_max_level > janma_base::dasha::MAX_DASHA_LEVEL {
            return Err("dasha_max_level must be at most 3");
        }
        if !self.cluster_gap_days.is_finite() || self.cluster_gap_days < 0.0 {
            return Err("cluster_gap_days must be finite and non-negative");
        }
        if self.weights.values().any(|w| !w.is_finite() || *w < 0.0) {
            return Err("metric weights must be finite and non-negative");
        }
        Ok(())
    }

    pub fn metric_settings(&self) -> MetricSettings {
        MetricSettings {
            dasha_max_level: self.dasha_max_level,
            cluster_gap_days: self.cluster_gap_days,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(RectificationConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = RectificationConfig::from_toml_str(
            "[search]\ncoarse_step_minutes = 10.0\n\n[weights]\nphysical_correlation = 0.0\n",
        )
        .unwrap();
        assert_eq!(c.search.coarse_step_minutes, 10.0);
        assert_eq!(c.search.window_minutes, 120.0);
        assert_eq!(c.weights[&MetricName::PhysicalCorrelation], 0.0);
        assert_eq!(c.dasha_max_level, 3);
    }

    #[test]
    fn rejects_fine_step_not_finer() {
        let mut c = RectificationConfig::default();
        c.search.fine_step_minutes = Some(5.0);
        assert!(c.validate().is_err());
        c.search.fine_step_minutes = None;
        assert!(c.validate().is_ok());
    }

    #[test]
    fn rejects_bad_values() {
        let mut c = RectificationConfig::default();
        c.search.coarse_step_minutes = 0.0;
        assert!(c.validate().is_err());

        let mut c = RectificationConfig::default();
        c.weights.insert(MetricName::EventTiming, -0.1);
        assert!(c.validate().is_err());

        let err = RectificationConfig::from_toml_str("[search]\nwindow_minutes = -1.0\n").unwrap_err();
        assert!(matches!(err, RectifyError::InvalidConfig(_)));
    }

    #[test]
    fn window_is_capped_at_one_day() {
        let mut c = RectificationConfig::default();
        c.search.window_minutes = MAX_WINDOW_MINUTES;
        assert!(c.validate().is_ok());
        c.search.window_minutes = 1e12;
        assert!(c.validate().is_err());

        let err = RectificationConfig::from_toml_str("[search]\nwindow_minutes = 1441.0\n").unwrap_err();
        assert!(matches!(err, RectifyError::InvalidConfig(_)));
    }

    #[test]
    fn unknown_metric_in_weights_rejected() {
        assert!(RectificationConfig::from_toml_str("[weights]\nluck = 1.0\n").is_err());
    }
}
