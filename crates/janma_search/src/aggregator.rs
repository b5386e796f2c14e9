//! Confidence aggregation over the metrics available for a candidate.
//!
//! Unavailable metrics leave the denominator instead of scoring zero, so
//! missing evidence narrows confidence without biasing it.

use std::collections::BTreeMap;

use janma_metrics::{
    ALL_METRICS, MetricCalculator, MetricContext, MetricName, MetricOutcome, default_calculators,
};
use serde::Serialize;
use tracing::debug;

use crate::error::{RectifyError, RectifyResult};

/// Base weight of every metric. Sums to 1 over the full set.
pub const BASE_WEIGHTS: [(MetricName, f64); 6] = [
    (MetricName::ElementalBalance, 0.15),
    (MetricName::QualityBalance, 0.0),
    (MetricName::PeriodVerification, 0.30),
    (MetricName::RelativeStrength, 0.15),
    (MetricName::PhysicalCorrelation, 0.10),
    (MetricName::EventTiming, 0.30),
];

/// Normalized per-metric weights.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricWeights {
    weights: BTreeMap<MetricName, f64>,
}

impl Default for MetricWeights {
    fn default() -> Self {
        Self {
            weights: BASE_WEIGHTS.into_iter().collect(),
        }
    }
}

impl MetricWeights {
    /// Base table with `overrides` applied, re-normalized to sum to 1.
    ///
    /// Overrides must be finite and non-negative and must leave at least
    /// one positive weight.
    pub fn with_overrides(overrides: &BTreeMap<MetricName, f64>) -> RectifyResult<Self> {
        let mut weights: BTreeMap<MetricName, f64> = BASE_WEIGHTS.into_iter().collect();
        for (&name, &w) in overrides {
            if !w.is_finite() || w < 0.0 {
                return Err(RectifyError::InvalidConfig(format!(
                    "weight for {name} must be finite and non-negative, got {w}"
                )));
            }
            weights.insert(name, w);
        }
        let total: f64 = weights.values().sum();
        if total <= 0.0 {
            return Err(RectifyError::InvalidConfig(
                "metric weights sum to zero".to_string(),
            ));
        }
        weights.values_mut().for_each(|w| *w /= total);
        Ok(Self { weights })
    }

    pub fn get(&self, name: MetricName) -> f64 {
        self.weights.get(&name).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MetricName, f64)> + '_ {
        self.weights.iter().map(|(n, w)| (*n, *w))
    }
}

/// Aggregated result for one candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    /// In [0, 1]; 0 when no weighted metric was available.
    pub confidence: f64,
    pub outcomes: BTreeMap<MetricName, MetricOutcome>,
    /// Metrics that produced a score, in metric order.
    pub coverage: Vec<MetricName>,
}

impl Evaluation {
    pub fn score(&self, name: MetricName) -> Option<f64> {
        self.outcomes.get(&name)?.score().map(|s| s.value)
    }
}

/// Weighted combination of the registered calculators.
pub struct ConfidenceAggregator {
    weights: MetricWeights,
    calculators: BTreeMap<MetricName, Box<dyn MetricCalculator>>,
}

impl ConfidenceAggregator {
    /// Aggregator with no calculators registered.
    pub fn new(weights: MetricWeights) -> Self {
        Self {
            weights,
            calculators: BTreeMap::new(),
        }
    }

    /// Aggregator with every built-in calculator.
    pub fn with_default_calculators(weights: MetricWeights) -> Self {
        let mut aggregator = Self::new(weights);
        for calc in default_calculators() {
            aggregator.register(calc);
        }
        aggregator
    }

    /// Register a calculator, replacing any with the same name.
    pub fn register(&mut self, calculator: Box<dyn MetricCalculator>) {
        self.calculators.insert(calculator.name(), calculator);
    }

    pub fn weights(&self) -> &MetricWeights {
        &self.weights
    }

    pub fn registered(&self) -> impl Iterator<Item = MetricName> + '_ {
        self.calculators.keys().copied()
    }

    /// Run every calculator and combine the available scores.
    pub fn evaluate(&self, ctx: &MetricContext<'_>) -> Evaluation {
        let outcomes: BTreeMap<MetricName, MetricOutcome> = self
            .calculators
            .iter()
            .map(|(&name, calc)| (name, calc.compute(ctx)))
            .collect();

        for (name, outcome) in &outcomes {
            if let MetricOutcome::Unavailable { reason } = outcome {
                debug!(metric = %name, reason = %reason, "metric unavailable");
            }
        }

        let coverage: Vec<MetricName> = ALL_METRICS
            .into_iter()
            .filter(|m| outcomes.get(m).is_some_and(MetricOutcome::is_available))
            .collect();

        Evaluation {
            confidence: self.combine(&outcomes),
            outcomes,
            coverage,
        }
    }

    /// Weighted mean over scored metrics, renormalized over their weights.
    pub fn combine(&self, outcomes: &BTreeMap<MetricName, MetricOutcome>) -> f64 {
        let (num, den) = outcomes
            .iter()
            .filter_map(|(name, o)| o.score().map(|s| (self.weights.get(*name), s.value)))
            .filter(|(w, _)| *w > 0.0)
            .fold((0.0, 0.0), |(n, d), (w, v)| (n + w * v, d + w));
        if den > 0.0 {
            (num / den).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

impl std::fmt::Debug for ConfidenceAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfidenceAggregator")
            .field("weights", &self.weights)
            .field("calculators", &self.calculators.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Pick the winning offset among `(offset_seconds, confidence)` pairs.
///
/// Every candidate within `epsilon` of the maximum counts as tied; ties go
/// to the smallest absolute offset, then to the earlier offset.
pub fn select_candidate(
    candidates: impl IntoIterator<Item = (i64, f64)>,
    epsilon: f64,
) -> Option<i64> {
    let candidates: Vec<(i64, f64)> = candidates
        .into_iter()
        .filter(|(_, c)| c.is_finite())
        .collect();
    let best = candidates
        .iter()
        .map(|(_, c)| *c)
        .fold(f64::NEG_INFINITY, f64::max);
    candidates
        .into_iter()
        .filter(|(_, c)| best - c <= epsilon)
        .map(|(offset, _)| offset)
        .min_by_key(|offset| (offset.unsigned_abs(), *offset))
}
