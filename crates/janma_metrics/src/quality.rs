//! Hierarchical quality balance.
//!
//! Trait scores are linear in the element distribution. Each trait row is
//! divided by its largest coefficient so a chart made of the trait's
//! strongest element scores exactly 1.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::calculator::{MetricCalculator, MetricContext};
use crate::elemental::analyze_tattwa;
use crate::score::{MetricName, MetricOutcome, MetricScore};

/// (trait, [fire, earth, air, water, ether]) coefficients.
type TraitRow = (&'static str, [f64; 5]);

const PRIMARY: [TraitRow; 5] = [
    ("energetic", [0.7, 0.0, 0.3, 0.0, 0.0]),
    ("grounded", [0.0, 0.7, 0.0, 0.3, 0.0]),
    ("intellectual", [0.0, 0.0, 0.7, 0.0, 0.3]),
    ("emotional", [0.0, 0.3, 0.0, 0.7, 0.0]),
    ("spiritual", [0.0, 0.0, 0.0, 0.3, 0.7]),
];

const SECONDARY: [TraitRow; 5] = [
    ("transformative", [0.6, 0.0, 0.0, 0.2, 0.2]),
    ("enduring", [0.2, 0.6, 0.0, 0.2, 0.0]),
    ("adaptable", [0.0, 0.0, 0.5, 0.5, 0.0]),
    ("creative", [0.4, 0.0, 0.3, 0.3, 0.0]),
    ("intuitive", [0.0, 0.0, 0.0, 0.5, 0.5]),
];

const TERTIARY: [TraitRow; 5] = [
    ("leadership", [0.5, 0.3, 0.0, 0.0, 0.2]),
    ("analytical", [0.0, 0.5, 0.5, 0.0, 0.0]),
    ("nurturing", [0.0, 0.4, 0.0, 0.6, 0.0]),
    ("expressive", [0.4, 0.0, 0.6, 0.0, 0.0]),
    ("contemplative", [0.0, 0.2, 0.0, 0.2, 0.6]),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityHierarchy {
    pub primary: BTreeMap<&'static str, f64>,
    pub secondary: BTreeMap<&'static str, f64>,
    pub tertiary: BTreeMap<&'static str, f64>,
    /// Highest-scoring primary trait.
    pub dominant: &'static str,
}

fn score_rows(rows: &[TraitRow], distribution: &[f64; 5]) -> BTreeMap<&'static str, f64> {
    rows.iter()
        .map(|(name, coeffs)| {
            let max = coeffs.iter().copied().fold(0.0, f64::max);
            let raw: f64 = coeffs
                .iter()
                .zip(distribution)
                .map(|(c, p)| c * if p.is_finite() { p.max(0.0) } else { 0.0 })
                .sum();
            let score = if max > 0.0 { raw / max } else { 0.0 };
            (*name, score.clamp(0.0, 1.0))
        })
        .collect()
}

/// Trait hierarchy from an element distribution indexed by `Tattwa::index`.
pub fn quality_hierarchy(distribution: &[f64; 5]) -> QualityHierarchy {
    let primary = score_rows(&PRIMARY, distribution);
    let dominant = PRIMARY
        .iter()
        .map(|(name, _)| *name)
        .fold(PRIMARY[0].0, |best, name| {
            if primary[name] > primary[best] { name } else { best }
        });
    QualityHierarchy {
        secondary: score_rows(&SECONDARY, distribution),
        tertiary: score_rows(&TERTIARY, distribution),
        primary,
        dominant,
    }
}

/// Explanatory trait layer; its score is the dominant primary trait.
#[derive(Debug, Default, Clone, Copy)]
pub struct QualityBalanceCalculator;

impl MetricCalculator for QualityBalanceCalculator {
    fn name(&self) -> MetricName {
        MetricName::QualityBalance
    }

    fn compute(&self, ctx: &MetricContext<'_>) -> MetricOutcome {
        let Some(tattwa) = analyze_tattwa(&ctx.chart.positions, ctx.chart.ascendant()) else {
            return MetricOutcome::unavailable("no element distribution");
        };
        let q = quality_hierarchy(&tattwa.distribution());
        let top = q.primary[q.dominant];
        let mut score = MetricScore::new(top).with_factor(format!("predominantly {}", q.dominant));
        for (name, value) in &q.primary {
            score = score.with_sub_score(*name, *value);
        }
        MetricOutcome::Scored(score.with_detail(&q))
    }
}
