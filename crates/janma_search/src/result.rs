//! The rectification result handed to outer layers.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, FixedOffset};
use janma_metrics::{MetricName, MetricOutcome, ProcessedBirthData};
use serde::Serialize;

use crate::search::SearchOutcome;

/// Score and explanation of one metric at the chosen time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricReport {
    pub score: f64,
    pub detail: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RectificationResult {
    pub original_time: DateTime<FixedOffset>,
    pub rectified_time: DateTime<FixedOffset>,
    /// In [0, 1].
    pub confidence_score: f64,
    pub metrics: BTreeMap<MetricName, MetricReport>,
    pub factors: Vec<String>,
    pub offset_minutes: f64,
    pub candidates_evaluated: usize,
    pub metric_coverage: Vec<MetricName>,
}

impl RectificationResult {
    /// Serialized form with RFC 3339 times.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn correction(&self) -> Duration {
        self.rectified_time - self.original_time
    }
}

/// Per-metric reports from the winning candidate, in metric order.
pub fn metric_reports(outcomes: &BTreeMap<MetricName, MetricOutcome>) -> BTreeMap<MetricName, MetricReport> {
    outcomes
        .iter()
        .filter_map(|(name, outcome)| {
            let score = outcome.score()?;
            let detail = serde_json::json!({
                "sub_scores": score.sub_scores,
                "analysis": score.detail,
            });
            Some((
                *name,
                MetricReport {
                    score: score.value,
                    detail,
                },
            ))
        })
        .collect()
}

/// Factors of every scored metric, first occurrence kept.
pub fn collect_factors(outcomes: &BTreeMap<MetricName, MetricOutcome>) -> Vec<String> {
    let mut factors: Vec<String> = Vec::new();
    for score in outcomes.values().filter_map(MetricOutcome::score) {
        for f in &score.factors {
            if !factors.contains(f) {
                factors.push(f.clone());
            }
        }
    }
    factors
}

/// Assemble the result from a finished search.
pub fn assemble(birth: &ProcessedBirthData, search: &SearchOutcome) -> RectificationResult {
    let offset = birth.offset();
    let original_time = birth.utc().with_timezone(&offset);
    let rectified_time = search.best.at.with_timezone(&offset);
    let offset_minutes = search.best.offset_seconds as f64 / 60.0;

    let (confidence_score, metrics, mut factors, metric_coverage) = match search.best.evaluation() {
        Some(e) => (
            e.confidence,
            metric_reports(&e.outcomes),
            collect_factors(&e.outcomes),
            e.coverage.clone(),
        ),
        None => (0.0, BTreeMap::new(), Vec::new(), Vec::new()),
    };
    factors.insert(
        0,
        if search.best.offset_seconds == 0 {
            "recorded time retained".to_string()
        } else {
            format!("recorded time corrected by {offset_minutes:+.1} min")
        },
    );

    RectificationResult {
        original_time,
        rectified_time,
        confidence_score,
        metrics,
        factors,
        offset_minutes,
        candidates_evaluated: search.evaluated,
        metric_coverage,
    }
}
