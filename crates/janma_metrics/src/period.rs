//! Dasha period verification.
//!
//! For every dated event the active period chain is looked up and each
//! level's lord is scored against the event category: 1 for a significator
//! or lord of a category house, 0.5 for a natural friend of a significator.
//! Outer levels weigh more.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use janma_base::{
    DashaHierarchy, DashaPeriod, Graha, NaisargikaMaitri, active_chain, angular_distance,
    house_class, jd_from_datetime, naisargika_maitri, rashi_lord_by_index, whole_sign_house_rashi,
};
use serde::Serialize;

use crate::calculator::{MetricCalculator, MetricContext};
use crate::chart::ChartSnapshot;
use crate::event::{Event, EventCategory};
use crate::score::{MetricName, MetricOutcome, MetricScore, weighted_mean};
use crate::strength::relative_strengths;

/// Weight of Mahadasha, Antardasha, Pratyantardasha, Sookshmadasha.
pub const LEVEL_WEIGHTS: [f64; 4] = [0.4, 0.3, 0.2, 0.1];

/// Share of the final score taken by event alignment; harmony takes the rest.
pub const ALIGNMENT_SHARE: f64 = 0.7;

/// Orb for the aspect harmony, in degrees.
pub const ASPECT_ORB: f64 = 8.0;

/// Neutral score when there is nothing to verify.
pub const NEUTRAL: f64 = 0.5;

/// How strongly a period lord speaks for a category.
pub fn lord_relevance(graha: Graha, category: EventCategory, chart: &ChartSnapshot) -> f64 {
    let significators = category.significators();
    if significators.contains(&graha) {
        return 1.0;
    }
    if let Some(asc) = chart.ascendant() {
        let rules_house = category
            .houses()
            .iter()
            .any(|h| rashi_lord_by_index(whole_sign_house_rashi(asc, *h)) == Some(graha));
        if rules_house {
            return 1.0;
        }
    }
    if significators
        .iter()
        .any(|s| naisargika_maitri(graha, *s) == NaisargikaMaitri::Friend)
    {
        0.5
    } else {
        0.0
    }
}

/// Category alignment of one active chain, normalized by the weights of
/// the levels the hierarchy materializes.
pub fn chain_alignment(
    chain: &[DashaPeriod],
    depth: usize,
    category: EventCategory,
    chart: &ChartSnapshot,
) -> f64 {
    let den: f64 = LEVEL_WEIGHTS.iter().take(depth).sum();
    if den <= 0.0 {
        return 0.0;
    }
    let num: f64 = chain
        .iter()
        .zip(LEVEL_WEIGHTS)
        .map(|(p, w)| w * lord_relevance(p.graha, category, chart))
        .sum();
    (num / den).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventAlignment {
    pub category: EventCategory,
    pub timestamp: Option<DateTime<Utc>>,
    /// Lords of the active chain, outermost first. Empty when undated or
    /// outside the timeline.
    pub lords: Vec<Graha>,
    pub alignment: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodAlignment {
    pub events: Vec<EventAlignment>,
    pub timestamped: usize,
    /// Intensity-weighted mean; None for an empty event list.
    pub alignment: Option<f64>,
}

/// Per-event alignment against a hierarchy.
///
/// Undated events and events outside the timeline contribute zero
/// alignment but keep their weight.
pub fn period_alignment(
    hierarchy: &DashaHierarchy,
    events: &[Event],
    chart: &ChartSnapshot,
) -> PeriodAlignment {
    let depth = hierarchy.depth();
    let per_event: Vec<EventAlignment> = events
        .iter()
        .map(|e| {
            let chain = e
                .timestamp
                .map(|t| active_chain(hierarchy, jd_from_datetime(&t)))
                .unwrap_or_default();
            let alignment = if chain.is_empty() {
                0.0
            } else {
                chain_alignment(&chain, depth, e.category, chart)
            };
            EventAlignment {
                category: e.category,
                timestamp: e.timestamp,
                lords: chain.iter().map(|p| p.graha).collect(),
                alignment,
                weight: e.weight(),
            }
        })
        .collect();

    let pairs: Vec<(f64, Option<f64>)> = per_event
        .iter()
        .map(|a| (a.weight, Some(a.alignment)))
        .collect();
    PeriodAlignment {
        timestamped: events.iter().filter(|e| e.timestamp.is_some()).count(),
        alignment: weighted_mean(&pairs),
        events: per_event,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustedStrength {
    pub base: f64,
    pub influence: f64,
    pub adjusted: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodVerification {
    pub alignment: PeriodAlignment,
    pub birth_chain: Vec<Graha>,
    pub adjusted_strengths: BTreeMap<Graha, AdjustedStrength>,
    pub house_harmony: Option<f64>,
    pub planet_harmony: Option<f64>,
    pub aspect_harmony: Option<f64>,
}

impl PeriodVerification {
    pub fn harmony(&self) -> f64 {
        weighted_mean(&[
            (1.0, self.house_harmony),
            (1.0, self.planet_harmony),
            (1.0, self.aspect_harmony),
        ])
        .unwrap_or(NEUTRAL)
    }

    /// Neutral with no events, zero when none is dated.
    pub fn score(&self) -> f64 {
        match self.alignment.alignment {
            None => NEUTRAL,
            Some(_) if self.alignment.timestamped == 0 => 0.0,
            Some(a) => ALIGNMENT_SHARE * a + (1.0 - ALIGNMENT_SHARE) * self.harmony(),
        }
    }
}

fn aspect_value(separation: f64) -> f64 {
    let near = |target: f64| (separation - target).abs() <= ASPECT_ORB;
    if near(0.0) || near(60.0) || near(120.0) {
        1.0
    } else if near(90.0) || near(180.0) {
        0.25
    } else {
        0.5
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Full verification: alignment, strength adjustment and harmonies.
pub fn verify_periods(
    hierarchy: &DashaHierarchy,
    events: &[Event],
    chart: &ChartSnapshot,
) -> PeriodVerification {
    let alignment = period_alignment(hierarchy, events, chart);
    let birth_chain: Vec<Graha> = active_chain(hierarchy, hierarchy.birth_jd)
        .iter()
        .map(|p| p.graha)
        .collect();

    let mut chains: Vec<&[Graha]> = vec![birth_chain.as_slice()];
    chains.extend(
        alignment
            .events
            .iter()
            .filter(|a| !a.lords.is_empty())
            .map(|a| a.lords.as_slice()),
    );

    let mut influence: BTreeMap<Graha, f64> = BTreeMap::new();
    for chain in &chains {
        for (g, w) in chain.iter().zip(LEVEL_WEIGHTS) {
            *influence.entry(*g).or_insert(0.0) += w / chains.len() as f64;
        }
    }
    let adjusted_strengths: BTreeMap<Graha, AdjustedStrength> = relative_strengths(chart)
        .map(|rs| {
            rs.planets
                .iter()
                .map(|(g, p)| {
                    let inf = influence.get(g).copied().unwrap_or(0.0);
                    (
                        *g,
                        AdjustedStrength {
                            base: p.total,
                            influence: inf,
                            adjusted: p.total * (1.0 + inf),
                        },
                    )
                })
                .collect()
        })
        .unwrap_or_default();

    let house_harmony = mean(chains.iter().filter_map(|chain| {
        mean(
            chain
                .iter()
                .take(2)
                .filter_map(|g| chart.house_of_graha(*g))
                .map(|h| house_class(h).score()),
        )
    }));

    let planet_harmony = mean(chains.iter().filter(|c| c.len() >= 2).map(|chain| {
        let maitri = naisargika_maitri(chain[0], chain[1]).value();
        match adjusted_strengths.get(&chain[0]) {
            Some(s) => 0.5 * maitri + 0.5 * s.adjusted.min(1.0),
            None => maitri,
        }
    }));

    let aspect_harmony = mean(chains.iter().filter(|c| c.len() >= 2).filter_map(|chain| {
        let a = chart.positions.longitude(chain[0])?;
        let b = chart.positions.longitude(chain[1])?;
        Some(aspect_value(angular_distance(a, b)))
    }));

    PeriodVerification {
        alignment,
        birth_chain,
        adjusted_strengths,
        house_harmony,
        planet_harmony,
        aspect_harmony,
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PeriodVerificationCalculator;

impl MetricCalculator for PeriodVerificationCalculator {
    fn name(&self) -> MetricName {
        MetricName::PeriodVerification
    }

    fn compute(&self, ctx: &MetricContext<'_>) -> MetricOutcome {
        if ctx.events.is_empty() {
            return MetricOutcome::Scored(
                MetricScore::new(NEUTRAL).with_factor("no events to verify against periods"),
            );
        }
        let Some(hierarchy) = ctx.dasha() else {
            return MetricOutcome::unavailable("moon longitude unusable, no dasha timeline");
        };
        let v = verify_periods(hierarchy, ctx.events, ctx.chart);

        let mut score = MetricScore::new(v.score())
            .with_sub_score("alignment", v.alignment.alignment.unwrap_or(0.0))
            .with_sub_score("harmony", v.harmony());
        if v.alignment.timestamped == 0 {
            score = score.with_factor("no event carries a date");
        }
        for a in &v.alignment.events {
            if let (Some(t), Some(md)) = (a.timestamp, a.lords.first()) {
                score = score.with_factor(format!(
                    "{} event {} fell in {md} mahadasha (alignment {:.2})",
                    a.category,
                    t.format("%Y-%m-%d"),
                    a.alignment
                ));
            }
        }
        MetricOutcome::Scored(score.with_detail(&v))
    }
}
