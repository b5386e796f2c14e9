//! Event-timing correlation.
//!
//! Four views of the dated events: patterns among the events themselves,
//! dasha alignment, divisional-chart support for each category and the
//! pairwise relatedness of events. A list with no usable event scores a
//! neutral 0.5.
//!
//! Pattern and pairwise terms start at neutral and only rise with
//! corroboration. Divisional support is averaged over distinct categories,
//! so repeating a category leaves it unchanged.

use std::collections::{BTreeMap, BTreeSet};

use janma_base::{
    Amsha, DashaHierarchy, dignity_at, house_class, jd_from_datetime, rashi_lord_by_index,
    whole_sign_house_rashi,
};
use serde::Serialize;

use crate::calculator::{MetricCalculator, MetricContext};
use crate::chart::{ChartSnapshot, DivisionalChart};
use crate::event::{Event, EventCategory};
use crate::period::period_alignment;
use crate::score::{MetricName, MetricOutcome, MetricScore, weighted_mean};

pub const PATTERN_WEIGHT: f64 = 0.2;
pub const PERIOD_WEIGHT: f64 = 0.35;
pub const DIVISIONAL_WEIGHT: f64 = 0.25;
pub const PAIRWISE_WEIGHT: f64 = 0.2;

pub const NEUTRAL: f64 = 0.5;

/// Tropical year for the solar-return phase.
const TROPICAL_YEAR_DAYS: f64 = 365.2422;

/// E-folding time of temporal proximity between two events.
const PROXIMITY_SCALE_DAYS: f64 = 365.0;

/// Two events recur on the same solar-return phase when they fall within
/// this fraction of a year of each other.
const RECURRENCE_ORB_YEARS: f64 = 30.0 / 365.2422;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternAnalysis {
    pub clusters: usize,
    /// Corroboration of the largest timing cluster.
    pub cluster_score: f64,
    pub dominant_category: Option<EventCategory>,
    pub category_score: f64,
    /// Corroboration of the largest group sharing a solar-return phase.
    pub cyclical_score: f64,
    /// Least-squares intensity change per year; explanatory only.
    pub intensity_trend: Option<f64>,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DivisionalSupport {
    pub category: EventCategory,
    pub charts: BTreeMap<Amsha, f64>,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventTimingAnalysis {
    pub events_used: usize,
    pub events_ignored: usize,
    pub pattern: PatternAnalysis,
    pub period: Option<f64>,
    pub divisional: Vec<DivisionalSupport>,
    pub divisional_score: Option<f64>,
    pub pairwise: f64,
    pub confidence: f64,
}

/// An event with a resolved instant.
struct Dated<'e> {
    event: &'e Event,
    jd: f64,
}

/// Corroboration carried by the largest group of `k` mutually supporting
/// events: 0 for a lone event, approaching 1 as the group grows.
fn corroboration(k: usize) -> f64 {
    if k == 0 { 0.0 } else { 1.0 - 1.0 / k as f64 }
}

/// Circular distance between two solar-return phases, as a fraction of a year.
fn phase_distance(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(1.0);
    d.min(1.0 - d)
}

/// Each sub-score grows with the size of the largest supporting group, so
/// adding an event never weakens a pattern that is already there.
fn pattern_analysis(dated: &[Dated<'_>], birth_jd: f64, cluster_gap_days: f64) -> PatternAnalysis {
    let mut jds: Vec<f64> = dated.iter().map(|d| d.jd).collect();
    jds.sort_by(f64::total_cmp);

    let mut clusters = 0;
    let mut largest_cluster = 0;
    let mut run = 0;
    for (i, jd) in jds.iter().enumerate() {
        if i == 0 || jd - jds[i - 1] > cluster_gap_days {
            clusters += 1;
            run = 0;
        }
        run += 1;
        largest_cluster = largest_cluster.max(run);
    }

    let mut counts: BTreeMap<EventCategory, usize> = BTreeMap::new();
    for d in dated {
        *counts.entry(d.event.category).or_insert(0) += 1;
    }
    let dominant = counts
        .iter()
        .fold(None::<(EventCategory, usize)>, |best, (c, k)| match best {
            Some((_, bk)) if bk >= *k => best,
            _ => Some((*c, *k)),
        });

    let phases: Vec<f64> = dated
        .iter()
        .map(|d| ((d.jd - birth_jd) / TROPICAL_YEAR_DAYS).rem_euclid(1.0))
        .collect();
    let largest_recurrence = phases
        .iter()
        .map(|a| {
            phases
                .iter()
                .filter(|b| phase_distance(*a, **b) <= RECURRENCE_ORB_YEARS)
                .count()
        })
        .max()
        .unwrap_or(0);

    let cluster_score = corroboration(largest_cluster);
    let category_score = corroboration(dominant.map_or(0, |(_, k)| k));
    let cyclical_score = corroboration(largest_recurrence);
    let support = (cluster_score + category_score + cyclical_score) / 3.0;

    PatternAnalysis {
        clusters,
        cluster_score,
        dominant_category: dominant.map(|(c, _)| c),
        category_score,
        cyclical_score,
        intensity_trend: intensity_trend(dated),
        score: NEUTRAL + (1.0 - NEUTRAL) * support,
    }
}

fn intensity_trend(dated: &[Dated<'_>]) -> Option<f64> {
    if dated.len() < 2 {
        return None;
    }
    let n = dated.len() as f64;
    let xs: Vec<f64> = dated.iter().map(|d| d.jd / 365.25).collect();
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = dated.iter().map(|d| d.event.intensity).sum::<f64>() / n;
    let (sxy, sxx) = xs.iter().zip(dated).fold((0.0, 0.0), |(sxy, sxx), (x, d)| {
        let dx = x - mean_x;
        (sxy + dx * (d.event.intensity - mean_y), sxx + dx * dx)
    });
    (sxx > 0.0).then(|| sxy / sxx)
}

/// Support a divisional chart gives a category: significator dignity and
/// the placement of the category-house lords.
fn divisional_chart_score(chart: &DivisionalChart, category: EventCategory) -> Option<f64> {
    let dignity = mean(
        category
            .significators()
            .iter()
            .filter_map(|g| chart.longitude(*g).map(|lon| dignity_at(*g, lon).score())),
    );
    let placement = chart.ascendant.and_then(|asc| {
        mean(category.houses().iter().filter_map(|h| {
            let lord = rashi_lord_by_index(whole_sign_house_rashi(asc, *h))?;
            chart.house_of(lord).map(|house| house_class(house).score())
        }))
    });
    weighted_mean(&[(1.0, dignity), (1.0, placement)])
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

fn divisional_support(chart: &ChartSnapshot, category: EventCategory) -> DivisionalSupport {
    let charts: BTreeMap<Amsha, f64> = category
        .divisional_charts()
        .iter()
        .filter_map(|a| {
            let d = chart.divisional(*a);
            divisional_chart_score(&d, category).map(|s| (*a, s.clamp(0.0, 1.0)))
        })
        .collect();
    let score = mean(charts.values().copied()).unwrap_or(NEUTRAL);
    DivisionalSupport {
        category,
        charts,
        score,
    }
}

/// Strongest relationship between any two events, lifted above neutral.
fn pairwise(dated: &[Dated<'_>]) -> f64 {
    let strongest = dated
        .iter()
        .enumerate()
        .flat_map(|(i, a)| dated[i + 1..].iter().map(move |b| (a, b)))
        .map(|(a, b)| {
            let proximity = (-(a.jd - b.jd).abs() / PROXIMITY_SCALE_DAYS).exp();
            0.5 * a.event.category.similarity(b.event.category) + 0.5 * proximity
        })
        .fold(0.0, f64::max);
    (NEUTRAL + (1.0 - NEUTRAL) * strongest).clamp(0.0, 1.0)
}

/// Analyze well-formed events; None when there are none.
pub fn event_timing(
    events: &[Event],
    chart: &ChartSnapshot,
    hierarchy: Option<&DashaHierarchy>,
    cluster_gap_days: f64,
) -> Option<EventTimingAnalysis> {
    let usable: Vec<Event> = events.iter().filter(|e| e.is_well_formed()).cloned().collect();
    let dated: Vec<Dated<'_>> = usable
        .iter()
        .filter_map(|e| e.timestamp.map(|t| Dated { event: e, jd: jd_from_datetime(&t) }))
        .collect();
    if dated.is_empty() {
        return None;
    }

    let pattern = pattern_analysis(&dated, chart.jd_ut, cluster_gap_days);
    let period = hierarchy.and_then(|h| period_alignment(h, &usable, chart).alignment);
    let categories: BTreeSet<EventCategory> = dated.iter().map(|d| d.event.category).collect();
    let divisional: Vec<DivisionalSupport> = categories
        .into_iter()
        .map(|c| divisional_support(chart, c))
        .collect();
    let divisional_score = mean(divisional.iter().map(|d| d.score));
    let pairwise = pairwise(&dated);

    let confidence = weighted_mean(&[
        (PATTERN_WEIGHT, Some(pattern.score)),
        (PERIOD_WEIGHT, period),
        (DIVISIONAL_WEIGHT, divisional_score),
        (PAIRWISE_WEIGHT, Some(pairwise)),
    ])
    .unwrap_or(NEUTRAL);

    Some(EventTimingAnalysis {
        events_used: dated.len(),
        events_ignored: events.len() - dated.len(),
        pattern,
        period,
        divisional,
        divisional_score,
        pairwise,
        confidence,
    })
}

#[derive(Debug, Default, Clone, Copy)]
pub struct EventTimingCalculator;

impl MetricCalculator for EventTimingCalculator {
    fn name(&self) -> MetricName {
        MetricName::EventTiming
    }

    fn compute(&self, ctx: &MetricContext<'_>) -> MetricOutcome {
        let Some(a) = event_timing(
            ctx.events,
            ctx.chart,
            ctx.dasha(),
            ctx.settings.cluster_gap_days,
        ) else {
            return MetricOutcome::Scored(
                MetricScore::new(NEUTRAL).with_factor("no well-formed dated events"),
            );
        };

        let mut score = MetricScore::new(a.confidence)
            .with_sub_score("pattern", a.pattern.score)
            .with_sub_score("pairwise", a.pairwise);
        if let Some(p) = a.period {
            score = score.with_sub_score("period", p);
        }
        if let Some(d) = a.divisional_score {
            score = score.with_sub_score("divisional", d);
        }
        if a.events_ignored > 0 {
            score = score.with_factor(format!("{} malformed event(s) ignored", a.events_ignored));
        }
        if let Some(c) = a.pattern.dominant_category {
            score = score.with_factor(format!(
                "{} events form {} timing cluster(s), mostly {c}",
                a.events_used, a.pattern.clusters
            ));
        }
        MetricOutcome::Scored(score.with_detail(&a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{HouseCusps, PlanetPosition, PlanetaryPositions};
    use chrono::{TimeZone, Utc};
    use janma_base::{Graha, vimshottari_hierarchy};

    fn chart() -> ChartSnapshot {
        let positions: PlanetaryPositions = [
            (Graha::Surya, 280.0),
            (Graha::Chandra, 0.0),
            (Graha::Mangal, 250.0),
            (Graha::Buddh, 290.0),
            (Graha::Guru, 95.0),
            (Graha::Shukra, 300.0),
            (Graha::Shani, 285.0),
            (Graha::Rahu, 310.0),
            (Graha::Ketu, 130.0),
        ]
        .into_iter()
        .map(|(g, l)| (g, PlanetPosition::at_longitude(l)))
        .collect();
        let birth = Utc.with_ymd_and_hms(1990, 1, 1, 17, 0, 0).unwrap();
        ChartSnapshot::new(
            jd_from_datetime(&birth),
            positions,
            Some(HouseCusps {
                cusps: std::array::from_fn(|i| 30.0 * i as f64 + 5.0),
                ascendant: 5.0,
                midheaven: 275.0,
            }),
        )
    }

    fn ev(cat: EventCategory, y: i32, m: u32) -> Event {
        Event::new(cat, Utc.with_ymd_and_hms(y, m, 1, 12, 0, 0).unwrap(), 0.8).unwrap()
    }

    fn confidence(events: &[Event]) -> f64 {
        let c = chart();
        let h = vimshottari_hierarchy(c.jd_ut, 0.0, 3).unwrap();
        event_timing(events, &c, Some(&h), 730.0).map_or(NEUTRAL, |a| a.confidence)
    }

    #[test]
    fn empty_or_malformed_is_none() {
        assert!(event_timing(&[], &chart(), None, 730.0).is_none());
        let mut bad = ev(EventCategory::Career, 2020, 1);
        bad.intensity = f64::NAN;
        assert!(event_timing(&[bad], &chart(), None, 730.0).is_none());
    }

    /// Career events whose whole active chain speaks for career.
    fn fully_aligned_career_events() -> Vec<Event> {
        let c = chart();
        let h = vimshottari_hierarchy(c.jd_ut, 0.0, 3).unwrap();
        let start = Utc.with_ymd_and_hms(2017, 1, 1, 12, 0, 0).unwrap();
        let candidates: Vec<Event> = (0..6000)
            .map(|i| {
                let t = start + chrono::Duration::days(5 * i);
                Event::new(EventCategory::Career, t, 0.8).unwrap()
            })
            .collect();
        let aligned = period_alignment(&h, &candidates, &c);
        candidates
            .into_iter()
            .zip(aligned.events)
            .filter(|(_, a)| a.alignment >= 1.0 - 1e-12)
            .map(|(e, _)| e)
            .collect()
    }

    #[test]
    fn distant_aligned_event_does_not_lower_confidence() {
        let aligned = fully_aligned_career_events();
        let first = aligned[0].clone();
        let last = aligned.last().unwrap().clone();
        let gap = (last.timestamp.unwrap() - first.timestamp.unwrap()).num_days();
        assert!(gap > 20 * 365, "aligned events span only {gap} days");

        let one = confidence(std::slice::from_ref(&first));
        let two = confidence(&[first.clone(), last.clone()]);
        assert!(two >= one - 1e-12, "{two} < {one}");

        let mut growing = vec![first];
        let mut previous = one;
        for e in aligned.iter().step_by(aligned.len() / 5 + 1).skip(1) {
            growing.push(e.clone());
            let next = confidence(&growing);
            assert!(next >= previous - 1e-12, "{next} < {previous}");
            previous = next;
        }
    }

    #[test]
    fn pattern_and_pairwise_never_fall_below_neutral() {
        let c = chart();
        let scattered = [
            ev(EventCategory::Career, 1995, 1),
            ev(EventCategory::Health, 2003, 7),
            ev(EventCategory::Education, 2012, 4),
        ];
        let a = event_timing(&scattered, &c, None, 730.0).unwrap();
        assert!(a.pattern.score >= NEUTRAL);
        assert!(a.pairwise >= NEUTRAL);
    }

    #[test]
    fn repeating_an_event_of_the_same_category_does_not_lower_confidence() {
        let c = chart();
        let base = vec![ev(EventCategory::Career, 2019, 1), ev(EventCategory::Career, 2019, 6)];
        let mut more = base.clone();
        more.push(base[0].clone());
        let before = event_timing(&base, &c, None, 730.0).unwrap().confidence;
        let after = event_timing(&more, &c, None, 730.0).unwrap().confidence;
        assert!(after >= before - 1e-12);
    }

    #[test]
    fn clustered_events_score_higher_pattern() {
        let c = chart();
        let close = [ev(EventCategory::Career, 2019, 1), ev(EventCategory::Career, 2019, 6)];
        let far = [ev(EventCategory::Career, 1995, 1), ev(EventCategory::Health, 2019, 6)];
        let a = event_timing(&close, &c, None, 730.0).unwrap();
        let b = event_timing(&far, &c, None, 730.0).unwrap();
        assert!(a.pattern.score > b.pattern.score);
        assert!(a.pairwise > b.pairwise);
        assert_eq!(a.pattern.clusters, 1);
        assert_eq!(b.pattern.clusters, 2);
    }

    #[test]
    fn single_event_pattern_is_neutral() {
        let a = event_timing(&[ev(EventCategory::Career, 2020, 1)], &chart(), None, 730.0).unwrap();
        assert_eq!(a.pattern.score, NEUTRAL);
        assert_eq!(a.pairwise, NEUTRAL);
        assert!(a.pattern.intensity_trend.is_none());
        assert!(a.period.is_none());
    }

    #[test]
    fn divisional_scores_bounded() {
        let a = event_timing(
            &[ev(EventCategory::Children, 2010, 1), ev(EventCategory::Spiritual, 2012, 1)],
            &chart(),
            None,
            730.0,
        )
        .unwrap();
        for d in &a.divisional {
            assert!(!d.charts.is_empty());
            assert!(d.charts.values().all(|v| (0.0..=1.0).contains(v)));
        }
        assert!((0.0..=1.0).contains(&a.confidence));
    }
}
