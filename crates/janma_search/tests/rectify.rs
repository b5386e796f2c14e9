//! End-to-end rectification against deterministic chart collaborators.

mod common;

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Duration, TimeZone, Timelike, Utc};
use common::{AnalyticProvider, FailingProvider, FlakyProvider};
use janma_metrics::{
    ALL_METRICS, BirthData, Event, EventCategory, MetricCalculator, MetricContext, MetricName,
    MetricOutcome, MetricScore, PhysicalTraits,
};
use janma_search::{
    ALL_STAGES, BASE_WEIGHTS, ChartCache, ConfidenceAggregator, MetricWeights, RectificationConfig,
    RectifyError, Rectifier, SearchConfig, ValidationError,
};

fn new_york() -> BirthData {
    BirthData::new("1990-01-01", "12:00", 40.7128, -74.0060).with_timezone("-05:00")
}

fn career() -> Vec<Event> {
    vec![
        Event::new(
            EventCategory::Career,
            Utc.with_ymd_and_hms(2020, 1, 1, 12, 0, 0).unwrap(),
            0.8,
        )
        .unwrap(),
    ]
}

fn small_config(window: f64, fine: Option<f64>) -> RectificationConfig {
    RectificationConfig {
        search: SearchConfig {
            window_minutes: window,
            fine_step_minutes: fine,
            ..SearchConfig::default()
        },
        ..RectificationConfig::default()
    }
}

#[test]
fn new_york_career_scenario() {
    let rectifier = Rectifier::new(AnalyticProvider::new(), RectificationConfig::default()).unwrap();
    let result = rectifier.rectify(&new_york(), &career()).unwrap();

    assert!((0.0..=1.0).contains(&result.confidence_score));
    for name in [
        MetricName::ElementalBalance,
        MetricName::PeriodVerification,
        MetricName::EventTiming,
    ] {
        let report = result.metrics.get(&name).unwrap_or_else(|| panic!("{name} missing"));
        assert!((0.0..=1.0).contains(&report.score));
    }
    assert!(!result.metrics.contains_key(&MetricName::PhysicalCorrelation));
    assert!(result.offset_minutes.abs() <= 120.0);
    assert_eq!(result.original_time.hour(), 12);
    assert_eq!(result.original_time.offset().local_minus_utc(), -5 * 3600);
    assert_eq!(
        result.correction(),
        Duration::seconds((result.offset_minutes * 60.0).round() as i64)
    );
    // 49 coarse candidates plus up to 8 new fine ones
    assert!((49..=57).contains(&result.candidates_evaluated));
    assert!(!result.factors.is_empty());

    let json: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();
    assert!(json["confidence_score"].is_f64());
    assert!(json["metrics"]["event_timing"]["score"].is_f64());
    assert!(json["original_time"].as_str().unwrap().starts_with("1990-01-01T12:00:00"));
}

struct Constant(MetricName, f64);

impl MetricCalculator for Constant {
    fn name(&self) -> MetricName {
        self.0
    }

    fn compute(&self, _ctx: &MetricContext<'_>) -> MetricOutcome {
        MetricOutcome::Scored(MetricScore::new(self.1))
    }
}

#[test]
fn tied_candidates_keep_recorded_time() {
    let mut aggregator = ConfidenceAggregator::new(MetricWeights::default());
    for m in ALL_METRICS {
        aggregator.register(Box::new(Constant(m, 0.70)));
    }
    let rectifier = Rectifier::new(AnalyticProvider::new(), RectificationConfig::default())
        .unwrap()
        .with_aggregator(aggregator);
    let result = rectifier.rectify(&new_york(), &career()).unwrap();

    assert_eq!(result.offset_minutes, 0.0);
    assert_eq!(result.rectified_time, result.original_time);
    assert!((result.confidence_score - 0.70).abs() < 1e-12);
}

#[test]
fn rectify_is_idempotent() {
    let rectifier = Rectifier::new(AnalyticProvider::new(), RectificationConfig::default()).unwrap();
    let a = rectifier.rectify(&new_york(), &career()).unwrap();
    let b = rectifier.rectify(&new_york(), &career()).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.to_json().unwrap(), b.to_json().unwrap());

    let serial = Rectifier::new(
        AnalyticProvider::new(),
        RectificationConfig {
            search: SearchConfig {
                parallel: false,
                ..SearchConfig::default()
            },
            ..RectificationConfig::default()
        },
    )
    .unwrap();
    assert_eq!(serial.rectify(&new_york(), &career()).unwrap(), a);
}

fn renormalized(result: &janma_search::RectificationResult) -> f64 {
    let weights: BTreeMap<MetricName, f64> = BASE_WEIGHTS.into_iter().collect();
    let (num, den) = result
        .metric_coverage
        .iter()
        .map(|m| (weights[m], result.metrics[m].score))
        .fold((0.0, 0.0), |(n, d), (w, s)| (n + w * s, d + w));
    num / den
}

#[test]
fn missing_traits_shrink_coverage_not_confidence_range() {
    let rectifier = Rectifier::new(AnalyticProvider::new(), RectificationConfig::default()).unwrap();
    let traits = PhysicalTraits {
        build: Some("tall and athletic".into()),
        complexion: Some("fair".into()),
        ..Default::default()
    };
    let with = rectifier
        .rectify(&new_york().with_traits(traits), &career())
        .unwrap();
    let without = rectifier.rectify(&new_york(), &career()).unwrap();

    assert!(with.metric_coverage.contains(&MetricName::PhysicalCorrelation));
    assert!(!without.metric_coverage.contains(&MetricName::PhysicalCorrelation));
    for r in [&with, &without] {
        assert!((0.0..=1.0).contains(&r.confidence_score));
        assert!((r.confidence_score - renormalized(r)).abs() < 1e-9);
    }
}

#[test]
fn empty_events_are_neutral() {
    let rectifier = Rectifier::new(AnalyticProvider::new(), small_config(10.0, None)).unwrap();
    let result = rectifier.rectify(&new_york(), &[]).unwrap();
    assert_eq!(result.metrics[&MetricName::EventTiming].score, 0.5);
    assert_eq!(result.metrics[&MetricName::PeriodVerification].score, 0.5);
}

#[test]
fn invalid_birth_data_is_rejected() {
    let rectifier = Rectifier::new(AnalyticProvider::new(), RectificationConfig::default()).unwrap();

    let bad_lat = BirthData::new("1990-01-01", "12:00", 95.0, 0.0);
    assert_eq!(
        rectifier.rectify(&bad_lat, &career()),
        Err(RectifyError::Validation(ValidationError::LatitudeOutOfRange(95.0)))
    );

    let bad_date = BirthData::new("01/01/1990", "12:00", 10.0, 10.0);
    assert!(matches!(
        rectifier.rectify(&bad_date, &career()),
        Err(RectifyError::Validation(ValidationError::UnparsableDate(_)))
    ));

    let bad_tz = new_york().with_timezone("Mars/Olympus");
    assert!(matches!(
        rectifier.rectify(&bad_tz, &career()),
        Err(RectifyError::Validation(ValidationError::UnparsableTimezone(_)))
    ));
}

#[test]
fn all_candidates_failing_is_surfaced() {
    let rectifier = Rectifier::new(FailingProvider, small_config(10.0, None)).unwrap();
    match rectifier.rectify(&new_york(), &career()) {
        Err(RectifyError::ExternalComputation { failed, .. }) => assert_eq!(failed, 5),
        other => panic!("expected external computation error, got {other:?}"),
    }
}

#[test]
fn failing_candidates_are_skipped() {
    let rectifier = Rectifier::new(FlakyProvider, small_config(30.0, None)).unwrap();
    let result = rectifier.rectify(&new_york(), &career()).unwrap();
    // Minutes ending in 5 carry a Moon at 412 degrees
    assert_ne!(result.rectified_time.minute() % 10, 5);
    assert_eq!(result.candidates_evaluated, 7);
}

#[test]
fn invalid_weights_are_rejected() {
    let mut config = RectificationConfig::default();
    config.weights.insert(MetricName::EventTiming, f64::NAN);
    assert!(matches!(
        Rectifier::new(AnalyticProvider::new(), config),
        Err(RectifyError::InvalidConfig(_))
    ));
}

#[test]
fn charts_are_fetched_once_per_candidate() {
    let provider = AnalyticProvider::new();
    let rectifier = Rectifier::new(&provider, RectificationConfig::default()).unwrap();
    let result = rectifier.rectify(&new_york(), &career()).unwrap();
    assert_eq!(provider.calls(), result.candidates_evaluated);

    let cache = Arc::new(ChartCache::new());
    let shared = Rectifier::new(&provider, small_config(20.0, Some(1.0)))
        .unwrap()
        .with_cache(Arc::clone(&cache));
    let before = provider.calls();
    shared.rectify(&new_york(), &career()).unwrap();
    let first_pass = provider.calls() - before;
    assert_eq!(first_pass, cache.len());
    shared.rectify(&new_york(), &career()).unwrap();
    assert_eq!(provider.calls() - before, first_pass);
    assert!(cache.stats().hits >= first_pass as u64);
}

#[test]
fn staged_run_reports_every_stage() {
    let rectifier = Rectifier::new(AnalyticProvider::new(), small_config(15.0, None)).unwrap();
    let birth = new_york();
    let events = career();

    let stages: Vec<_> = rectifier
        .run(&birth, &events)
        .map(|p| p.unwrap().stage)
        .collect();
    assert_eq!(stages, ALL_STAGES);

    let mut run = rectifier.run(&birth, &events);
    assert_eq!(run.next().unwrap().unwrap().percent, 10);
    assert_eq!(run.next().unwrap().unwrap().percent, 25);
    run.restart();
    assert_eq!(run.count(), 5);

    let mut run = rectifier.run(&birth, &events);
    run.next();
    run.restart();
    assert_eq!(run.finish().unwrap(), rectifier.rectify(&birth, &events).unwrap());
}

#[test]
fn staged_run_stops_after_failure() {
    let rectifier = Rectifier::new(AnalyticProvider::new(), RectificationConfig::default()).unwrap();
    let birth = BirthData::new("1990-01-01", "12:00", 0.0, 200.0);
    let mut run = rectifier.run(&birth, &[]);
    assert!(matches!(
        run.next(),
        Some(Err(RectifyError::Validation(ValidationError::LongitudeOutOfRange(_))))
    ));
    assert!(run.next().is_none());
}

#[test]
fn local_mean_time_when_timezone_missing() {
    let rectifier = Rectifier::new(AnalyticProvider::new(), small_config(0.0, None)).unwrap();
    let birth = BirthData::new("1990-01-01", "12:00", 40.7128, -74.0060);
    let result = rectifier.rectify(&birth, &career()).unwrap();
    assert_eq!(result.original_time.offset().local_minus_utc(), -296 * 60);
    assert_eq!(result.candidates_evaluated, 1);
}
