//! Deterministic chart collaborators for tests and benches.
//!
//! Planets move at their mean daily motion from rough sidereal J2000
//! positions; the ascendant follows local sidereal time with equal houses.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Timelike, Utc};
use janma_base::{ALL_GRAHAS, Graha, jd_from_datetime, normalize_360};
use janma_metrics::{HouseCusps, PlanetPosition, PlanetaryPositions};
use janma_search::{ChartError, ChartProvider};

const J2000: f64 = 2_451_545.0;
const AYANAMSHA: f64 = 23.85;

/// (longitude at J2000, degrees per day)
fn mean_motion(graha: Graha) -> (f64, f64) {
    match graha {
        Graha::Surya => (256.5, 0.985_647),
        Graha::Chandra => (194.3, 13.176_396),
        Graha::Mangal => (331.2, 0.524_039),
        Graha::Buddh => (247.6, 1.383_3),
        Graha::Guru => (1.6, 0.083_086),
        Graha::Shukra => (217.1, 1.602_130),
        Graha::Shani => (16.4, 0.033_459),
        Graha::Rahu => (101.3, -0.052_954),
        Graha::Ketu => (281.3, -0.052_954),
    }
}

#[derive(Debug, Default)]
pub struct AnalyticProvider {
    calls: AtomicUsize,
}

impl AnalyticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `compute_positions` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub fn analytic_positions(at: DateTime<Utc>) -> PlanetaryPositions {
    let d = jd_from_datetime(&at) - J2000;
    ALL_GRAHAS
        .into_iter()
        .map(|g| {
            let (l0, rate) = mean_motion(g);
            let mut p = PlanetPosition::at_longitude(normalize_360(l0 + rate * d));
            p.speed_longitude = rate;
            (g, p)
        })
        .collect()
}

pub fn analytic_houses(at: DateTime<Utc>, longitude: f64) -> HouseCusps {
    let d = jd_from_datetime(&at) - J2000;
    let lst = 280.460_618_37 + 360.985_647_366_29 * d + longitude;
    let asc = normalize_360(lst + 90.0 - AYANAMSHA);
    HouseCusps {
        cusps: std::array::from_fn(|i| normalize_360(asc + 30.0 * i as f64)),
        ascendant: asc,
        midheaven: normalize_360(asc + 270.0),
    }
}

impl ChartProvider for AnalyticProvider {
    fn compute_positions(
        &self,
        at: DateTime<Utc>,
        _latitude: f64,
        _longitude: f64,
        _altitude: f64,
    ) -> Result<PlanetaryPositions, ChartError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(analytic_positions(at))
    }

    fn compute_houses(
        &self,
        at: DateTime<Utc>,
        _latitude: f64,
        longitude: f64,
    ) -> Result<HouseCusps, ChartError> {
        Ok(analytic_houses(at, longitude))
    }
}

/// Fails for every instant.
pub struct FailingProvider;

impl ChartProvider for FailingProvider {
    fn compute_positions(
        &self,
        _at: DateTime<Utc>,
        _latitude: f64,
        _longitude: f64,
        _altitude: f64,
    ) -> Result<PlanetaryPositions, ChartError> {
        Err(ChartError::Unavailable("ephemeris offline".into()))
    }

    fn compute_houses(
        &self,
        _at: DateTime<Utc>,
        _latitude: f64,
        _longitude: f64,
    ) -> Result<HouseCusps, ChartError> {
        Err(ChartError::Unavailable("ephemeris offline".into()))
    }
}

/// Analytic, except that minutes ending in 5 get an out-of-range Moon.
pub struct FlakyProvider;

impl ChartProvider for FlakyProvider {
    fn compute_positions(
        &self,
        at: DateTime<Utc>,
        _latitude: f64,
        _longitude: f64,
        _altitude: f64,
    ) -> Result<PlanetaryPositions, ChartError> {
        let mut bodies: std::collections::BTreeMap<Graha, PlanetPosition> =
            analytic_positions(at).iter().map(|(g, p)| (g, *p)).collect();
        if at.minute() % 10 == 5 {
            bodies.insert(Graha::Chandra, PlanetPosition::at_longitude(412.0));
        }
        Ok(PlanetaryPositions::new(bodies))
    }

    fn compute_houses(
        &self,
        at: DateTime<Utc>,
        _latitude: f64,
        longitude: f64,
    ) -> Result<HouseCusps, ChartError> {
        Ok(analytic_houses(at, longitude))
    }
}
