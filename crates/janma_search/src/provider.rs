//! The chart collaborator boundary.
//!
//! Ephemeris work happens outside this workspace. Implementations answer
//! for one instant and location; every answer is range-checked before the
//! engine uses it.

use chrono::{DateTime, Utc};
use janma_base::jd_from_datetime;
use janma_base::util::is_valid_longitude;
use janma_metrics::{ChartSnapshot, HouseCusps, PlanetaryPositions};

use crate::error::ChartError;

/// Positions and houses for an instant and place.
pub trait ChartProvider: Send + Sync {
    /// Sidereal positions of the grahas.
    fn compute_positions(
        &self,
        at: DateTime<Utc>,
        latitude: f64,
        longitude: f64,
        altitude: f64,
    ) -> Result<PlanetaryPositions, ChartError>;

    /// House cusps, ascendant and midheaven.
    fn compute_houses(
        &self,
        at: DateTime<Utc>,
        latitude: f64,
        longitude: f64,
    ) -> Result<HouseCusps, ChartError>;
}

impl<P: ChartProvider + ?Sized> ChartProvider for &P {
    fn compute_positions(
        &self,
        at: DateTime<Utc>,
        latitude: f64,
        longitude: f64,
        altitude: f64,
    ) -> Result<PlanetaryPositions, ChartError> {
        (**self).compute_positions(at, latitude, longitude, altitude)
    }

    fn compute_houses(
        &self,
        at: DateTime<Utc>,
        latitude: f64,
        longitude: f64,
    ) -> Result<HouseCusps, ChartError> {
        (**self).compute_houses(at, latitude, longitude)
    }
}

fn check_longitude(body: &str, field: &'static str, value: f64) -> Result<(), ChartError> {
    if is_valid_longitude(value) {
        Ok(())
    } else {
        Err(ChartError::OutOfRange {
            body: body.to_string(),
            field,
            value,
        })
    }
}

/// Longitudes in [0, 360) and latitudes in [-90, 90], all finite.
///
/// The first offending value is reported.
pub fn validate_chart(positions: &PlanetaryPositions, houses: &HouseCusps) -> Result<(), ChartError> {
    if let Some((graha, p)) = positions.iter().find(|(_, p)| !p.is_valid()) {
        let body = graha.english_name();
        check_longitude(body, "longitude", p.longitude)?;
        return Err(ChartError::OutOfRange {
            body: body.to_string(),
            field: "latitude",
            value: p.latitude,
        });
    }
    if !houses.is_valid() {
        for cusp in houses.cusps {
            check_longitude("house", "cusp", cusp)?;
        }
        check_longitude("ascendant", "longitude", houses.ascendant)?;
        check_longitude("midheaven", "longitude", houses.midheaven)?;
    }
    Ok(())
}

/// Ask the provider for a full snapshot and validate it.
pub fn fetch_snapshot<P: ChartProvider + ?Sized>(
    provider: &P,
    at: DateTime<Utc>,
    latitude: f64,
    longitude: f64,
    altitude: f64,
) -> Result<ChartSnapshot, ChartError> {
    let positions = provider.compute_positions(at, latitude, longitude, altitude)?;
    let houses = provider.compute_houses(at, latitude, longitude)?;
    validate_chart(&positions, &houses)?;
    Ok(ChartSnapshot::new(jd_from_datetime(&at), positions, Some(houses)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use janma_base::Graha;
    use janma_metrics::PlanetPosition;

    fn houses() -> HouseCusps {
        HouseCusps {
            cusps: std::array::from_fn(|i| 30.0 * i as f64),
            ascendant: 0.0,
            midheaven: 270.0,
        }
    }

    #[test]
    fn rejects_out_of_range_longitude() {
        let positions: PlanetaryPositions =
            [(Graha::Shani, PlanetPosition::at_longitude(361.0))].into_iter().collect();
        let err = validate_chart(&positions, &houses()).unwrap_err();
        assert_eq!(
            err,
            ChartError::OutOfRange {
                body: "Saturn".into(),
                field: "longitude",
                value: 361.0
            }
        );
    }

    #[test]
    fn rejects_bad_latitude_and_cusp() {
        let mut p = PlanetPosition::at_longitude(10.0);
        p.latitude = f64::NAN;
        let positions: PlanetaryPositions = [(Graha::Chandra, p)].into_iter().collect();
        assert!(validate_chart(&positions, &houses()).is_err());

        let mut h = houses();
        h.cusps[4] = -1.0;
        assert!(validate_chart(&PlanetaryPositions::default(), &h).is_err());
    }

    #[test]
    fn reports_the_failing_field() {
        let mut p = PlanetPosition::at_longitude(10.0);
        p.latitude = 91.0;
        assert!(!p.is_valid());
        let positions: PlanetaryPositions = [(Graha::Chandra, p)].into_iter().collect();
        assert_eq!(
            validate_chart(&positions, &houses()).unwrap_err(),
            ChartError::OutOfRange {
                body: "Moon".into(),
                field: "latitude",
                value: 91.0
            }
        );

        let mut h = houses();
        h.midheaven = 360.0;
        assert!(!h.is_valid());
        assert_eq!(
            validate_chart(&PlanetaryPositions::default(), &h).unwrap_err(),
            ChartError::OutOfRange {
                body: "midheaven".into(),
                field: "longitude",
                value: 360.0
            }
        );
    }

    #[test]
    fn accepts_valid_chart() {
        let positions: PlanetaryPositions =
            [(Graha::Surya, PlanetPosition::at_longitude(359.99))].into_iter().collect();
        assert!(validate_chart(&positions, &houses()).is_ok());
    }
}
