//! Chart values produced by the chart collaborator for one instant.

use std::collections::BTreeMap;

use janma_base::util::is_valid_longitude;
use janma_base::{
    Amsha, Graha, amsha_longitude, house_of, rashi_from_longitude, whole_sign_house,
};
use serde::{Deserialize, Serialize};

/// Position of one body: ecliptic longitude/latitude in degrees, distance
/// in AU and daily speeds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanetPosition {
    pub longitude: f64,
    pub latitude: f64,
    pub distance: f64,
    pub speed_longitude: f64,
    pub speed_latitude: f64,
}

impl PlanetPosition {
    /// Position known only by longitude.
    pub fn at_longitude(longitude: f64) -> Self {
        Self {
            longitude,
            latitude: 0.0,
            distance: 1.0,
            speed_longitude: 0.0,
            speed_latitude: 0.0,
        }
    }

    /// Longitude in [0, 360) and latitude in [-90, 90].
    pub fn is_valid(&self) -> bool {
        is_valid_longitude(self.longitude)
            && self.latitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
    }
}

/// Positions of the grahas at one instant. Never mutated once built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanetaryPositions {
    bodies: BTreeMap<Graha, PlanetPosition>,
}

impl PlanetaryPositions {
    pub fn new(bodies: BTreeMap<Graha, PlanetPosition>) -> Self {
        Self { bodies }
    }

    pub fn get(&self, graha: Graha) -> Option<&PlanetPosition> {
        self.bodies.get(&graha)
    }

    /// Longitude of a graha when present and in range.
    pub fn longitude(&self, graha: Graha) -> Option<f64> {
        self.bodies
            .get(&graha)
            .map(|p| p.longitude)
            .filter(|lon| is_valid_longitude(*lon))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Graha, &PlanetPosition)> {
        self.bodies.iter().map(|(g, p)| (*g, p))
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

impl FromIterator<(Graha, PlanetPosition)> for PlanetaryPositions {
    fn from_iter<I: IntoIterator<Item = (Graha, PlanetPosition)>>(iter: I) -> Self {
        Self {
            bodies: iter.into_iter().collect(),
        }
    }
}

/// House cusps plus the two angles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HouseCusps {
    pub cusps: [f64; 12],
    pub ascendant: f64,
    pub midheaven: f64,
}

impl HouseCusps {
    /// True when every cusp and angle is a valid longitude.
    pub fn is_valid(&self) -> bool {
        self.cusps.iter().all(|c| is_valid_longitude(*c))
            && is_valid_longitude(self.ascendant)
            && is_valid_longitude(self.midheaven)
    }

    /// House containing `lon`, whole-sign from the ascendant when the cusps
    /// cannot place it.
    pub fn house_of(&self, lon: f64) -> Option<u8> {
        house_of(lon, &self.cusps).or_else(|| whole_sign_house(lon, self.ascendant))
    }
}

/// Positions and houses for one candidate instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSnapshot {
    /// Julian day (UT) of the instant.
    pub jd_ut: f64,
    pub positions: PlanetaryPositions,
    pub houses: Option<HouseCusps>,
}

impl ChartSnapshot {
    pub fn new(jd_ut: f64, positions: PlanetaryPositions, houses: Option<HouseCusps>) -> Self {
        Self {
            jd_ut,
            positions,
            houses,
        }
    }

    /// Ascendant longitude when houses are known and valid.
    pub fn ascendant(&self) -> Option<f64> {
        self.houses
            .map(|h| h.ascendant)
            .filter(|a| is_valid_longitude(*a))
    }

    /// Ascendant rashi index.
    pub fn ascendant_rashi(&self) -> Option<u8> {
        self.ascendant().map(|a| rashi_from_longitude(a).rashi_index)
    }

    /// House of a graha, None when either its position or the houses are missing.
    pub fn house_of_graha(&self, graha: Graha) -> Option<u8> {
        let lon = self.positions.longitude(graha)?;
        self.houses.as_ref()?.house_of(lon)
    }

    /// Rashi index occupied by a graha.
    pub fn rashi_of(&self, graha: Graha) -> Option<u8> {
        self.positions
            .longitude(graha)
            .map(|lon| rashi_from_longitude(lon).rashi_index)
    }

    /// Derived divisional chart.
    pub fn divisional(&self, amsha: Amsha) -> DivisionalChart {
        DivisionalChart::from_snapshot(self, amsha)
    }
}

/// Longitudes remapped by `lon * D mod 360`. Houses are whole-sign from
/// the remapped ascendant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivisionalChart {
    pub amsha: Amsha,
    pub longitudes: BTreeMap<Graha, f64>,
    pub ascendant: Option<f64>,
}

impl DivisionalChart {
    pub fn from_snapshot(snapshot: &ChartSnapshot, amsha: Amsha) -> Self {
        let longitudes = snapshot
            .positions
            .iter()
            .filter(|(_, p)| is_valid_longitude(p.longitude))
            .map(|(g, p)| (g, amsha_longitude(p.longitude, amsha)))
            .collect();
        Self {
            amsha,
            longitudes,
            ascendant: snapshot.ascendant().map(|a| amsha_longitude(a, amsha)),
        }
    }

    pub fn longitude(&self, graha: Graha) -> Option<f64> {
        self.longitudes.get(&graha).copied()
    }

    /// Whole-sign house of a graha in this chart.
    pub fn house_of(&self, graha: Graha) -> Option<u8> {
        whole_sign_house(self.longitude(graha)?, self.ascendant?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> ChartSnapshot {
        let positions: PlanetaryPositions = [
            (Graha::Surya, PlanetPosition::at_longitude(45.0)),
            (Graha::Chandra, PlanetPosition::at_longitude(f64::NAN)),
        ]
        .into_iter()
        .collect();
        let cusps = std::array::from_fn(|i| 30.0 * i as f64 + 10.0);
        ChartSnapshot::new(
            2_451_545.0,
            positions,
            Some(HouseCusps {
                cusps,
                ascendant: 10.0,
                midheaven: 280.0,
            }),
        )
    }

    #[test]
    fn invalid_longitude_hidden() {
        let s = snapshot();
        assert_eq!(s.positions.longitude(Graha::Surya), Some(45.0));
        assert_eq!(s.positions.longitude(Graha::Chandra), None);
        assert_eq!(s.positions.longitude(Graha::Guru), None);
    }

    #[test]
    fn house_from_cusps() {
        let s = snapshot();
        assert_eq!(s.house_of_graha(Graha::Surya), Some(2));
        assert_eq!(s.ascendant_rashi(), Some(0));
    }

    #[test]
    fn navamsha_remaps_positions_and_ascendant() {
        let d9 = snapshot().divisional(Amsha::D9);
        assert!((d9.longitude(Graha::Surya).unwrap() - 45.0).abs() < 1e-9);
        assert!((d9.ascendant.unwrap() - 90.0).abs() < 1e-9);
        assert_eq!(d9.longitude(Graha::Chandra), None);
        // Sun at 45 (Taurus) vs ascendant 90 (Cancer)
        assert_eq!(d9.house_of(Graha::Surya), Some(11));
    }

    #[test]
    fn position_validity() {
        assert!(PlanetPosition::at_longitude(359.9).is_valid());
        assert!(!PlanetPosition::at_longitude(360.0).is_valid());
        let mut p = PlanetPosition::at_longitude(10.0);
        p.latitude = 91.0;
        assert!(!p.is_valid());
    }
}
