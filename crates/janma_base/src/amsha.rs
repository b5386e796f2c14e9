//! Amsha (divisional chart) factors.
//!
//! A divisional chart Dn remaps every longitude by `lon * n mod 360`, which
//! splits each 30-degree rashi into n equal parts and carries each part into
//! a fresh rashi in sequence.

use serde::{Deserialize, Serialize};

use crate::util::normalize_360;

/// Divisional charts used by the scorers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Amsha {
    D1,
    D2,
    D3,
    D4,
    D7,
    D9,
    D10,
    D12,
    D16,
    D20,
    D24,
    D30,
    D60,
}

/// All supported amshas in order.
pub const ALL_AMSHAS: [Amsha; 13] = [
    Amsha::D1,
    Amsha::D2,
    Amsha::D3,
    Amsha::D4,
    Amsha::D7,
    Amsha::D9,
    Amsha::D10,
    Amsha::D12,
    Amsha::D16,
    Amsha::D20,
    Amsha::D24,
    Amsha::D30,
    Amsha::D60,
];

impl Amsha {
    /// Division factor n.
    pub const fn divisions(self) -> u16 {
        match self {
            Self::D1 => 1,
            Self::D2 => 2,
            Self::D3 => 3,
            Self::D4 => 4,
            Self::D7 => 7,
            Self::D9 => 9,
            Self::D10 => 10,
            Self::D12 => 12,
            Self::D16 => 16,
            Self::D20 => 20,
            Self::D24 => 24,
            Self::D30 => 30,
            Self::D60 => 60,
        }
    }

    /// Short code, e.g. "D9".
    pub const fn code(self) -> &'static str {
        match self {
            Self::D1 => "D1",
            Self::D2 => "D2",
            Self::D3 => "D3",
            Self::D4 => "D4",
            Self::D7 => "D7",
            Self::D9 => "D9",
            Self::D10 => "D10",
            Self::D12 => "D12",
            Self::D16 => "D16",
            Self::D20 => "D20",
            Self::D24 => "D24",
            Self::D30 => "D30",
            Self::D60 => "D60",
        }
    }

    /// Traditional name of the varga.
    pub const fn name(self) -> &'static str {
        match self {
            Self::D1 => "Rashi",
            Self::D2 => "Hora",
            Self::D3 => "Drekkana",
            Self::D4 => "Chaturthamsha",
            Self::D7 => "Saptamsha",
            Self::D9 => "Navamsha",
            Self::D10 => "Dashamsha",
            Self::D12 => "Dwadashamsha",
            Self::D16 => "Shodashamsha",
            Self::D20 => "Vimshamsha",
            Self::D24 => "Chaturvimshamsha",
            Self::D30 => "Trimshamsha",
            Self::D60 => "Shashtiamsha",
        }
    }

    /// Lookup by division factor.
    pub fn from_divisions(n: u16) -> Option<Self> {
        ALL_AMSHAS.into_iter().find(|a| a.divisions() == n)
    }
}

impl std::fmt::Display for Amsha {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Longitude in the divisional chart with factor `divisions`.
pub fn divisional_longitude(sidereal_lon: f64, divisions: u16) -> f64 {
    normalize_360(normalize_360(sidereal_lon) * divisions as f64)
}

/// Longitude in the given amsha.
pub fn amsha_longitude(sidereal_lon: f64, amsha: Amsha) -> f64 {
    divisional_longitude(sidereal_lon, amsha.divisions())
}

/// True when a longitude falls in the same rashi in D1 and D9.
pub fn is_vargottama(sidereal_lon: f64) -> bool {
    let d1 = (normalize_360(sidereal_lon) / 30.0).floor() as u8;
    let d9 = (amsha_longitude(sidereal_lon, Amsha::D9) / 30.0).floor() as u8;
    d1.min(11) == d9.min(11)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn d1_identity() {
        assert!((amsha_longitude(123.4, Amsha::D1) - 123.4).abs() < 1e-10);
    }

    #[test]
    fn d9_first_navamsha_of_aries() {
        // 0..3°20' of Aries maps to Aries in D9
        assert!(amsha_longitude(1.0, Amsha::D9) < 30.0);
    }

    #[test]
    fn d9_wraps() {
        // 45 deg * 9 = 405 -> 45
        assert!((amsha_longitude(45.0, Amsha::D9) - 45.0).abs() < 1e-9);
    }

    #[test]
    fn from_divisions_roundtrip() {
        for a in ALL_AMSHAS {
            assert_eq!(Amsha::from_divisions(a.divisions()), Some(a));
        }
        assert_eq!(Amsha::from_divisions(5), None);
    }

    #[test]
    fn vargottama_start_of_aries() {
        assert!(is_vargottama(1.0));
        assert!(!is_vargottama(5.0));
    }
}
