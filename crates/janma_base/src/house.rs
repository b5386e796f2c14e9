//! Bhava (house) placement.
//!
//! Houses are resolved against the twelve cusps supplied by the chart
//! collaborator. When cusps are unusable, whole-sign houses counted from
//! the ascendant's rashi are used instead.

use serde::{Deserialize, Serialize};

use crate::util::{forward_distance, is_valid_longitude};

/// Classical grouping of a house number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HouseClass {
    /// 1, 4, 7, 10
    Kendra,
    /// 5, 9
    Trikona,
    /// 3, 6, 11
    Upachaya,
    /// 8, 12
    Dusthana,
    /// 2
    Maraka,
}

impl HouseClass {
    /// Placement strength in [0, 1].
    pub const fn score(self) -> f64 {
        match self {
            Self::Kendra => 1.0,
            Self::Trikona => 0.9,
            Self::Upachaya => 0.6,
            Self::Maraka => 0.5,
            Self::Dusthana => 0.2,
        }
    }
}

/// Classify a 1-based house number. Out of range numbers are Dusthana.
pub const fn house_class(house: u8) -> HouseClass {
    match house {
        1 | 4 | 7 | 10 => HouseClass::Kendra,
        5 | 9 => HouseClass::Trikona,
        3 | 6 | 11 => HouseClass::Upachaya,
        2 => HouseClass::Maraka,
        _ => HouseClass::Dusthana,
    }
}

/// House (1..=12) containing `lon` for the given cusps.
///
/// Returns None when any cusp or the longitude is unusable.
pub fn house_of(lon: f64, cusps: &[f64; 12]) -> Option<u8> {
    if !is_valid_longitude(lon) || !cusps.iter().all(|c| is_valid_longitude(*c)) {
        return None;
    }
    for i in 0..12 {
        let start = cusps[i];
        let end = cusps[(i + 1) % 12];
        let span = forward_distance(start, end);
        if span > 0.0 && forward_distance(start, lon) < span {
            return Some(i as u8 + 1);
        }
    }
    None
}

/// Whole-sign house of `lon` counted from the ascendant's rashi.
pub fn whole_sign_house(lon: f64, ascendant: f64) -> Option<u8> {
    if !lon.is_finite() || !ascendant.is_finite() {
        return None;
    }
    let asc_rashi = (crate::util::normalize_360(ascendant) / 30.0).floor() as i16;
    let rashi = (crate::util::normalize_360(lon) / 30.0).floor() as i16;
    Some(((rashi - asc_rashi).rem_euclid(12) + 1) as u8)
}

/// Rashi index (0-based) on the cusp of `house` under whole-sign houses.
pub fn whole_sign_house_rashi(ascendant: f64, house: u8) -> u8 {
    let asc_rashi = (crate::util::normalize_360(ascendant) / 30.0).floor() as u8;
    crate::graha::nth_rashi_from(asc_rashi.min(11), house.clamp(1, 12))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn equal_cusps(asc: f64) -> [f64; 12] {
        std::array::from_fn(|i| crate::util::normalize_360(asc + 30.0 * i as f64))
    }

    #[test]
    fn first_house_starts_at_ascendant() {
        let cusps = equal_cusps(100.0);
        assert_eq!(house_of(100.0, &cusps), Some(1));
        assert_eq!(house_of(129.9, &cusps), Some(1));
        assert_eq!(house_of(130.0, &cusps), Some(2));
    }

    #[test]
    fn house_wraps_through_zero() {
        let cusps = equal_cusps(350.0);
        assert_eq!(house_of(5.0, &cusps), Some(1));
        assert_eq!(house_of(345.0, &cusps), Some(12));
    }

    #[test]
    fn bad_cusps_yield_none() {
        let mut cusps = equal_cusps(0.0);
        cusps[3] = f64::NAN;
        assert_eq!(house_of(10.0, &cusps), None);
    }

    #[test]
    fn whole_sign_counts_signs() {
        assert_eq!(whole_sign_house(15.0, 29.0), Some(1));
        assert_eq!(whole_sign_house(35.0, 29.0), Some(2));
        assert_eq!(whole_sign_house(5.0, 340.0), Some(2));
    }

    #[test]
    fn whole_sign_house_rashi_tenth() {
        // Aries rising: 10th house is Capricorn
        assert_eq!(whole_sign_house_rashi(10.0, 10), 9);
    }

    #[test]
    fn classes() {
        assert_eq!(house_class(10), HouseClass::Kendra);
        assert_eq!(house_class(9), HouseClass::Trikona);
        assert_eq!(house_class(12), HouseClass::Dusthana);
    }
}
