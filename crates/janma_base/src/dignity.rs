//! Graha dignity and natural relationships.
//!
//! Exaltation/debilitation points, moolatrikona ranges, own signs and the
//! natural (naisargika) friendship table from BPHS. Rahu and Ketu have no
//! universally agreed dignity and are always treated as neutral here.

use serde::{Deserialize, Serialize};

use crate::graha::{Graha, rashi_lord_by_index};
use crate::rashi::rashi_from_longitude;
use crate::util::{angular_distance, normalize_360};

/// Exaltation degree (sidereal). None for Rahu/Ketu.
pub const fn exaltation_degree(graha: Graha) -> Option<f64> {
    match graha {
        Graha::Surya => Some(10.0),   // 10 Aries
        Graha::Chandra => Some(33.0), // 3 Taurus
        Graha::Mangal => Some(298.0), // 28 Capricorn
        Graha::Buddh => Some(165.0),  // 15 Virgo
        Graha::Guru => Some(95.0),    // 5 Cancer
        Graha::Shukra => Some(357.0), // 27 Pisces
        Graha::Shani => Some(200.0),  // 20 Libra
        Graha::Rahu | Graha::Ketu => None,
    }
}

/// Debilitation degree, opposite the exaltation point.
pub fn debilitation_degree(graha: Graha) -> Option<f64> {
    exaltation_degree(graha).map(|e| normalize_360(e + 180.0))
}

/// Moolatrikona as (rashi_index, start_deg, end_deg) within the rashi.
pub const fn moolatrikone_range(graha: Graha) -> Option<(u8, f64, f64)> {
    match graha {
        Graha::Surya => Some((4, 0.0, 20.0)),
        Graha::Chandra => Some((1, 4.0, 20.0)),
        Graha::Mangal => Some((0, 0.0, 12.0)),
        Graha::Buddh => Some((5, 16.0, 20.0)),
        Graha::Guru => Some((8, 0.0, 10.0)),
        Graha::Shukra => Some((6, 0.0, 15.0)),
        Graha::Shani => Some((10, 0.0, 20.0)),
        Graha::Rahu | Graha::Ketu => None,
    }
}

/// Own-sign rashi indices. Empty for Rahu/Ketu.
pub fn own_signs(graha: Graha) -> &'static [u8] {
    match graha {
        Graha::Surya => &[4],
        Graha::Chandra => &[3],
        Graha::Mangal => &[0, 7],
        Graha::Buddh => &[2, 5],
        Graha::Guru => &[8, 11],
        Graha::Shukra => &[1, 6],
        Graha::Shani => &[9, 10],
        Graha::Rahu | Graha::Ketu => &[],
    }
}

/// Natural relationship between two grahas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NaisargikaMaitri {
    Friend,
    Neutral,
    Enemy,
}

impl NaisargikaMaitri {
    /// Harmony value: friend 1.0, neutral 0.5, enemy 0.0.
    pub const fn value(self) -> f64 {
        match self {
            Self::Friend => 1.0,
            Self::Neutral => 0.5,
            Self::Enemy => 0.0,
        }
    }
}

/// Natural friendship of `graha` towards `other` (BPHS table).
///
/// The table is not symmetric: the Moon has no enemies while Mercury
/// counts the Moon as one. Pairs involving a node are neutral, and a
/// graha is its own friend.
pub const fn naisargika_maitri(graha: Graha, other: Graha) -> NaisargikaMaitri {
    use Graha::*;
    use NaisargikaMaitri::*;

    if graha as u8 == other as u8 {
        return Friend;
    }
    match (graha, other) {
        (Rahu | Ketu, _) | (_, Rahu | Ketu) => Neutral,

        (Surya, Chandra | Mangal | Guru) => Friend,
        (Surya, Shukra | Shani) => Enemy,

        (Chandra, Surya | Buddh) => Friend,

        (Mangal, Surya | Chandra | Guru) => Friend,
        (Mangal, Buddh) => Enemy,

        (Buddh, Surya | Shukra) => Friend,
        (Buddh, Chandra) => Enemy,

        (Guru, Surya | Chandra | Mangal) => Friend,
        (Guru, Buddh | Shukra) => Enemy,

        (Shukra, Buddh | Shani) => Friend,
        (Shukra, Surya | Chandra) => Enemy,

        (Shani, Buddh | Shukra) => Friend,
        (Shani, Surya | Chandra | Mangal) => Enemy,

        _ => Neutral,
    }
}

/// Dignity of a graha in a rashi, naisargika relationships only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dignity {
    Exalted,
    Moolatrikone,
    OwnSign,
    Friend,
    Neutral,
    Enemy,
    Debilitated,
}

impl Dignity {
    /// Positional strength in [0, 1].
    pub const fn score(self) -> f64 {
        match self {
            Self::Exalted => 1.0,
            Self::Moolatrikone => 0.9,
            Self::OwnSign => 0.8,
            Self::Friend => 0.65,
            Self::Neutral => 0.5,
            Self::Enemy => 0.35,
            Self::Debilitated => 0.1,
        }
    }
}

/// Dignity of `graha` at a sidereal longitude.
///
/// Priority: exaltation > debilitation > moolatrikona > own sign >
/// naisargika friendship with the rashi lord.
pub fn dignity_at(graha: Graha, sidereal_lon: f64) -> Dignity {
    if graha.is_node() || !sidereal_lon.is_finite() {
        return Dignity::Neutral;
    }
    let info = rashi_from_longitude(sidereal_lon);
    let rashi = info.rashi_index;

    if exaltation_degree(graha).is_some_and(|e| (e / 30.0) as u8 == rashi) {
        return Dignity::Exalted;
    }
    if debilitation_degree(graha).is_some_and(|d| (d / 30.0) as u8 == rashi) {
        return Dignity::Debilitated;
    }
    if let Some((mt_rashi, start, end)) = moolatrikone_range(graha) {
        if mt_rashi == rashi && info.degrees_in_rashi >= start && info.degrees_in_rashi < end {
            return Dignity::Moolatrikone;
        }
    }
    if own_signs(graha).contains(&rashi) {
        return Dignity::OwnSign;
    }
    match rashi_lord_by_index(rashi).map(|lord| naisargika_maitri(graha, lord)) {
        Some(NaisargikaMaitri::Friend) => Dignity::Friend,
        Some(NaisargikaMaitri::Enemy) => Dignity::Enemy,
        _ => Dignity::Neutral,
    }
}

/// Uchcha (exaltation) proximity in [0, 1]: 1 at the exaltation point,
/// 0 at debilitation. Nodes and non-finite longitudes score 0.5.
pub fn uchcha_strength(graha: Graha, sidereal_lon: f64) -> f64 {
    match exaltation_degree(graha) {
        Some(e) if sidereal_lon.is_finite() => 1.0 - angular_distance(sidereal_lon, e) / 180.0,
        _ => 0.5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graha::SAPTA_GRAHAS;

    #[test]
    fn debilitation_opposite_exaltation() {
        assert!((debilitation_degree(Graha::Surya).unwrap() - 190.0).abs() < 1e-10);
        assert!((debilitation_degree(Graha::Shukra).unwrap() - 177.0).abs() < 1e-10);
        assert!(debilitation_degree(Graha::Rahu).is_none());
    }

    #[test]
    fn sun_exalted_in_aries() {
        assert_eq!(dignity_at(Graha::Surya, 15.0), Dignity::Exalted);
    }

    #[test]
    fn sun_debilitated_in_libra() {
        assert_eq!(dignity_at(Graha::Surya, 195.0), Dignity::Debilitated);
    }

    #[test]
    fn sun_moolatrikona_then_own_sign_in_leo() {
        assert_eq!(dignity_at(Graha::Surya, 125.0), Dignity::Moolatrikone);
        assert_eq!(dignity_at(Graha::Surya, 145.0), Dignity::OwnSign);
    }

    #[test]
    fn friendship_with_rashi_lord() {
        // Jupiter in Aries: lord Mars is a friend
        assert_eq!(dignity_at(Graha::Guru, 10.0), Dignity::Friend);
        // Jupiter in Gemini: lord Mercury is an enemy
        assert_eq!(dignity_at(Graha::Guru, 70.0), Dignity::Enemy);
    }

    #[test]
    fn nodes_and_nan_are_neutral() {
        assert_eq!(dignity_at(Graha::Rahu, 10.0), Dignity::Neutral);
        assert_eq!(dignity_at(Graha::Surya, f64::NAN), Dignity::Neutral);
    }

    #[test]
    fn uchcha_strength_extremes() {
        for g in SAPTA_GRAHAS {
            let e = exaltation_degree(g).unwrap();
            assert!((uchcha_strength(g, e) - 1.0).abs() < 1e-10);
            assert!(uchcha_strength(g, e + 180.0).abs() < 1e-10);
        }
    }

    #[test]
    fn moon_has_no_enemies() {
        for g in SAPTA_GRAHAS {
            assert_ne!(naisargika_maitri(Graha::Chandra, g), NaisargikaMaitri::Enemy);
        }
    }

    #[test]
    fn self_relation_is_friend() {
        assert_eq!(naisargika_maitri(Graha::Shani, Graha::Shani), NaisargikaMaitri::Friend);
    }

    #[test]
    fn dignity_scores_ordered() {
        assert!(Dignity::Exalted.score() > Dignity::OwnSign.score());
        assert!(Dignity::Enemy.score() > Dignity::Debilitated.score());
    }
}
