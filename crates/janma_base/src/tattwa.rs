//! Tattwa (five classical elements) classification.
//!
//! Rashis carry one of four elements by triplicity. The fifth element,
//! akasha (ether), has no sign of its own; it enters a chart only through
//! the natural element of a graha (Guru is the akasha graha).

use serde::{Deserialize, Serialize};

use crate::graha::Graha;

/// The five tattwas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tattwa {
    Fire,
    Earth,
    Air,
    Water,
    Ether,
}

/// All tattwas in order.
pub const ALL_TATTWAS: [Tattwa; 5] = [
    Tattwa::Fire,
    Tattwa::Earth,
    Tattwa::Air,
    Tattwa::Water,
    Tattwa::Ether,
];

impl Tattwa {
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Lower-case English key used in reports.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Fire => "fire",
            Self::Earth => "earth",
            Self::Air => "air",
            Self::Water => "water",
            Self::Ether => "ether",
        }
    }

    /// Sanskrit name.
    pub const fn sanskrit_name(self) -> &'static str {
        match self {
            Self::Fire => "Agni",
            Self::Earth => "Prithvi",
            Self::Air => "Vayu",
            Self::Water => "Jala",
            Self::Ether => "Akasha",
        }
    }
}

impl std::fmt::Display for Tattwa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Element of a rashi by 0-based index.
///
/// Fire: 0,4,8; Earth: 1,5,9; Air: 2,6,10; Water: 3,7,11.
pub const fn rashi_tattwa(rashi_index: u8) -> Tattwa {
    match rashi_index % 4 {
        0 => Tattwa::Fire,
        1 => Tattwa::Earth,
        2 => Tattwa::Air,
        _ => Tattwa::Water,
    }
}

/// Natural element of a graha.
pub const fn graha_tattwa(graha: Graha) -> Tattwa {
    match graha {
        Graha::Surya | Graha::Mangal | Graha::Ketu => Tattwa::Fire,
        Graha::Buddh => Tattwa::Earth,
        Graha::Shani | Graha::Rahu => Tattwa::Air,
        Graha::Chandra | Graha::Shukra => Tattwa::Water,
        Graha::Guru => Tattwa::Ether,
    }
}

/// Compatibility between two elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TattwaRelation {
    Friend,
    Neutral,
    Enemy,
}

impl TattwaRelation {
    /// Numeric harmony value: friend 1.0, neutral 0.5, enemy 0.0.
    pub const fn value(self) -> f64 {
        match self {
            Self::Friend => 1.0,
            Self::Neutral => 0.5,
            Self::Enemy => 0.0,
        }
    }
}

/// Fixed element relation table (symmetric).
///
/// Fire feeds on air and earth holds water; fire/water and earth/air
/// oppose. Ether supports every element.
pub const fn tattwa_relation(a: Tattwa, b: Tattwa) -> TattwaRelation {
    use Tattwa::*;
    use TattwaRelation::*;
    match (a, b) {
        (Fire, Fire) | (Earth, Earth) | (Air, Air) | (Water, Water) | (Ether, Ether) => Friend,
        (Ether, _) | (_, Ether) => Friend,
        (Fire, Air) | (Air, Fire) | (Earth, Water) | (Water, Earth) => Friend,
        (Fire, Water) | (Water, Fire) | (Earth, Air) | (Air, Earth) => Enemy,
        _ => Neutral,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triplicities() {
        assert_eq!(rashi_tattwa(0), Tattwa::Fire);
        assert_eq!(rashi_tattwa(5), Tattwa::Earth);
        assert_eq!(rashi_tattwa(10), Tattwa::Air);
        assert_eq!(rashi_tattwa(11), Tattwa::Water);
    }

    #[test]
    fn guru_is_the_only_ether_graha() {
        let ether: Vec<Graha> = crate::graha::ALL_GRAHAS
            .into_iter()
            .filter(|g| graha_tattwa(*g) == Tattwa::Ether)
            .collect();
        assert_eq!(ether, vec![Graha::Guru]);
    }

    #[test]
    fn relation_symmetric() {
        for a in ALL_TATTWAS {
            for b in ALL_TATTWAS {
                assert_eq!(tattwa_relation(a, b), tattwa_relation(b, a));
            }
        }
    }

    #[test]
    fn fire_air_friendly_fire_water_inimical() {
        assert_eq!(tattwa_relation(Tattwa::Fire, Tattwa::Air), TattwaRelation::Friend);
        assert_eq!(tattwa_relation(Tattwa::Fire, Tattwa::Water), TattwaRelation::Enemy);
        assert_eq!(tattwa_relation(Tattwa::Fire, Tattwa::Earth), TattwaRelation::Neutral);
    }
}
