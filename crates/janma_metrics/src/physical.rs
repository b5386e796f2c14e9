//! Physical-trait correlation.
//!
//! Free-text descriptors are matched against fixed phrase tables per
//! element and per graha. The chart side supplies a physical element
//! profile (ascendant, its lord and the Moon) and the prominence of each
//! graha relative to the first house.

use std::collections::BTreeMap;

use janma_base::{
    ALL_GRAHAS, ALL_TATTWAS, Graha, Tattwa, rashi_from_longitude, rashi_lord_by_index,
    rashi_tattwa,
};
use serde::Serialize;

use crate::birth::PhysicalTraits;
use crate::calculator::{MetricCalculator, MetricContext};
use crate::chart::ChartSnapshot;
use crate::elemental::analyze_tattwa;
use crate::score::{MetricName, MetricOutcome, MetricScore, weighted_mean};

pub const ELEMENT_WEIGHT: f64 = 0.5;
pub const PLANET_WEIGHT: f64 = 0.35;
pub const PERIOD_LORD_WEIGHT: f64 = 0.15;

const fn element_phrases(t: Tattwa) -> &'static [&'static str] {
    match t {
        Tattwa::Fire => &[
            "medium height", "athletic", "muscular", "reddish", "ruddy", "sharp",
            "piercing", "bald", "warm", "angular",
        ],
        Tattwa::Earth => &[
            "short", "stocky", "sturdy", "heavy", "dark", "thick", "broad", "solid",
            "square", "large bones",
        ],
        Tattwa::Air => &[
            "tall", "thin", "slim", "lean", "dry", "wiry", "restless", "veins",
            "long limbs", "curly",
        ],
        Tattwa::Water => &[
            "round", "soft", "plump", "pale", "large eyes", "smooth", "moist", "wavy",
            "full lips", "fleshy",
        ],
        Tattwa::Ether => &[
            "large head", "broad forehead", "expansive", "dignified", "well proportioned",
            "calm", "graceful",
        ],
    }
}

const fn planet_phrases(g: Graha) -> &'static [&'static str] {
    match g {
        Graha::Surya => &["square", "bald", "reddish", "strong bones", "golden", "commanding"],
        Graha::Chandra => &["round", "fair", "soft", "large eyes", "pale", "plump"],
        Graha::Mangal => &["athletic", "muscular", "reddish", "scar", "sharp", "medium height"],
        Graha::Buddh => &["youthful", "slim", "expressive", "green", "quick"],
        Graha::Guru => &["heavy", "large", "fleshy", "broad", "golden", "dignified"],
        Graha::Shukra => &["attractive", "beautiful", "curly", "full lips", "well proportioned", "graceful"],
        Graha::Shani => &["tall", "thin", "dark", "lean", "veins", "long limbs"],
        Graha::Rahu => &["tall", "dark", "smoky", "unusual"],
        Graha::Ketu => &["scar", "thin", "angular", "piercing"],
    }
}

/// Lowercase alphanumeric words; punctuation and hyphens separate.
fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// True when the phrase occurs as a run of whole words.
fn contains_phrase(words_in_text: &[String], phrase: &str) -> bool {
    let needle = words(phrase);
    !needle.is_empty() && words_in_text.windows(needle.len()).any(|w| w == needle.as_slice())
}

/// Fraction of a phrase table found in the text.
fn match_fraction(phrases: &[&str], text: &[String]) -> f64 {
    if phrases.is_empty() {
        return 0.0;
    }
    phrases.iter().filter(|p| contains_phrase(text, p)).count() as f64 / phrases.len() as f64
}

/// Share of matched evidence that the chart's profile supports.
fn concentration(pairs: impl Iterator<Item = (f64, f64)>) -> Option<f64> {
    let (num, den) = pairs.fold((0.0, 0.0), |(n, d), (w, m)| (n + w * m, d + m));
    (den > 0.0).then(|| (num / den).clamp(0.0, 1.0))
}

/// Element profile from the ascendant (0.5), its lord (0.3) and the Moon
/// (0.2); the full element distribution when no ascendant is known.
pub fn physical_element_profile(chart: &ChartSnapshot) -> Option<[f64; 5]> {
    if let Some(asc) = chart.ascendant() {
        let asc_rashi = rashi_from_longitude(asc).rashi_index;
        let lord_rashi = rashi_lord_by_index(asc_rashi).and_then(|l| chart.rashi_of(l));
        let moon_rashi = chart.rashi_of(Graha::Chandra);
        let mut profile = [0.0; 5];
        let mut total = 0.0;
        for (rashi, w) in [(Some(asc_rashi), 0.5), (lord_rashi, 0.3), (moon_rashi, 0.2)] {
            if let Some(r) = rashi {
                profile[rashi_tattwa(r).index()] += w;
                total += w;
            }
        }
        for p in &mut profile {
            *p /= total;
        }
        return Some(profile);
    }
    analyze_tattwa(&chart.positions, None).map(|a| a.distribution())
}

/// 1.0 in the first house or ruling the ascendant, 0.5 in the seventh.
pub fn prominence(graha: Graha, chart: &ChartSnapshot) -> f64 {
    let asc_lord = chart.ascendant_rashi().and_then(rashi_lord_by_index);
    match chart.house_of_graha(graha) {
        _ if asc_lord == Some(graha) => 1.0,
        Some(1) => 1.0,
        Some(7) => 0.5,
        _ => 0.2,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhysicalCorrelation {
    pub fields: Vec<&'static str>,
    pub element_matches: BTreeMap<Tattwa, f64>,
    pub planet_matches: BTreeMap<Graha, f64>,
    pub element_correlation: Option<f64>,
    pub planet_correlation: Option<f64>,
    pub period_lord: Option<Graha>,
    pub period_lord_correlation: Option<f64>,
    pub score: f64,
}

/// Correlate descriptors with the chart. `period_lord` is the mahadasha
/// lord at birth when a dasha timeline exists.
pub fn physical_correlation(
    traits: &PhysicalTraits,
    chart: &ChartSnapshot,
    period_lord: Option<Graha>,
) -> Option<PhysicalCorrelation> {
    let descriptors = traits.descriptors();
    if descriptors.is_empty() {
        return None;
    }
    let text = words(
        &descriptors
            .iter()
            .map(|(_, v)| v.as_str())
            .collect::<Vec<_>>()
            .join(" "),
    );

    let element_matches: BTreeMap<Tattwa, f64> = ALL_TATTWAS
        .into_iter()
        .map(|t| (t, match_fraction(element_phrases(t), &text)))
        .collect();
    let planet_matches: BTreeMap<Graha, f64> = ALL_GRAHAS
        .into_iter()
        .map(|g| (g, match_fraction(planet_phrases(g), &text)))
        .collect();

    let element_correlation = physical_element_profile(chart).map(|profile| {
        concentration(element_matches.iter().map(|(t, m)| (profile[t.index()], *m)))
            .unwrap_or(0.0)
    });
    let planet_correlation = concentration(
        planet_matches
            .iter()
            .map(|(g, m)| (prominence(*g, chart), *m)),
    )
    .or(Some(0.0));
    let period_lord_correlation = period_lord.map(|g| planet_matches[&g]);

    let score = weighted_mean(&[
        (ELEMENT_WEIGHT, element_correlation),
        (PLANET_WEIGHT, planet_correlation),
        (PERIOD_LORD_WEIGHT, period_lord_correlation),
    ])
    .unwrap_or(0.0);

    let mut fields: Vec<&'static str> = descriptors.iter().map(|(f, _)| *f).collect();
    fields.dedup();

    Some(PhysicalCorrelation {
        fields,
        element_matches,
        planet_matches,
        element_correlation,
        planet_correlation,
        period_lord,
        period_lord_correlation,
        score,
    })
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PhysicalCorrelationCalculator;

impl MetricCalculator for PhysicalCorrelationCalculator {
    fn name(&self) -> MetricName {
        MetricName::PhysicalCorrelation
    }

    fn compute(&self, ctx: &MetricContext<'_>) -> MetricOutcome {
        let Some(traits) = ctx.birth.traits() else {
            return MetricOutcome::unavailable("no physical trait data");
        };
        let period_lord = ctx
            .dasha()
            .and_then(|h| h.levels.first())
            .and_then(|l0| l0.first())
            .map(|p| p.graha);
        let Some(pc) = physical_correlation(traits, ctx.chart, period_lord) else {
            return MetricOutcome::unavailable("physical trait descriptors are blank");
        };

        let mut score = MetricScore::new(pc.score)
            .with_factor(format!("traits compared: {}", pc.fields.join(", ")));
        if let Some(v) = pc.element_correlation {
            score = score.with_sub_score("element", v);
        }
        if let Some(v) = pc.planet_correlation {
            score = score.with_sub_score("planet", v);
        }
        if let Some(v) = pc.period_lord_correlation {
            score = score.with_sub_score("period_lord", v);
        }
        MetricOutcome::Scored(score.with_detail(&pc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{HouseCusps, PlanetPosition, PlanetaryPositions};

    fn chart(asc: Option<f64>) -> ChartSnapshot {
        let positions: PlanetaryPositions = [
            (Graha::Surya, 15.0),   // Aries
            (Graha::Chandra, 130.0), // Leo
            (Graha::Mangal, 5.0),    // Aries
            (Graha::Shani, 200.0),   // Libra
        ]
        .into_iter()
        .map(|(g, l)| (g, PlanetPosition::at_longitude(l)))
        .collect();
        let houses = asc.map(|a| HouseCusps {
            cusps: std::array::from_fn(|i| janma_base::normalize_360(a + 30.0 * i as f64)),
            ascendant: a,
            midheaven: janma_base::normalize_360(a + 270.0),
        });
        ChartSnapshot::new(2_451_545.0, positions, houses)
    }

    fn fiery() -> PhysicalTraits {
        PhysicalTraits {
            build: Some("Athletic, muscular".into()),
            complexion: Some("reddish".into()),
            ..Default::default()
        }
    }

    #[test]
    fn fire_rising_matches_fiery_traits() {
        let pc = physical_correlation(&fiery(), &chart(Some(2.0)), None).unwrap();
        // Aries rising, Mars in Aries, Moon in Leo: all fire
        assert!((pc.element_correlation.unwrap() - 1.0).abs() < 1e-12);
        // Mars rules and occupies the first house
        assert!(pc.planet_correlation.unwrap() > 0.5);
        assert!(pc.score > 0.5);
    }

    #[test]
    fn watery_traits_on_fire_chart_score_low() {
        let watery = PhysicalTraits {
            face: Some("round and soft, pale".into()),
            ..Default::default()
        };
        let fire = physical_correlation(&fiery(), &chart(Some(2.0)), None).unwrap();
        let water = physical_correlation(&watery, &chart(Some(2.0)), None).unwrap();
        assert!(water.score < fire.score);
    }

    #[test]
    fn missing_fields_still_correlate() {
        let only_height = PhysicalTraits {
            height: Some("tall".into()),
            ..Default::default()
        };
        let pc = physical_correlation(&only_height, &chart(None), Some(Graha::Shani)).unwrap();
        assert_eq!(pc.fields, vec!["height"]);
        assert!(pc.period_lord_correlation.unwrap() > 0.0);
        assert!((0.0..=1.0).contains(&pc.score));
    }

    #[test]
    fn phrases_match_whole_words_only() {
        let text = words("Shortly after birth, stall-fed; well-proportioned frame");
        assert!(!contains_phrase(&text, "short"));
        assert!(!contains_phrase(&text, "tall"));
        assert!(contains_phrase(&text, "well proportioned"));
        assert!(contains_phrase(&words("short and TALL"), "tall"));

        let decoy = PhysicalTraits {
            other: vec!["shortly, a stall".into()],
            ..Default::default()
        };
        let pc = physical_correlation(&decoy, &chart(Some(2.0)), None).unwrap();
        assert!(pc.element_matches.values().all(|m| *m == 0.0));
        assert!(pc.planet_matches.values().all(|m| *m == 0.0));
    }

    #[test]
    fn blank_traits_are_none() {
        assert!(physical_correlation(&PhysicalTraits::default(), &chart(None), None).is_none());
    }

    #[test]
    fn profile_without_ascendant_uses_distribution() {
        let p = physical_element_profile(&chart(None)).unwrap();
        assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }
}
