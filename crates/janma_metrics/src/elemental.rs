//! Elemental balance (tattwa) calculator.
//!
//! Each graha sends most of its significance weight to the element of the
//! rashi it occupies and the rest to its own natural element, which is how
//! akasha (ether) enters a chart. The ascendant counts with full weight for
//! its rashi element.

use std::collections::BTreeMap;

use janma_base::{
    ALL_GRAHAS, ALL_TATTWAS, Graha, Tattwa, graha_tattwa, rashi_from_longitude, rashi_tattwa,
    tattwa_relation,
};
use janma_base::util::is_valid_longitude;
use serde::Serialize;

use crate::calculator::{MetricCalculator, MetricContext};
use crate::chart::PlanetaryPositions;
use crate::score::{MetricName, MetricOutcome, MetricScore};

/// Share of a graha's weight given to its rashi element.
pub const SIGN_SHARE: f64 = 0.8;

/// Ideal distribution: the four sign elements equally, ether less.
pub const IDEAL_DISTRIBUTION: [f64; 5] = [0.22, 0.22, 0.22, 0.22, 0.12];

pub const ASCENDANT_WEIGHT: f64 = 1.0;

/// Significance weight of a graha.
pub const fn planet_weight(graha: Graha) -> f64 {
    match graha {
        Graha::Surya | Graha::Chandra => 1.0,
        Graha::Guru => 0.9,
        Graha::Mangal | Graha::Shukra | Graha::Shani => 0.8,
        Graha::Buddh => 0.7,
        Graha::Rahu | Graha::Ketu => 0.5,
    }
}

/// One element's share and who put it there.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ElementShare {
    /// Normalized share in [0, 1].
    pub score: f64,
    /// Contributor name to raw weight.
    pub contributors: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TattwaAnalysis {
    pub elements: BTreeMap<Tattwa, ElementShare>,
    pub balance_score: f64,
    pub elemental_harmony: f64,
    pub dominant: Tattwa,
    /// Bodies skipped for unusable longitudes.
    pub skipped: Vec<String>,
}

impl TattwaAnalysis {
    /// Shares indexed by `Tattwa::index`.
    pub fn distribution(&self) -> [f64; 5] {
        let mut d = [0.0; 5];
        for (t, share) in &self.elements {
            d[t.index()] = share.score;
        }
        d
    }

    pub fn score(&self) -> f64 {
        0.5 * self.balance_score + 0.5 * self.elemental_harmony
    }
}

/// Distance of a distribution from the ideal, as 1 - sqrt(var / max_var).
pub fn balance_score(distribution: &[f64; 5]) -> f64 {
    let var: f64 = distribution
        .iter()
        .zip(IDEAL_DISTRIBUTION)
        .map(|(p, q)| (p - q).powi(2))
        .sum();
    // worst case is everything in the rarest element
    let max_var = (0..5)
        .map(|k| {
            IDEAL_DISTRIBUTION
                .iter()
                .enumerate()
                .map(|(i, q)| if i == k { (1.0 - q).powi(2) } else { q * q })
                .sum::<f64>()
        })
        .fold(0.0, f64::max);
    (1.0 - (var / max_var).sqrt()).clamp(0.0, 1.0)
}

/// Pairwise compatibility of the present elements weighted by share product.
///
/// A single-element chart has no inimical pair and scores 1.
pub fn elemental_harmony(distribution: &[f64; 5]) -> f64 {
    let mut num = 0.0;
    let mut den = 0.0;
    for i in 0..5 {
        for j in (i + 1)..5 {
            let w = distribution[i] * distribution[j];
            num += w * tattwa_relation(ALL_TATTWAS[i], ALL_TATTWAS[j]).value();
            den += w;
        }
    }
    if den > 0.0 { num / den } else { 1.0 }
}

/// Element distribution of a chart. None when no body has a usable longitude.
pub fn analyze_tattwa(
    positions: &PlanetaryPositions,
    ascendant: Option<f64>,
) -> Option<TattwaAnalysis> {
    let mut raw: BTreeMap<Tattwa, ElementShare> = ALL_TATTWAS
        .into_iter()
        .map(|t| (t, ElementShare::default()))
        .collect();
    let mut skipped = Vec::new();
    let mut total = 0.0;

    let mut add = |t: Tattwa, who: &str, w: f64, total: &mut f64| {
        if let Some(share) = raw.get_mut(&t) {
            share.score += w;
            *share.contributors.entry(who.to_string()).or_insert(0.0) += w;
        }
        *total += w;
    };

    for graha in ALL_GRAHAS {
        let Some(pos) = positions.get(graha) else {
            continue;
        };
        if !is_valid_longitude(pos.longitude) {
            skipped.push(graha.english_name().to_string());
            continue;
        }
        let w = planet_weight(graha);
        let sign = rashi_tattwa(rashi_from_longitude(pos.longitude).rashi_index);
        add(sign, graha.english_name(), w * SIGN_SHARE, &mut total);
        add(graha_tattwa(graha), graha.english_name(), w * (1.0 - SIGN_SHARE), &mut total);
    }
    match ascendant {
        Some(asc) if is_valid_longitude(asc) => {
            let sign = rashi_tattwa(rashi_from_longitude(asc).rashi_index);
            add(sign, "Ascendant", ASCENDANT_WEIGHT, &mut total);
        }
        Some(_) => skipped.push("Ascendant".to_string()),
        None => {}
    }

    if total <= 0.0 {
        return None;
    }
    for share in raw.values_mut() {
        share.score /= total;
    }

    let mut distribution = [0.0; 5];
    for (t, share) in &raw {
        distribution[t.index()] = share.score;
    }
    let dominant = ALL_TATTWAS
        .into_iter()
        .fold(Tattwa::Fire, |best, t| {
            if distribution[t.index()] > distribution[best.index()] {
                t
            } else {
                best
            }
        });

    Some(TattwaAnalysis {
        elements: raw,
        balance_score: balance_score(&distribution),
        elemental_harmony: elemental_harmony(&distribution),
        dominant,
        skipped,
    })
}

/// Scores elemental balance and harmony.
#[derive(Debug, Default, Clone, Copy)]
pub struct ElementalBalanceCalculator;

impl MetricCalculator for ElementalBalanceCalculator {
    fn name(&self) -> MetricName {
        MetricName::ElementalBalance
    }

    fn compute(&self, ctx: &MetricContext<'_>) -> MetricOutcome {
        let Some(analysis) = analyze_tattwa(&ctx.chart.positions, ctx.chart.ascendant()) else {
            return MetricOutcome::unavailable("no usable planetary longitude");
        };
        let score = MetricScore::new(analysis.score())
            .with_sub_score("balance", analysis.balance_score)
            .with_sub_score("harmony", analysis.elemental_harmony)
            .with_factor(format!(
                "{} is the dominant element ({:.0}%)",
                analysis.dominant,
                analysis.distribution()[analysis.dominant.index()] * 100.0
            ))
            .with_factors(
                analysis
                    .skipped
                    .iter()
                    .map(|b| format!("{b} ignored: unusable longitude")),
            )
            .with_detail(&analysis);
        MetricOutcome::Scored(score)
    }
}
