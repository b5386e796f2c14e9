//! Relative planetary strength.
//!
//! Four positional components are averaged over whatever the chart
//! supports: dignity, exaltation proximity, house placement and the
//! graha's own ashtakavarga bindus. The D1 result is then blended with the
//! navamsha dignity.

use std::collections::BTreeMap;

use janma_base::{
    ALL_GRAHAS, Amsha, BinduChart, Dignity, Graha, SAPTA_GRAHAS, amsha_longitude, dignity_at,
    house_class, is_vargottama, uchcha_strength,
};
use serde::Serialize;

use crate::calculator::{MetricCalculator, MetricContext};
use crate::chart::ChartSnapshot;
use crate::score::{MetricName, MetricOutcome, MetricScore, weighted_mean};

pub const DIGNITY_WEIGHT: f64 = 0.35;
pub const UCHCHA_WEIGHT: f64 = 0.15;
pub const HOUSE_WEIGHT: f64 = 0.25;
pub const BINDU_WEIGHT: f64 = 0.25;

/// Share of the total taken by the navamsha.
pub const NAVAMSHA_SHARE: f64 = 0.2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanetStrength {
    pub dignity: Dignity,
    pub dignity_score: f64,
    pub uchcha: f64,
    pub house: Option<u8>,
    pub house_score: Option<f64>,
    pub bindus: Option<u8>,
    pub navamsha_dignity: Dignity,
    pub vargottama: bool,
    /// Final strength in [0, 1].
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelativeStrengths {
    pub planets: BTreeMap<Graha, PlanetStrength>,
    pub mean: f64,
    pub strongest: Option<Graha>,
    pub weakest: Option<Graha>,
}

impl RelativeStrengths {
    pub fn total(&self, graha: Graha) -> Option<f64> {
        self.planets.get(&graha).map(|p| p.total)
    }
}

fn bindu_chart(chart: &ChartSnapshot) -> Option<BinduChart> {
    let lagna = chart.ascendant_rashi()?;
    let mut rashis = [0u8; 7];
    for (slot, graha) in rashis.iter_mut().zip(SAPTA_GRAHAS) {
        *slot = chart.rashi_of(graha)?;
    }
    Some(BinduChart::compute(&rashis, lagna))
}

fn strength_with(
    graha: Graha,
    lon: f64,
    chart: &ChartSnapshot,
    bindus: Option<&BinduChart>,
) -> PlanetStrength {
    let dignity = dignity_at(graha, lon);
    let uchcha = uchcha_strength(graha, lon);
    let house = chart.houses.as_ref().and_then(|h| h.house_of(lon));
    let house_score = house.map(|h| house_class(h).score());
    let own_bindus = bindus.and_then(|b| {
        let rashi = chart.rashi_of(graha)?;
        b.own_bindus(graha, rashi)
    });

    let d1 = weighted_mean(&[
        (DIGNITY_WEIGHT, Some(dignity.score())),
        (UCHCHA_WEIGHT, Some(uchcha)),
        (HOUSE_WEIGHT, house_score),
        (BINDU_WEIGHT, own_bindus.map(|b| b as f64 / 8.0)),
    ])
    .unwrap_or(0.5);

    let navamsha_dignity = dignity_at(graha, amsha_longitude(lon, Amsha::D9));
    let vargottama = is_vargottama(lon);
    let d9 = if vargottama { 1.0 } else { navamsha_dignity.score() };
    let total = ((1.0 - NAVAMSHA_SHARE) * d1 + NAVAMSHA_SHARE * d9).clamp(0.0, 1.0);

    PlanetStrength {
        dignity,
        dignity_score: dignity.score(),
        uchcha,
        house,
        house_score,
        bindus: own_bindus,
        navamsha_dignity,
        vargottama,
        total,
    }
}

/// Strength of one graha, None when its longitude is unusable.
pub fn planet_strength(graha: Graha, chart: &ChartSnapshot) -> Option<PlanetStrength> {
    let lon = chart.positions.longitude(graha)?;
    let bindus = bindu_chart(chart);
    Some(strength_with(graha, lon, chart, bindus.as_ref()))
}

/// Strength of every graha with a usable longitude.
pub fn relative_strengths(chart: &ChartSnapshot) -> Option<RelativeStrengths> {
    let bindus = bindu_chart(chart);
    let planets: BTreeMap<Graha, PlanetStrength> = ALL_GRAHAS
        .into_iter()
        .filter_map(|g| {
            let lon = chart.positions.longitude(g)?;
            Some((g, strength_with(g, lon, chart, bindus.as_ref())))
        })
        .collect();
    if planets.is_empty() {
        return None;
    }
    let mean = planets.values().map(|p| p.total).sum::<f64>() / planets.len() as f64;
    let by_total = |a: &(&Graha, &PlanetStrength), b: &(&Graha, &PlanetStrength)| {
        a.1.total.total_cmp(&b.1.total)
    };
    let strongest = planets.iter().max_by(by_total).map(|(g, _)| *g);
    let weakest = planets.iter().min_by(by_total).map(|(g, _)| *g);
    Some(RelativeStrengths {
        planets,
        mean,
        strongest,
        weakest,
    })
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RelativeStrengthCalculator;

impl MetricCalculator for RelativeStrengthCalculator {
    fn name(&self) -> MetricName {
        MetricName::RelativeStrength
    }

    fn compute(&self, ctx: &MetricContext<'_>) -> MetricOutcome {
        let Some(rs) = relative_strengths(ctx.chart) else {
            return MetricOutcome::unavailable("no usable planetary longitude");
        };
        let mut score = MetricScore::new(rs.mean);
        for (g, p) in &rs.planets {
            score = score.with_sub_score(g.english_name(), p.total);
            if p.vargottama {
                score = score.with_factor(format!("{g} is vargottama"));
            }
        }
        if let Some(g) = rs.strongest {
            score = score.with_factor(format!("{g} is the strongest planet"));
        }
        MetricOutcome::Scored(score.with_detail(&rs))
    }
}
