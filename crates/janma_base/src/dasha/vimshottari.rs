//! Vimshottari: the 120-year nine-graha cycle.

use super::balance::nakshatra_birth_balance;
use super::subperiod::proportional_children;
use super::types::{
    DAYS_PER_YEAR, DashaHierarchy, DashaLevel, DashaPeriod, MAX_DASHA_LEVEL, MAX_PERIODS_PER_LEVEL,
};
use crate::error::BaseError;
use crate::graha::Graha;
use crate::rashi::nakshatra_lord;

/// Cycle order with period lengths in years.
pub const VIMSHOTTARI_SEQUENCE: [(Graha, f64); 9] = [
    (Graha::Ketu, 7.0),
    (Graha::Shukra, 20.0),
    (Graha::Surya, 6.0),
    (Graha::Chandra, 10.0),
    (Graha::Mangal, 7.0),
    (Graha::Rahu, 18.0),
    (Graha::Guru, 16.0),
    (Graha::Shani, 19.0),
    (Graha::Buddh, 17.0),
];

pub const VIMSHOTTARI_TOTAL_YEARS: f64 = 120.0;

/// Mahadasha length of a graha in years.
pub fn vimshottari_years(graha: Graha) -> f64 {
    VIMSHOTTARI_SEQUENCE
        .iter()
        .find(|(g, _)| *g == graha)
        .map(|(_, y)| *y)
        .unwrap_or(0.0)
}

/// Mahadashas from birth.
///
/// The sequence runs one full cycle past the balance period, so the
/// timeline always covers at least 120 years after birth.
pub fn vimshottari_level0(birth_jd: f64, moon_sidereal_lon: f64) -> Vec<DashaPeriod> {
    let lord = nakshatra_lord(crate::rashi::nakshatra_index(moon_sidereal_lon));
    let start = VIMSHOTTARI_SEQUENCE
        .iter()
        .position(|(g, _)| *g == lord)
        .unwrap_or(0);
    let entry_days = VIMSHOTTARI_SEQUENCE[start].1 * DAYS_PER_YEAR;
    let (_, balance_days, _) = nakshatra_birth_balance(moon_sidereal_lon, entry_days);

    let n = VIMSHOTTARI_SEQUENCE.len();
    let mut periods = Vec::with_capacity(n + 1);
    let mut cursor = birth_jd;
    for offset in 0..=n {
        let (graha, years) = VIMSHOTTARI_SEQUENCE[(start + offset) % n];
        let duration = if offset == 0 {
            balance_days
        } else {
            years * DAYS_PER_YEAR
        };
        let end = cursor + duration;
        periods.push(DashaPeriod {
            graha,
            start_jd: cursor,
            end_jd: end,
            level: DashaLevel::Mahadasha,
            order: offset as u16 + 1,
            parent_idx: 0,
        });
        cursor = end;
    }
    periods
}

/// All levels from Mahadasha down to `max_level` (clamped to the deepest).
pub fn vimshottari_hierarchy(
    birth_jd: f64,
    moon_sidereal_lon: f64,
    max_level: u8,
) -> Result<DashaHierarchy, BaseError> {
    if !birth_jd.is_finite() {
        return Err(BaseError::InvalidInput("birth_jd must be finite"));
    }
    if !moon_sidereal_lon.is_finite() {
        return Err(BaseError::InvalidInput("moon longitude must be finite"));
    }
    let max_level = max_level.min(MAX_DASHA_LEVEL);
    let mut levels = vec![vimshottari_level0(birth_jd, moon_sidereal_lon)];

    for depth in 1..=max_level {
        let Some(child_level) = DashaLevel::from_u8(depth) else {
            break;
        };
        let parents = &levels[(depth - 1) as usize];
        let estimated = parents.len() * VIMSHOTTARI_SEQUENCE.len();
        if estimated > MAX_PERIODS_PER_LEVEL {
            return Err(BaseError::LimitExceeded(
                "dasha level would exceed MAX_PERIODS_PER_LEVEL",
            ));
        }
        let mut children = Vec::with_capacity(estimated);
        for (pidx, parent) in parents.iter().enumerate() {
            children.extend(proportional_children(
                parent,
                &VIMSHOTTARI_SEQUENCE,
                VIMSHOTTARI_TOTAL_YEARS,
                child_level,
                pidx as u32,
            ));
        }
        levels.push(children);
    }

    Ok(DashaHierarchy { birth_jd, levels })
}

/// Active period at each materialized level, outermost first.
///
/// Empty when `jd` falls before birth or after the timeline.
pub fn active_chain(hierarchy: &DashaHierarchy, jd: f64) -> Vec<DashaPeriod> {
    let mut chain = Vec::with_capacity(hierarchy.depth());
    if !jd.is_finite() {
        return chain;
    }
    for level in &hierarchy.levels {
        let idx = level.partition_point(|p| p.end_jd <= jd);
        match level.get(idx) {
            Some(p) if p.contains(jd) => chain.push(*p),
            _ => break,
        }
    }
    chain
}
