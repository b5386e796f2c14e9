//! Core dasha data structures.

use serde::{Deserialize, Serialize};

use crate::graha::Graha;

/// Year length for period arithmetic.
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Deepest supported level (0-based): Sookshmadasha.
pub const MAX_DASHA_LEVEL: u8 = 3;

/// Hard cap on periods per level.
pub const MAX_PERIODS_PER_LEVEL: usize = 100_000;

/// The four nested levels, outermost first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum DashaLevel {
    Mahadasha = 0,
    Antardasha = 1,
    Pratyantardasha = 2,
    Sookshmadasha = 3,
}

/// All levels in depth order.
pub const ALL_DASHA_LEVELS: [DashaLevel; 4] = [
    DashaLevel::Mahadasha,
    DashaLevel::Antardasha,
    DashaLevel::Pratyantardasha,
    DashaLevel::Sookshmadasha,
];

impl DashaLevel {
    pub fn from_u8(v: u8) -> Option<Self> {
        ALL_DASHA_LEVELS.get(v as usize).copied()
    }

    pub const fn depth(self) -> u8 {
        self as u8
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Mahadasha => "Mahadasha",
            Self::Antardasha => "Antardasha",
            Self::Pratyantardasha => "Pratyantardasha",
            Self::Sookshmadasha => "Sookshmadasha",
        }
    }

    /// Next deeper level, if any.
    pub const fn child_level(self) -> Option<Self> {
        match self {
            Self::Mahadasha => Some(Self::Antardasha),
            Self::Antardasha => Some(Self::Pratyantardasha),
            Self::Pratyantardasha => Some(Self::Sookshmadasha),
            Self::Sookshmadasha => None,
        }
    }
}

/// A single dasha period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DashaPeriod {
    /// Ruling graha.
    pub graha: Graha,
    /// JD UT, inclusive.
    pub start_jd: f64,
    /// JD UT, exclusive.
    pub end_jd: f64,
    pub level: DashaLevel,
    /// 1-indexed position among siblings.
    pub order: u16,
    /// Index into the parent level (0 for mahadashas).
    pub parent_idx: u32,
}

impl DashaPeriod {
    pub fn duration_days(&self) -> f64 {
        self.end_jd - self.start_jd
    }

    /// True when `jd` falls in [start, end).
    pub fn contains(&self, jd: f64) -> bool {
        jd >= self.start_jd && jd < self.end_jd
    }
}

/// Materialized levels, each in chronological order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashaHierarchy {
    pub birth_jd: f64,
    pub levels: Vec<Vec<DashaPeriod>>,
}

impl DashaHierarchy {
    /// Number of materialized levels.
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// JD at which the last mahadasha ends.
    pub fn end_jd(&self) -> Option<f64> {
        self.levels.first()?.last().map(|p| p.end_jd)
    }

    /// Periods at a given level, empty when not materialized.
    pub fn level(&self, level: DashaLevel) -> &[DashaPeriod] {
        self.levels
            .get(level.depth() as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
