//! Vimshottari dasha (planetary period) engine.
//!
//! Four nested levels are generated from the Moon's nakshatra at birth:
//! the mahadasha sequence starts with the nakshatra lord, its first period
//! shortened by the part of the nakshatra the Moon has already traversed,
//! and every deeper level splits its parent proportionally in sequence
//! order starting from the parent's own lord.

pub mod balance;
pub mod subperiod;
pub mod types;
pub mod vimshottari;

pub use balance::nakshatra_birth_balance;
pub use subperiod::{proportional_children, snap_last_child_end};
pub use types::{
    DAYS_PER_YEAR, DashaHierarchy, DashaLevel, DashaPeriod, MAX_DASHA_LEVEL,
    MAX_PERIODS_PER_LEVEL,
};
pub use vimshottari::{
    VIMSHOTTARI_SEQUENCE, VIMSHOTTARI_TOTAL_YEARS, active_chain, vimshottari_hierarchy,
    vimshottari_level0, vimshottari_years,
};
