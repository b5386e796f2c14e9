//! Pure Vedic primitives for birth-time rectification.
//!
//! Everything here is deterministic math on sidereal longitudes and Julian
//! days: no ephemeris access and no I/O. Higher crates feed chart positions
//! in and read scores out.

pub mod amsha;
pub mod ashtakavarga;
pub mod dasha;
pub mod dignity;
pub mod error;
pub mod graha;
pub mod house;
pub mod julian;
pub mod rashi;
pub mod tattwa;
pub mod util;

pub use amsha::{ALL_AMSHAS, Amsha, amsha_longitude, divisional_longitude, is_vargottama};
pub use ashtakavarga::{BAV_TOTALS, BinduChart, SAV_TOTAL};
pub use dasha::{
    DashaHierarchy, DashaLevel, DashaPeriod, active_chain, vimshottari_hierarchy,
    vimshottari_level0,
};
pub use dignity::{Dignity, NaisargikaMaitri, dignity_at, naisargika_maitri, uchcha_strength};
pub use error::BaseError;
pub use graha::{
    ALL_GRAHAS, Graha, SAPTA_GRAHAS, nth_rashi_from, rashi_lord, rashi_lord_by_index,
};
pub use house::{HouseClass, house_class, house_of, whole_sign_house, whole_sign_house_rashi};
pub use julian::{datetime_from_jd, jd_from_datetime};
pub use rashi::{
    ALL_RASHIS, NAKSHATRA_SPAN_27, Rashi, RashiInfo, nakshatra_index, nakshatra_lord,
    rashi_from_longitude,
};
pub use tattwa::{
    ALL_TATTWAS, Tattwa, TattwaRelation, graha_tattwa, rashi_tattwa, tattwa_relation,
};
pub use util::{angular_distance, normalize_360, normalize_to_pm180};
