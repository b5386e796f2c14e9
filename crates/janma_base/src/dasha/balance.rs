//! Birth balance of the first mahadasha.

use crate::rashi::NAKSHATRA_SPAN_27;
use crate::util::normalize_360;

/// Balance of the entry period from the Moon's sidereal longitude.
///
/// Returns `(nakshatra_index, balance_days, elapsed_fraction)` where the
/// elapsed fraction is the part of the nakshatra already traversed, in [0, 1).
pub fn nakshatra_birth_balance(moon_sidereal_lon: f64, entry_period_days: f64) -> (u8, f64, f64) {
    let lon = normalize_360(moon_sidereal_lon);
    let nak_idx = ((lon / NAKSHATRA_SPAN_27).floor() as u8).min(26);
    let position_in_nak = lon - nak_idx as f64 * NAKSHATRA_SPAN_27;
    let elapsed_fraction = (position_in_nak / NAKSHATRA_SPAN_27).clamp(0.0, 1.0);
    let balance_days = entry_period_days * (1.0 - elapsed_fraction);
    (nak_idx, balance_days, elapsed_fraction)
}
