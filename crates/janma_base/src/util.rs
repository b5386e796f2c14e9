//! Angle helpers shared by every scorer.
//!
//! All angles are ecliptic degrees. Functions never panic on non-finite
//! input; they propagate NaN so callers can treat the value as missing.

/// Normalize an angle to [0, 360) degrees.
pub fn normalize_360(deg: f64) -> f64 {
    let r = deg % 360.0;
    let r = if r < 0.0 { r + 360.0 } else { r };
    // -1e-18 % 360 + 360 rounds to exactly 360.0
    if r >= 360.0 { 0.0 } else { r }
}

/// Normalize an angle to (-180, 180] degrees.
pub fn normalize_to_pm180(deg: f64) -> f64 {
    let r = normalize_360(deg);
    if r > 180.0 { r - 360.0 } else { r }
}

/// Shortest arc between two longitudes, in [0, 180].
pub fn angular_distance(a: f64, b: f64) -> f64 {
    normalize_to_pm180(b - a).abs()
}

/// Forward arc from `from` to `to`, in [0, 360).
pub fn forward_distance(from: f64, to: f64) -> f64 {
    normalize_360(to - from)
}

/// Clamp a score into [0, 1]; NaN maps to 0.
pub fn clamp_unit(x: f64) -> f64 {
    if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) }
}

/// True when `lon` is a usable ecliptic longitude in [0, 360).
pub fn is_valid_longitude(lon: f64) -> bool {
    lon.is_finite() && (0.0..360.0).contains(&lon)
}
