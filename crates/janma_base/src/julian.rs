//! Julian-day conversion for UT instants.
//!
//! All period boundaries are carried as JD (UT) floats. Conversion uses the
//! Meeus proleptic Gregorian formula, which is exact to well below a second
//! across the centuries dasha timelines span.

use chrono::{DateTime, Datelike, Duration, TimeZone, Timelike, Utc};

/// JD of the Unix epoch, 1970-01-01T00:00:00Z.
pub const JD_UNIX_EPOCH: f64 = 2_440_587.5;

/// Seconds per day.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Julian day (UT) of a UTC instant.
pub fn jd_from_datetime(dt: &DateTime<Utc>) -> f64 {
    let y = dt.year() as f64;
    let m = dt.month() as f64;
    let secs = dt.hour() as f64 * 3600.0
        + dt.minute() as f64 * 60.0
        + dt.second() as f64
        + dt.nanosecond() as f64 * 1e-9;
    let d = dt.day() as f64 + secs / SECONDS_PER_DAY;

    let (y2, m2) = if m <= 2.0 { (y - 1.0, m + 12.0) } else { (y, m) };
    let a = (y2 / 100.0).floor();
    let b = 2.0 - a + (a / 4.0).floor();

    (365.25 * (y2 + 4716.0)).floor() + (30.6001 * (m2 + 1.0)).floor() + d + b - 1524.5
}

/// UTC instant of a Julian day (UT), rounded to the millisecond.
///
/// Returns None for non-finite input or dates chrono cannot represent.
pub fn datetime_from_jd(jd: f64) -> Option<DateTime<Utc>> {
    if !jd.is_finite() {
        return None;
    }
    let millis = ((jd - JD_UNIX_EPOCH) * SECONDS_PER_DAY * 1000.0).round();
    if millis.abs() > i64::MAX as f64 {
        return None;
    }
    let epoch = Utc.timestamp_opt(0, 0).single()?;
    epoch.checked_add_signed(Duration::milliseconds(millis as i64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn j2000_epoch() {
        let dt = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        assert!((jd_from_datetime(&dt) - 2_451_545.0).abs() < 1e-9);
    }

    #[test]
    fn unix_epoch() {
        let dt = Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap();
        assert!((jd_from_datetime(&dt) - JD_UNIX_EPOCH).abs() < 1e-9);
    }

    #[test]
    fn january_uses_previous_year_branch() {
        let dt = Utc.with_ymd_and_hms(1990, 1, 1, 12, 0, 0).unwrap();
        assert!((jd_from_datetime(&dt) - 2_447_893.0).abs() < 1e-9);
    }

    #[test]
    fn inverse_to_the_millisecond() {
        let dt = Utc.with_ymd_and_hms(1987, 6, 19, 17, 43, 11).unwrap();
        let back = datetime_from_jd(jd_from_datetime(&dt)).unwrap();
        assert!((back - dt).num_milliseconds().abs() <= 1);
    }

    #[test]
    fn nan_has_no_datetime() {
        assert!(datetime_from_jd(f64::NAN).is_none());
    }
}
