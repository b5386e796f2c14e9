//! Birth-data validation and resolution of the recorded instant.
//!
//! Offsets are fixed: `+HH:MM`, `-HH:MM`, `+HHMM`, `+HH`, `Z` or `UTC`.
//! Without one, local mean time from the longitude is assumed
//! (4 minutes per degree, rounded to the minute).

use chrono::{FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use janma_metrics::{BirthData, ProcessedBirthData};

use crate::error::ValidationError;

pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), ValidationError> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(ValidationError::LatitudeOutOfRange(latitude));
    }
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(ValidationError::LongitudeOutOfRange(longitude));
    }
    Ok(())
}

pub fn parse_date(s: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::UnparsableDate(s.to_string()))
}

pub fn parse_time(s: &str) -> Result<NaiveTime, ValidationError> {
    let t = s.trim();
    NaiveTime::parse_from_str(t, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(t, "%H:%M"))
        .map_err(|_| ValidationError::UnparsableTime(s.to_string()))
}

pub fn parse_offset(s: &str) -> Result<FixedOffset, ValidationError> {
    let err = || ValidationError::UnparsableTimezone(s.to_string());
    let t = s.trim();
    if t.eq_ignore_ascii_case("z") || t.eq_ignore_ascii_case("utc") || t.eq_ignore_ascii_case("gmt") {
        return FixedOffset::east_opt(0).ok_or_else(err);
    }
    let (sign, rest) = match t.split_at_checked(1) {
        Some(("+", rest)) => (1, rest),
        Some(("-", rest)) => (-1, rest),
        _ => return Err(err()),
    };
    if !rest.is_ascii() {
        return Err(err());
    }
    let (hh, mm) = match rest.split_once(':') {
        Some((h, m)) => (h, m),
        None if rest.len() == 4 => rest.split_at(2),
        None => (rest, "0"),
    };
    let digits = |p: &str| !p.is_empty() && p.len() <= 2 && p.bytes().all(|b| b.is_ascii_digit());
    if !digits(hh) || !digits(mm) {
        return Err(err());
    }
    let hours: i32 = hh.parse().map_err(|_| err())?;
    let minutes: i32 = mm.parse().map_err(|_| err())?;
    if hours > 14 || minutes >= 60 {
        return Err(err());
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(err)
}

/// Local mean time offset for a longitude in degrees east.
pub fn local_mean_time_offset(longitude: f64) -> Result<FixedOffset, ValidationError> {
    let minutes = (longitude.clamp(-180.0, 180.0) * 4.0).round() as i32;
    FixedOffset::east_opt(minutes * 60).ok_or(ValidationError::LongitudeOutOfRange(longitude))
}

/// Validate birth data and resolve the recorded instant to UTC.
pub fn preprocess(birth: &BirthData) -> Result<ProcessedBirthData, ValidationError> {
    validate_coordinates(birth.latitude(), birth.longitude())?;
    let altitude = birth.altitude().unwrap_or(0.0);
    if !altitude.is_finite() {
        return Err(ValidationError::AltitudeNotFinite);
    }
    let local = parse_date(birth.date())?.and_time(parse_time(birth.time())?);
    let offset = match birth.timezone() {
        Some(tz) => parse_offset(tz)?,
        None => local_mean_time_offset(birth.longitude())?,
    };
    let utc = offset
        .from_local_datetime(&local)
        .single()
        .ok_or_else(|| ValidationError::NonexistentLocalTime(local.to_string()))?
        .with_timezone(&Utc);
    Ok(ProcessedBirthData::new(
        local,
        offset,
        utc,
        birth.latitude(),
        birth.longitude(),
        altitude,
        birth.traits().cloned(),
    ))
}
