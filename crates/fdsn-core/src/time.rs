//! Timestamp codec for the FDSN text and query grammars.
//!
//! Upstream data centres disagree on precision and zone suffixes
//! (`2020-01-01T00:00:00`, `2020-01-01T00:00:00.0000`,
//! `2004-11-22T18:56:51.535840Z`, plain `2020-01-01`). Every variant is
//! read as UTC. Output always uses the second-precision form the FDSN text
//! format expects.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::{Error, Result};

/// Canonical wire and storage format.
pub const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse any accepted timestamp variant. Returns `None` for empty or
/// unrecognised input.
pub fn parse_time(s: &str) -> Option<DateTime<Utc>> {
  let s = s.trim();
  if s.is_empty() {
    return None;
  }

  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Some(dt.with_timezone(&Utc));
  }

  let naive = s
    .strip_suffix('Z')
    .or_else(|| s.strip_suffix('z'))
    .unwrap_or(s);

  for fmt in DATETIME_FORMATS {
    if let Ok(dt) = NaiveDateTime::parse_from_str(naive, fmt) {
      return Some(dt.and_utc());
    }
  }

  NaiveDate::parse_from_str(naive, "%Y-%m-%d")
    .ok()
    .and_then(|d| d.and_hms_opt(0, 0, 0))
    .map(|dt| dt.and_utc())
}

/// Like [`parse_time`], but an unparseable value is an error instead of
/// an absent one.
pub fn parse_query_time(s: &str) -> Result<DateTime<Utc>> {
  parse_time(s).ok_or_else(|| Error::InvalidTime(s.to_owned()))
}

pub fn format_time(dt: DateTime<Utc>) -> String { dt.format(TIME_FORMAT).to_string() }

/// Format an optional timestamp; `None` becomes the empty string.
pub fn format_opt_time(dt: Option<DateTime<Utc>>) -> String {
  dt.map(format_time).unwrap_or_default()
}
