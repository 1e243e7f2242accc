//! FDSN query parameter parsing.
//!
//! Every field has a short and a long spelling (`net`/`network`,
//! `minlat`/`minlatitude`, ...). When both are present the short one wins.
//! Empty values count as absent.

use std::{collections::HashMap, str::FromStr};

use chrono::{DateTime, Utc};
use fdsn_core::{
  model::Level,
  pattern::matches_any,
  time::parse_query_time,
};
use strum::{Display, EnumString};

use crate::error::{Error, Result};

pub type RawParams = HashMap<String, String>;

/// Response rendering of the station service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Format {
  Text,
  #[default]
  Xml,
}

/// First non-empty value among `names`, in order.
pub(crate) fn first_of<'a>(q: &'a RawParams, names: &[&str]) -> Option<&'a str> {
  names
    .iter()
    .filter_map(|n| q.get(*n))
    .map(|v| v.trim())
    .find(|v| !v.is_empty())
}

/// Split a comma-separated list, trimming entries and dropping empty ones.
pub fn split_list(raw: &str) -> Vec<String> {
  raw
    .split(',')
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(str::to_string)
    .collect()
}

fn list(q: &RawParams, names: &[&str]) -> Vec<String> {
  first_of(q, names).map(split_list).unwrap_or_default()
}

fn time(q: &RawParams, names: &[&str]) -> Result<Option<DateTime<Utc>>> {
  first_of(q, names)
    .map(|v| parse_query_time(v).map_err(Error::from))
    .transpose()
}

fn number(q: &RawParams, names: &[&str]) -> Result<Option<f64>> {
  first_of(q, names)
    .map(|v| {
      v.parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| Error::BadRequest(format!("invalid {}: {v}", names[0])))
    })
    .transpose()
}

fn parsed<T: FromStr + Default>(q: &RawParams, name: &str) -> Result<T> {
  match first_of(q, &[name]) {
    None => Ok(T::default()),
    Some(v) => v
      .parse()
      .map_err(|_| Error::BadRequest(format!("unsupported {name}: {v}"))),
  }
}

// ─── Selection ───────────────────────────────────────────────────────────────

/// Code patterns and a time window, shared by the station and availability
/// services.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
  pub network:  Vec<String>,
  pub station:  Vec<String>,
  pub location: Vec<String>,
  pub channel:  Vec<String>,
  pub start:    Option<DateTime<Utc>>,
  pub end:      Option<DateTime<Utc>>,
}

impl Selection {
  pub fn parse(q: &RawParams) -> Result<Self> {
    Ok(Self {
      network:  list(q, &["net", "network"]),
      station:  list(q, &["sta", "station"]),
      location: list(q, &["loc", "location"]),
      channel:  list(q, &["cha", "channel"]),
      start:    time(q, &["start", "starttime"])?,
      end:      time(q, &["end", "endtime"])?,
    })
  }

  pub fn network_matches(&self, code: &str) -> bool { matches_any(&self.network, code) }

  pub fn station_matches(&self, network: &str, station: &str) -> bool {
    self.network_matches(network) && matches_any(&self.station, station)
  }

  pub fn channel_matches(&self, location: &str, channel: &str) -> bool {
    matches_any(&self.location, location) && matches_any(&self.channel, channel)
  }

  /// Epoch overlap: a record ending before `start` or beginning after `end`
  /// is excluded. An open bound on either side never excludes.
  pub fn overlaps(&self, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> bool {
    if let (Some(from), Some(end)) = (self.start, end)
      && end < from
    {
      return false;
    }
    if let (Some(to), Some(start)) = (self.end, start)
      && start > to
    {
      return false;
    }
    true
  }
}

// ─── Station service ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoundingBox {
  pub min_lat: Option<f64>,
  pub max_lat: Option<f64>,
  pub min_lon: Option<f64>,
  pub max_lon: Option<f64>,
}

impl BoundingBox {
  pub fn contains(&self, lat: f64, lon: f64) -> bool {
    self.min_lat.is_none_or(|min| lat >= min)
      && self.max_lat.is_none_or(|max| lat <= max)
      && self.min_lon.is_none_or(|min| lon >= min)
      && self.max_lon.is_none_or(|max| lon <= max)
  }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationParams {
  pub selection: Selection,
  pub level:     Level,
  pub format:    Format,
  pub bbox:      BoundingBox,
}

impl StationParams {
  pub fn parse(q: &RawParams) -> Result<Self> {
    Ok(Self {
      selection: Selection::parse(q)?,
      level:     parsed(q, "level")?,
      format:    parsed(q, "format")?,
      bbox:      BoundingBox {
        min_lat: number(q, &["minlat", "minlatitude"])?,
        max_lat: number(q, &["maxlat", "maxlatitude"])?,
        min_lon: number(q, &["minlon", "minlongitude"])?,
        max_lon: number(q, &["maxlon", "maxlongitude"])?,
      },
    })
  }
}
