//! Typed upstream queries and their URL parameters.
//!
//! Unset and empty fields are left out of the request entirely.

use serde::Deserialize;

type Params = Vec<(&'static str, String)>;

fn push(params: &mut Params, key: &'static str, value: &Option<String>) {
  if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
    params.push((key, v.to_string()));
  }
}

/// Filters for the station service. Deserializes from the FDSN short
/// parameter names, so it can be lifted straight out of a query string.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StationQuery {
  #[serde(default, rename = "net")]
  pub network:   Option<String>,
  #[serde(default, rename = "sta")]
  pub station:   Option<String>,
  #[serde(default, rename = "cha")]
  pub channel:   Option<String>,
  #[serde(default, rename = "loc")]
  pub location:  Option<String>,
  #[serde(default)]
  pub starttime: Option<String>,
  #[serde(default)]
  pub endtime:   Option<String>,
  #[serde(default)]
  pub minlat:    Option<String>,
  #[serde(default)]
  pub maxlat:    Option<String>,
  #[serde(default)]
  pub minlon:    Option<String>,
  #[serde(default)]
  pub maxlon:    Option<String>,
}

impl StationQuery {
  /// Query parameters for `level`, always asking for the text rendering.
  pub(crate) fn params(&self, level: &'static str) -> Params {
    let mut p = vec![("format", "text".to_string()), ("level", level.to_string())];
    push(&mut p, "net", &self.network);
    push(&mut p, "sta", &self.station);
    push(&mut p, "cha", &self.channel);
    push(&mut p, "loc", &self.location);
    push(&mut p, "starttime", &self.starttime);
    push(&mut p, "endtime", &self.endtime);
    push(&mut p, "minlat", &self.minlat);
    push(&mut p, "maxlat", &self.maxlat);
    push(&mut p, "minlon", &self.minlon);
    push(&mut p, "maxlon", &self.maxlon);
    p
  }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AvailabilityQuery {
  pub network:  Option<String>,
  pub station:  Option<String>,
  pub channel:  Option<String>,
  pub location: Option<String>,
}

impl AvailabilityQuery {
  pub(crate) fn params(&self) -> Params {
    let mut p = vec![("format", "text".to_string())];
    push(&mut p, "net", &self.network);
    push(&mut p, "sta", &self.station);
    push(&mut p, "cha", &self.channel);
    push(&mut p, "loc", &self.location);
    p
  }
}

/// A waveform request, forwarded to the upstream verbatim.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataselectQuery {
  pub network:   String,
  pub station:   String,
  pub location:  Option<String>,
  pub channel:   String,
  pub starttime: String,
  pub endtime:   String,
}

impl DataselectQuery {
  pub(crate) fn params(&self) -> Params {
    let mut p = vec![("net", self.network.clone()), ("sta", self.station.clone())];
    push(&mut p, "loc", &self.location);
    p.push(("cha", self.channel.clone()));
    p.push(("starttime", self.starttime.clone()));
    p.push(("endtime", self.endtime.clone()));
    p
  }
}
