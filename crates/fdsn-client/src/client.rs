//! Async HTTP client for one upstream FDSN data centre.

use std::time::Duration;

use reqwest::{Client, StatusCode};

use crate::{
  error::{Error, Result},
  query::{AvailabilityQuery, DataselectQuery, StationQuery},
  text::{self, ChannelRow, ExtentRow, NetworkRow, StationRow},
};

pub const USER_AGENT: &str = concat!("fdsn-mirror/", env!("CARGO_PKG_VERSION"));

const STATION_PATH: &str = "/fdsnws/station/1/query";
const EXTENT_PATH: &str = "/fdsnws/availability/1/extent";
const DATASELECT_PATH: &str = "/fdsnws/dataselect/1/query";

/// Build the shared upstream HTTP client with the given request timeout.
pub fn http_client(timeout: Duration) -> Result<Client> {
  Client::builder()
    .timeout(timeout)
    .user_agent(USER_AGENT)
    .build()
    .map_err(Error::Build)
}

/// Queries one upstream data centre.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Debug, Clone)]
pub struct FdsnClient {
  http:     Client,
  base_url: String,
}

impl FdsnClient {
  /// A client with its own connection pool and a 60 s timeout.
  pub fn new(base_url: impl Into<String>) -> Result<Self> {
    Ok(Self::with_http_client(http_client(Duration::from_secs(60))?, base_url))
  }

  pub fn with_http_client(http: Client, base_url: impl Into<String>) -> Self {
    let base_url = base_url.into().trim_end_matches('/').to_string();
    Self { http, base_url }
  }

  pub fn base_url(&self) -> &str { &self.base_url }

  /// GET `path` and return the body of a 200, or `None` for a 204.
  async fn get_text(&self, path: &str, params: &[(&str, String)]) -> Result<Option<String>> {
    let url = format!("{}{path}", self.base_url);
    let request = self
      .http
      .get(&url)
      .query(params)
      .build()
      .map_err(|source| Error::Transport { url: url.clone(), source })?;
    let url = request.url().to_string();

    tracing::debug!(%url, "querying upstream");
    let resp = self
      .http
      .execute(request)
      .await
      .map_err(|source| Error::Transport { url: url.clone(), source })?;

    let status = resp.status();
    if status == StatusCode::NO_CONTENT {
      return Ok(None);
    }
    let body = resp
      .text()
      .await
      .map_err(|source| Error::Transport { url: url.clone(), source })?;

    if status == StatusCode::OK {
      Ok(Some(body))
    } else {
      Err(Error::from_status(url, status, body))
    }
  }

  // ── Station service ───────────────────────────────────────────────────────

  pub async fn query_networks(&self, q: &StationQuery) -> Result<Vec<NetworkRow>> {
    let body = self.get_text(STATION_PATH, &q.params("network")).await?;
    Ok(body.as_deref().map(text::parse_networks).unwrap_or_default())
  }

  pub async fn query_stations(&self, q: &StationQuery) -> Result<Vec<StationRow>> {
    let body = self.get_text(STATION_PATH, &q.params("station")).await?;
    Ok(body.as_deref().map(text::parse_stations).unwrap_or_default())
  }

  pub async fn query_channels(&self, q: &StationQuery) -> Result<Vec<ChannelRow>> {
    let body = self.get_text(STATION_PATH, &q.params("channel")).await?;
    Ok(body.as_deref().map(text::parse_channels).unwrap_or_default())
  }

  // ── Availability service ──────────────────────────────────────────────────

  pub async fn query_availability_extent(&self, q: &AvailabilityQuery) -> Result<Vec<ExtentRow>> {
    let body = self.get_text(EXTENT_PATH, &q.params()).await?;
    Ok(body.as_deref().map(text::parse_extents).unwrap_or_default())
  }

  // ── Dataselect service ────────────────────────────────────────────────────

  /// Issue a waveform request and hand back the raw response, whatever its
  /// status.
  pub async fn dataselect(&self, q: &DataselectQuery) -> Result<reqwest::Response> {
    let url = format!("{}{DATASELECT_PATH}", self.base_url);
    tracing::debug!(%url, network = %q.network, station = %q.station, "forwarding dataselect");
    self
      .http
      .get(&url)
      .query(&q.params())
      .send()
      .await
      .map_err(|source| Error::Transport { url, source })
  }
}
