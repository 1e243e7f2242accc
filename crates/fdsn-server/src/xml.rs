//! FDSN StationXML generation.
//!
//! Uses `quick-xml`'s writer API. The document only descends as deep as the
//! requested level: a network-level tree has no stations and a station-level
//! tree has no channels.

use std::io::Cursor;

use chrono::{DateTime, SecondsFormat, Utc};
use fdsn_core::{
  model::{ChannelRecord, NetworkSummary, StationRecord},
  time::format_time,
};
use quick_xml::{
  Writer,
  events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};

use crate::error::{Error, Result};

pub const NS_STATION: &str = "http://www.fdsn.org/xml/station/1";
pub const SCHEMA_VERSION: &str = "1.1";
pub const CONTENT_TYPE: &str = "application/xml";

// ─── Document tree ───────────────────────────────────────────────────────────

pub struct StationXml<'a> {
  pub source:   &'a str,
  pub sender:   &'a str,
  pub created:  DateTime<Utc>,
  pub networks: Vec<NetworkNode<'a>>,
}

pub struct NetworkNode<'a> {
  pub network:  &'a NetworkSummary,
  pub stations: Vec<StationNode<'a>>,
}

pub struct StationNode<'a> {
  pub station:  &'a StationRecord,
  pub channels: Vec<&'a ChannelRecord>,
}

// ─── Writer ──────────────────────────────────────────────────────────────────

struct XmlOut {
  writer: Writer<Cursor<Vec<u8>>>,
}

impl XmlOut {
  fn new() -> Self { Self { writer: Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2) } }

  fn event(&mut self, event: Event<'_>) -> Result<()> {
    self
      .writer
      .write_event(event)
      .map_err(|e| Error::Xml(e.to_string()))
  }

  fn start(&mut self, tag: &str, attrs: &[(&str, &str)]) -> Result<()> {
    let mut el = BytesStart::new(tag);
    for (k, v) in attrs {
      el.push_attribute((*k, *v));
    }
    self.event(Event::Start(el))
  }

  fn end(&mut self, tag: &str) -> Result<()> { self.event(Event::End(BytesEnd::new(tag))) }

  fn text(&mut self, tag: &str, text: &str) -> Result<()> {
    self.start(tag, &[])?;
    self.event(Event::Text(BytesText::new(text)))?;
    self.end(tag)
  }

  fn number(&mut self, tag: &str, value: Option<f64>) -> Result<()> {
    match value {
      Some(v) => self.text(tag, &v.to_string()),
      None => Ok(()),
    }
  }

  fn finish(self) -> Vec<u8> { self.writer.into_inner().into_inner() }
}

/// `code`, then `startDate`/`endDate` when known.
fn epoch_attrs<'a>(
  mut attrs: Vec<(&'a str, String)>,
  start: Option<DateTime<Utc>>,
  end: Option<DateTime<Utc>>,
) -> Vec<(&'a str, String)> {
  if let Some(t) = start {
    attrs.push(("startDate", format_time(t)));
  }
  if let Some(t) = end {
    attrs.push(("endDate", format_time(t)));
  }
  attrs
}

fn borrowed<'a>(attrs: &'a [(&'a str, String)]) -> Vec<(&'a str, &'a str)> {
  attrs.iter().map(|(k, v)| (*k, v.as_str())).collect()
}

// ─── Rendering ───────────────────────────────────────────────────────────────

pub fn render(doc: &StationXml<'_>) -> Result<Vec<u8>> {
  let mut out = XmlOut::new();
  out.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

  let root = "FDSNStationXML";
  out.start(root, &[("xmlns", NS_STATION), ("schemaVersion", SCHEMA_VERSION)])?;
  out.text("Source", doc.source)?;
  out.text("Sender", doc.sender)?;
  out.text("Created", &doc.created.to_rfc3339_opts(SecondsFormat::Secs, true))?;
  for node in &doc.networks {
    write_network(&mut out, node)?;
  }
  out.end(root)?;

  Ok(out.finish())
}

fn write_network(out: &mut XmlOut, node: &NetworkNode<'_>) -> Result<()> {
  let n = node.network;
  let attrs = epoch_attrs(vec![("code", n.code.clone())], n.start_time, n.end_time);
  out.start("Network", &borrowed(&attrs))?;
  if !n.description.is_empty() {
    out.text("Description", &n.description)?;
  }
  for station in &node.stations {
    write_station(out, station)?;
  }
  out.end("Network")
}

fn write_station(out: &mut XmlOut, node: &StationNode<'_>) -> Result<()> {
  let s = node.station;
  let attrs = epoch_attrs(vec![("code", s.code.clone())], s.start_time, s.end_time);
  out.start("Station", &borrowed(&attrs))?;
  out.number("Latitude", Some(s.latitude))?;
  out.number("Longitude", Some(s.longitude))?;
  out.number("Elevation", Some(s.elevation))?;
  out.start("Site", &[])?;
  out.text("Name", &s.site_name)?;
  out.end("Site")?;
  for channel in &node.channels {
    write_channel(out, channel)?;
  }
  out.end("Station")
}

fn write_channel(out: &mut XmlOut, c: &ChannelRecord) -> Result<()> {
  let attrs = epoch_attrs(
    vec![("code", c.code.clone()), ("locationCode", c.location_code.clone())],
    c.start_time,
    c.end_time,
  );
  out.start("Channel", &borrowed(&attrs))?;
  out.number("Latitude", c.latitude)?;
  out.number("Longitude", c.longitude)?;
  out.number("Elevation", c.elevation)?;
  out.number("Depth", c.depth)?;
  out.number("Azimuth", c.azimuth)?;
  out.number("Dip", c.dip)?;
  out.number("SampleRate", c.sample_rate)?;
  if !c.sensor_description.is_empty() {
    out.start("Sensor", &[])?;
    out.text("Description", &c.sensor_description)?;
    out.end("Sensor")?;
  }
  out.end("Channel")
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn network() -> NetworkSummary {
    NetworkSummary {
      code:          "IU".into(),
      description:   "Global Seismograph Network & friends".into(),
      start_time:    Some(Utc.with_ymd_and_hms(1988, 1, 1, 0, 0, 0).unwrap()),
      end_time:      None,
      station_count: 1,
    }
  }

  fn station() -> StationRecord {
    StationRecord {
      station_id:   1,
      network_code: "IU".into(),
      code:         "ANMO".into(),
      latitude:     34.9459,
      longitude:    -106.4572,
      elevation:    1850.0,
      site_name:    "Albuquerque, New Mexico, USA".into(),
      start_time:   None,
      end_time:     None,
    }
  }

  fn channel() -> ChannelRecord {
    ChannelRecord {
      station_id:         1,
      network_code:       "IU".into(),
      station_code:       "ANMO".into(),
      location_code:      "00".into(),
      code:               "BHZ".into(),
      latitude:           Some(34.9459),
      longitude:          Some(-106.4572),
      elevation:          Some(1671.0),
      depth:              Some(145.0),
      azimuth:            None,
      dip:                Some(-90.0),
      sensor_description: String::new(),
      scale:              None,
      scale_freq:         None,
      scale_units:        String::new(),
      sample_rate:        Some(20.0),
      start_time:         Some(Utc.with_ymd_and_hms(2018, 7, 9, 20, 45, 0).unwrap()),
      end_time:           None,
    }
  }

  fn render_str(doc: &StationXml<'_>) -> String { String::from_utf8(render(doc).unwrap()).unwrap() }

  #[test]
  fn document_header_and_root() {
    let doc = StationXml {
      source:   "fdsn-mirror",
      sender:   "test",
      created:  Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
      networks: vec![],
    };
    let xml = render_str(&doc);
    assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#), "{xml}");
    assert!(
      xml.contains(r#"<FDSNStationXML xmlns="http://www.fdsn.org/xml/station/1" schemaVersion="1.1">"#),
      "{xml}"
    );
    assert!(xml.contains("<Created>2024-03-01T12:00:00Z</Created>"), "{xml}");
    assert!(xml.contains("\n  <Source>fdsn-mirror</Source>"), "{xml}");
  }

  #[test]
  fn nested_tree_omits_absent_values() {
    let (network, station, channel) = (network(), station(), channel());
    let doc = StationXml {
      source:   "fdsn-mirror",
      sender:   "fdsn-mirror",
      created:  Utc::now(),
      networks: vec![NetworkNode {
        network:  &network,
        stations: vec![StationNode { station: &station, channels: vec![&channel] }],
      }],
    };
    let xml = render_str(&doc);

    assert!(xml.contains(r#"<Network code="IU" startDate="1988-01-01T00:00:00">"#), "{xml}");
    assert!(xml.contains("<Description>Global Seismograph Network &amp; friends</Description>"));
    assert!(xml.contains(r#"<Station code="ANMO">"#), "{xml}");
    assert!(xml.contains("<Elevation>1850</Elevation>"), "{xml}");
    assert!(xml.contains("<Name>Albuquerque, New Mexico, USA</Name>"), "{xml}");
    assert!(
      xml.contains(r#"<Channel code="BHZ" locationCode="00" startDate="2018-07-09T20:45:00">"#),
      "{xml}"
    );
    assert!(xml.contains("<Dip>-90</Dip>"), "{xml}");
    assert!(xml.contains("<SampleRate>20</SampleRate>"), "{xml}");
    assert!(!xml.contains("<Azimuth>"), "{xml}");
    assert!(!xml.contains("<Sensor>"), "{xml}");
    assert!(!xml.contains("endDate"), "{xml}");
  }
}
