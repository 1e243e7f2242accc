//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{DateTime, TimeZone, Utc};
use fdsn_core::{
  model::{AvailabilityItem, ImportChannel, NewSource, StationFilter},
  store::{AvailabilityStore, MetadataStore},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
  Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

async fn source(s: &SqliteStore, name: &str) -> i64 {
  s.create_source(NewSource {
    name:        name.to_string(),
    base_url:    format!("https://{}.example", name.to_lowercase()),
    description: String::new(),
    enabled:     true,
  })
  .await
  .unwrap()
  .id
}

fn channel(net: &str, sta: &str, loc: &str, cha: &str) -> ImportChannel {
  ImportChannel {
    network_code: net.to_string(),
    network_description: Some(format!("{net} network")),
    station_code: sta.to_string(),
    station_latitude: 34.9459,
    station_longitude: -106.4572,
    station_elevation: 1850.0,
    site_name: Some(format!("{sta} site")),
    station_start: Some(at(1989, 8, 29)),
    location_code: loc.to_string(),
    channel_code: cha.to_string(),
    latitude: Some(34.9459),
    longitude: Some(-106.4572),
    elevation: Some(1850.0),
    depth: Some(100.0),
    azimuth: Some(0.0),
    dip: Some(-90.0),
    sensor_description: "Streckeisen STS-6A".to_string(),
    scale: Some(3.3e9),
    scale_freq: Some(0.02),
    scale_units: "M/S".to_string(),
    sample_rate: Some(20.0),
    start_time: Some(at(2018, 7, 9)),
    ..Default::default()
  }
}

// ─── Sources ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn source_crud() {
  let s = store().await;
  let id = source(&s, "IRIS").await;

  let fetched = s.get_source(id).await.unwrap().unwrap();
  assert_eq!(fetched.name, "IRIS");
  assert!(fetched.enabled);

  let by_url = s
    .find_source_by_url("https://iris.example".to_string())
    .await
    .unwrap();
  assert_eq!(by_url.map(|s| s.id), Some(id));

  let updated = s
    .update_source(id, NewSource {
      name:        "IRIS DMC".to_string(),
      base_url:    "https://service.iris.edu".to_string(),
      description: "updated".to_string(),
      enabled:     false,
    })
    .await
    .unwrap()
    .unwrap();
  assert_eq!(updated.name, "IRIS DMC");
  assert!(!updated.enabled);

  assert!(s.update_source(9999, NewSource::default()).await.unwrap().is_none());
  assert!(s.delete_source(id).await.unwrap());
  assert!(!s.delete_source(id).await.unwrap());
  assert!(s.get_source(id).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_source_name_is_rejected() {
  let s = store().await;
  source(&s, "IRIS").await;
  let dup = s
    .create_source(NewSource {
      name: "IRIS".to_string(),
      base_url: "https://other.example".to_string(),
      ..Default::default()
    })
    .await;
  assert!(dup.is_err());
}

#[tokio::test]
async fn list_sources_counts_children() {
  let s = store().await;
  let id = source(&s, "IRIS").await;
  source(&s, "ORFEUS").await;
  s.import_channels(id, vec![
    channel("IU", "ANMO", "00", "BHZ"),
    channel("IU", "COLA", "00", "BHZ"),
  ])
  .await
  .unwrap();

  let sources = s.list_sources().await.unwrap();
  assert_eq!(sources.len(), 2);
  let iris = sources.iter().find(|s| s.source.name == "IRIS").unwrap();
  assert_eq!(iris.network_count, 1);
  assert_eq!(iris.station_count, 2);
  assert_eq!(iris.availability_count, 0);
}

// ─── Import ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn reimport_is_idempotent() {
  let s = store().await;
  let id = source(&s, "IRIS").await;
  let rows = vec![
    channel("IU", "ANMO", "00", "BHZ"),
    channel("IU", "ANMO", "00", "BH1"),
    channel("IU", "ANMO", "10", "BHZ"),
  ];

  assert_eq!(s.import_channels(id, rows.clone()).await.unwrap(), 3);
  let first = s.stats().await.unwrap();
  let first_ids = s
    .lookup_channel_ids(id, "IU".to_string(), "ANMO".to_string())
    .await
    .unwrap();

  assert_eq!(s.import_channels(id, rows).await.unwrap(), 3);
  let second = s.stats().await.unwrap();
  let second_ids = s
    .lookup_channel_ids(id, "IU".to_string(), "ANMO".to_string())
    .await
    .unwrap();

  assert_eq!(first, second);
  assert_eq!(second.networks, 1);
  assert_eq!(second.stations, 1);
  assert_eq!(second.channels, 3);
  assert_eq!(first_ids, second_ids);
}

#[tokio::test]
async fn reimport_updates_station_in_place() {
  let s = store().await;
  let id = source(&s, "IRIS").await;
  s.import_channels(id, vec![channel("IU", "ANMO", "00", "BHZ")])
    .await
    .unwrap();

  let mut moved = channel("IU", "ANMO", "00", "BHZ");
  moved.station_latitude = 35.0;
  moved.site_name = Some("Albuquerque, New Mexico".to_string());
  s.import_channels(id, vec![moved]).await.unwrap();

  let page = s.list_stations(StationFilter::default()).await.unwrap();
  assert_eq!(page.total, 1);
  assert_eq!(page.stations[0].latitude, 35.0);
  assert_eq!(page.stations[0].site_name, "Albuquerque, New Mexico");
}

#[tokio::test]
async fn reimport_without_enrichment_keeps_metadata() {
  let s = store().await;
  let id = source(&s, "IRIS").await;
  let mut full = channel("IU", "ANMO", "00", "BHZ");
  full.station_end = Some(at(2030, 1, 1));
  s.import_channels(id, vec![full]).await.unwrap();

  let mut bare = channel("IU", "ANMO", "00", "BHZ");
  bare.network_description = None;
  bare.site_name = None;
  bare.station_start = None;
  bare.station_latitude = 35.0;
  s.import_channels(id, vec![bare]).await.unwrap();

  let page = s.list_stations(StationFilter::default()).await.unwrap();
  let station = &page.stations[0];
  assert_eq!(station.latitude, 35.0);
  assert_eq!(station.site_name, "ANMO site");
  assert_eq!(station.start_time, Some(at(1989, 8, 29)));
  assert_eq!(station.end_time, Some(at(2030, 1, 1)));

  let networks = s.list_networks(Some(id)).await.unwrap();
  assert_eq!(networks[0].description, "IU network");
}

#[tokio::test]
async fn first_import_without_enrichment_stores_empty_text() {
  let s = store().await;
  let id = source(&s, "IRIS").await;
  let mut bare = channel("IU", "ANMO", "00", "BHZ");
  bare.network_description = None;
  bare.site_name = None;
  s.import_channels(id, vec![bare]).await.unwrap();

  let page = s.list_stations(StationFilter::default()).await.unwrap();
  assert_eq!(page.stations[0].site_name, "");
  assert_eq!(s.list_networks(Some(id)).await.unwrap()[0].description, "");
}

#[tokio::test]
async fn reimport_replaces_channel_fields() {
  let s = store().await;
  let id = source(&s, "IRIS").await;
  s.import_channels(id, vec![channel("IU", "ANMO", "00", "BHZ")])
    .await
    .unwrap();

  let mut changed = channel("IU", "ANMO", "00", "BHZ");
  changed.sample_rate = Some(40.0);
  changed.depth = None;
  s.import_channels(id, vec![changed]).await.unwrap();

  let records = s.channel_records().await.unwrap();
  assert_eq!(records.len(), 1);
  assert_eq!(records[0].sample_rate, Some(40.0));
  assert_eq!(records[0].depth, None);
}

#[tokio::test]
async fn lookup_keys_are_location_dot_channel() {
  let s = store().await;
  let id = source(&s, "IRIS").await;
  s.import_channels(id, vec![
    channel("IU", "ANMO", "", "BHZ"),
    channel("IU", "ANMO", "00", "LHZ"),
  ])
  .await
  .unwrap();

  let ids = s
    .lookup_channel_ids(id, "IU".to_string(), "ANMO".to_string())
    .await
    .unwrap();
  assert_eq!(ids.len(), 2);
  assert!(ids.contains_key(".BHZ"));
  assert!(ids.contains_key("00.LHZ"));

  let other = s
    .lookup_channel_ids(id, "IU".to_string(), "COLA".to_string())
    .await
    .unwrap();
  assert!(other.is_empty());
}

// ─── Availability ────────────────────────────────────────────────────────────

async fn seeded_channel(s: &SqliteStore) -> (i64, i64) {
  let id = source(s, "IRIS").await;
  s.import_channels(id, vec![channel("IU", "ANMO", "00", "BHZ")])
    .await
    .unwrap();
  let ids = s
    .lookup_channel_ids(id, "IU".to_string(), "ANMO".to_string())
    .await
    .unwrap();
  (id, ids["00.BHZ"])
}

#[tokio::test]
async fn availability_latest_never_shrinks() {
  let s = store().await;
  let (_, ch) = seeded_channel(&s).await;

  let item = |latest| AvailabilityItem { channel_id: ch, earliest: at(2020, 1, 1), latest };
  s.upsert_availability(vec![item(at(2024, 1, 1))]).await.unwrap();
  s.upsert_availability(vec![item(at(2022, 1, 1))]).await.unwrap();

  let records = s.availability_records().await.unwrap();
  assert_eq!(records.len(), 1);
  assert_eq!(records[0].latest, at(2024, 1, 1));

  s.upsert_availability(vec![item(at(2025, 6, 1))]).await.unwrap();
  let records = s.availability_records().await.unwrap();
  assert_eq!(records[0].latest, at(2025, 6, 1));
}

#[tokio::test]
async fn inverted_extent_rolls_back_batch() {
  let s = store().await;
  let (_, ch) = seeded_channel(&s).await;

  let result = s
    .upsert_availability(vec![
      AvailabilityItem { channel_id: ch, earliest: at(2020, 1, 1), latest: at(2021, 1, 1) },
      AvailabilityItem { channel_id: ch, earliest: at(2023, 1, 1), latest: at(2022, 1, 1) },
    ])
    .await;
  assert!(result.is_err());
  assert!(s.availability_records().await.unwrap().is_empty());
}

#[tokio::test]
async fn reimport_keeps_availability() {
  let s = store().await;
  let (id, ch) = seeded_channel(&s).await;
  s.upsert_availability(vec![AvailabilityItem {
    channel_id: ch,
    earliest:   at(2020, 1, 1),
    latest:     at(2021, 1, 1),
  }])
  .await
  .unwrap();

  s.import_channels(id, vec![channel("IU", "ANMO", "00", "BHZ")])
    .await
    .unwrap();
  assert_eq!(s.availability_records().await.unwrap().len(), 1);
}

#[tokio::test]
async fn extents_collapse_per_channel() {
  let s = store().await;
  let (_, ch) = seeded_channel(&s).await;
  s.upsert_availability(vec![
    AvailabilityItem { channel_id: ch, earliest: at(2020, 1, 1), latest: at(2020, 6, 1) },
    AvailabilityItem { channel_id: ch, earliest: at(2021, 1, 1), latest: at(2022, 1, 1) },
  ])
  .await
  .unwrap();

  assert_eq!(s.availability_records().await.unwrap().len(), 2);
  let extents = s.availability_extents().await.unwrap();
  assert_eq!(extents.len(), 1);
  assert_eq!(extents[0].earliest, at(2020, 1, 1));
  assert_eq!(extents[0].latest, at(2022, 1, 1));
}

#[tokio::test]
async fn station_availability_includes_uncovered_channels() {
  let s = store().await;
  let id = source(&s, "IRIS").await;
  s.import_channels(id, vec![
    channel("IU", "ANMO", "00", "BHZ"),
    channel("IU", "ANMO", "00", "LHZ"),
  ])
  .await
  .unwrap();
  let ids = s
    .lookup_channel_ids(id, "IU".to_string(), "ANMO".to_string())
    .await
    .unwrap();
  s.upsert_availability(vec![AvailabilityItem {
    channel_id: ids["00.BHZ"],
    earliest:   at(2020, 1, 1),
    latest:     at(2021, 1, 1),
  }])
  .await
  .unwrap();

  let station_id = s.list_stations(StationFilter::default()).await.unwrap().stations[0].id;
  let rows = s.station_availability(station_id).await.unwrap();
  assert_eq!(rows.len(), 2);
  assert_eq!(rows[0].channel_code, "BHZ");
  assert!(rows[0].earliest.is_some());
  assert_eq!(rows[1].channel_code, "LHZ");
  assert!(rows[1].earliest.is_none());

  let page = s.list_stations(StationFilter::default()).await.unwrap();
  assert!(page.stations[0].has_availability);
}

// ─── Deletion ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn deleting_source_cascades() {
  let s = store().await;
  let (id, ch) = seeded_channel(&s).await;
  s.upsert_availability(vec![AvailabilityItem {
    channel_id: ch,
    earliest:   at(2020, 1, 1),
    latest:     at(2021, 1, 1),
  }])
  .await
  .unwrap();

  assert!(s.delete_source(id).await.unwrap());
  let stats = s.stats().await.unwrap();
  assert_eq!((stats.sources, stats.networks, stats.stations, stats.channels), (0, 0, 0, 0));
  assert!(s.availability_records().await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_station_removes_channels() {
  let s = store().await;
  seeded_channel(&s).await;
  let station = s.list_stations(StationFilter::default()).await.unwrap().stations[0].id;

  assert!(s.delete_station(station).await.unwrap());
  assert!(!s.delete_station(station).await.unwrap());
  assert_eq!(s.stats().await.unwrap().channels, 0);
  assert!(s.get_station(station).await.unwrap().is_none());
}

// ─── Browsing ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn station_listing_filters_and_pages() {
  let s = store().await;
  let iris = source(&s, "IRIS").await;
  let orfeus = source(&s, "ORFEUS").await;
  s.import_channels(iris, vec![
    channel("IU", "ANMO", "00", "BHZ"),
    channel("IU", "COLA", "00", "BHZ"),
    channel("II", "PFO", "00", "BHZ"),
  ])
  .await
  .unwrap();
  s.import_channels(orfeus, vec![channel("NL", "HGN", "", "BHZ")])
    .await
    .unwrap();

  let all = s.list_stations(StationFilter::default()).await.unwrap();
  assert_eq!(all.total, 4);
  let codes: Vec<_> = all.stations.iter().map(|s| s.code.as_str()).collect();
  assert_eq!(codes, ["PFO", "ANMO", "COLA", "HGN"]);

  let iu = s
    .list_stations(StationFilter { network: Some("IU".to_string()), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(iu.total, 2);

  let by_source = s
    .list_stations(StationFilter { source_id: Some(orfeus), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(by_source.total, 1);
  assert_eq!(by_source.stations[0].source_name, "ORFEUS");

  let paged = s
    .list_stations(StationFilter { limit: 2, offset: 2, ..Default::default() })
    .await
    .unwrap();
  assert_eq!(paged.total, 4);
  assert_eq!(paged.stations.len(), 2);
  assert_eq!(paged.stations[0].code, "COLA");
}

#[tokio::test]
async fn get_station_returns_channels() {
  let s = store().await;
  let id = source(&s, "IRIS").await;
  s.import_channels(id, vec![
    channel("IU", "ANMO", "10", "BHZ"),
    channel("IU", "ANMO", "00", "BHZ"),
  ])
  .await
  .unwrap();
  let station = s.list_stations(StationFilter::default()).await.unwrap().stations[0].id;

  let detail = s.get_station(station).await.unwrap().unwrap();
  assert_eq!(detail.station.network_code, "IU");
  assert_eq!(detail.channels.len(), 2);
  assert_eq!(detail.channels[0].location_code, "00");
  assert_eq!(detail.channels[0].start_time, Some(at(2018, 7, 9)));
}

#[tokio::test]
async fn network_owner_prefers_lowest_source() {
  let s = store().await;
  let iris = source(&s, "IRIS").await;
  let orfeus = source(&s, "ORFEUS").await;
  s.import_channels(orfeus, vec![channel("GE", "WLF", "", "BHZ")])
    .await
    .unwrap();
  s.import_channels(iris, vec![channel("GE", "APE", "", "BHZ")])
    .await
    .unwrap();

  let owner = s.network_owner("GE".to_string()).await.unwrap().unwrap();
  assert_eq!(owner.id, iris);
  assert!(s.network_owner("XX".to_string()).await.unwrap().is_none());

  let pairs = s.list_source_networks().await.unwrap();
  assert_eq!(pairs.len(), 2);
  assert_eq!(pairs[0].source_name, "IRIS");

  let networks = s.list_networks(Some(orfeus)).await.unwrap();
  assert_eq!(networks.len(), 1);
  assert_eq!(networks[0].code, "GE");
  assert_eq!(s.list_networks(None).await.unwrap().len(), 2);
}

#[tokio::test]
async fn network_summaries_group_by_code() {
  let s = store().await;
  let iris = source(&s, "IRIS").await;
  let orfeus = source(&s, "ORFEUS").await;

  let mut early = channel("GE", "APE", "", "BHZ");
  early.network_start = Some(at(1993, 1, 1));
  early.network_end = Some(at(2000, 1, 1));
  let mut late = channel("GE", "WLF", "", "BHZ");
  late.network_start = Some(at(1995, 1, 1));
  late.network_end = None;
  let shared = channel("GE", "APE", "", "BHN");

  s.import_channels(iris, vec![early]).await.unwrap();
  s.import_channels(orfeus, vec![late, shared]).await.unwrap();

  let summaries = s.network_summaries().await.unwrap();
  assert_eq!(summaries.len(), 1);
  let ge = &summaries[0];
  assert_eq!(ge.code, "GE");
  assert_eq!(ge.description, "GE network");
  assert_eq!(ge.start_time, Some(at(1993, 1, 1)));
  assert_eq!(ge.end_time, None);
  assert_eq!(ge.station_count, 2);
}

#[tokio::test]
async fn station_records_are_sorted() {
  let s = store().await;
  let id = source(&s, "IRIS").await;
  s.import_channels(id, vec![
    channel("IU", "COLA", "00", "BHZ"),
    channel("II", "PFO", "00", "BHZ"),
    channel("IU", "ANMO", "00", "BHZ"),
  ])
  .await
  .unwrap();

  let records = s.station_records().await.unwrap();
  let keys: Vec<_> = records
    .iter()
    .map(|r| format!("{}.{}", r.network_code, r.code))
    .collect();
  assert_eq!(keys, ["II.PFO", "IU.ANMO", "IU.COLA"]);
  assert_eq!(records[0].start_time, Some(at(1989, 8, 29)));
}
