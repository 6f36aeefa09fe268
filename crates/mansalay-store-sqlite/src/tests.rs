//! Integration tests for `SqliteStore` against an in-memory database.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use mansalay_core::{
  consolidate::{Consolidator, SourceStatus},
  content::{MediaType, Source},
  fingerprint::digest,
  store::{ContentQuery, ContentStore},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn legacy_store() -> SqliteStore {
  let s = store().await;
  s.bootstrap_legacy_schema().await.expect("legacy schema");
  s
}

fn now() -> DateTime<Utc> { Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap() }

async fn consolidate(s: &SqliteStore) -> mansalay_core::consolidate::ConsolidationReport {
  Consolidator::new(Arc::new(s.clone()))
    .run_at(now())
    .await
    .expect("consolidation run")
}

const SEED: &str = "
INSERT INTO navbar (logo) VALUES ('logo.png');
INSERT INTO experience_cards (title, image_path, link, created_at, updated_at)
  VALUES ('Island Hopping', 'uploads/experience/hop.jpg', '/activities',
          '2023-01-01 10:00:00', '2023-02-01 10:00:00');
INSERT INTO explorecms (title, city, email, contact, image_path)
  VALUES ('Mangrove Park', 'Mansalay', NULL, '0917', 'mangrove.jpg');
INSERT INTO hero_content (title, subtitle) VALUES ('Discover Mansalay', 'Gateway to the south');
INSERT INTO highlight_events (title, description, date_range, image_url, link)
  VALUES ('Hudyaka Festival', 'Street dancing', 'Feb 10 - 14', 'hudyaka.jpg', NULL);
INSERT INTO tourist_spots (name, lat, lng, image, category)
  VALUES ('Buktot Beach', 12.52, 121.44, 'buktot.jpg', 'Beach');
INSERT INTO destinations (name, description, category, image, created_at)
  VALUES ('Blue Lagoon', NULL, 'Beaches', 'blue.jpg', '2022-12-25 08:00:00');
";

// ─── Schema ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn fresh_store_has_no_legacy_tables() {
  let s = store().await;
  for source in Source::ALL {
    assert!(!s.table_exists(source).await.unwrap(), "{source} should not exist");
  }
  assert_eq!(s.count_content().await.unwrap(), 0);
}

#[tokio::test]
async fn bootstrap_creates_every_legacy_table() {
  let s = legacy_store().await;
  for source in Source::ALL {
    assert!(s.table_exists(source).await.unwrap(), "{source} should exist");
  }
}

#[tokio::test]
async fn ensure_schema_is_idempotent() {
  let s = store().await;
  s.ensure_schema().await.unwrap();
  s.ensure_schema().await.unwrap();
}

// ─── Consolidation ───────────────────────────────────────────────────────────

#[tokio::test]
async fn consolidates_every_legacy_table() {
  let s = legacy_store().await;
  s.execute_batch(SEED).await.unwrap();

  let report = consolidate(&s).await;

  assert_eq!(report.inserted(), 7);
  assert!(report.sources.iter().all(|r| r.status == SourceStatus::Migrated));
  assert_eq!(s.count_content().await.unwrap(), 7);
}

#[tokio::test]
async fn second_run_adds_nothing() {
  let s = legacy_store().await;
  s.execute_batch(SEED).await.unwrap();

  consolidate(&s).await;
  let before = s.list_content(None).await.unwrap();

  let report = consolidate(&s).await;
  assert_eq!(report.inserted(), 0);
  assert_eq!(report.already_present(), 7);
  assert_eq!(s.list_content(None).await.unwrap(), before);
}

#[tokio::test]
async fn blue_lagoon_maps_onto_unified_row() {
  let s = legacy_store().await;
  s.execute_batch(SEED).await.unwrap();
  consolidate(&s).await;

  let rows = s.list_content(Some(Source::Destinations)).await.unwrap();
  assert_eq!(rows.len(), 1);
  let item = &rows[0].item;
  assert_eq!(item.name.as_deref(), Some("Blue Lagoon"));
  assert_eq!(item.category.as_deref(), Some("Beaches"));
  assert_eq!(item.image_url.as_deref(), Some("blue.jpg"));
  assert_eq!(item.dedup_hash, digest("destinations|Blue Lagoon|Beaches|blue.jpg"));
  assert_eq!(
    item.created_at,
    Utc.with_ymd_and_hms(2022, 12, 25, 8, 0, 0).unwrap()
  );
}

#[tokio::test]
async fn explore_null_email_uses_empty_string_in_fingerprint() {
  let s = legacy_store().await;
  s.execute_batch(SEED).await.unwrap();
  consolidate(&s).await;

  let rows = s.list_content(Some(Source::Explorecms)).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].item.email, None);
  assert_eq!(rows[0].item.contact.as_deref(), Some("0917"));
  assert_eq!(
    rows[0].item.dedup_hash,
    digest("explorecms|Mangrove Park|Mansalay|mangrove.jpg")
  );
}

#[tokio::test]
async fn hero_column_defaults_flow_through() {
  let s = legacy_store().await;
  s.execute_batch(SEED).await.unwrap();
  consolidate(&s).await;

  let rows = s.list_content(Some(Source::HeroContent)).await.unwrap();
  let item = &rows[0].item;
  assert_eq!(item.media_type, MediaType::Image);
  assert_eq!(item.media_path.as_deref(), Some("default.jpg"));
  assert_eq!(item.description.as_deref(), Some("Gateway to the south"));
  assert_eq!(
    item.dedup_hash,
    digest("hero_content|Discover Mansalay|Gateway to the south|image|default.jpg")
  );
}

#[tokio::test]
async fn hero_media_type_is_fingerprinted_as_stored() {
  let s = legacy_store().await;
  s.execute_batch(
    "INSERT INTO hero_content (title, subtitle, media_type, media_path) VALUES ('H', 's', 'Video', 'a.mp4');
     INSERT INTO hero_content (title, subtitle, media_type, media_path) VALUES ('H', 's', 'video', 'a.mp4');",
  )
  .await
  .unwrap();

  let report = consolidate(&s).await;
  let hero = report.source(Source::HeroContent).unwrap();
  assert_eq!(hero.inserted, 2);
  assert_eq!(hero.duplicates, 0);

  let rows = s.list_content(Some(Source::HeroContent)).await.unwrap();
  assert_eq!(rows.len(), 2);
  assert!(rows.iter().all(|r| r.item.media_type == MediaType::Video));
  assert_eq!(rows[0].item.dedup_hash, digest("hero_content|H|s|Video|a.mp4"));
  assert_eq!(rows[1].item.dedup_hash, digest("hero_content|H|s|video|a.mp4"));
}

#[tokio::test]
async fn tourist_spot_coordinates_survive() {
  let s = legacy_store().await;
  s.execute_batch(SEED).await.unwrap();
  consolidate(&s).await;

  let rows = s.list_content(Some(Source::TouristSpots)).await.unwrap();
  let item = &rows[0].item;
  assert_eq!(item.lat, Some(12.52));
  assert_eq!(item.lng, Some(121.44));
  assert_eq!(
    item.dedup_hash,
    digest("tourist_spots|Buktot Beach|12.520000|121.440000")
  );
}

#[tokio::test]
async fn missing_legacy_tables_are_skipped() {
  let s = store().await;
  s.execute_batch(
    "CREATE TABLE destinations (
       id INTEGER PRIMARY KEY, name TEXT, description TEXT,
       category TEXT, image TEXT, created_at TEXT
     );
     INSERT INTO destinations (name, category, image) VALUES ('Blue Lagoon', 'Beaches', 'blue.jpg');",
  )
  .await
  .unwrap();

  let report = consolidate(&s).await;

  assert_eq!(
    report.source(Source::Destinations).unwrap().status,
    SourceStatus::Migrated
  );
  assert_eq!(report.source(Source::Navbar).unwrap().status, SourceStatus::Skipped);
  assert_eq!(report.failed().count(), 0);
  assert_eq!(s.count_content().await.unwrap(), 1);
}

#[tokio::test]
async fn malformed_coordinates_reject_only_that_row() {
  let s = legacy_store().await;
  s.execute_batch(
    "INSERT INTO tourist_spots (name, lat, lng) VALUES ('Good Spot', 12.5, 121.4);
     INSERT INTO tourist_spots (name, lat, lng) VALUES ('Bad Spot', 'north', 121.4);
     INSERT INTO tourist_spots (name, lat, lng) VALUES ('Far Spot', 95.0, 121.4);
     INSERT INTO tourist_spots (name, lat, lng) VALUES ('Unmapped Spot', NULL, NULL);",
  )
  .await
  .unwrap();

  let report = consolidate(&s).await;
  let spots = report.source(Source::TouristSpots).unwrap();

  assert_eq!(spots.status, SourceStatus::Migrated);
  assert_eq!(spots.read, 4);
  assert_eq!(spots.rejected, 2);
  assert_eq!(spots.inserted, 2);
}

#[tokio::test]
async fn legacy_table_missing_columns_fails_only_that_source() {
  let s = store().await;
  s.execute_batch(
    "CREATE TABLE navbar (id INTEGER PRIMARY KEY, logo TEXT);
     INSERT INTO navbar (logo) VALUES ('logo.png');
     CREATE TABLE explorecms (id INTEGER PRIMARY KEY, title TEXT);
     INSERT INTO explorecms (title) VALUES ('Cafe');",
  )
  .await
  .unwrap();

  let report = consolidate(&s).await;

  assert!(matches!(
    report.source(Source::Explorecms).unwrap().status,
    SourceStatus::Failed { .. }
  ));
  assert_eq!(report.source(Source::Navbar).unwrap().inserted, 1);
  assert_eq!(s.count_content().await.unwrap(), 1);
}

#[tokio::test]
async fn insert_failure_rolls_back_the_whole_source() {
  let s = legacy_store().await;
  s.execute_batch(SEED).await.unwrap();
  s.execute_batch(
    "INSERT INTO explorecms (title, city, image_path) VALUES ('Boom', 'Mansalay', 'boom.jpg');
     CREATE TRIGGER reject_boom BEFORE INSERT ON content_items
     WHEN NEW.title = 'Boom'
     BEGIN SELECT RAISE(ABORT, 'rejected by trigger'); END;",
  )
  .await
  .unwrap();

  let report = consolidate(&s).await;

  let explore = report.source(Source::Explorecms).unwrap();
  assert!(matches!(explore.status, SourceStatus::Failed { .. }));
  assert!(s.list_content(Some(Source::Explorecms)).await.unwrap().is_empty());
  // Every other source still committed.
  assert_eq!(s.count_content().await.unwrap(), 6);
}

#[tokio::test]
async fn new_legacy_rows_are_picked_up_without_touching_old_ones() {
  let s = legacy_store().await;
  s.execute_batch(SEED).await.unwrap();
  consolidate(&s).await;
  let old = s.get_content(1).await.unwrap().unwrap();

  s.execute_batch(
    "INSERT INTO destinations (name, category, image) VALUES ('Wasig Falls', 'Adventures', 'wasig.jpg');
     UPDATE navbar SET logo = 'logo-2025.png';",
  )
  .await
  .unwrap();
  let report = consolidate(&s).await;

  // The edited navbar logo fingerprints as a new row; the old one stays.
  assert_eq!(report.inserted(), 2);
  assert_eq!(s.count_content().await.unwrap(), 9);
  assert_eq!(s.get_content(1).await.unwrap().unwrap(), old);
}

#[tokio::test]
async fn overlapping_runs_insert_each_row_once() {
  let s = legacy_store().await;
  s.execute_batch(SEED).await.unwrap();

  let a = Consolidator::new(Arc::new(s.clone()));
  let b = Consolidator::new(Arc::new(s.clone()));
  let (ra, rb) = tokio::join!(a.run_at(now()), b.run_at(now()));

  assert_eq!(ra.unwrap().inserted() + rb.unwrap().inserted(), 7);
  assert_eq!(s.count_content().await.unwrap(), 7);
}

// ─── Reads ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn get_content_missing_returns_none() {
  let s = store().await;
  assert!(s.get_content(42).await.unwrap().is_none());
}

#[tokio::test]
async fn search_matches_title_and_name_case_insensitively() {
  let s = legacy_store().await;
  s.execute_batch(SEED).await.unwrap();
  consolidate(&s).await;

  let by_name = s
    .search(&ContentQuery { text: Some("LAGOON".into()), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(by_name.len(), 1);
  assert_eq!(by_name[0].item.source, Source::Destinations);

  let by_title = s
    .search(&ContentQuery { text: Some("festival".into()), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(by_title.len(), 1);
  assert_eq!(by_title[0].item.source, Source::HighlightEvents);
}

#[tokio::test]
async fn search_filters_compose() {
  let s = legacy_store().await;
  s.execute_batch(SEED).await.unwrap();
  s.execute_batch(
    "INSERT INTO destinations (name, category, image) VALUES ('Beach Resort', 'Hotels', 'r.jpg');",
  )
  .await
  .unwrap();
  consolidate(&s).await;

  let beaches = s
    .search(&ContentQuery {
      text: Some("beach".into()),
      source: Some(Source::Destinations),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(beaches.len(), 1);
  assert_eq!(beaches[0].item.name.as_deref(), Some("Beach Resort"));

  let by_category = s
    .search(&ContentQuery { category: Some("Beach".into()), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(by_category.len(), 1);
  assert_eq!(by_category[0].item.source, Source::TouristSpots);
}

#[tokio::test]
async fn search_treats_wildcards_literally() {
  let s = legacy_store().await;
  s.execute_batch(SEED).await.unwrap();
  consolidate(&s).await;

  let hits = s
    .search(&ContentQuery { text: Some("%".into()), ..Default::default() })
    .await
    .unwrap();
  assert!(hits.is_empty());
}

#[tokio::test]
async fn search_paginates() {
  let s = legacy_store().await;
  s.execute_batch(SEED).await.unwrap();
  consolidate(&s).await;

  let page = s
    .search(&ContentQuery { limit: Some(3), offset: Some(5), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(page.len(), 2);
  assert_eq!(page[0].id, 6);
}

#[tokio::test]
async fn search_clamps_huge_paging_values() {
  let s = legacy_store().await;
  s.execute_batch(SEED).await.unwrap();
  consolidate(&s).await;

  let past_the_end = s
    .search(&ContentQuery { offset: Some(usize::MAX), ..Default::default() })
    .await
    .unwrap();
  assert!(past_the_end.is_empty());

  let everything = s
    .search(&ContentQuery { limit: Some(usize::MAX), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(everything.len(), 7);
}

#[tokio::test]
async fn suggest_returns_prefix_matches() {
  let s = legacy_store().await;
  s.execute_batch(SEED).await.unwrap();
  s.execute_batch(
    "INSERT INTO destinations (name, category, image) VALUES ('Blue Hole', 'Adventures', 'hole.jpg');",
  )
  .await
  .unwrap();
  consolidate(&s).await;

  let suggestions = s.suggest("bl", 5).await.unwrap();
  assert_eq!(suggestions, vec!["Blue Hole".to_owned(), "Blue Lagoon".to_owned()]);

  let limited = s.suggest("b", 1).await.unwrap();
  assert_eq!(limited.len(), 1);
}
