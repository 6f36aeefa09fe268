//! The `ContentStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `mansalay-store-sqlite`). The consolidator and the API layer depend on
//! this abstraction, never on a concrete backend.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{
  content::{ContentItem, NewContentItem, Source},
  legacy::{LegacyRecord, RowError},
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Parameters for [`ContentStore::search`].
#[derive(Debug, Clone, Default)]
pub struct ContentQuery {
  /// Case-insensitive substring matched against `title` and `name`.
  pub text:     Option<String>,
  pub source:   Option<Source>,
  /// Exact match on `category`.
  pub category: Option<String>,
  pub limit:    Option<usize>,
  pub offset:   Option<usize>,
}

impl ContentQuery {
  pub const DEFAULT_LIMIT: usize = 100;

  /// `true` when no filter would narrow the result set.
  pub fn is_unfiltered(&self) -> bool {
    self.text.as_deref().is_none_or(|t| t.trim().is_empty())
      && self.source.is_none()
      && self.category.is_none()
  }
}

/// What happened to one source's batch in [`ContentStore::insert_if_absent`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertOutcome {
  pub inserted:        usize,
  /// Rows whose `dedup_hash` was already in the table.
  pub already_present: usize,
}

/// Result of reading one legacy table: a record or a per-row error for each
/// row, in table order.
pub type LegacyRows = Vec<Result<LegacyRecord, RowError>>;

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the relational store holding both the legacy tables and
/// the unified `content_items` table.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait ContentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Schema ────────────────────────────────────────────────────────────

  /// Create the unified table and its unique `dedup_hash` index if missing.
  fn ensure_schema(
    &self,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Whether the legacy table for `source` exists.
  fn table_exists(
    &self,
    source: Source,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Consolidation ─────────────────────────────────────────────────────

  /// Read every row of the legacy table for `source`.
  ///
  /// Rows that cannot be decoded come back as [`RowError`]s; only a failure
  /// of the query itself is an `Err`.
  fn load_legacy(
    &self,
    source: Source,
  ) -> impl Future<Output = Result<LegacyRows, Self::Error>> + Send + '_;

  /// Insert `items` in a single transaction, skipping any whose
  /// `dedup_hash` is already present.
  ///
  /// A uniqueness conflict on `dedup_hash` is never an error. Any other
  /// failure rolls the whole batch back.
  fn insert_if_absent(
    &self,
    source: Source,
    items: Vec<NewContentItem>,
  ) -> impl Future<Output = Result<InsertOutcome, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  fn get_content(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<ContentItem>, Self::Error>> + Send + '_;

  /// All unified items ordered by `id`, optionally restricted to a source.
  fn list_content(
    &self,
    source: Option<Source>,
  ) -> impl Future<Output = Result<Vec<ContentItem>, Self::Error>> + Send + '_;

  fn count_content(
    &self,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  fn search<'a>(
    &'a self,
    query: &'a ContentQuery,
  ) -> impl Future<Output = Result<Vec<ContentItem>, Self::Error>> + Send + 'a;

  /// Up to `limit` distinct labels (title or name) starting with `prefix`,
  /// case-insensitively.
  fn suggest<'a>(
    &'a self,
    prefix: &'a str,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + 'a;
}
