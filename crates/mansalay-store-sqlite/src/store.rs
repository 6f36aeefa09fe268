//! [`SqliteStore`], the SQLite implementation of [`ContentStore`].

use std::path::Path;

use mansalay_core::{
  content::{ContentItem, NewContentItem, Source},
  store::{ContentQuery, ContentStore, InsertOutcome, LegacyRows},
};
use rusqlite::{OptionalExtension as _, types::Value};
use tracing::debug;

use crate::{
  Result,
  encode::{RawContentItem, RawLegacyRow, encode_dt},
  error::Error,
  schema::{CONTENT_COLUMNS, LEGACY_SCHEMA, SCHEMA, legacy_columns},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// The content store backed by a single SQLite file.
///
/// The inner connection is reference-counted, so clones share it.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and create the unified schema.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self.execute_batch(SCHEMA).await
  }

  /// Create the seven legacy section tables if they are missing.
  pub async fn bootstrap_legacy_schema(&self) -> Result<()> {
    self.execute_batch(LEGACY_SCHEMA).await
  }

  /// Run arbitrary SQL, e.g. to seed legacy tables.
  pub async fn execute_batch(&self, sql: impl Into<String>) -> Result<()> {
    let sql = sql.into();
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(&sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// Escape `%`, `_` and `\` so user text matches literally inside a `LIKE`
/// pattern using `ESCAPE '\'`.
fn escape_like(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  for ch in text.chars() {
    if matches!(ch, '%' | '_' | '\\') {
      out.push('\\');
    }
    out.push(ch);
  }
  out
}

/// Clamp a count into SQLite's integer range. SQLite reads a negative `LIMIT`
/// as unlimited and a negative `OFFSET` as zero.
fn sql_count(n: usize) -> i64 { i64::try_from(n).unwrap_or(i64::MAX) }

// ─── ContentStore impl ───────────────────────────────────────────────────────

impl ContentStore for SqliteStore {
  type Error = Error;

  // ── Schema ────────────────────────────────────────────────────────────────

  async fn ensure_schema(&self) -> Result<()> { self.init_schema().await }

  async fn table_exists(&self, source: Source) -> Result<bool> {
    let table = source.as_str();

    let exists = self
      .conn
      .call(move |conn| {
        let exists: bool = conn.query_row(
          "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
          rusqlite::params![table],
          |row| row.get(0),
        )?;
        Ok(exists)
      })
      .await?;

    Ok(exists)
  }

  // ── Consolidation ─────────────────────────────────────────────────────────

  async fn load_legacy(&self, source: Source) -> Result<LegacyRows> {
    let sql = format!(
      "SELECT {} FROM {} ORDER BY id",
      legacy_columns(source),
      source.as_str()
    );

    let raws: Vec<RawLegacyRow> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let width = stmt.column_count();
        let rows = stmt
          .query_map([], |row| {
            let values = (1..width)
              .map(|i| row.get::<_, Value>(i))
              .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(RawLegacyRow { id: row.get(0)?, values })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    debug!(%source, rows = raws.len(), "loaded legacy rows");
    Ok(raws.into_iter().map(|raw| raw.into_record(source)).collect())
  }

  async fn insert_if_absent(
    &self,
    source: Source,
    items: Vec<NewContentItem>,
  ) -> Result<InsertOutcome> {
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut outcome = InsertOutcome::default();
        {
          let mut stmt = tx.prepare(
            "INSERT INTO content_items (
               source, title, name, description, category, city, email,
               contact, lat, lng, media_type, media_path, image_url, link,
               created_at, updated_at, dedup_hash
             ) VALUES (
               ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
               ?15, ?16, ?17
             )
             ON CONFLICT (dedup_hash) DO NOTHING",
          )?;

          for item in &items {
            let changed = stmt.execute(rusqlite::params![
              item.source.as_str(),
              item.title,
              item.name,
              item.description,
              item.category,
              item.city,
              item.email,
              item.contact,
              item.lat,
              item.lng,
              item.media_type.as_str(),
              item.media_path,
              item.image_url,
              item.link,
              encode_dt(item.created_at),
              encode_dt(item.updated_at),
              item.dedup_hash,
            ])?;

            if changed == 0 {
              outcome.already_present += 1;
            } else {
              outcome.inserted += 1;
            }
          }
        }
        tx.commit()?;
        Ok(outcome)
      })
      .await?;

    debug!(
      %source,
      inserted = outcome.inserted,
      already_present = outcome.already_present,
      "committed content batch"
    );
    Ok(outcome)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get_content(&self, id: i64) -> Result<Option<ContentItem>> {
    let raw: Option<RawContentItem> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {CONTENT_COLUMNS} FROM content_items WHERE id = ?1"),
              rusqlite::params![id],
              RawContentItem::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawContentItem::into_content_item).transpose()
  }

  async fn list_content(&self, source: Option<Source>) -> Result<Vec<ContentItem>> {
    let source_str = source.map(Source::as_str);

    let raws: Vec<RawContentItem> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CONTENT_COLUMNS} FROM content_items
           WHERE ?1 IS NULL OR source = ?1
           ORDER BY id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![source_str], RawContentItem::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawContentItem::into_content_item).collect()
  }

  async fn count_content(&self) -> Result<usize> {
    let count: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM content_items", [], |row| row.get(0))?)
      })
      .await?;

    Ok(count.try_into().unwrap_or_default())
  }

  async fn search(&self, query: &ContentQuery) -> Result<Vec<ContentItem>> {
    let text_pattern = query
      .text
      .as_deref()
      .map(str::trim)
      .filter(|t| !t.is_empty())
      .map(|t| format!("%{}%", escape_like(&t.to_lowercase())));
    let source_str = query.source.map(Source::as_str);
    let category = query.category.clone();
    let limit_val = sql_count(query.limit.unwrap_or(ContentQuery::DEFAULT_LIMIT));
    let offset_val = sql_count(query.offset.unwrap_or(0));

    let raws: Vec<RawContentItem> = self
      .conn
      .call(move |conn| {
        // Build WHERE clause dynamically.
        let mut conds: Vec<&'static str> = vec![];
        if text_pattern.is_some() {
          conds.push(
            "(LOWER(COALESCE(title, '')) LIKE ?1 ESCAPE '\\'
              OR LOWER(COALESCE(name, '')) LIKE ?1 ESCAPE '\\')",
          );
        }
        if source_str.is_some() {
          conds.push("source = ?2");
        }
        if category.is_some() {
          conds.push("category = ?3");
        }

        let where_clause = if conds.is_empty() {
          String::new()
        } else {
          format!("WHERE {}", conds.join(" AND "))
        };

        let sql = format!(
          "SELECT {CONTENT_COLUMNS}
           FROM content_items
           {where_clause}
           ORDER BY id
           LIMIT ?4 OFFSET ?5"
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![
              text_pattern.as_deref(),
              source_str,
              category.as_deref(),
              limit_val,
              offset_val,
            ],
            RawContentItem::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawContentItem::into_content_item).collect()
  }

  async fn suggest(&self, prefix: &str, limit: usize) -> Result<Vec<String>> {
    let pattern = format!("{}%", escape_like(&prefix.trim().to_lowercase()));
    let limit_val = sql_count(limit);

    let labels = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT DISTINCT COALESCE(title, name) AS label
           FROM content_items
           WHERE COALESCE(title, name) IS NOT NULL
             AND LOWER(COALESCE(title, name)) LIKE ?1 ESCAPE '\\'
           ORDER BY label
           LIMIT ?2",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![pattern, limit_val], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(labels)
  }
}

#[cfg(test)]
mod tests {
  use super::{escape_like, sql_count};

  #[test]
  fn escape_like_escapes_wildcards() {
    assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    assert_eq!(escape_like("blue lagoon"), "blue lagoon");
  }

  #[test]
  fn sql_count_saturates() {
    assert_eq!(sql_count(25), 25);
    assert_eq!(sql_count(usize::MAX), i64::MAX);
  }
}
