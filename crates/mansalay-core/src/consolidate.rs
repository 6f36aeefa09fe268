//! The content consolidator.
//!
//! Copies every row of the seven legacy tables into `content_items`, keyed by
//! fingerprint, so that any number of runs leaves exactly one unified row per
//! logical legacy row.
//!
//! Each source is committed in its own transaction. A source that fails to
//! load or insert is logged, reported as [`SourceStatus::Failed`] and leaves
//! no partial rows behind; the sources that succeeded stay committed. Only a
//! failure to create the unified schema aborts the run.

use std::{collections::HashSet, sync::Arc};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
  content::{NewContentItem, Source},
  store::ContentStore,
};

// ─── Errors ──────────────────────────────────────────────────────────────────

/// A failure that stops the run before any source is processed.
#[derive(Debug, Error)]
pub enum ConsolidateError {
  #[error("failed to create the unified content schema: {0}")]
  Schema(#[source] Box<dyn std::error::Error + Send + Sync>),
}

// ─── Report ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceStatus {
  /// The legacy table was read and its batch committed.
  Migrated,
  /// The legacy table does not exist.
  Skipped,
  /// Loading or inserting failed; nothing from this source was committed.
  Failed { reason: String },
}

/// Per-source counters for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceReport {
  pub source:          Source,
  #[serde(flatten)]
  pub status:          SourceStatus,
  /// Rows returned by the legacy table, including rejected ones.
  pub read:            usize,
  /// Rows that failed to decode and were skipped.
  pub rejected:        usize,
  /// Rows that shared a fingerprint with an earlier row of the same table.
  pub duplicates:      usize,
  pub inserted:        usize,
  pub already_present: usize,
}

impl SourceReport {
  fn new(source: Source, status: SourceStatus) -> Self {
    Self {
      source,
      status,
      read: 0,
      rejected: 0,
      duplicates: 0,
      inserted: 0,
      already_present: 0,
    }
  }
}

/// Outcome of [`Consolidator::run`], one entry per source in visiting order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidationReport {
  pub sources: Vec<SourceReport>,
}

impl ConsolidationReport {
  pub fn source(&self, source: Source) -> Option<&SourceReport> {
    self.sources.iter().find(|r| r.source == source)
  }

  pub fn inserted(&self) -> usize { self.sources.iter().map(|r| r.inserted).sum() }

  pub fn already_present(&self) -> usize {
    self.sources.iter().map(|r| r.already_present).sum()
  }

  pub fn rejected(&self) -> usize { self.sources.iter().map(|r| r.rejected).sum() }

  pub fn failed(&self) -> impl Iterator<Item = &SourceReport> {
    self
      .sources
      .iter()
      .filter(|r| matches!(r.status, SourceStatus::Failed { .. }))
  }
}

// ─── Consolidator ────────────────────────────────────────────────────────────

/// Runs the legacy → unified migration against an injected store.
pub struct Consolidator<S> {
  store: Arc<S>,
}

impl<S: ContentStore> Consolidator<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Consolidate every source, stamping missing timestamps with the current
  /// time.
  pub async fn run(&self) -> Result<ConsolidationReport, ConsolidateError> {
    self.run_at(Utc::now()).await
  }

  /// As [`Self::run`], with an explicit clock reading for rows that carry no
  /// timestamp of their own.
  pub async fn run_at(
    &self,
    now: DateTime<Utc>,
  ) -> Result<ConsolidationReport, ConsolidateError> {
    self
      .store
      .ensure_schema()
      .await
      .map_err(|e| ConsolidateError::Schema(Box::new(e)))?;

    let mut report = ConsolidationReport::default();
    for source in Source::ALL {
      let source_report = self.consolidate_source(source, now).await;
      match &source_report.status {
        SourceStatus::Migrated => info!(
          %source,
          read = source_report.read,
          rejected = source_report.rejected,
          inserted = source_report.inserted,
          already_present = source_report.already_present,
          "consolidated source"
        ),
        SourceStatus::Skipped => {
          info!(%source, "legacy table not found, skipping")
        }
        SourceStatus::Failed { reason } => {
          warn!(%source, %reason, "failed to consolidate source")
        }
      }
      report.sources.push(source_report);
    }

    info!(
      inserted = report.inserted(),
      already_present = report.already_present(),
      rejected = report.rejected(),
      failed = report.failed().count(),
      "content consolidation finished"
    );

    Ok(report)
  }

  async fn consolidate_source(
    &self,
    source: Source,
    now: DateTime<Utc>,
  ) -> SourceReport {
    let failed = |reason: String| {
      SourceReport::new(source, SourceStatus::Failed { reason })
    };

    match self.store.table_exists(source).await {
      Ok(true) => {}
      Ok(false) => return SourceReport::new(source, SourceStatus::Skipped),
      Err(e) => return failed(e.to_string()),
    }

    let rows = match self.store.load_legacy(source).await {
      Ok(rows) => rows,
      Err(e) => return failed(e.to_string()),
    };

    let mut report = SourceReport::new(source, SourceStatus::Migrated);
    report.read = rows.len();

    let mut seen = HashSet::new();
    let mut batch: Vec<NewContentItem> = Vec::with_capacity(rows.len());
    for row in rows {
      let record = match row {
        Ok(record) => record,
        Err(e) => {
          warn!(error = %e, "rejecting legacy row");
          report.rejected += 1;
          continue;
        }
      };

      let item = record.into_content_item(now);
      if !seen.insert(item.dedup_hash.clone()) {
        debug!(%source, dedup_hash = %item.dedup_hash, "duplicate row in legacy table");
        report.duplicates += 1;
        continue;
      }
      batch.push(item);
    }

    match self.store.insert_if_absent(source, batch).await {
      Ok(outcome) => {
        report.inserted = outcome.inserted;
        report.already_present = outcome.already_present;
        report
      }
      Err(e) => {
        report.status = SourceStatus::Failed { reason: e.to_string() };
        report
      }
    }
  }
}
