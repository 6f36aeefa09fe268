//! Error type for `mansalay-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A `content_items` row holds a value the domain types cannot represent.
  #[error("corrupt content row {id}: {reason}")]
  CorruptRow { id: i64, reason: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
