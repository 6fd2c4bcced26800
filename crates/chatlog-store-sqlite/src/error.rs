//! Error type for `chatlog-store-sqlite`.

use chatlog_core::id::InteractionId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// Attempted to update a record that was never inserted.
  #[error("record not found: {0}")]
  RecordNotFound(InteractionId),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
