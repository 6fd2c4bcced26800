//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, UUIDs hyphenated lowercase strings, and
//! payloads compact JSON.

use chrono::{DateTime, Utc};
use chatlog_core::{
  id::{InteractionId, ThreadId},
  record::{ChatUpdateKind, ChatUpdateRecord},
  thread::{ChatThread, ThreadKind},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Payloads ────────────────────────────────────────────────────────────────

pub fn encode_kind(kind: &ChatUpdateKind) -> Result<String> {
  Ok(serde_json::to_string(kind)?)
}

pub fn encode_thread_kind(kind: &ThreadKind) -> Result<String> {
  Ok(serde_json::to_string(kind)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `chat_updates` row.
pub struct RawRecord {
  pub interaction_id: String,
  pub thread_id:      String,
  pub timestamp:      String,
  pub payload_json:   String,
}

impl RawRecord {
  pub const COLUMNS: &'static str = "interaction_id, thread_id, timestamp, payload_json";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      interaction_id: row.get(0)?,
      thread_id:      row.get(1)?,
      timestamp:      row.get(2)?,
      payload_json:   row.get(3)?,
    })
  }

  pub fn into_record(self) -> Result<ChatUpdateRecord> {
    Ok(ChatUpdateRecord {
      id:        InteractionId(decode_uuid(&self.interaction_id)?),
      thread_id: ThreadId(decode_uuid(&self.thread_id)?),
      timestamp: decode_dt(&self.timestamp)?,
      kind:      serde_json::from_str(&self.payload_json)?,
    })
  }
}

/// Raw strings read directly from a `threads` row.
pub struct RawThread {
  pub thread_id: String,
  pub kind_json: String,
}

impl RawThread {
  pub fn into_thread(self) -> Result<ChatThread> {
    Ok(ChatThread {
      id:   ThreadId(decode_uuid(&self.thread_id)?),
      kind: serde_json::from_str(&self.kind_json)?,
    })
  }
}
