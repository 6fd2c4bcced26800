//! [`SqliteStore`]: the SQLite implementation of [`InteractionStore`].

use std::path::Path;

use rusqlite::{Connection, OptionalExtension as _};

use chatlog_core::{
  id::{InteractionId, ThreadId},
  record::{ChatUpdateRecord, NewChatUpdate},
  store::InteractionStore,
  thread::ChatThread,
};

use crate::{
  Error, Result,
  encode::{RawRecord, RawThread, encode_dt, encode_kind, encode_thread_kind, encode_uuid},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A chat-update store backed by a single SQLite file.
pub struct SqliteStore {
  conn: Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub fn open(path: impl AsRef<Path>) -> Result<Self> {
    let store = Self { conn: Connection::open(path)? };
    store.init_schema()?;
    Ok(store)
  }

  /// Open an in-memory store; useful for testing.
  pub fn open_in_memory() -> Result<Self> {
    let store = Self { conn: Connection::open_in_memory()? };
    store.init_schema()?;
    Ok(store)
  }

  fn init_schema(&self) -> Result<()> {
    self.conn.execute_batch(SCHEMA)?;
    Ok(())
  }

  /// Begin the write scope an import runs in. Nothing is visible until
  /// [`SqliteTransaction::commit`]; dropping the transaction rolls back.
  pub fn transaction(&mut self) -> Result<SqliteTransaction<'_>> {
    Ok(SqliteTransaction { tx: self.conn.transaction()? })
  }

  /// Register `thread`. Registering the same thread twice is a no-op.
  pub fn add_thread(&self, thread: &ChatThread) -> Result<()> { add_thread(&self.conn, thread) }

  /// Every known thread, in no particular order.
  pub fn threads(&self) -> Result<Vec<ChatThread>> {
    let mut stmt = self.conn.prepare("SELECT thread_id, kind_json FROM threads")?;
    let raws = stmt
      .query_map([], |row| {
        Ok(RawThread {
          thread_id: row.get(0)?,
          kind_json: row.get(1)?,
        })
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    raws.into_iter().map(RawThread::into_thread).collect()
  }

  /// The records of `thread_id` in timeline order.
  pub fn records_in_thread(&self, thread_id: ThreadId) -> Result<Vec<ChatUpdateRecord>> {
    let sql = format!(
      "SELECT {} FROM chat_updates WHERE thread_id = ?1 ORDER BY seq",
      RawRecord::COLUMNS
    );
    let mut stmt = self.conn.prepare(&sql)?;
    let raws = stmt
      .query_map(rusqlite::params![encode_uuid(thread_id.0)], RawRecord::from_row)?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    raws.into_iter().map(RawRecord::into_record).collect()
  }
}

impl InteractionStore for SqliteStore {
  type Error = Error;

  fn insert(&mut self, record: NewChatUpdate) -> Result<ChatUpdateRecord> {
    insert(&self.conn, record)
  }

  fn most_recent(&self, thread_id: ThreadId) -> Result<Option<ChatUpdateRecord>> {
    most_recent(&self.conn, thread_id)
  }

  fn update(&mut self, record: &ChatUpdateRecord) -> Result<()> { update(&self.conn, record) }
}

// ─── Transaction ─────────────────────────────────────────────────────────────

/// An open write transaction on a [`SqliteStore`].
pub struct SqliteTransaction<'c> {
  tx: rusqlite::Transaction<'c>,
}

impl SqliteTransaction<'_> {
  pub fn add_thread(&self, thread: &ChatThread) -> Result<()> { add_thread(&self.tx, thread) }

  pub fn commit(self) -> Result<()> {
    self.tx.commit()?;
    Ok(())
  }
}

impl InteractionStore for SqliteTransaction<'_> {
  type Error = Error;

  fn insert(&mut self, record: NewChatUpdate) -> Result<ChatUpdateRecord> {
    insert(&self.tx, record)
  }

  fn most_recent(&self, thread_id: ThreadId) -> Result<Option<ChatUpdateRecord>> {
    most_recent(&self.tx, thread_id)
  }

  fn update(&mut self, record: &ChatUpdateRecord) -> Result<()> { update(&self.tx, record) }
}

// ─── Queries ─────────────────────────────────────────────────────────────────

fn add_thread(conn: &Connection, thread: &ChatThread) -> Result<()> {
  conn.execute(
    "INSERT OR IGNORE INTO threads (thread_id, kind_json) VALUES (?1, ?2)",
    rusqlite::params![encode_uuid(thread.id.0), encode_thread_kind(&thread.kind)?],
  )?;
  Ok(())
}

fn insert(conn: &Connection, record: NewChatUpdate) -> Result<ChatUpdateRecord> {
  let record = record.into_record(InteractionId::new());

  conn.execute(
    "INSERT INTO chat_updates (interaction_id, thread_id, timestamp, kind, payload_json)
     VALUES (?1, ?2, ?3, ?4, ?5)",
    rusqlite::params![
      encode_uuid(record.id.0),
      encode_uuid(record.thread_id.0),
      encode_dt(record.timestamp),
      record.kind.name(),
      encode_kind(&record.kind)?,
    ],
  )?;
  tracing::trace!(interaction_id = %record.id, kind = record.kind.name(), "inserted chat update");

  Ok(record)
}

fn most_recent(conn: &Connection, thread_id: ThreadId) -> Result<Option<ChatUpdateRecord>> {
  let sql = format!(
    "SELECT {} FROM chat_updates WHERE thread_id = ?1 ORDER BY seq DESC LIMIT 1",
    RawRecord::COLUMNS
  );
  let raw = conn
    .query_row(&sql, rusqlite::params![encode_uuid(thread_id.0)], RawRecord::from_row)
    .optional()?;
  raw.map(RawRecord::into_record).transpose()
}

fn update(conn: &Connection, record: &ChatUpdateRecord) -> Result<()> {
  let changed = conn.execute(
    "UPDATE chat_updates SET kind = ?2, payload_json = ?3 WHERE interaction_id = ?1",
    rusqlite::params![
      encode_uuid(record.id.0),
      record.kind.name(),
      encode_kind(&record.kind)?,
    ],
  )?;
  if changed == 0 {
    return Err(Error::RecordNotFound(record.id));
  }
  Ok(())
}
