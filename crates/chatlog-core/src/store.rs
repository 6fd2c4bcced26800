//! The `InteractionStore` trait: the persistence layer the restore path
//! writes through.
//!
//! Implemented by storage backends (e.g. `chatlog-store-sqlite`). An
//! implementation represents one write transaction for the duration of an
//! import; the codec assumes exclusive access to it.

use crate::{
  id::ThreadId,
  record::{ChatUpdateRecord, NewChatUpdate},
};

pub trait InteractionStore {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a new record and return it with its assigned id.
  fn insert(&mut self, record: NewChatUpdate) -> Result<ChatUpdateRecord, Self::Error>;

  /// The most recently inserted record in `thread_id`, if that record is a
  /// chat update.
  fn most_recent(
    &self,
    thread_id: ThreadId,
  ) -> Result<Option<ChatUpdateRecord>, Self::Error>;

  /// Overwrite the payload of an existing record, keeping its id and
  /// position.
  fn update(&mut self, record: &ChatUpdateRecord) -> Result<(), Self::Error>;
}
