//! One codec per chat-update family.
//!
//! Each codec exposes an `archive` and a `restore` function. Narrow codecs
//! report through plain `Result`s; the dispatcher lifts them into
//! [`ArchiveResult`](crate::result::ArchiveResult) and
//! [`RestoreResult`](crate::result::RestoreResult).

pub(crate) mod collapse;
pub(crate) mod expiration_timer;
pub(crate) mod group;
pub(crate) mod learned_profile;
pub(crate) mod profile_change;
pub(crate) mod session_switchover;
pub(crate) mod simple;
pub(crate) mod thread_merge;

use chatlog_core::{
  address::ContactAddress,
  record::{ChatUpdateKind, ChatUpdateRecord, NewChatUpdate},
  id::RecipientId,
  thread::ChatThread,
};

use crate::{
  context::{ArchivingContext, decode_timestamp, encode_timestamp},
  error::{ArchiveError, ArchiveErrorKind, ChatItemId, InvalidProtoData, RestoreError},
  wire::{ChatUpdate, ChatUpdateItem},
};

/// Wrap an encoded update into a chat item stamped with the record's time.
pub(crate) fn chat_item(
  record: &ChatUpdateRecord,
  author_id: RecipientId,
  update: ChatUpdate,
) -> Result<ChatUpdateItem, ArchiveError> {
  Ok(ChatUpdateItem {
    author_id,
    date_sent: encode_timestamp(record.timestamp, record.id)?,
    update: Some(update),
  })
}

/// Build the record a restored chat item becomes.
pub(crate) fn new_record(
  item: &ChatUpdateItem,
  thread: &ChatThread,
  kind: ChatUpdateKind,
) -> Result<NewChatUpdate, RestoreError> {
  Ok(NewChatUpdate {
    thread_id: thread.id,
    timestamp: decode_timestamp(item.date_sent, ChatItemId(item.date_sent))?,
    kind,
  })
}

/// The contact of the 1:1 thread being archived, or a failure naming
/// `update`.
pub(crate) fn archived_contact<'a>(
  record: &ChatUpdateRecord,
  context: &ArchivingContext<'a>,
  update: &'static str,
) -> Result<&'a ContactAddress, ArchiveError> {
  context.thread.contact_address().ok_or_else(|| {
    ArchiveError::new(record.id, ArchiveErrorKind::ChatUpdateNotInContactThread { update })
  })
}

/// The contact of a 1:1 thread, or a restore failure naming `update`.
pub(crate) fn require_contact_thread<'t>(
  thread: &'t ChatThread,
  chat_item_id: ChatItemId,
  update: &'static str,
) -> Result<&'t ContactAddress, RestoreError> {
  thread.contact_address().ok_or_else(|| {
    RestoreError::new(chat_item_id, InvalidProtoData::ChatUpdateNotInContactThread { update })
  })
}
