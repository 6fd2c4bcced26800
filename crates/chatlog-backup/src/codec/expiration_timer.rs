//! Disappearing-message timer changes in 1:1 threads.
//!
//! The author is the local user when the timer was configured locally and
//! the thread's contact otherwise. A duration of zero on the wire means the
//! timer is off.

use chatlog_core::{
  address::RecipientAddress,
  record::{ChatUpdateKind, ChatUpdateRecord, InfoMessage},
  store::InteractionStore,
  thread::{ChatThread, ThreadKind},
};

use crate::{
  codec::{chat_item, new_record},
  context::{ArchivingContext, RestoringContext},
  error::{ArchiveError, ArchiveErrorKind, ChatItemId, InvalidProtoData, RestoreError},
  wire::{ChatUpdate, ChatUpdateItem, ExpirationTimerChatUpdate},
};

pub(crate) fn archive(
  record: &ChatUpdateRecord,
  enabled: bool,
  duration_ms: u64,
  configured_by_local_user: bool,
  context: &ArchivingContext<'_>,
) -> Result<ChatUpdateItem, ArchiveError> {
  let author_id = match &context.thread.kind {
    ThreadKind::Group(_) => {
      return Err(ArchiveError::new(
        record.id,
        ArchiveErrorKind::DisappearingMessageConfigUpdateNotInContactThread,
      ));
    }
    ThreadKind::NoteToSelf => context.local_recipient_id(),
    ThreadKind::Contact(_) if configured_by_local_user => context.local_recipient_id(),
    ThreadKind::Contact(contact) => context.contact_recipient_id(contact, record.id)?,
  };

  let expires_in_ms = if enabled { duration_ms } else { 0 };
  chat_item(
    record,
    author_id,
    ChatUpdate::ExpirationTimerChange(ExpirationTimerChatUpdate { expires_in_ms }),
  )
}

pub(crate) fn restore<S: InteractionStore>(
  update: &ExpirationTimerChatUpdate,
  item: &ChatUpdateItem,
  thread: &ChatThread,
  context: &mut RestoringContext<'_, S>,
) -> Result<(), RestoreError> {
  let chat_item_id = ChatItemId(item.date_sent);
  if thread.is_group() {
    return Err(RestoreError::new(
      chat_item_id,
      InvalidProtoData::ExpirationTimerUpdateNotInContactThread,
    ));
  }

  let configured_by_local_user = match context.address(item.author_id, chat_item_id)? {
    RecipientAddress::LocalUser => true,
    RecipientAddress::Contact(_) => false,
    _ => {
      return Err(RestoreError::new(
        chat_item_id,
        InvalidProtoData::ExpirationTimerUpdateNotFromContact,
      ));
    }
  };

  let kind = ChatUpdateKind::Info(InfoMessage::DisappearingTimer {
    enabled: update.expires_in_ms > 0,
    duration_ms: update.expires_in_ms,
    configured_by_local_user,
  });
  context.insert(new_record(item, thread, kind)?, chat_item_id)?;
  Ok(())
}
