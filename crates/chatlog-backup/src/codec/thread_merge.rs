//! Thread merges: two threads for the same contact were combined. 1:1
//! threads only; authored by the thread's contact.

use chatlog_core::{
  address::RecipientAddress,
  id::E164,
  record::{ChatUpdateKind, ChatUpdateRecord, InfoMessage},
  store::InteractionStore,
  thread::ChatThread,
};

use crate::{
  codec::{archived_contact, chat_item, new_record, require_contact_thread},
  context::{ArchivingContext, RestoringContext},
  error::{ArchiveError, ArchiveErrorKind, ChatItemId, InvalidProtoData, RestoreError},
  wire::{ChatUpdate, ChatUpdateItem, ThreadMergeChatUpdate},
};

pub(crate) fn archive(
  record: &ChatUpdateRecord,
  previous_phone_number: Option<&str>,
  context: &ArchivingContext<'_>,
) -> Result<ChatUpdateItem, ArchiveError> {
  let contact = archived_contact(record, context, "thread merge")?;
  let Some(previous) = previous_phone_number else {
    return Err(ArchiveError::new(
      record.id,
      ArchiveErrorKind::ThreadMergeUpdateMissingPhoneNumber,
    ));
  };
  let previous_e164 = E164::parse(previous)
    .map_err(|_| ArchiveError::new(record.id, ArchiveErrorKind::InvalidE164(previous.into())))?
    .to_u64();

  let author_id = context.contact_recipient_id(contact, record.id)?;
  chat_item(
    record,
    author_id,
    ChatUpdate::ThreadMerge(ThreadMergeChatUpdate { previous_e164 }),
  )
}

pub(crate) fn restore<S: InteractionStore>(
  update: &ThreadMergeChatUpdate,
  item: &ChatUpdateItem,
  thread: &ChatThread,
  context: &mut RestoringContext<'_, S>,
) -> Result<(), RestoreError> {
  let chat_item_id = ChatItemId(item.date_sent);
  require_contact_thread(thread, chat_item_id, "thread merge")?;
  let RecipientAddress::Contact(_) = context.address(item.author_id, chat_item_id)? else {
    return Err(RestoreError::new(
      chat_item_id,
      InvalidProtoData::ThreadMergeUpdateNotFromContact,
    ));
  };
  let previous = E164::from_u64(update.previous_e164).map_err(|_| {
    RestoreError::new(chat_item_id, InvalidProtoData::InvalidE164(update.previous_e164))
  })?;

  let kind = ChatUpdateKind::Info(InfoMessage::ThreadMerge {
    previous_phone_number: Some(previous.to_string()),
  });
  context.insert(new_record(item, thread, kind)?, chat_item_id)?;
  Ok(())
}
