//! Session switchovers: a contact's session moved to a new phone number.
//! 1:1 threads only; authored by the thread's contact.

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
  wire::{ChatUpdate, ChatUpdateItem, SessionSwitchoverChatUpdate},
};

pub(crate) fn archive(
  record: &ChatUpdateRecord,
  phone_number: Option<&str>,
  context: &ArchivingContext<'_>,
) -> Result<ChatUpdateItem, ArchiveError> {
  let contact = archived_contact(record, context, "session switchover")?;
  let phone_number = phone_number.ok_or_else(|| {
    ArchiveError::new(
      record.id,
      ArchiveErrorKind::SessionSwitchoverUpdateMissingPhoneNumber,
    )
  })?;
  let e164 = E164::parse(phone_number).map_err(|_| {
    ArchiveError::new(record.id, ArchiveErrorKind::InvalidE164(phone_number.to_string()))
  })?;

  let author_id = context.contact_recipient_id(contact, record.id)?;
  chat_item(
    record,
    author_id,
    ChatUpdate::SessionSwitchover(SessionSwitchoverChatUpdate { e164: e164.to_u64() }),
  )
}

pub(crate) fn restore<S: InteractionStore>(
  update: &SessionSwitchoverChatUpdate,
  item: &ChatUpdateItem,
  thread: &ChatThread,
  context: &mut RestoringContext<'_, S>,
) -> Result<(), RestoreError> {
  let chat_item_id = ChatItemId(item.date_sent);
  require_contact_thread(thread, chat_item_id, "session switchover")?;
  if !matches!(
    context.address(item.author_id, chat_item_id)?,
    RecipientAddress::Contact(_)
  ) {
    return Err(RestoreError::new(
      chat_item_id,
      InvalidProtoData::SessionSwitchoverUpdateNotFromContact,
    ));
  }
  let e164 = E164::from_u64(update.e164)
    .map_err(|_| RestoreError::new(chat_item_id, InvalidProtoData::InvalidE164(update.e164)))?;

  let kind = ChatUpdateKind::Info(InfoMessage::SessionSwitchover {
    phone_number: Some(e164.to_string()),
  });
  context.insert(new_record(item, thread, kind)?, chat_item_id)?;
  Ok(())
}
