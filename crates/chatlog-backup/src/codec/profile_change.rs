//! Profile name changes. Allowed in any thread; the author is the contact
//! whose name changed.

use chatlog_core::{
  address::{ContactAddress, RecipientAddress},
  record::{ChatUpdateKind, ChatUpdateRecord, InfoMessage},
  store::InteractionStore,
  thread::ChatThread,
};

use crate::{
  codec::{chat_item, new_record},
  context::{ArchivingContext, RestoringContext},
  error::{ArchiveError, ArchiveErrorKind, ChatItemId, InvalidProtoData, RestoreError},
  wire::{ChatUpdate, ChatUpdateItem, ProfileChangeChatUpdate},
};

pub(crate) fn archive(
  record: &ChatUpdateRecord,
  address: Option<&ContactAddress>,
  old_name: Option<&str>,
  new_name: Option<&str>,
  context: &ArchivingContext<'_>,
) -> Result<ChatUpdateItem, ArchiveError> {
  let address = address.ok_or_else(|| {
    ArchiveError::new(record.id, ArchiveErrorKind::ProfileChangeUpdateMissingAuthor)
  })?;
  let (Some(previous_name), Some(new_name)) = (old_name, new_name) else {
    return Err(ArchiveError::new(
      record.id,
      ArchiveErrorKind::ProfileChangeUpdateMissingNames,
    ));
  };

  let author_id = context.contact_recipient_id(address, record.id)?;
  chat_item(
    record,
    author_id,
    ChatUpdate::ProfileChange(ProfileChangeChatUpdate {
      previous_name: previous_name.to_string(),
      new_name:      new_name.to_string(),
    }),
  )
}

pub(crate) fn restore<S: InteractionStore>(
  update: &ProfileChangeChatUpdate,
  item: &ChatUpdateItem,
  thread: &ChatThread,
  context: &mut RestoringContext<'_, S>,
) -> Result<(), RestoreError> {
  let chat_item_id = ChatItemId(item.date_sent);
  let RecipientAddress::Contact(address) = context.address(item.author_id, chat_item_id)?
  else {
    return Err(RestoreError::new(
      chat_item_id,
      InvalidProtoData::ProfileChangeUpdateNotFromContact,
    ));
  };
  if update.previous_name.is_empty() || update.new_name.is_empty() {
    return Err(RestoreError::new(
      chat_item_id,
      InvalidProtoData::ProfileChangeUpdateInvalidNames,
    ));
  }

  let kind = ChatUpdateKind::Info(InfoMessage::ProfileChange {
    address:  Some(address.clone()),
    old_name: Some(update.previous_name.clone()),
    new_name: Some(update.new_name.clone()),
  });
  context.insert(new_record(item, thread, kind)?, chat_item_id)?;
  Ok(())
}
