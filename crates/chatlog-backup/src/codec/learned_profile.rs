//! Learned profile names: the name a contact was displayed under before
//! their profile name became known.

use chatlog_core::{
  address::RecipientAddress,
  id::E164,
  record::{ChatUpdateKind, ChatUpdateRecord, InfoMessage, LearnedDisplayName},
  store::InteractionStore,
  thread::ChatThread,
};

use crate::{
  codec::{archived_contact, chat_item, new_record, require_contact_thread},
  context::{ArchivingContext, RestoringContext},
  error::{ArchiveError, ArchiveErrorKind, ChatItemId, InvalidProtoData, RestoreError},
  wire::{ChatUpdate, ChatUpdateItem, LearnedProfileChatUpdate, PreviousName},
};

pub(crate) fn archive(
  record: &ChatUpdateRecord,
  previous_name: Option<&LearnedDisplayName>,
  context: &ArchivingContext<'_>,
) -> Result<ChatUpdateItem, ArchiveError> {
  let fail = |kind| ArchiveError::new(record.id, kind);

  let contact = archived_contact(record, context, "learned profile")?;
  let previous_name = match previous_name {
    None => return Err(fail(ArchiveErrorKind::LearnedProfileUpdateMissingPreviousName)),
    Some(LearnedDisplayName::E164(number)) => {
      let e164 = E164::parse(number)
        .map_err(|_| fail(ArchiveErrorKind::InvalidE164(number.clone())))?;
      PreviousName::E164(e164.to_u64())
    }
    Some(LearnedDisplayName::Username(username)) => PreviousName::Username(username.clone()),
  };

  let author_id = context.contact_recipient_id(contact, record.id)?;
  chat_item(
    record,
    author_id,
    ChatUpdate::LearnedProfileChange(LearnedProfileChatUpdate {
      previous_name: Some(previous_name),
    }),
  )
}

pub(crate) fn restore<S: InteractionStore>(
  update: &LearnedProfileChatUpdate,
  item: &ChatUpdateItem,
  thread: &ChatThread,
  context: &mut RestoringContext<'_, S>,
) -> Result<(), RestoreError> {
  let chat_item_id = ChatItemId(item.date_sent);
  let fail = |reason| RestoreError::new(chat_item_id, reason);

  require_contact_thread(thread, chat_item_id, "learned profile")?;
  let RecipientAddress::Contact(_) = context.address(item.author_id, chat_item_id)? else {
    return Err(fail(InvalidProtoData::LearnedProfileUpdateNotFromContact));
  };
  let previous_name = match &update.previous_name {
    None => return Err(fail(InvalidProtoData::LearnedProfileUpdateMissingPreviousName)),
    Some(PreviousName::E164(number)) => E164::from_u64(*number)
      .map(|e164| LearnedDisplayName::E164(e164.to_string()))
      .map_err(|_| fail(InvalidProtoData::InvalidE164(*number)))?,
    Some(PreviousName::Username(username)) if username.is_empty() => {
      return Err(fail(InvalidProtoData::LearnedProfileUpdateInvalidUsername));
    }
    Some(PreviousName::Username(username)) => LearnedDisplayName::Username(username.clone()),
  };

  let kind = ChatUpdateKind::Info(InfoMessage::LearnedProfileName {
    previous_name: Some(previous_name),
  });
  context.insert(new_record(item, thread, kind)?, chat_item_id)?;
  Ok(())
}
