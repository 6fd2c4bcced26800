//! Per-pass contexts handed to every codec.

use chrono::{DateTime, Utc};

use chatlog_core::{
  address::{ContactAddress, RecipientAddress},
  id::{InteractionId, LocalIdentifiers, RecipientId},
  provider::GroupUpdateItemProvider,
  recipient::RecipientContext,
  record::{ChatUpdateRecord, NewChatUpdate},
  store::InteractionStore,
  thread::ChatThread,
};

use crate::error::{
  ArchiveError, ArchiveErrorKind, ChatItemId, InvalidProtoData, RestoreError,
  RestoreErrorKind,
};

// ─── Archiving ───────────────────────────────────────────────────────────────

/// Everything an archive call may consult: recipient lookup, the group
/// update item provider and the thread currently being exported.
#[derive(Clone, Copy)]
pub struct ArchivingContext<'a> {
  pub recipients:    &'a dyn RecipientContext,
  pub group_updates: &'a dyn GroupUpdateItemProvider,
  pub thread:        &'a ChatThread,
}

impl<'a> ArchivingContext<'a> {
  pub fn new(
    recipients: &'a dyn RecipientContext,
    group_updates: &'a dyn GroupUpdateItemProvider,
    thread: &'a ChatThread,
  ) -> Self {
    Self { recipients, group_updates, thread }
  }

  pub fn local_identifiers(&self) -> &'a LocalIdentifiers {
    self.recipients.local_identifiers()
  }

  pub fn local_recipient_id(&self) -> RecipientId { self.recipients.local_recipient_id() }

  /// Resolve `address`; an address unknown to this export is an item
  /// failure.
  pub fn recipient_id(
    &self,
    address: &RecipientAddress,
    interaction_id: InteractionId,
  ) -> Result<RecipientId, ArchiveError> {
    self.recipients.recipient_id(address).ok_or_else(|| {
      ArchiveError::new(
        interaction_id,
        ArchiveErrorKind::ReferencedRecipientMissing(address.clone()),
      )
    })
  }

  pub fn contact_recipient_id(
    &self,
    contact: &ContactAddress,
    interaction_id: InteractionId,
  ) -> Result<RecipientId, ArchiveError> {
    self.recipient_id(&RecipientAddress::Contact(contact.clone()), interaction_id)
  }
}

// ─── Restoring ───────────────────────────────────────────────────────────────

/// Recipient lookup plus the write scope restored records go into.
pub struct RestoringContext<'a, S> {
  pub recipients: &'a dyn RecipientContext,
  pub store:      &'a mut S,
}

impl<'a, S: InteractionStore> RestoringContext<'a, S> {
  pub fn new(recipients: &'a dyn RecipientContext, store: &'a mut S) -> Self {
    Self { recipients, store }
  }

  pub fn local_identifiers(&self) -> &'a LocalIdentifiers {
    self.recipients.local_identifiers()
  }

  /// Look up the address of a wire recipient id.
  pub fn address(
    &self,
    id: RecipientId,
    chat_item_id: ChatItemId,
  ) -> Result<&'a RecipientAddress, RestoreError> {
    let recipients: &'a dyn RecipientContext = self.recipients;
    recipients
      .address(id)
      .ok_or_else(|| RestoreError::new(chat_item_id, InvalidProtoData::RecipientIdNotFound(id)))
  }

  pub fn insert(
    &mut self,
    record: NewChatUpdate,
    chat_item_id: ChatItemId,
  ) -> Result<ChatUpdateRecord, RestoreError> {
    self.store.insert(record).map_err(|e| {
      RestoreError::new(chat_item_id, RestoreErrorKind::DatabaseInsertionFailed(Box::new(e)))
    })
  }
}

// ─── Timestamps ──────────────────────────────────────────────────────────────

pub(crate) fn encode_timestamp(
  timestamp: DateTime<Utc>,
  interaction_id: InteractionId,
) -> Result<u64, ArchiveError> {
  u64::try_from(timestamp.timestamp_millis())
    .map_err(|_| ArchiveError::new(interaction_id, ArchiveErrorKind::InvalidTimestamp))
}

pub(crate) fn decode_timestamp(
  date_sent: u64,
  chat_item_id: ChatItemId,
) -> Result<DateTime<Utc>, RestoreError> {
  i64::try_from(date_sent)
    .ok()
    .and_then(DateTime::from_timestamp_millis)
    .ok_or_else(|| {
      RestoreError::new(chat_item_id, InvalidProtoData::ChatItemInvalidDateSent(date_sent))
    })
}
