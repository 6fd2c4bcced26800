//! Shared fixtures: a recipient table with two contacts and a group, an
//! in-memory store, and record builders.

use chatlog_core::{
  address::{ContactAddress, RecipientAddress},
  group::{GroupUpdateItem, GroupUpdateMetadata},
  id::{Aci, E164, GroupId, InteractionId, LocalIdentifiers, RecipientId, ThreadId},
  provider::SnapshotItemBuilder,
  recipient::RecipientTable,
  record::{ChatUpdateKind, ChatUpdateRecord, InfoMessage, NewChatUpdate},
  store::InteractionStore,
  thread::ChatThread,
};
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::{
  context::{ArchivingContext, RestoringContext},
  dispatcher,
  result::{ArchiveResult, RestoreResult},
  wire::ChatUpdateItem,
};

pub(crate) const LOCAL_ID: RecipientId = RecipientId(1);
pub(crate) const ALICE_ID: RecipientId = RecipientId(2);
pub(crate) const BOB_ID: RecipientId = RecipientId(3);
pub(crate) const GROUP_ID: RecipientId = RecipientId(4);

pub(crate) const SENT_AT_MS: u64 = 1_700_000_000_000;

// ─── Store ───────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub(crate) enum MemoryStoreError {
  #[error("no record with id {0}")]
  NotFound(InteractionId),
  #[error("inserts are disabled")]
  InsertsDisabled,
}

/// Records in insertion order.
#[derive(Debug, Default)]
pub(crate) struct MemoryStore {
  pub records:       Vec<ChatUpdateRecord>,
  pub reject_insert: bool,
}

impl MemoryStore {
  pub fn in_thread(&self, thread_id: ThreadId) -> Vec<&ChatUpdateRecord> {
    self.records.iter().filter(|r| r.thread_id == thread_id).collect()
  }
}

impl InteractionStore for MemoryStore {
  type Error = MemoryStoreError;

  fn insert(&mut self, record: NewChatUpdate) -> Result<ChatUpdateRecord, Self::Error> {
    if self.reject_insert {
      return Err(MemoryStoreError::InsertsDisabled);
    }
    let record = record.into_record(InteractionId::new());
    self.records.push(record.clone());
    Ok(record)
  }

  fn most_recent(&self, thread_id: ThreadId) -> Result<Option<ChatUpdateRecord>, Self::Error> {
    Ok(self.records.iter().rev().find(|r| r.thread_id == thread_id).cloned())
  }

  fn update(&mut self, record: &ChatUpdateRecord) -> Result<(), Self::Error> {
    let slot = self
      .records
      .iter_mut()
      .find(|r| r.id == record.id)
      .ok_or(MemoryStoreError::NotFound(record.id))?;
    *slot = record.clone();
    Ok(())
  }
}

// ─── Fixture ─────────────────────────────────────────────────────────────────

pub(crate) struct Fixture {
  pub local_aci:  Aci,
  pub alice_aci:  Aci,
  pub alice:      ContactAddress,
  pub bob:        ContactAddress,
  pub group_id:   GroupId,
  pub recipients: RecipientTable,
  pub store:      MemoryStore,
}

impl Fixture {
  pub fn new() -> Self {
    let local_aci = Aci(Uuid::new_v4());
    let alice_aci = Aci(Uuid::new_v4());
    let alice = ContactAddress {
      aci:  Some(alice_aci),
      pni:  None,
      e164: Some(E164::parse("+15550000001").expect("valid e164")),
    };
    let bob = ContactAddress::from_aci(Aci(Uuid::new_v4()));
    let group_id = GroupId(vec![0x42; 32]);

    let mut local = LocalIdentifiers::new(local_aci);
    local.e164 = Some(E164::parse("+15550000000").expect("valid e164"));
    let mut recipients = RecipientTable::new(local, LOCAL_ID);
    recipients
      .insert(ALICE_ID, RecipientAddress::Contact(alice.clone()))
      .expect("alice");
    recipients
      .insert(BOB_ID, RecipientAddress::Contact(bob.clone()))
      .expect("bob");
    recipients
      .insert(GROUP_ID, RecipientAddress::Group(group_id.clone()))
      .expect("group");

    Self {
      local_aci,
      alice_aci,
      alice,
      bob,
      group_id,
      recipients,
      store: MemoryStore::default(),
    }
  }

  pub fn alice_thread(&self) -> ChatThread { ChatThread::contact(self.alice.clone()) }

  pub fn group_thread(&self) -> ChatThread { ChatThread::group(self.group_id.clone()) }

  pub fn archive(
    &self,
    record: &ChatUpdateRecord,
    thread: &ChatThread,
  ) -> ArchiveResult<ChatUpdateItem> {
    let context = ArchivingContext::new(&self.recipients, &SnapshotItemBuilder, thread);
    dispatcher::archive(record, &context)
  }

  pub fn restore(&mut self, item: &ChatUpdateItem, thread: &ChatThread) -> RestoreResult<()> {
    let mut context = RestoringContext::new(&self.recipients, &mut self.store);
    dispatcher::restore(item, thread, &mut context)
  }

  /// Kinds stored in `thread`, oldest first.
  pub fn restored_kinds(&self, thread: &ChatThread) -> Vec<ChatUpdateKind> {
    self.store.in_thread(thread.id).into_iter().map(|r| r.kind.clone()).collect()
  }

  /// Items of every group update stored in `thread`, one list per record.
  pub fn restored_group_items(&self, thread: &ChatThread) -> Vec<Vec<GroupUpdateItem>> {
    self
      .restored_kinds(thread)
      .into_iter()
      .filter_map(|kind| match kind {
        ChatUpdateKind::Info(InfoMessage::GroupUpdate {
          metadata: Some(GroupUpdateMetadata::Precomputed(items)),
        }) => Some(items),
        _ => None,
      })
      .collect()
  }
}

// ─── Builders ────────────────────────────────────────────────────────────────

pub(crate) fn sent_at() -> DateTime<Utc> {
  DateTime::from_timestamp_millis(SENT_AT_MS as i64).expect("in range")
}

pub(crate) fn record(thread: &ChatThread, kind: ChatUpdateKind) -> ChatUpdateRecord {
  ChatUpdateRecord {
    id: InteractionId::new(),
    thread_id: thread.id,
    timestamp: sent_at(),
    kind,
  }
}

pub(crate) fn info(thread: &ChatThread, info: InfoMessage) -> ChatUpdateRecord {
  record(thread, ChatUpdateKind::Info(info))
}

pub(crate) fn group_update(thread: &ChatThread, items: Vec<GroupUpdateItem>) -> ChatUpdateRecord {
  info(thread, InfoMessage::GroupUpdate {
    metadata: Some(GroupUpdateMetadata::Precomputed(items)),
  })
}

pub(crate) fn chat_item(
  author_id: RecipientId,
  update: crate::wire::ChatUpdate,
) -> ChatUpdateItem {
  ChatUpdateItem { author_id, date_sent: SENT_AT_MS, update: Some(update) }
}
