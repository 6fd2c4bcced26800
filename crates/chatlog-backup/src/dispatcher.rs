//! Routing of chat updates to their codec.

use chatlog_core::{
  record::{ChatUpdateKind, ChatUpdateRecord, InfoMessage},
  store::InteractionStore,
  thread::ChatThread,
};

use crate::{
  codec::{
    expiration_timer, group, learned_profile, profile_change, session_switchover, simple,
    thread_merge,
  },
  context::{ArchivingContext, RestoringContext},
  error::{ArchiveError, ChatItemId, RestoreError},
  result::{ArchiveResult, RestoreResult, UnrecognizedVariant},
  wire::{ChatUpdate, ChatUpdateItem},
};

impl<T> From<Result<T, ArchiveError>> for ArchiveResult<T> {
  fn from(result: Result<T, ArchiveError>) -> Self {
    match result {
      Ok(value) => ArchiveResult::Success(value),
      Err(error) => ArchiveResult::failure(error),
    }
  }
}

impl<T> From<Result<T, RestoreError>> for RestoreResult<T> {
  fn from(result: Result<T, RestoreError>) -> Self {
    match result {
      Ok(value) => RestoreResult::Success(value),
      Err(error) => RestoreResult::failure(error),
    }
  }
}

/// Archive one chat-update record of `context.thread`.
pub fn archive(
  record: &ChatUpdateRecord,
  context: &ArchivingContext<'_>,
) -> ArchiveResult<ChatUpdateItem> {
  let ChatUpdateKind::Info(info) = &record.kind else {
    return simple::archive(record, context);
  };

  match info {
    InfoMessage::GroupUpdate { metadata } => group::archive(record, metadata.as_ref(), context),
    InfoMessage::DisappearingTimer { enabled, duration_ms, configured_by_local_user } => {
      expiration_timer::archive(record, *enabled, *duration_ms, *configured_by_local_user, context)
        .into()
    }
    InfoMessage::ProfileChange { address, old_name, new_name } => profile_change::archive(
      record,
      address.as_ref(),
      old_name.as_deref(),
      new_name.as_deref(),
      context,
    )
    .into(),
    InfoMessage::SessionSwitchover { phone_number } => {
      session_switchover::archive(record, phone_number.as_deref(), context).into()
    }
    InfoMessage::ThreadMerge { previous_phone_number } => {
      thread_merge::archive(record, previous_phone_number.as_deref(), context).into()
    }
    InfoMessage::LearnedProfileName { previous_name } => {
      learned_profile::archive(record, previous_name.as_ref(), context).into()
    }
    _ => simple::archive(record, context),
  }
}

/// Restore one wire chat item into `thread`.
pub fn restore<S: InteractionStore>(
  item: &ChatUpdateItem,
  thread: &ChatThread,
  context: &mut RestoringContext<'_, S>,
) -> RestoreResult<()> {
  let unrecognized = || {
    RestoreResult::UnrecognizedVariant(UnrecognizedVariant {
      chat_item_id: ChatItemId(item.date_sent),
      oneof:        "chat_update",
    })
  };
  let Some(update) = &item.update else {
    return unrecognized();
  };

  match update {
    ChatUpdate::SimpleUpdate(update) => simple::restore(update, item, thread, context).into(),
    ChatUpdate::GroupChange(update) => group::restore(update, item, thread, context),
    ChatUpdate::ExpirationTimerChange(update) => {
      expiration_timer::restore(update, item, thread, context).into()
    }
    ChatUpdate::ProfileChange(update) => {
      profile_change::restore(update, item, thread, context).into()
    }
    ChatUpdate::ThreadMerge(update) => thread_merge::restore(update, item, thread, context).into(),
    ChatUpdate::SessionSwitchover(update) => {
      session_switchover::restore(update, item, thread, context).into()
    }
    ChatUpdate::LearnedProfileChange(update) => {
      learned_profile::restore(update, item, thread, context).into()
    }
    ChatUpdate::Unrecognized => unrecognized(),
  }
}
