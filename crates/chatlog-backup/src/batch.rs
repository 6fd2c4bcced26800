//! Whole-thread export and import.
//!
//! Item-level failures are logged and collected into the summary; a fatal
//! error stops the batch and is returned as `Err`.

use std::fmt;

use chatlog_core::{record::ChatUpdateRecord, store::InteractionStore, thread::ChatThread};

use crate::{
  context::{ArchivingContext, RestoringContext},
  dispatcher,
  error::{ArchiveError, ChatItemId, RestoreError, Result},
  result::{ArchiveResult, RestoreResult},
  wire::ChatUpdateItem,
};

// ─── Archive ─────────────────────────────────────────────────────────────────

/// The chat items produced by an export, with per-outcome counts.
#[derive(Debug, Default)]
pub struct ArchiveSummary {
  pub items:   Vec<ChatUpdateItem>,
  /// Items produced with some sub-items dropped.
  pub partial: usize,
  pub failed:  usize,
  pub skipped: usize,
  pub errors:  Vec<ArchiveError>,
}

impl ArchiveSummary {
  pub fn archived(&self) -> usize { self.items.len() }

  /// Fold another thread's summary into this one.
  pub fn absorb(&mut self, other: ArchiveSummary) {
    self.items.extend(other.items);
    self.partial += other.partial;
    self.failed += other.failed;
    self.skipped += other.skipped;
    self.errors.extend(other.errors);
  }
}

impl fmt::Display for ArchiveSummary {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "archived {} chat updates ({} partial), {} failed, {} skipped",
      self.archived(),
      self.partial,
      self.failed,
      self.skipped,
    )
  }
}

/// Archive `records`, all belonging to `context.thread`, in order.
pub fn archive_all<'r>(
  records: impl IntoIterator<Item = &'r ChatUpdateRecord>,
  context: &ArchivingContext<'_>,
) -> Result<ArchiveSummary> {
  let mut summary = ArchiveSummary::default();

  for record in records {
    match dispatcher::archive(record, context) {
      ArchiveResult::Success(item) => summary.items.push(item),
      ArchiveResult::PartialSuccess(item, errors) => {
        for error in &errors {
          tracing::warn!(%error, "dropped part of a chat update");
        }
        summary.items.push(item);
        summary.partial += 1;
        summary.errors.extend(errors);
      }
      ArchiveResult::Failure(errors) => {
        for error in &errors {
          tracing::warn!(%error, "failed to archive chat update");
        }
        summary.failed += 1;
        summary.errors.extend(errors);
      }
      ArchiveResult::Skipped(reason) => {
        tracing::debug!(interaction_id = %record.id, ?reason, "skipped chat update");
        summary.skipped += 1;
      }
      ArchiveResult::Fatal(error) => {
        tracing::error!(interaction_id = %record.id, %error, "aborting export");
        return Err(error);
      }
    }
  }

  tracing::debug!(thread_id = %context.thread.id, %summary, "archived thread");
  Ok(summary)
}

// ─── Restore ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct RestoreSummary {
  pub restored:     usize,
  pub partial:      usize,
  pub failed:       usize,
  /// Items carrying a case this build does not know.
  pub unrecognized: usize,
  pub errors:       Vec<RestoreError>,
}

impl RestoreSummary {
  pub fn absorb(&mut self, other: RestoreSummary) {
    self.restored += other.restored;
    self.partial += other.partial;
    self.failed += other.failed;
    self.unrecognized += other.unrecognized;
    self.errors.extend(other.errors);
  }
}

impl fmt::Display for RestoreSummary {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "restored {} chat updates ({} partial), {} failed, {} unrecognized",
      self.restored, self.partial, self.failed, self.unrecognized,
    )
  }
}

/// Restore `items` into `thread`, in backup order.
pub fn restore_all<'i, S: InteractionStore>(
  items: impl IntoIterator<Item = &'i ChatUpdateItem>,
  thread: &ChatThread,
  context: &mut RestoringContext<'_, S>,
) -> Result<RestoreSummary> {
  let mut summary = RestoreSummary::default();

  for item in items {
    let chat_item_id = ChatItemId(item.date_sent);
    match dispatcher::restore(item, thread, context) {
      RestoreResult::Success(()) => summary.restored += 1,
      RestoreResult::PartialSuccess((), errors) => {
        for error in &errors {
          tracing::warn!(%error, "dropped part of a chat item");
        }
        summary.restored += 1;
        summary.partial += 1;
        summary.errors.extend(errors);
      }
      RestoreResult::Failure(errors) => {
        for error in &errors {
          tracing::warn!(%error, "failed to restore chat item");
        }
        summary.failed += 1;
        summary.errors.extend(errors);
      }
      RestoreResult::UnrecognizedVariant(info) => {
        tracing::debug!(%chat_item_id, oneof = info.oneof, "skipped unrecognized chat item");
        summary.unrecognized += 1;
      }
      RestoreResult::Fatal(error) => {
        tracing::error!(%chat_item_id, %error, "aborting import");
        return Err(error);
      }
    }
  }

  tracing::debug!(thread_id = %thread.id, %summary, "restored thread");
  Ok(summary)
}
