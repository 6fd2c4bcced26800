//! Outcomes of archiving and restoring a single chat update.

use chatlog_core::record::{LegacyErrorKind, LegacyInfoKind};

use crate::error::{ArchiveError, ChatItemId, FatalError, RestoreError};

/// Why an update was intentionally left out of a backup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
  /// A group update recorded before structured updates existed.
  LegacyGroupUpdate,
  /// Every item of a group update is reconstructible or legacy.
  OnlySkippableGroupUpdateItems,
  LegacyInfoMessage(LegacyInfoKind),
  LegacyErrorMessage(LegacyErrorKind),
}

/// A wire discriminant this build does not understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnrecognizedVariant {
  pub chat_item_id: ChatItemId,
  /// Which oneof held the unknown case.
  pub oneof:        &'static str,
}

// ─── Archive ─────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ArchiveResult<T> {
  Success(T),
  /// Some sub-items failed; `T` holds the rest.
  PartialSuccess(T, Vec<ArchiveError>),
  Failure(Vec<ArchiveError>),
  Fatal(FatalError),
  Skipped(SkipReason),
}

impl<T> ArchiveResult<T> {
  pub fn failure(error: ArchiveError) -> Self { ArchiveResult::Failure(vec![error]) }

  pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ArchiveResult<U> {
    match self {
      ArchiveResult::Success(value) => ArchiveResult::Success(f(value)),
      ArchiveResult::PartialSuccess(value, errors) => {
        ArchiveResult::PartialSuccess(f(value), errors)
      }
      ArchiveResult::Failure(errors) => ArchiveResult::Failure(errors),
      ArchiveResult::Fatal(error) => ArchiveResult::Fatal(error),
      ArchiveResult::Skipped(reason) => ArchiveResult::Skipped(reason),
    }
  }

  /// The produced value, if any.
  pub fn value(&self) -> Option<&T> {
    match self {
      ArchiveResult::Success(value) | ArchiveResult::PartialSuccess(value, _) => {
        Some(value)
      }
      _ => None,
    }
  }

  pub fn errors(&self) -> &[ArchiveError] {
    match self {
      ArchiveResult::PartialSuccess(_, errors) | ArchiveResult::Failure(errors) => {
        errors
      }
      _ => &[],
    }
  }
}

// ─── Restore ─────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum RestoreResult<T> {
  Success(T),
  PartialSuccess(T, Vec<RestoreError>),
  Failure(Vec<RestoreError>),
  Fatal(FatalError),
  /// Treated as a skip; never an error.
  UnrecognizedVariant(UnrecognizedVariant),
}

impl<T> RestoreResult<T> {
  pub fn failure(error: RestoreError) -> Self { RestoreResult::Failure(vec![error]) }

  pub fn map<U>(self, f: impl FnOnce(T) -> U) -> RestoreResult<U> {
    match self {
      RestoreResult::Success(value) => RestoreResult::Success(f(value)),
      RestoreResult::PartialSuccess(value, errors) => {
        RestoreResult::PartialSuccess(f(value), errors)
      }
      RestoreResult::Failure(errors) => RestoreResult::Failure(errors),
      RestoreResult::Fatal(error) => RestoreResult::Fatal(error),
      RestoreResult::UnrecognizedVariant(info) => RestoreResult::UnrecognizedVariant(info),
    }
  }

  /// Downgrade a success to a partial success when `errors` is non-empty.
  pub fn with_errors(self, mut errors: Vec<RestoreError>) -> Self {
    if errors.is_empty() {
      return self;
    }
    match self {
      RestoreResult::Success(value) => RestoreResult::PartialSuccess(value, errors),
      RestoreResult::PartialSuccess(value, mut existing) => {
        existing.append(&mut errors);
        RestoreResult::PartialSuccess(value, existing)
      }
      RestoreResult::Failure(mut existing) => {
        existing.append(&mut errors);
        RestoreResult::Failure(existing)
      }
      RestoreResult::UnrecognizedVariant(_) => RestoreResult::Failure(errors),
      fatal @ RestoreResult::Fatal(_) => fatal,
    }
  }

  pub fn is_success(&self) -> bool { matches!(self, RestoreResult::Success(_)) }

  pub fn errors(&self) -> &[RestoreError] {
    match self {
      RestoreResult::PartialSuccess(_, errors) | RestoreResult::Failure(errors) => {
        errors
      }
      _ => &[],
    }
  }
}
