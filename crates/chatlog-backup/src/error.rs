//! Error types for `chatlog-backup`.
//!
//! Item-level problems are values ([`ArchiveError`], [`RestoreError`])
//! carried inside results so one bad update never aborts a whole backup.
//! Only [`FatalError`] stops the batch.

use std::fmt;

use chatlog_core::{
  address::RecipientAddress,
  id::{InteractionId, RecipientId},
};
use thiserror::Error;

/// Identifies a chat item in a backup by its sent timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChatItemId(pub u64);

impl fmt::Display for ChatItemId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "chat item @{}", self.0)
  }
}

// ─── Fatal ───────────────────────────────────────────────────────────────────

/// An internal invariant was violated. The enclosing export or import must
/// stop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FatalError {
  #[error("chat update backup: developer error: {0}")]
  DeveloperError(String),
}

// ─── Archive ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArchiveErrorKind {
  #[error("group update has no archivable items")]
  EmptyGroupUpdate,

  #[error("referenced recipient is not part of this backup: {0:?}")]
  ReferencedRecipientMissing(RecipientAddress),

  #[error("timestamp is outside the representable range")]
  InvalidTimestamp,

  #[error("group update item {item} references an invalid ACI")]
  InvalidGroupMemberAci { item: &'static str },

  #[error("sequence of requests and cancels names the local user")]
  SequenceOfRequestsAndCancelsWithLocalAci,

  #[error("group disappearing timer enabled with a zero duration")]
  GroupTimerEnabledWithoutDuration,

  #[error("unnamed invite revocation claims {0} invitees")]
  TooManyUnnamedRevokedInvitees(u32),

  #[error("verification state update is missing its recipient")]
  VerificationStateUpdateMissingAuthor,

  #[error("phone number change is missing the changed user")]
  PhoneNumberChangeMissingAuthor,

  #[error("payment activation request is missing its sender")]
  PaymentActivationRequestMissingAuthor,

  #[error("payments activated update is missing its sender")]
  PaymentsActivatedMissingAuthor,

  #[error("identity key change is missing its recipient")]
  IdentityKeyChangeMissingAuthor,

  #[error("decryption error is missing its sender")]
  DecryptionErrorMissingAuthor,

  #[error("{update} update found outside a 1:1 thread")]
  ChatUpdateNotInContactThread { update: &'static str },

  #[error("disappearing message timer update found outside a 1:1 thread")]
  DisappearingMessageConfigUpdateNotInContactThread,

  #[error("profile change is missing its author")]
  ProfileChangeUpdateMissingAuthor,

  #[error("profile change is missing a name")]
  ProfileChangeUpdateMissingNames,

  #[error("thread merge update is missing the previous phone number")]
  ThreadMergeUpdateMissingPhoneNumber,

  #[error("session switchover update is missing the phone number")]
  SessionSwitchoverUpdateMissingPhoneNumber,

  #[error("learned profile update is missing the previous name")]
  LearnedProfileUpdateMissingPreviousName,

  #[error("stored phone number is not valid E.164: {0:?}")]
  InvalidE164(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("interaction {interaction_id}: {kind}")]
pub struct ArchiveError {
  pub interaction_id: InteractionId,
  pub kind:           ArchiveErrorKind,
}

impl ArchiveError {
  pub fn new(interaction_id: InteractionId, kind: ArchiveErrorKind) -> Self {
    Self { interaction_id, kind }
  }
}

// ─── Restore ─────────────────────────────────────────────────────────────────

/// The backup contents are malformed or inconsistent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidProtoData {
  #[error("invalid ACI in {field}")]
  InvalidAci { field: &'static str },

  #[error("invalid PNI in {field}")]
  InvalidPni { field: &'static str },

  #[error("invalid service id in {field}")]
  InvalidServiceId { field: &'static str },

  #[error("{0} is not a valid E.164 number")]
  InvalidE164(u64),

  #[error("recipient {0} was not found")]
  RecipientIdNotFound(RecipientId),

  #[error("date sent {0} is out of range")]
  ChatItemInvalidDateSent(u64),

  #[error("group update found outside a group thread")]
  GroupUpdateMessageInNonGroupChat,

  #[error("group change has no updates")]
  EmptyGroupUpdates,

  #[error("sequence of requests and cancels names the local user")]
  SequenceOfRequestsAndCancelsWithLocalAci,

  #[error("unrecognized simple chat update type")]
  UnrecognizedSimpleChatUpdate,

  #[error("{update} update found outside a 1:1 thread")]
  ChatUpdateNotInContactThread { update: &'static str },

  #[error("expiration timer update found outside a 1:1 thread")]
  ExpirationTimerUpdateNotInContactThread,

  #[error("expiration timer update is not from the local user or a contact")]
  ExpirationTimerUpdateNotFromContact,

  #[error("profile change has an empty name")]
  ProfileChangeUpdateInvalidNames,

  #[error("profile change is not from a contact")]
  ProfileChangeUpdateNotFromContact,

  #[error("thread merge update is not from a contact")]
  ThreadMergeUpdateNotFromContact,

  #[error("session switchover update is not from a contact")]
  SessionSwitchoverUpdateNotFromContact,

  #[error("learned profile update is not from a contact")]
  LearnedProfileUpdateNotFromContact,

  #[error("learned profile update is missing the previous name")]
  LearnedProfileUpdateMissingPreviousName,

  #[error("learned profile update has an empty username")]
  LearnedProfileUpdateInvalidUsername,

  #[error("verification state change is not from a contact")]
  VerificationStateChangeNotFromContact,

  #[error("identity update is not from a contact")]
  IdentityUpdateNotFromContact,

  #[error("joined update is not from a contact")]
  JoinedSignalNotFromContact,

  #[error("phone number change is not from a contact")]
  PhoneNumberChangeNotFromContact,

  #[error("end session update is not from a contact or the local user")]
  EndSessionNotFromContact,

  #[error("decryption error is not from a contact")]
  DecryptionErrorNotFromContact,

  #[error("payments update is not from the local user or a contact with an ACI")]
  PaymentsActivatedNotFromAci,

  #[error("unsupported protocol version update is not from a contact")]
  UnsupportedProtocolVersionNotFromContact,
}

#[derive(Debug, Error)]
pub enum RestoreErrorKind {
  #[error("invalid backup data: {0}")]
  InvalidProtoData(#[from] InvalidProtoData),

  #[error("database insertion failed: {0}")]
  DatabaseInsertionFailed(#[source] Box<dyn std::error::Error + Send + Sync>),
}

#[derive(Debug, Error)]
#[error("{chat_item_id}: {kind}")]
pub struct RestoreError {
  pub chat_item_id: ChatItemId,
  pub kind:         RestoreErrorKind,
}

impl RestoreError {
  pub fn new(chat_item_id: ChatItemId, kind: impl Into<RestoreErrorKind>) -> Self {
    Self { chat_item_id, kind: kind.into() }
  }

  /// The data-level reason, if this is not a storage failure.
  pub fn invalid_proto_data(&self) -> Option<&InvalidProtoData> {
    match &self.kind {
      RestoreErrorKind::InvalidProtoData(reason) => Some(reason),
      RestoreErrorKind::DatabaseInsertionFailed(_) => None,
    }
  }
}

pub type Result<T, E = FatalError> = std::result::Result<T, E>;
