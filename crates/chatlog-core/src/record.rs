//! Chat-update records: the non-content events rendered inline in a
//! conversation.
//!
//! A record is either an info message or an error message. The split mirrors
//! how the events were historically stored; both kinds end up in the same
//! backup enumeration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  address::ContactAddress,
  group::GroupUpdateMetadata,
  id::{Aci, InteractionId, ThreadId},
};

// ─── Info payloads ───────────────────────────────────────────────────────────

/// Identity verification state of a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationState {
  Default,
  DefaultAcknowledged,
  Verified,
  NoLongerVerified,
}

/// One side of a payments activation exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "aci", rename_all = "snake_case")]
pub enum PaymentsParticipant {
  LocalUser,
  OtherUser(Aci),
}

/// The name a contact was known by before their profile name was learned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum LearnedDisplayName {
  /// Stored as it was recorded; validated when archived.
  E164(String),
  Username(String),
}

/// Info kinds kept only for history; none of them is carried into backups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegacyInfoKind {
  UserNotRegistered,
  UnsupportedMessage,
  GroupQuit,
  AddToContactsOffer,
  AddUserToProfileWhitelistOffer,
  AddGroupToProfileWhitelistOffer,
  SyncedThread,
  RecipientHidden,
}

#[derive(
  Debug, Clone, PartialEq, Eq, Serialize, Deserialize, strum::IntoStaticStr,
)]
#[serde(tag = "info", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InfoMessage {
  GroupUpdate {
    metadata: Option<GroupUpdateMetadata>,
  },
  DisappearingTimer {
    enabled:                  bool,
    duration_ms:              u64,
    configured_by_local_user: bool,
  },
  ProfileChange {
    address:  Option<ContactAddress>,
    old_name: Option<String>,
    new_name: Option<String>,
  },
  SessionSwitchover {
    phone_number: Option<String>,
  },
  ThreadMerge {
    previous_phone_number: Option<String>,
  },
  LearnedProfileName {
    previous_name: Option<LearnedDisplayName>,
  },
  VerificationStateChange {
    recipient:       Option<ContactAddress>,
    state:           VerificationState,
    is_local_change: bool,
  },
  PhoneNumberChange {
    aci:        Option<Aci>,
    old_number: Option<String>,
    new_number: Option<String>,
  },
  PaymentsActivationRequest {
    sender: Option<PaymentsParticipant>,
  },
  PaymentsActivated {
    sender: Option<PaymentsParticipant>,
  },
  /// `sender` is `None` when the message came from one of our own devices.
  UnknownProtocolVersion {
    sender:           Option<ContactAddress>,
    protocol_version: u64,
  },
  RemoteUserEndedSession,
  LocalUserEndedSession,
  UserJoinedService,
  ReportedSpam,
  BlockedOtherUser,
  BlockedGroup,
  UnblockedOtherUser,
  UnblockedGroup,
  AcceptedMessageRequest,
  Legacy {
    kind: LegacyInfoKind,
  },
}

// ─── Error payloads ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegacyErrorKind {
  NoSession,
  WrongTrustedIdentityKey,
  InvalidKeyException,
  MissingKeyId,
  InvalidMessage,
  DuplicateMessage,
  InvalidVersion,
  UnknownContactBlockOffer,
  GroupCreationFailed,
}

#[derive(
  Debug, Clone, PartialEq, Eq, Serialize, Deserialize, strum::IntoStaticStr,
)]
#[serde(tag = "error", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorMessage {
  NonBlockingIdentityChange {
    recipient:             Option<ContactAddress>,
    was_identity_verified: bool,
  },
  SessionRefresh,
  DecryptionFailure {
    sender: Option<ContactAddress>,
  },
  Legacy {
    kind: LegacyErrorKind,
  },
}

// ─── Records ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ChatUpdateKind {
  Info(InfoMessage),
  Error(ErrorMessage),
}

impl ChatUpdateKind {
  /// The snake_case name of the payload, for logs.
  pub fn name(&self) -> &'static str {
    match self {
      ChatUpdateKind::Info(info) => info.into(),
      ChatUpdateKind::Error(error) => error.into(),
    }
  }
}

/// A persisted chat update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatUpdateRecord {
  pub id:        InteractionId,
  pub thread_id: ThreadId,
  pub timestamp: DateTime<Utc>,
  pub kind:      ChatUpdateKind,
}

/// A chat update that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChatUpdate {
  pub thread_id: ThreadId,
  pub timestamp: DateTime<Utc>,
  pub kind:      ChatUpdateKind,
}

impl NewChatUpdate {
  /// Attach an id, producing the persisted form.
  pub fn into_record(self, id: InteractionId) -> ChatUpdateRecord {
    ChatUpdateRecord {
      id,
      thread_id: self.thread_id,
      timestamp: self.timestamp,
      kind: self.kind,
    }
  }
}
