//! Group update items (the atomic edits a group-update record is made of)
//! and the snapshot types they are derived from.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::id::{Aci, LocalIdentifiers, ServiceId};

// ─── Actors ──────────────────────────────────────────────────────────────────

/// Who performed a group change.
///
/// `Unknown` is historical data loss, not an error: older records did not
/// always capture the actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "aci", rename_all = "snake_case")]
pub enum Updater {
  LocalUser,
  OtherUser(Aci),
  Unknown,
}

impl Updater {
  /// Classify an ACI relative to the local account.
  pub fn from_aci(aci: Aci, local: &LocalIdentifiers) -> Self {
    if aci == local.aci {
      Updater::LocalUser
    } else {
      Updater::OtherUser(aci)
    }
  }

  pub fn is_known(&self) -> bool { !matches!(self, Updater::Unknown) }
}

/// The subject of a group change; always identifiable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "aci", rename_all = "snake_case")]
pub enum Member {
  LocalUser,
  OtherUser(Aci),
}

impl Member {
  pub fn from_aci(aci: Aci, local: &LocalIdentifiers) -> Self {
    if aci == local.aci {
      Member::LocalUser
    } else {
      Member::OtherUser(aci)
    }
  }

  pub fn aci(self, local: &LocalIdentifiers) -> Aci {
    match self {
      Member::LocalUser => local.aci,
      Member::OtherUser(aci) => aci,
    }
  }
}

impl From<Member> for Updater {
  fn from(member: Member) -> Self {
    match member {
      Member::LocalUser => Updater::LocalUser,
      Member::OtherUser(aci) => Updater::OtherUser(aci),
    }
  }
}

/// Who may perform a guarded group action.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
  #[default]
  Unknown,
  Any,
  Member,
  Administrator,
  Unsatisfiable,
}

// ─── Items ───────────────────────────────────────────────────────────────────

/// One atomic semantic edit to a group.
#[derive(
  Debug, Clone, PartialEq, Eq, Serialize, Deserialize, strum::IntoStaticStr,
)]
#[serde(tag = "type", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GroupUpdateItem {
  Generic { updater: Updater },
  Created { updater: Updater },
  /// Shown after the local user creates a group. Derived from `Created`.
  InviteFriendsToNewlyCreatedGroup,

  WasMigrated,
  LocalUserInvitedAfterMigration,
  OtherUsersInvitedAfterMigration { count: u32 },
  OtherUsersDroppedAfterMigration { count: u32 },

  NameChanged { updater: Updater, new_name: String },
  NameRemoved { updater: Updater },
  AvatarChanged { updater: Updater },
  AvatarRemoved { updater: Updater },
  DescriptionChanged { updater: Updater, new_description: String },
  DescriptionRemoved { updater: Updater },

  MembersAccessChanged { updater: Updater, access: AccessLevel },
  AttributesAccessChanged { updater: Updater, access: AccessLevel },
  AnnouncementOnlyEnabled { updater: Updater },
  AnnouncementOnlyDisabled { updater: Updater },

  DisappearingMessagesEnabled { updater: Updater, duration_ms: u32 },
  DisappearingMessagesDisabled { updater: Updater },

  AdministratorGranted { member: Member, updater: Updater },
  AdministratorRevoked { member: Member, updater: Updater },

  MemberLeft { member: Member },
  MemberRemoved { member: Member, remover: Updater },
  MemberJoined { member: Member },
  MemberAdded { member: Member, updater: Updater },
  MemberJoinedViaInviteLink { member: Member },

  LocalUserWasInvited { inviter: Updater },
  OtherUserWasInvitedByLocalUser { invitee: ServiceId },
  UnnamedUsersWereInvited { inviter: Updater, count: u32 },
  InviteAccepted { member: Member, inviter: Updater },
  /// `invitee` is `None` when the decliner was only known by a PNI.
  InviteDeclined { invitee: Option<Member>, inviter: Updater },
  LocalUserInviteRevoked { revoker: Updater },
  OtherUserInviteRevokedByLocalUser { invitee: ServiceId },
  UnnamedUserInvitesWereRevoked { updater: Updater, count: u32 },

  RequestedToJoin { requester: Member },
  RequestApproved { requester: Member, approver: Updater },
  RequestRejected { requester: Member, rejecter: Updater },
  RequestCanceled { requester: Member },

  InviteLinkReset { updater: Updater },
  InviteLinkEnabled { updater: Updater, requires_approval: bool },
  InviteLinkDisabled { updater: Updater },
  InviteLinkApprovalEnabled { updater: Updater },
  InviteLinkApprovalDisabled { updater: Updater },

  /// A requester that repeatedly asked to join and then canceled.
  /// `is_tail` is false when a still-pending request follows the sequence.
  SequenceOfRequestsAndCancels { requester: Aci, count: u32, is_tail: bool },
}

impl GroupUpdateItem {
  /// The snake_case variant name, for logs and skip reasons.
  pub fn name(&self) -> &'static str { self.into() }
}

// ─── Snapshots ───────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
  #[default]
  Default,
  Administrator,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum InviteLinkState {
  #[default]
  Disabled,
  Enabled,
  EnabledWithApproval,
}

/// The state of a group at one revision.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GroupSnapshot {
  pub revision:              u32,
  pub name:                  Option<String>,
  pub description:           Option<String>,
  pub avatar_hash:           Option<String>,
  pub members:               BTreeMap<Aci, MemberRole>,
  pub invited:               BTreeSet<ServiceId>,
  pub requesting:            BTreeSet<Aci>,
  pub disappearing_timer_ms: u32,
  pub members_access:        AccessLevel,
  pub attributes_access:     AccessLevel,
  pub announcements_only:    bool,
  pub invite_link:           InviteLinkState,
}

/// How a group-update record describes its change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum GroupUpdateMetadata {
  /// Pre-structured history: only a rendered string survives.
  LegacyRawString(String),
  NewGroup { group: GroupSnapshot, source: Updater },
  ModelDiff {
    old:    GroupSnapshot,
    new:    GroupSnapshot,
    source: Updater,
  },
  Precomputed(Vec<GroupUpdateItem>),
}
