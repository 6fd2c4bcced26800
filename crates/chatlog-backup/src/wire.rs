//! The backup wire schema for chat updates.
//!
//! These types mirror the externally versioned backup message layout. Oneof
//! fields are internally tagged enums (`"type"`); a tag this build does not
//! know deserializes into the `Unrecognized` case instead of failing, so
//! newer backups remain readable. Identifier bytes are hex strings.

use serde::{Deserialize, Serialize};

use chatlog_core::id::RecipientId;

// ─── Chat item ───────────────────────────────────────────────────────────────

/// A chat item whose content is a chat update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatUpdateItem {
  pub author_id: RecipientId,
  /// Milliseconds since the Unix epoch.
  pub date_sent: u64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub update:    Option<ChatUpdate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatUpdate {
  SimpleUpdate(SimpleChatUpdate),
  GroupChange(GroupChangeChatUpdate),
  ExpirationTimerChange(ExpirationTimerChatUpdate),
  ProfileChange(ProfileChangeChatUpdate),
  ThreadMerge(ThreadMergeChatUpdate),
  SessionSwitchover(SessionSwitchoverChatUpdate),
  LearnedProfileChange(LearnedProfileChatUpdate),
  #[serde(other)]
  Unrecognized,
}

// ─── Simple updates ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleChatUpdate {
  #[serde(rename = "kind")]
  pub update_type: SimpleChatUpdateType,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SimpleChatUpdateType {
  JoinedSignal,
  IdentityUpdate,
  IdentityVerified,
  IdentityDefault,
  ChangeNumber,
  ReleaseChannelDonationRequest,
  EndSession,
  ChatSessionRefresh,
  BadDecrypt,
  PaymentsActivated,
  PaymentActivationRequest,
  UnsupportedProtocolMessage,
  ReportedSpam,
  Blocked,
  Unblocked,
  MessageRequestAccepted,
  #[serde(other)]
  Unknown,
}

// ─── Single-purpose updates ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpirationTimerChatUpdate {
  /// Zero means disappearing messages are off.
  #[serde(default)]
  pub expires_in_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileChangeChatUpdate {
  #[serde(default)]
  pub previous_name: String,
  #[serde(default)]
  pub new_name:      String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadMergeChatUpdate {
  #[serde(default)]
  pub previous_e164: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSwitchoverChatUpdate {
  #[serde(default)]
  pub e164: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnedProfileChatUpdate {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub previous_name: Option<PreviousName>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviousName {
  E164(u64),
  Username(String),
}

// ─── Group updates ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupChangeChatUpdate {
  #[serde(default)]
  pub updates: Vec<GroupChangeUpdate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GroupChangeUpdate {
  GenericGroupUpdate(GenericGroupUpdate),
  GroupCreationUpdate(GroupCreationUpdate),
  GroupNameUpdate(GroupNameUpdate),
  GroupAvatarUpdate(GroupAvatarUpdate),
  GroupDescriptionUpdate(GroupDescriptionUpdate),
  GroupMembershipAccessLevelChangeUpdate(GroupMembershipAccessLevelChangeUpdate),
  GroupAttributesAccessLevelChangeUpdate(GroupAttributesAccessLevelChangeUpdate),
  GroupAnnouncementOnlyChangeUpdate(GroupAnnouncementOnlyChangeUpdate),
  GroupAdminStatusUpdate(GroupAdminStatusUpdate),
  GroupMemberLeftUpdate(GroupMemberLeftUpdate),
  GroupMemberRemovedUpdate(GroupMemberRemovedUpdate),
  SelfInvitedToGroupUpdate(SelfInvitedToGroupUpdate),
  SelfInvitedOtherUserToGroupUpdate(SelfInvitedOtherUserToGroupUpdate),
  GroupUnknownInviteeUpdate(GroupUnknownInviteeUpdate),
  GroupInvitationAcceptedUpdate(GroupInvitationAcceptedUpdate),
  GroupInvitationDeclinedUpdate(GroupInvitationDeclinedUpdate),
  GroupMemberJoinedUpdate(GroupMemberJoinedUpdate),
  GroupMemberAddedUpdate(GroupMemberAddedUpdate),
  GroupSelfInvitationRevokedUpdate(GroupSelfInvitationRevokedUpdate),
  GroupInvitationRevokedUpdate(GroupInvitationRevokedUpdate),
  GroupJoinRequestUpdate(GroupJoinRequestUpdate),
  GroupJoinRequestApprovalUpdate(GroupJoinRequestApprovalUpdate),
  GroupJoinRequestCanceledUpdate(GroupJoinRequestCanceledUpdate),
  GroupInviteLinkResetUpdate(GroupInviteLinkResetUpdate),
  GroupInviteLinkEnabledUpdate(GroupInviteLinkEnabledUpdate),
  GroupInviteLinkAdminApprovalUpdate(GroupInviteLinkAdminApprovalUpdate),
  GroupInviteLinkDisabledUpdate(GroupInviteLinkDisabledUpdate),
  GroupMemberJoinedByLinkUpdate(GroupMemberJoinedByLinkUpdate),
  GroupV2MigrationUpdate(GroupV2MigrationUpdate),
  GroupV2MigrationSelfInvitedUpdate(GroupV2MigrationSelfInvitedUpdate),
  GroupV2MigrationInvitedMembersUpdate(GroupV2MigrationInvitedMembersUpdate),
  GroupV2MigrationDroppedMembersUpdate(GroupV2MigrationDroppedMembersUpdate),
  GroupSequenceOfRequestsAndCancelsUpdate(GroupSequenceOfRequestsAndCancelsUpdate),
  GroupExpirationTimerUpdate(GroupExpirationTimerUpdate),
  #[serde(other)]
  Unrecognized,
}

/// Identifier bytes, absent when the actor or subject is unknown.
type OptionalId = Option<Vec<u8>>;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessLevel {
  Any,
  Member,
  Administrator,
  Unsatisfiable,
  #[default]
  #[serde(other)]
  Unknown,
}

macro_rules! wire_struct {
  ($(#[$meta:meta])* $name:ident { $($body:tt)* }) => {
    $(#[$meta])*
    #[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub struct $name { $($body)* }
  };
}

wire_struct!(GenericGroupUpdate {
  #[serde(default, with = "hex_opt", skip_serializing_if = "Option::is_none")]
  pub updater_aci: OptionalId,
});

wire_struct!(GroupCreationUpdate {
  #[serde(default, with = "hex_opt", skip_serializing_if = "Option::is_none")]
  pub updater_aci: OptionalId,
});

wire_struct!(
  /// `new_group_name` is absent when the name was removed.
  GroupNameUpdate {
    #[serde(default, with = "hex_opt", skip_serializing_if = "Option::is_none")]
    pub updater_aci:    OptionalId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_group_name: Option<String>,
  }
);

wire_struct!(GroupAvatarUpdate {
  #[serde(default, with = "hex_opt", skip_serializing_if = "Option::is_none")]
  pub updater_aci: OptionalId,
  #[serde(default)]
  pub was_removed: bool,
});

wire_struct!(
  /// `new_description` is absent when the description was removed.
  GroupDescriptionUpdate {
    #[serde(default, with = "hex_opt", skip_serializing_if = "Option::is_none")]
    pub updater_aci:     OptionalId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_description: Option<String>,
  }
);

wire_struct!(GroupMembershipAccessLevelChangeUpdate {
  #[serde(default, with = "hex_opt", skip_serializing_if = "Option::is_none")]
  pub updater_aci:  OptionalId,
  #[serde(default)]
  pub access_level: AccessLevel,
});

wire_struct!(GroupAttributesAccessLevelChangeUpdate {
  #[serde(default, with = "hex_opt", skip_serializing_if = "Option::is_none")]
  pub updater_aci:  OptionalId,
  #[serde(default)]
  pub access_level: AccessLevel,
});

wire_struct!(GroupAnnouncementOnlyChangeUpdate {
  #[serde(default, with = "hex_opt", skip_serializing_if = "Option::is_none")]
  pub updater_aci:          OptionalId,
  #[serde(default)]
  pub is_announcement_only: bool,
});

wire_struct!(GroupAdminStatusUpdate {
  #[serde(default, with = "hex_opt", skip_serializing_if = "Option::is_none")]
  pub updater_aci:              OptionalId,
  #[serde(default, with = "hex_bytes")]
  pub member_aci:               Vec<u8>,
  #[serde(default)]
  pub was_admin_status_granted: bool,
});

wire_struct!(GroupMemberLeftUpdate {
  #[serde(default, with = "hex_bytes")]
  pub aci: Vec<u8>,
});

wire_struct!(GroupMemberRemovedUpdate {
  #[serde(default, with = "hex_opt", skip_serializing_if = "Option::is_none")]
  pub remover_aci: OptionalId,
  #[serde(default, with = "hex_bytes")]
  pub removed_aci: Vec<u8>,
});

wire_struct!(SelfInvitedToGroupUpdate {
  #[serde(default, with = "hex_opt", skip_serializing_if = "Option::is_none")]
  pub inviter_aci: OptionalId,
});

wire_struct!(SelfInvitedOtherUserToGroupUpdate {
  #[serde(default, with = "hex_bytes")]
  pub invitee_service_id: Vec<u8>,
});

wire_struct!(GroupUnknownInviteeUpdate {
  #[serde(default, with = "hex_opt", skip_serializing_if = "Option::is_none")]
  pub inviter_aci:   OptionalId,
  #[serde(default)]
  pub invitee_count: u32,
});

wire_struct!(GroupInvitationAcceptedUpdate {
  #[serde(default, with = "hex_opt", skip_serializing_if = "Option::is_none")]
  pub inviter_aci:    OptionalId,
  #[serde(default, with = "hex_bytes")]
  pub new_member_aci: Vec<u8>,
});

wire_struct!(GroupInvitationDeclinedUpdate {
  #[serde(default, with = "hex_opt", skip_serializing_if = "Option::is_none")]
  pub inviter_aci: OptionalId,
  #[serde(default, with = "hex_opt", skip_serializing_if = "Option::is_none")]
  pub invitee_aci: OptionalId,
});

wire_struct!(GroupMemberJoinedUpdate {
  #[serde(default, with = "hex_bytes")]
  pub new_member_aci: Vec<u8>,
});

wire_struct!(GroupMemberAddedUpdate {
  #[serde(default, with = "hex_opt", skip_serializing_if = "Option::is_none")]
  pub updater_aci:         OptionalId,
  #[serde(default, with = "hex_bytes")]
  pub new_member_aci:      Vec<u8>,
  #[serde(default)]
  pub had_open_invitation: bool,
  #[serde(default, with = "hex_opt", skip_serializing_if = "Option::is_none")]
  pub inviter_aci:         OptionalId,
});

wire_struct!(GroupSelfInvitationRevokedUpdate {
  #[serde(default, with = "hex_opt", skip_serializing_if = "Option::is_none")]
  pub revoker_aci: OptionalId,
});

wire_struct!(
  /// One revoked invitation. Both ids may be absent: the entry then only
  /// contributes to the count.
  Invitee {
    #[serde(default, with = "hex_opt", skip_serializing_if = "Option::is_none")]
    pub inviter_aci: OptionalId,
    #[serde(default, with = "hex_opt", skip_serializing_if = "Option::is_none")]
    pub invitee_aci: OptionalId,
    #[serde(default, with = "hex_opt", skip_serializing_if = "Option::is_none")]
    pub invitee_pni: OptionalId,
  }
);

wire_struct!(GroupInvitationRevokedUpdate {
  #[serde(default, with = "hex_opt", skip_serializing_if = "Option::is_none")]
  pub updater_aci: OptionalId,
  #[serde(default)]
  pub invitees:    Vec<Invitee>,
});

wire_struct!(GroupJoinRequestUpdate {
  #[serde(default, with = "hex_bytes")]
  pub requestor_aci: Vec<u8>,
});

wire_struct!(GroupJoinRequestApprovalUpdate {
  #[serde(default, with = "hex_bytes")]
  pub requestor_aci: Vec<u8>,
  #[serde(default, with = "hex_opt", skip_serializing_if = "Option::is_none")]
  pub updater_aci:   OptionalId,
  #[serde(default)]
  pub was_approved:  bool,
});

wire_struct!(GroupJoinRequestCanceledUpdate {
  #[serde(default, with = "hex_bytes")]
  pub requestor_aci: Vec<u8>,
});

wire_struct!(GroupInviteLinkResetUpdate {
  #[serde(default, with = "hex_opt", skip_serializing_if = "Option::is_none")]
  pub updater_aci: OptionalId,
});

wire_struct!(GroupInviteLinkEnabledUpdate {
  #[serde(default, with = "hex_opt", skip_serializing_if = "Option::is_none")]
  pub updater_aci:                  OptionalId,
  #[serde(default)]
  pub link_requires_admin_approval: bool,
});

wire_struct!(GroupInviteLinkAdminApprovalUpdate {
  #[serde(default, with = "hex_opt", skip_serializing_if = "Option::is_none")]
  pub updater_aci:                  OptionalId,
  #[serde(default)]
  pub link_requires_admin_approval: bool,
});

wire_struct!(GroupInviteLinkDisabledUpdate {
  #[serde(default, with = "hex_opt", skip_serializing_if = "Option::is_none")]
  pub updater_aci: OptionalId,
});

wire_struct!(GroupMemberJoinedByLinkUpdate {
  #[serde(default, with = "hex_bytes")]
  pub new_member_aci: Vec<u8>,
});

wire_struct!(GroupV2MigrationUpdate {});

wire_struct!(GroupV2MigrationSelfInvitedUpdate {});

wire_struct!(GroupV2MigrationInvitedMembersUpdate {
  #[serde(default)]
  pub invited_members_count: u32,
});

wire_struct!(GroupV2MigrationDroppedMembersUpdate {
  #[serde(default)]
  pub dropped_members_count: u32,
});

wire_struct!(GroupSequenceOfRequestsAndCancelsUpdate {
  #[serde(default, with = "hex_bytes")]
  pub requestor_aci: Vec<u8>,
  #[serde(default)]
  pub count:         u32,
});

wire_struct!(
  /// `expires_in_ms` of zero means the timer was turned off.
  GroupExpirationTimerUpdate {
    #[serde(default)]
    pub expires_in_ms: u32,
    #[serde(default, with = "hex_opt", skip_serializing_if = "Option::is_none")]
    pub updater_aci:   OptionalId,
  }
);

// ─── Hex encoding ────────────────────────────────────────────────────────────

mod hex_bytes {
  use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

  pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&::hex::encode(bytes))
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    let encoded = String::deserialize(deserializer)?;
    ::hex::decode(encoded).map_err(D::Error::custom)
  }
}

mod hex_opt {
  use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

  pub fn serialize<S: Serializer>(
    bytes: &Option<Vec<u8>>,
    serializer: S,
  ) -> Result<S::Ok, S::Error> {
    match bytes {
      Some(bytes) => serializer.serialize_some(&::hex::encode(bytes)),
      None => serializer.serialize_none(),
    }
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(
    deserializer: D,
  ) -> Result<Option<Vec<u8>>, D::Error> {
    Option::<String>::deserialize(deserializer)?
      .map(|encoded| ::hex::decode(encoded).map_err(D::Error::custom))
      .transpose()
  }
}
