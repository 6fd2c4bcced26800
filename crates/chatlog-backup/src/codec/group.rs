//! Group updates.
//!
//! A group-update record is expanded into a flat list of
//! [`GroupUpdateItem`]s by the item provider; each item maps to one wire
//! case (a non-tail request sequence maps to two). Actors are written as the
//! ACI of the acting user, with the local user written as the local ACI and
//! an unknown actor left out.
//!
//! On restore each wire case is decoded back, unknown cases are skipped, and
//! the result is collapsed against itself and against the thread's previous
//! group update before anything is inserted.

use chatlog_core::{
  group::{AccessLevel, GroupUpdateItem, GroupUpdateMetadata, Member, Updater},
  id::{Aci, LocalIdentifiers, Pni, ServiceId},
  record::{ChatUpdateKind, ChatUpdateRecord, InfoMessage},
  store::InteractionStore,
  thread::ChatThread,
};

use crate::{
  codec::{chat_item, collapse, new_record},
  context::{ArchivingContext, RestoringContext},
  error::{
    ArchiveError, ArchiveErrorKind, ChatItemId, FatalError, InvalidProtoData, RestoreError,
    RestoreErrorKind,
  },
  result::{ArchiveResult, RestoreResult, SkipReason, UnrecognizedVariant},
  wire::{self, ChatUpdate, ChatUpdateItem, GroupChangeChatUpdate, GroupChangeUpdate},
};

/// Upper bound on placeholder invitees written for one unnamed revocation.
/// Far above any real group size.
pub(crate) const MAX_UNNAMED_REVOKED_INVITEES: u32 = 10_000;

// ─── Archive ─────────────────────────────────────────────────────────────────

pub(crate) fn archive(
  record: &ChatUpdateRecord,
  metadata: Option<&GroupUpdateMetadata>,
  context: &ArchivingContext<'_>,
) -> ArchiveResult<ChatUpdateItem> {
  let Some(metadata) = metadata else {
    return ArchiveResult::Fatal(FatalError::DeveloperError(format!(
      "group update {} has no update metadata",
      record.id
    )));
  };

  let local = context.local_identifiers();
  let provider = context.group_updates;
  let items = match metadata {
    GroupUpdateMetadata::LegacyRawString(_) => {
      return ArchiveResult::Skipped(SkipReason::LegacyGroupUpdate);
    }
    GroupUpdateMetadata::NewGroup { group, source } => {
      provider.items_for_new_group(group, *source, local)
    }
    GroupUpdateMetadata::ModelDiff { old, new, source } => {
      provider.items_for_diff(old, new, *source, local)
    }
    GroupUpdateMetadata::Precomputed(items) => provider.precomputed_items(items),
  };

  archive_items(record, &items, context)
}

/// Encode `items`, isolating per-item failures.
///
/// Precedence when nothing could be encoded: a list made only of skippable
/// items is skipped; any failure (or an empty list) makes the whole update a
/// failure with [`ArchiveErrorKind::EmptyGroupUpdate`].
pub(crate) fn archive_items(
  record: &ChatUpdateRecord,
  items: &[GroupUpdateItem],
  context: &ArchivingContext<'_>,
) -> ArchiveResult<ChatUpdateItem> {
  let encoder = Encoder { local: context.local_identifiers() };
  let mut updates = Vec::with_capacity(items.len());
  let mut errors = Vec::new();
  let mut skipped = 0usize;

  for item in items {
    match encoder.encode(item) {
      Ok(Encoded::Updates(encoded)) => updates.extend(encoded),
      Ok(Encoded::Skipped) => skipped += 1,
      Err(kind) => errors.push(ArchiveError::new(record.id, kind)),
    }
  }

  if updates.is_empty() {
    if errors.is_empty() && skipped > 0 {
      return ArchiveResult::Skipped(SkipReason::OnlySkippableGroupUpdateItems);
    }
    errors.push(ArchiveError::new(record.id, ArchiveErrorKind::EmptyGroupUpdate));
    return ArchiveResult::Failure(errors);
  }

  let update = ChatUpdate::GroupChange(GroupChangeChatUpdate { updates });
  match chat_item(record, context.local_recipient_id(), update) {
    Ok(item) if errors.is_empty() => ArchiveResult::Success(item),
    Ok(item) => ArchiveResult::PartialSuccess(item, errors),
    Err(error) => {
      errors.push(error);
      ArchiveResult::Failure(errors)
    }
  }
}

enum Encoded {
  Updates(Vec<GroupChangeUpdate>),
  Skipped,
}

impl From<GroupChangeUpdate> for Encoded {
  fn from(update: GroupChangeUpdate) -> Self { Encoded::Updates(vec![update]) }
}

struct Encoder<'a> {
  local: &'a LocalIdentifiers,
}

impl Encoder<'_> {
  fn aci(&self, aci: Aci, item: &GroupUpdateItem) -> Result<Vec<u8>, ArchiveErrorKind> {
    if !aci.is_valid() {
      return Err(ArchiveErrorKind::InvalidGroupMemberAci { item: item.name() });
    }
    Ok(aci.to_bytes().to_vec())
  }

  fn updater(
    &self,
    updater: Updater,
    item: &GroupUpdateItem,
  ) -> Result<Option<Vec<u8>>, ArchiveErrorKind> {
    match updater {
      Updater::LocalUser => Ok(Some(self.local.aci.to_bytes().to_vec())),
      Updater::OtherUser(aci) => self.aci(aci, item).map(Some),
      Updater::Unknown => Ok(None),
    }
  }

  fn member(&self, member: Member, item: &GroupUpdateItem) -> Result<Vec<u8>, ArchiveErrorKind> {
    self.aci(member.aci(self.local), item)
  }

  fn service_id(
    &self,
    service_id: ServiceId,
    item: &GroupUpdateItem,
  ) -> Result<Vec<u8>, ArchiveErrorKind> {
    match service_id {
      ServiceId::Aci(aci) => self.aci(aci, item),
      ServiceId::Pni(pni) if pni.0.is_nil() => {
        Err(ArchiveErrorKind::InvalidGroupMemberAci { item: item.name() })
      }
      ServiceId::Pni(_) => Ok(service_id.to_bytes()),
    }
  }

  fn encode(&self, item: &GroupUpdateItem) -> Result<Encoded, ArchiveErrorKind> {
    use GroupChangeUpdate as W;
    use GroupUpdateItem as G;

    let update = match *item {
      G::InviteFriendsToNewlyCreatedGroup => return Ok(Encoded::Skipped),

      G::Generic { updater } => W::GenericGroupUpdate(wire::GenericGroupUpdate {
        updater_aci: self.updater(updater, item)?,
      }),
      G::Created { updater } => W::GroupCreationUpdate(wire::GroupCreationUpdate {
        updater_aci: self.updater(updater, item)?,
      }),

      G::WasMigrated => W::GroupV2MigrationUpdate(wire::GroupV2MigrationUpdate {}),
      G::LocalUserInvitedAfterMigration => {
        W::GroupV2MigrationSelfInvitedUpdate(wire::GroupV2MigrationSelfInvitedUpdate {})
      }
      G::OtherUsersInvitedAfterMigration { count } => W::GroupV2MigrationInvitedMembersUpdate(
        wire::GroupV2MigrationInvitedMembersUpdate { invited_members_count: count },
      ),
      G::OtherUsersDroppedAfterMigration { count } => W::GroupV2MigrationDroppedMembersUpdate(
        wire::GroupV2MigrationDroppedMembersUpdate { dropped_members_count: count },
      ),

      G::NameChanged { updater, ref new_name } => W::GroupNameUpdate(wire::GroupNameUpdate {
        updater_aci:    self.updater(updater, item)?,
        new_group_name: Some(new_name.clone()),
      }),
      G::NameRemoved { updater } => W::GroupNameUpdate(wire::GroupNameUpdate {
        updater_aci:    self.updater(updater, item)?,
        new_group_name: None,
      }),
      G::AvatarChanged { updater } => W::GroupAvatarUpdate(wire::GroupAvatarUpdate {
        updater_aci: self.updater(updater, item)?,
        was_removed: false,
      }),
      G::AvatarRemoved { updater } => W::GroupAvatarUpdate(wire::GroupAvatarUpdate {
        updater_aci: self.updater(updater, item)?,
        was_removed: true,
      }),
      G::DescriptionChanged { updater, ref new_description } => {
        W::GroupDescriptionUpdate(wire::GroupDescriptionUpdate {
          updater_aci:     self.updater(updater, item)?,
          new_description: Some(new_description.clone()),
        })
      }
      G::DescriptionRemoved { updater } => {
        W::GroupDescriptionUpdate(wire::GroupDescriptionUpdate {
          updater_aci:     self.updater(updater, item)?,
          new_description: None,
        })
      }

      G::MembersAccessChanged { updater, access } => W::GroupMembershipAccessLevelChangeUpdate(
        wire::GroupMembershipAccessLevelChangeUpdate {
          updater_aci:  self.updater(updater, item)?,
          access_level: encode_access(access),
        },
      ),
      G::AttributesAccessChanged { updater, access } => {
        W::GroupAttributesAccessLevelChangeUpdate(wire::GroupAttributesAccessLevelChangeUpdate {
          updater_aci:  self.updater(updater, item)?,
          access_level: encode_access(access),
        })
      }
      G::AnnouncementOnlyEnabled { updater } | G::AnnouncementOnlyDisabled { updater } => {
        W::GroupAnnouncementOnlyChangeUpdate(wire::GroupAnnouncementOnlyChangeUpdate {
          updater_aci:          self.updater(updater, item)?,
          is_announcement_only: matches!(item, G::AnnouncementOnlyEnabled { .. }),
        })
      }

      G::DisappearingMessagesEnabled { duration_ms: 0, .. } => {
        return Err(ArchiveErrorKind::GroupTimerEnabledWithoutDuration);
      }
      G::DisappearingMessagesEnabled { updater, duration_ms } => {
        W::GroupExpirationTimerUpdate(wire::GroupExpirationTimerUpdate {
          expires_in_ms: duration_ms,
          updater_aci:   self.updater(updater, item)?,
        })
      }
      G::DisappearingMessagesDisabled { updater } => {
        W::GroupExpirationTimerUpdate(wire::GroupExpirationTimerUpdate {
          expires_in_ms: 0,
          updater_aci:   self.updater(updater, item)?,
        })
      }

      G::AdministratorGranted { member, updater }
      | G::AdministratorRevoked { member, updater } => {
        W::GroupAdminStatusUpdate(wire::GroupAdminStatusUpdate {
          updater_aci:              self.updater(updater, item)?,
          member_aci:               self.member(member, item)?,
          was_admin_status_granted: matches!(item, G::AdministratorGranted { .. }),
        })
      }

      G::MemberLeft { member } => W::GroupMemberLeftUpdate(wire::GroupMemberLeftUpdate {
        aci: self.member(member, item)?,
      }),
      G::MemberRemoved { member, remover } => {
        W::GroupMemberRemovedUpdate(wire::GroupMemberRemovedUpdate {
          remover_aci: self.updater(remover, item)?,
          removed_aci: self.member(member, item)?,
        })
      }
      G::MemberJoined { member } => W::GroupMemberJoinedUpdate(wire::GroupMemberJoinedUpdate {
        new_member_aci: self.member(member, item)?,
      }),
      G::MemberAdded { member, updater } => {
        W::GroupMemberAddedUpdate(wire::GroupMemberAddedUpdate {
          updater_aci:         self.updater(updater, item)?,
          new_member_aci:      self.member(member, item)?,
          had_open_invitation: false,
          inviter_aci:         None,
        })
      }
      G::MemberJoinedViaInviteLink { member } => {
        W::GroupMemberJoinedByLinkUpdate(wire::GroupMemberJoinedByLinkUpdate {
          new_member_aci: self.member(member, item)?,
        })
      }

      G::LocalUserWasInvited { inviter } => {
        W::SelfInvitedToGroupUpdate(wire::SelfInvitedToGroupUpdate {
          inviter_aci: self.updater(inviter, item)?,
        })
      }
      G::OtherUserWasInvitedByLocalUser { invitee } => {
        W::SelfInvitedOtherUserToGroupUpdate(wire::SelfInvitedOtherUserToGroupUpdate {
          invitee_service_id: self.service_id(invitee, item)?,
        })
      }
      G::UnnamedUsersWereInvited { inviter, count } => {
        W::GroupUnknownInviteeUpdate(wire::GroupUnknownInviteeUpdate {
          inviter_aci:   self.updater(inviter, item)?,
          invitee_count: count,
        })
      }
      G::InviteAccepted { member, inviter } => {
        W::GroupInvitationAcceptedUpdate(wire::GroupInvitationAcceptedUpdate {
          inviter_aci:    self.updater(inviter, item)?,
          new_member_aci: self.member(member, item)?,
        })
      }
      G::InviteDeclined { invitee, inviter } => {
        W::GroupInvitationDeclinedUpdate(wire::GroupInvitationDeclinedUpdate {
          inviter_aci: self.updater(inviter, item)?,
          invitee_aci: invitee.map(|member| self.member(member, item)).transpose()?,
        })
      }
      G::LocalUserInviteRevoked { revoker } => {
        W::GroupSelfInvitationRevokedUpdate(wire::GroupSelfInvitationRevokedUpdate {
          revoker_aci: self.updater(revoker, item)?,
        })
      }
      G::OtherUserInviteRevokedByLocalUser { invitee } => {
        let mut entry = wire::Invitee::default();
        match invitee {
          ServiceId::Aci(_) => entry.invitee_aci = Some(self.service_id(invitee, item)?),
          ServiceId::Pni(pni) => {
            self.service_id(invitee, item)?;
            entry.invitee_pni = Some(pni.to_bytes().to_vec());
          }
        }
        W::GroupInvitationRevokedUpdate(wire::GroupInvitationRevokedUpdate {
          updater_aci: self.updater(Updater::LocalUser, item)?,
          invitees:    vec![entry],
        })
      }
      G::UnnamedUserInvitesWereRevoked { updater, count } => {
        if count > MAX_UNNAMED_REVOKED_INVITEES {
          return Err(ArchiveErrorKind::TooManyUnnamedRevokedInvitees(count));
        }
        // Identities are unknown; only the number of entries carries meaning.
        W::GroupInvitationRevokedUpdate(wire::GroupInvitationRevokedUpdate {
          updater_aci: self.updater(updater, item)?,
          invitees:    vec![wire::Invitee::default(); count as usize],
        })
      }

      G::RequestedToJoin { requester } => {
        W::GroupJoinRequestUpdate(wire::GroupJoinRequestUpdate {
          requestor_aci: self.member(requester, item)?,
        })
      }
      G::RequestApproved { requester, approver: updater }
      | G::RequestRejected { requester, rejecter: updater } => {
        W::GroupJoinRequestApprovalUpdate(wire::GroupJoinRequestApprovalUpdate {
          requestor_aci: self.member(requester, item)?,
          updater_aci:   self.updater(updater, item)?,
          was_approved:  matches!(item, G::RequestApproved { .. }),
        })
      }
      G::RequestCanceled { requester } => {
        W::GroupJoinRequestCanceledUpdate(wire::GroupJoinRequestCanceledUpdate {
          requestor_aci: self.member(requester, item)?,
        })
      }

      G::InviteLinkReset { updater } => {
        W::GroupInviteLinkResetUpdate(wire::GroupInviteLinkResetUpdate {
          updater_aci: self.updater(updater, item)?,
        })
      }
      G::InviteLinkEnabled { updater, requires_approval } => {
        W::GroupInviteLinkEnabledUpdate(wire::GroupInviteLinkEnabledUpdate {
          updater_aci:                  self.updater(updater, item)?,
          link_requires_admin_approval: requires_approval,
        })
      }
      G::InviteLinkDisabled { updater } => {
        W::GroupInviteLinkDisabledUpdate(wire::GroupInviteLinkDisabledUpdate {
          updater_aci: self.updater(updater, item)?,
        })
      }
      G::InviteLinkApprovalEnabled { updater } | G::InviteLinkApprovalDisabled { updater } => {
        W::GroupInviteLinkAdminApprovalUpdate(wire::GroupInviteLinkAdminApprovalUpdate {
          updater_aci:                  self.updater(updater, item)?,
          link_requires_admin_approval: matches!(item, G::InviteLinkApprovalEnabled { .. }),
        })
      }

      G::SequenceOfRequestsAndCancels { requester, .. } if requester == self.local.aci => {
        return Err(ArchiveErrorKind::SequenceOfRequestsAndCancelsWithLocalAci);
      }
      G::SequenceOfRequestsAndCancels { requester, count: 0, .. } => {
        W::GroupJoinRequestUpdate(wire::GroupJoinRequestUpdate {
          requestor_aci: self.aci(requester, item)?,
        })
      }
      G::SequenceOfRequestsAndCancels { requester, count, is_tail } => {
        let requestor_aci = self.aci(requester, item)?;
        let sequence = W::GroupSequenceOfRequestsAndCancelsUpdate(
          wire::GroupSequenceOfRequestsAndCancelsUpdate {
            requestor_aci: requestor_aci.clone(),
            count,
          },
        );
        if is_tail {
          sequence
        } else {
          // A request is still pending after the sequence.
          let pending = W::GroupJoinRequestUpdate(wire::GroupJoinRequestUpdate { requestor_aci });
          return Ok(Encoded::Updates(vec![sequence, pending]));
        }
      }
    };

    Ok(update.into())
  }
}

fn encode_access(access: AccessLevel) -> wire::AccessLevel {
  match access {
    AccessLevel::Unknown => wire::AccessLevel::Unknown,
    AccessLevel::Any => wire::AccessLevel::Any,
    AccessLevel::Member => wire::AccessLevel::Member,
    AccessLevel::Administrator => wire::AccessLevel::Administrator,
    AccessLevel::Unsatisfiable => wire::AccessLevel::Unsatisfiable,
  }
}

fn decode_access(access: wire::AccessLevel) -> AccessLevel {
  match access {
    wire::AccessLevel::Unknown => AccessLevel::Unknown,
    wire::AccessLevel::Any => AccessLevel::Any,
    wire::AccessLevel::Member => AccessLevel::Member,
    wire::AccessLevel::Administrator => AccessLevel::Administrator,
    wire::AccessLevel::Unsatisfiable => AccessLevel::Unsatisfiable,
  }
}

// ─── Restore ─────────────────────────────────────────────────────────────────

pub(crate) fn restore<S: InteractionStore>(
  update: &GroupChangeChatUpdate,
  item: &ChatUpdateItem,
  thread: &ChatThread,
  context: &mut RestoringContext<'_, S>,
) -> RestoreResult<()> {
  let chat_item_id = ChatItemId(item.date_sent);
  if !thread.is_group() {
    return RestoreResult::failure(RestoreError::new(
      chat_item_id,
      InvalidProtoData::GroupUpdateMessageInNonGroupChat,
    ));
  }
  if update.updates.is_empty() {
    return RestoreResult::failure(RestoreError::new(
      chat_item_id,
      InvalidProtoData::EmptyGroupUpdates,
    ));
  }

  let decoder = Decoder { local: context.local_identifiers() };
  let mut items = Vec::with_capacity(update.updates.len());
  let mut errors = Vec::new();
  for wire_update in &update.updates {
    match decoder.decode(wire_update) {
      Ok(Some(decoded)) => items.extend(decoded),
      Ok(None) => {
        tracing::debug!(%chat_item_id, "skipping unrecognized group change update");
      }
      Err(reason) => errors.push(RestoreError::new(chat_item_id, reason)),
    }
  }
  if items.is_empty() {
    if errors.is_empty() {
      return RestoreResult::UnrecognizedVariant(UnrecognizedVariant {
        chat_item_id,
        oneof: "group_change_update",
      });
    }
    return RestoreResult::Failure(errors);
  }

  let placeholder = ChatUpdateKind::Info(InfoMessage::GroupUpdate { metadata: None });
  let mut record = match new_record(item, thread, placeholder) {
    Ok(record) => record,
    Err(error) => {
      errors.push(error);
      return RestoreResult::Failure(errors);
    }
  };

  let storage_error = |e: S::Error| {
    RestoreError::new(chat_item_id, RestoreErrorKind::DatabaseInsertionFailed(Box::new(e)))
  };

  let mut previous = match context.store.most_recent(thread.id) {
    Ok(previous) => previous,
    Err(e) => {
      errors.push(storage_error(e));
      return RestoreResult::Failure(errors);
    }
  };
  let collapsed = collapse::collapse(items, previous.as_mut().and_then(sole_group_item));
  if collapsed.merged_into_previous
    && let Some(previous) = &previous
    && let Err(e) = context.store.update(previous)
  {
    errors.push(storage_error(e));
    return RestoreResult::Failure(errors);
  }

  if collapsed.remaining.is_empty() {
    return RestoreResult::Success(()).with_errors(errors);
  }

  record.kind = ChatUpdateKind::Info(InfoMessage::GroupUpdate {
    metadata: Some(GroupUpdateMetadata::Precomputed(collapsed.remaining)),
  });
  if let Err(error) = context.insert(record, chat_item_id) {
    errors.push(error);
    return RestoreResult::Failure(errors);
  }
  RestoreResult::Success(()).with_errors(errors)
}

/// The single item of a restored group update, the only shape later items
/// may be collapsed into.
fn sole_group_item(record: &mut ChatUpdateRecord) -> Option<&mut GroupUpdateItem> {
  match &mut record.kind {
    ChatUpdateKind::Info(InfoMessage::GroupUpdate {
      metadata: Some(GroupUpdateMetadata::Precomputed(items)),
    }) if items.len() == 1 => items.first_mut(),
    _ => None,
  }
}

struct Decoder<'a> {
  local: &'a LocalIdentifiers,
}

impl Decoder<'_> {
  fn aci(&self, bytes: &[u8], field: &'static str) -> Result<Aci, InvalidProtoData> {
    Aci::from_bytes(bytes).map_err(|_| InvalidProtoData::InvalidAci { field })
  }

  fn member(&self, bytes: &[u8], field: &'static str) -> Result<Member, InvalidProtoData> {
    Ok(Member::from_aci(self.aci(bytes, field)?, self.local))
  }

  fn updater(
    &self,
    bytes: &Option<Vec<u8>>,
    field: &'static str,
  ) -> Result<Updater, InvalidProtoData> {
    match bytes {
      Some(bytes) => Ok(Updater::from_aci(self.aci(bytes, field)?, self.local)),
      None => Ok(Updater::Unknown),
    }
  }

  fn invitee(&self, invitee: &wire::Invitee) -> Result<Option<ServiceId>, InvalidProtoData> {
    if let Some(aci) = &invitee.invitee_aci {
      return self.aci(aci, "invitee_aci").map(|aci| Some(ServiceId::Aci(aci)));
    }
    match &invitee.invitee_pni {
      Some(pni) => Pni::from_bytes(pni)
        .map(|pni| Some(ServiceId::Pni(pni)))
        .map_err(|_| InvalidProtoData::InvalidPni { field: "invitee_pni" }),
      None => Ok(None),
    }
  }

  /// Decode one wire case. `None` means the case is unknown to this build.
  fn decode(
    &self,
    update: &GroupChangeUpdate,
  ) -> Result<Option<Vec<GroupUpdateItem>>, InvalidProtoData> {
    use GroupChangeUpdate as W;
    use GroupUpdateItem as G;

    let item = match update {
      W::Unrecognized => return Ok(None),

      W::GenericGroupUpdate(u) => G::Generic {
        updater: self.updater(&u.updater_aci, "updater_aci")?,
      },
      W::GroupCreationUpdate(u) => {
        let updater = self.updater(&u.updater_aci, "updater_aci")?;
        if updater == Updater::LocalUser {
          return Ok(Some(vec![
            G::Created { updater },
            G::InviteFriendsToNewlyCreatedGroup,
          ]));
        }
        G::Created { updater }
      }
      W::GroupNameUpdate(u) => {
        let updater = self.updater(&u.updater_aci, "updater_aci")?;
        match &u.new_group_name {
          Some(name) => G::NameChanged { updater, new_name: name.clone() },
          None => G::NameRemoved { updater },
        }
      }
      W::GroupAvatarUpdate(u) => {
        let updater = self.updater(&u.updater_aci, "updater_aci")?;
        if u.was_removed {
          G::AvatarRemoved { updater }
        } else {
          G::AvatarChanged { updater }
        }
      }
      W::GroupDescriptionUpdate(u) => {
        let updater = self.updater(&u.updater_aci, "updater_aci")?;
        match &u.new_description {
          Some(description) => G::DescriptionChanged {
            updater,
            new_description: description.clone(),
          },
          None => G::DescriptionRemoved { updater },
        }
      }
      W::GroupMembershipAccessLevelChangeUpdate(u) => G::MembersAccessChanged {
        updater: self.updater(&u.updater_aci, "updater_aci")?,
        access:  decode_access(u.access_level),
      },
      W::GroupAttributesAccessLevelChangeUpdate(u) => G::AttributesAccessChanged {
        updater: self.updater(&u.updater_aci, "updater_aci")?,
        access:  decode_access(u.access_level),
      },
      W::GroupAnnouncementOnlyChangeUpdate(u) => {
        let updater = self.updater(&u.updater_aci, "updater_aci")?;
        if u.is_announcement_only {
          G::AnnouncementOnlyEnabled { updater }
        } else {
          G::AnnouncementOnlyDisabled { updater }
        }
      }
      W::GroupAdminStatusUpdate(u) => {
        let updater = self.updater(&u.updater_aci, "updater_aci")?;
        let member = self.member(&u.member_aci, "member_aci")?;
        if u.was_admin_status_granted {
          G::AdministratorGranted { member, updater }
        } else {
          G::AdministratorRevoked { member, updater }
        }
      }
      W::GroupMemberLeftUpdate(u) => G::MemberLeft { member: self.member(&u.aci, "aci")? },
      W::GroupMemberRemovedUpdate(u) => G::MemberRemoved {
        member:  self.member(&u.removed_aci, "removed_aci")?,
        remover: self.updater(&u.remover_aci, "remover_aci")?,
      },
      W::SelfInvitedToGroupUpdate(u) => G::LocalUserWasInvited {
        inviter: self.updater(&u.inviter_aci, "inviter_aci")?,
      },
      W::SelfInvitedOtherUserToGroupUpdate(u) => G::OtherUserWasInvitedByLocalUser {
        invitee: ServiceId::from_bytes(&u.invitee_service_id)
          .map_err(|_| InvalidProtoData::InvalidServiceId { field: "invitee_service_id" })?,
      },
      W::GroupUnknownInviteeUpdate(u) => G::UnnamedUsersWereInvited {
        inviter: self.updater(&u.inviter_aci, "inviter_aci")?,
        count:   u.invitee_count,
      },
      W::GroupInvitationAcceptedUpdate(u) => G::InviteAccepted {
        member:  self.member(&u.new_member_aci, "new_member_aci")?,
        inviter: self.updater(&u.inviter_aci, "inviter_aci")?,
      },
      W::GroupInvitationDeclinedUpdate(u) => G::InviteDeclined {
        invitee: u
          .invitee_aci
          .as_deref()
          .map(|bytes| self.member(bytes, "invitee_aci"))
          .transpose()?,
        inviter: self.updater(&u.inviter_aci, "inviter_aci")?,
      },
      W::GroupMemberJoinedUpdate(u) => G::MemberJoined {
        member: self.member(&u.new_member_aci, "new_member_aci")?,
      },
      W::GroupMemberAddedUpdate(u) => G::MemberAdded {
        member:  self.member(&u.new_member_aci, "new_member_aci")?,
        updater: self.updater(&u.updater_aci, "updater_aci")?,
      },
      W::GroupSelfInvitationRevokedUpdate(u) => G::LocalUserInviteRevoked {
        revoker: self.updater(&u.revoker_aci, "revoker_aci")?,
      },
      W::GroupInvitationRevokedUpdate(u) => {
        let updater = self.updater(&u.updater_aci, "updater_aci")?;
        let single = match u.invitees.as_slice() {
          [only] if updater == Updater::LocalUser => self.invitee(only)?,
          _ => None,
        };
        match single {
          Some(invitee) => G::OtherUserInviteRevokedByLocalUser { invitee },
          None => G::UnnamedUserInvitesWereRevoked {
            updater,
            count: u32::try_from(u.invitees.len()).unwrap_or(u32::MAX),
          },
        }
      }
      W::GroupJoinRequestUpdate(u) => G::RequestedToJoin {
        requester: self.member(&u.requestor_aci, "requestor_aci")?,
      },
      W::GroupJoinRequestApprovalUpdate(u) => {
        let requester = self.member(&u.requestor_aci, "requestor_aci")?;
        let updater = self.updater(&u.updater_aci, "updater_aci")?;
        if u.was_approved {
          G::RequestApproved { requester, approver: updater }
        } else {
          G::RequestRejected { requester, rejecter: updater }
        }
      }
      W::GroupJoinRequestCanceledUpdate(u) => G::RequestCanceled {
        requester: self.member(&u.requestor_aci, "requestor_aci")?,
      },
      W::GroupInviteLinkResetUpdate(u) => G::InviteLinkReset {
        updater: self.updater(&u.updater_aci, "updater_aci")?,
      },
      W::GroupInviteLinkEnabledUpdate(u) => G::InviteLinkEnabled {
        updater:           self.updater(&u.updater_aci, "updater_aci")?,
        requires_approval: u.link_requires_admin_approval,
      },
      W::GroupInviteLinkAdminApprovalUpdate(u) => {
        let updater = self.updater(&u.updater_aci, "updater_aci")?;
        if u.link_requires_admin_approval {
          G::InviteLinkApprovalEnabled { updater }
        } else {
          G::InviteLinkApprovalDisabled { updater }
        }
      }
      W::GroupInviteLinkDisabledUpdate(u) => G::InviteLinkDisabled {
        updater: self.updater(&u.updater_aci, "updater_aci")?,
      },
      W::GroupMemberJoinedByLinkUpdate(u) => G::MemberJoinedViaInviteLink {
        member: self.member(&u.new_member_aci, "new_member_aci")?,
      },
      W::GroupV2MigrationUpdate(_) => G::WasMigrated,
      W::GroupV2MigrationSelfInvitedUpdate(_) => G::LocalUserInvitedAfterMigration,
      W::GroupV2MigrationInvitedMembersUpdate(u) => G::OtherUsersInvitedAfterMigration {
        count: u.invited_members_count,
      },
      W::GroupV2MigrationDroppedMembersUpdate(u) => G::OtherUsersDroppedAfterMigration {
        count: u.dropped_members_count,
      },
      W::GroupSequenceOfRequestsAndCancelsUpdate(u) => {
        let requester = self.aci(&u.requestor_aci, "requestor_aci")?;
        if requester == self.local.aci {
          return Err(InvalidProtoData::SequenceOfRequestsAndCancelsWithLocalAci);
        }
        G::SequenceOfRequestsAndCancels { requester, count: u.count, is_tail: true }
      }
      W::GroupExpirationTimerUpdate(u) => {
        let updater = self.updater(&u.updater_aci, "updater_aci")?;
        match u.expires_in_ms {
          0 => G::DisappearingMessagesDisabled { updater },
          duration_ms => G::DisappearingMessagesEnabled { updater, duration_ms },
        }
      }
    };

    Ok(Some(vec![item]))
  }
}
