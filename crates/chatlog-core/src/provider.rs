//! Group update item providers: turn group snapshots into the flat list of
//! [`GroupUpdateItem`]s a group-update record is archived as.

use crate::{
  group::{
    GroupSnapshot, GroupUpdateItem, InviteLinkState, Member, MemberRole, Updater,
  },
  id::{LocalIdentifiers, ServiceId},
};

/// Produces ordered group update items for the three ways a group-update
/// record can describe its change.
pub trait GroupUpdateItemProvider {
  /// Items describing the creation of `group` (or the local user's
  /// invitation into it).
  fn items_for_new_group(
    &self,
    group: &GroupSnapshot,
    source: Updater,
    local: &LocalIdentifiers,
  ) -> Vec<GroupUpdateItem>;

  /// Items describing the change from `old` to `new`.
  fn items_for_diff(
    &self,
    old: &GroupSnapshot,
    new: &GroupSnapshot,
    source: Updater,
    local: &LocalIdentifiers,
  ) -> Vec<GroupUpdateItem>;

  /// Items already stored on a record.
  fn precomputed_items(&self, items: &[GroupUpdateItem]) -> Vec<GroupUpdateItem> {
    items.to_vec()
  }
}

// ─── Snapshot differ ─────────────────────────────────────────────────────────

/// Derives items by comparing snapshot fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotItemBuilder;

impl GroupUpdateItemProvider for SnapshotItemBuilder {
  fn items_for_new_group(
    &self,
    group: &GroupSnapshot,
    source: Updater,
    local: &LocalIdentifiers,
  ) -> Vec<GroupUpdateItem> {
    let source = normalize(source, local);
    let invited_only = group.invited.contains(&ServiceId::Aci(local.aci))
      && !group.members.contains_key(&local.aci);
    if invited_only {
      return vec![GroupUpdateItem::LocalUserWasInvited { inviter: source }];
    }

    let mut items = vec![GroupUpdateItem::Created { updater: source }];
    if source == Updater::LocalUser {
      items.push(GroupUpdateItem::InviteFriendsToNewlyCreatedGroup);
    }
    if group.disappearing_timer_ms > 0 {
      items.push(GroupUpdateItem::DisappearingMessagesEnabled {
        updater:     source,
        duration_ms: group.disappearing_timer_ms,
      });
    }
    items
  }

  fn items_for_diff(
    &self,
    old: &GroupSnapshot,
    new: &GroupSnapshot,
    source: Updater,
    local: &LocalIdentifiers,
  ) -> Vec<GroupUpdateItem> {
    let source = normalize(source, local);
    let mut items = Vec::new();

    diff_attributes(old, new, source, &mut items);
    diff_access(old, new, source, &mut items);
    diff_members(old, new, source, local, &mut items);
    diff_invites(old, new, source, local, &mut items);
    diff_requests(old, new, source, local, &mut items);

    if items.is_empty() {
      items.push(GroupUpdateItem::Generic { updater: source });
    }
    items
  }
}

fn normalize(source: Updater, local: &LocalIdentifiers) -> Updater {
  match source {
    Updater::OtherUser(aci) => Updater::from_aci(aci, local),
    other => other,
  }
}

fn diff_attributes(
  old: &GroupSnapshot,
  new: &GroupSnapshot,
  updater: Updater,
  items: &mut Vec<GroupUpdateItem>,
) {
  if old.name != new.name {
    items.push(match &new.name {
      Some(name) => GroupUpdateItem::NameChanged { updater, new_name: name.clone() },
      None => GroupUpdateItem::NameRemoved { updater },
    });
  }
  if old.avatar_hash != new.avatar_hash {
    items.push(match new.avatar_hash {
      Some(_) => GroupUpdateItem::AvatarChanged { updater },
      None => GroupUpdateItem::AvatarRemoved { updater },
    });
  }
  if old.description != new.description {
    items.push(match &new.description {
      Some(description) => GroupUpdateItem::DescriptionChanged {
        updater,
        new_description: description.clone(),
      },
      None => GroupUpdateItem::DescriptionRemoved { updater },
    });
  }
  if old.disappearing_timer_ms != new.disappearing_timer_ms {
    items.push(match new.disappearing_timer_ms {
      0 => GroupUpdateItem::DisappearingMessagesDisabled { updater },
      duration_ms => GroupUpdateItem::DisappearingMessagesEnabled { updater, duration_ms },
    });
  }
}

fn diff_access(
  old: &GroupSnapshot,
  new: &GroupSnapshot,
  updater: Updater,
  items: &mut Vec<GroupUpdateItem>,
) {
  if old.members_access != new.members_access {
    items.push(GroupUpdateItem::MembersAccessChanged {
      updater,
      access: new.members_access,
    });
  }
  if old.attributes_access != new.attributes_access {
    items.push(GroupUpdateItem::AttributesAccessChanged {
      updater,
      access: new.attributes_access,
    });
  }
  if old.announcements_only != new.announcements_only {
    items.push(if new.announcements_only {
      GroupUpdateItem::AnnouncementOnlyEnabled { updater }
    } else {
      GroupUpdateItem::AnnouncementOnlyDisabled { updater }
    });
  }

  use InviteLinkState::*;
  let link_item = match (old.invite_link, new.invite_link) {
    (Disabled, Enabled) => {
      Some(GroupUpdateItem::InviteLinkEnabled { updater, requires_approval: false })
    }
    (Disabled, EnabledWithApproval) => {
      Some(GroupUpdateItem::InviteLinkEnabled { updater, requires_approval: true })
    }
    (Enabled | EnabledWithApproval, Disabled) => {
      Some(GroupUpdateItem::InviteLinkDisabled { updater })
    }
    (Enabled, EnabledWithApproval) => {
      Some(GroupUpdateItem::InviteLinkApprovalEnabled { updater })
    }
    (EnabledWithApproval, Enabled) => {
      Some(GroupUpdateItem::InviteLinkApprovalDisabled { updater })
    }
    _ => None,
  };
  items.extend(link_item);
}

fn diff_members(
  old: &GroupSnapshot,
  new: &GroupSnapshot,
  source: Updater,
  local: &LocalIdentifiers,
  items: &mut Vec<GroupUpdateItem>,
) {
  for (&aci, &role) in &new.members {
    let member = Member::from_aci(aci, local);
    let acted_alone = source == Updater::from(member);

    let Some(&old_role) = old.members.get(&aci) else {
      items.push(if old.invited.contains(&ServiceId::Aci(aci)) && acted_alone {
        GroupUpdateItem::InviteAccepted { member, inviter: Updater::Unknown }
      } else if old.requesting.contains(&aci) && !acted_alone {
        GroupUpdateItem::RequestApproved { requester: member, approver: source }
      } else if acted_alone && old.invite_link != InviteLinkState::Disabled {
        GroupUpdateItem::MemberJoinedViaInviteLink { member }
      } else if acted_alone {
        GroupUpdateItem::MemberJoined { member }
      } else {
        GroupUpdateItem::MemberAdded { member, updater: source }
      });
      continue;
    };

    if old_role != role {
      items.push(match role {
        MemberRole::Administrator => {
          GroupUpdateItem::AdministratorGranted { member, updater: source }
        }
        MemberRole::Default => {
          GroupUpdateItem::AdministratorRevoked { member, updater: source }
        }
      });
    }
  }

  for &aci in old.members.keys() {
    if new.members.contains_key(&aci) {
      continue;
    }
    let member = Member::from_aci(aci, local);
    items.push(if source == Updater::from(member) {
      GroupUpdateItem::MemberLeft { member }
    } else {
      GroupUpdateItem::MemberRemoved { member, remover: source }
    });
  }
}

fn diff_invites(
  old: &GroupSnapshot,
  new: &GroupSnapshot,
  source: Updater,
  local: &LocalIdentifiers,
  items: &mut Vec<GroupUpdateItem>,
) {
  let mut unnamed_invited = 0u32;
  for &invitee in new.invited.difference(&old.invited) {
    if local.contains_service_id(invitee) {
      items.push(GroupUpdateItem::LocalUserWasInvited { inviter: source });
    } else if source == Updater::LocalUser {
      items.push(GroupUpdateItem::OtherUserWasInvitedByLocalUser { invitee });
    } else {
      unnamed_invited += 1;
    }
  }
  if unnamed_invited > 0 {
    items.push(GroupUpdateItem::UnnamedUsersWereInvited {
      inviter: source,
      count:   unnamed_invited,
    });
  }

  let mut unnamed_revoked = 0u32;
  for &invitee in old.invited.difference(&new.invited) {
    let accepted = invitee.aci().is_some_and(|aci| new.members.contains_key(&aci));
    if accepted {
      continue;
    }
    let self_declined =
      invitee.aci().is_some_and(|aci| source == Updater::from_aci(aci, local));

    if local.contains_service_id(invitee) {
      items.push(if self_declined || source == Updater::LocalUser {
        GroupUpdateItem::InviteDeclined {
          invitee: Some(Member::LocalUser),
          inviter: Updater::Unknown,
        }
      } else {
        GroupUpdateItem::LocalUserInviteRevoked { revoker: source }
      });
    } else if self_declined {
      items.push(GroupUpdateItem::InviteDeclined {
        invitee: invitee.aci().map(|aci| Member::from_aci(aci, local)),
        inviter: Updater::Unknown,
      });
    } else if source == Updater::LocalUser {
      items.push(GroupUpdateItem::OtherUserInviteRevokedByLocalUser { invitee });
    } else {
      unnamed_revoked += 1;
    }
  }
  if unnamed_revoked > 0 {
    items.push(GroupUpdateItem::UnnamedUserInvitesWereRevoked {
      updater: source,
      count:   unnamed_revoked,
    });
  }
}

fn diff_requests(
  old: &GroupSnapshot,
  new: &GroupSnapshot,
  source: Updater,
  local: &LocalIdentifiers,
  items: &mut Vec<GroupUpdateItem>,
) {
  for &aci in new.requesting.difference(&old.requesting) {
    items.push(GroupUpdateItem::RequestedToJoin {
      requester: Member::from_aci(aci, local),
    });
  }
  for &aci in old.requesting.difference(&new.requesting) {
    if new.members.contains_key(&aci) {
      continue;
    }
    let requester = Member::from_aci(aci, local);
    items.push(if source == Updater::from(requester) {
      GroupUpdateItem::RequestCanceled { requester }
    } else {
      GroupUpdateItem::RequestRejected { requester, rejecter: source }
    });
  }
}
