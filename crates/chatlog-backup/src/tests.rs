//! End-to-end tests: archive records through the dispatcher, restore the
//! produced chat items into an in-memory store and compare.

use chatlog_core::{
  address::ContactAddress,
  group::{AccessLevel, GroupUpdateItem, GroupUpdateMetadata, Member, Updater},
  id::{Aci, Pni, ServiceId},
  record::{
    ChatUpdateKind, ErrorMessage, InfoMessage, LearnedDisplayName, LegacyErrorKind,
    LegacyInfoKind, PaymentsParticipant, VerificationState,
  },
  thread::ChatThread,
};
use uuid::Uuid;

use crate::{
  batch,
  context::{ArchivingContext, RestoringContext},
  error::{ArchiveErrorKind, FatalError, InvalidProtoData, RestoreErrorKind},
  result::{ArchiveResult, RestoreResult, SkipReason},
  test_helpers::*,
  wire::{
    self, ChatUpdate, ChatUpdateItem, ExpirationTimerChatUpdate, GroupChangeChatUpdate,
    GroupChangeUpdate, SimpleChatUpdate, SimpleChatUpdateType,
  },
};

fn success<T: std::fmt::Debug>(result: ArchiveResult<T>) -> T {
  match result {
    ArchiveResult::Success(value) => value,
    other => panic!("expected success, got {other:?}"),
  }
}

fn group_updates(item: &ChatUpdateItem) -> &[GroupChangeUpdate] {
  match &item.update {
    Some(ChatUpdate::GroupChange(change)) => &change.updates,
    other => panic!("expected a group change, got {other:?}"),
  }
}

// ─── Group updates ───────────────────────────────────────────────────────────

/// Archive `items` as one record and restore it into a fresh group thread.
fn round_trip_group(
  fx: &mut Fixture,
  items: Vec<GroupUpdateItem>,
) -> Vec<Vec<GroupUpdateItem>> {
  let thread = fx.group_thread();
  let archived = success(fx.archive(&group_update(&thread, items), &thread));
  assert_eq!(archived.author_id, LOCAL_ID);
  assert!(fx.restore(&archived, &thread).is_success());
  fx.restored_group_items(&thread)
}

fn every_group_item(fx: &Fixture) -> Vec<GroupUpdateItem> {
  use GroupUpdateItem as G;

  let other = Aci(Uuid::new_v4());
  let pni = Pni(Uuid::new_v4());
  let updaters = [Updater::LocalUser, Updater::OtherUser(other), Updater::Unknown];
  let members = [Member::LocalUser, Member::OtherUser(fx.alice_aci)];

  let mut items = vec![
    G::WasMigrated,
    G::LocalUserInvitedAfterMigration,
    G::OtherUsersInvitedAfterMigration { count: 3 },
    G::OtherUsersDroppedAfterMigration { count: 2 },
    G::OtherUserWasInvitedByLocalUser { invitee: ServiceId::Aci(other) },
    G::OtherUserWasInvitedByLocalUser { invitee: ServiceId::Pni(pni) },
    G::OtherUserInviteRevokedByLocalUser { invitee: ServiceId::Aci(other) },
    G::OtherUserInviteRevokedByLocalUser { invitee: ServiceId::Pni(pni) },
    G::SequenceOfRequestsAndCancels { requester: other, count: 4, is_tail: true },
    G::SequenceOfRequestsAndCancels { requester: other, count: 4, is_tail: false },
  ];

  for updater in updaters {
    items.extend([
      G::Generic { updater },
      G::NameChanged { updater, new_name: "Climbing".into() },
      G::NameRemoved { updater },
      G::AvatarChanged { updater },
      G::AvatarRemoved { updater },
      G::DescriptionChanged { updater, new_description: "Saturdays".into() },
      G::DescriptionRemoved { updater },
      G::MembersAccessChanged { updater, access: AccessLevel::Administrator },
      G::AttributesAccessChanged { updater, access: AccessLevel::Member },
      G::AnnouncementOnlyEnabled { updater },
      G::AnnouncementOnlyDisabled { updater },
      G::DisappearingMessagesEnabled { updater, duration_ms: 86_400_000 },
      G::DisappearingMessagesDisabled { updater },
      G::LocalUserWasInvited { inviter: updater },
      G::UnnamedUsersWereInvited { inviter: updater, count: 2 },
      G::LocalUserInviteRevoked { revoker: updater },
      G::UnnamedUserInvitesWereRevoked { updater, count: 3 },
      G::InviteLinkReset { updater },
      G::InviteLinkEnabled { updater, requires_approval: true },
      G::InviteLinkDisabled { updater },
      G::InviteLinkApprovalEnabled { updater },
      G::InviteLinkApprovalDisabled { updater },
    ]);
    if updater != Updater::LocalUser {
      items.push(G::Created { updater });
    }
    for member in members {
      items.extend([
        G::AdministratorGranted { member, updater },
        G::AdministratorRevoked { member, updater },
        G::MemberRemoved { member, remover: updater },
        G::MemberAdded { member, updater },
        G::InviteAccepted { member, inviter: updater },
        G::InviteDeclined { invitee: Some(member), inviter: updater },
        G::RequestApproved { requester: member, approver: updater },
        G::RequestRejected { requester: member, rejecter: updater },
      ]);
    }
    items.push(G::InviteDeclined { invitee: None, inviter: updater });
  }

  for member in members {
    items.extend([
      G::MemberLeft { member },
      G::MemberJoined { member },
      G::MemberJoinedViaInviteLink { member },
      G::RequestedToJoin { requester: member },
      G::RequestCanceled { requester: member },
    ]);
  }
  items
}

#[test]
fn group_items_round_trip_one_record_each() {
  let mut fx = Fixture::new();
  for item in every_group_item(&fx) {
    let restored = round_trip_group(&mut fx, vec![item.clone()]);
    assert_eq!(restored, vec![vec![item]]);
  }
}

#[test]
fn group_creation_by_local_user_restores_invite_prompt() {
  let mut fx = Fixture::new();
  let created = GroupUpdateItem::Created { updater: Updater::LocalUser };
  let restored = round_trip_group(&mut fx, vec![
    created.clone(),
    GroupUpdateItem::InviteFriendsToNewlyCreatedGroup,
  ]);
  assert_eq!(restored, vec![vec![
    created,
    GroupUpdateItem::InviteFriendsToNewlyCreatedGroup,
  ]]);
}

#[test]
fn actors_are_written_as_acis() {
  let fx = Fixture::new();
  let thread = fx.group_thread();
  let record = group_update(&thread, vec![
    GroupUpdateItem::MemberRemoved {
      member:  Member::OtherUser(fx.alice_aci),
      remover: Updater::LocalUser,
    },
    GroupUpdateItem::NameRemoved { updater: Updater::Unknown },
  ]);

  let item = success(fx.archive(&record, &thread));
  assert_eq!(group_updates(&item), [
    GroupChangeUpdate::GroupMemberRemovedUpdate(wire::GroupMemberRemovedUpdate {
      remover_aci: Some(fx.local_aci.to_bytes().to_vec()),
      removed_aci: fx.alice_aci.to_bytes().to_vec(),
    }),
    GroupChangeUpdate::GroupNameUpdate(wire::GroupNameUpdate {
      updater_aci:    None,
      new_group_name: None,
    }),
  ]);
}

#[test]
fn empty_request_sequence_archives_as_join_request() {
  let mut fx = Fixture::new();
  let bob = fx.bob.aci.expect("bob has an aci");
  let restored = round_trip_group(&mut fx, vec![GroupUpdateItem::SequenceOfRequestsAndCancels {
    requester: bob,
    count:     0,
    is_tail:   true,
  }]);
  assert_eq!(restored, vec![vec![GroupUpdateItem::RequestedToJoin {
    requester: Member::OtherUser(bob),
  }]]);
}

#[test]
fn local_request_sequence_fails_both_ways() {
  let mut fx = Fixture::new();
  let thread = fx.group_thread();
  let record = group_update(&thread, vec![GroupUpdateItem::SequenceOfRequestsAndCancels {
    requester: fx.local_aci,
    count:     2,
    is_tail:   true,
  }]);
  let ArchiveResult::Failure(errors) = fx.archive(&record, &thread) else {
    panic!("expected failure");
  };
  assert_eq!(errors[0].kind, ArchiveErrorKind::SequenceOfRequestsAndCancelsWithLocalAci);

  let item = chat_item(
    LOCAL_ID,
    ChatUpdate::GroupChange(GroupChangeChatUpdate {
      updates: vec![GroupChangeUpdate::GroupSequenceOfRequestsAndCancelsUpdate(
        wire::GroupSequenceOfRequestsAndCancelsUpdate {
          requestor_aci: fx.local_aci.to_bytes().to_vec(),
          count:         2,
        },
      )],
    }),
  );
  let RestoreResult::Failure(errors) = fx.restore(&item, &thread) else {
    panic!("expected failure");
  };
  assert_eq!(
    errors[0].invalid_proto_data(),
    Some(&InvalidProtoData::SequenceOfRequestsAndCancelsWithLocalAci)
  );
}

#[test]
fn zero_group_timer_cannot_be_enabled() {
  let fx = Fixture::new();
  let thread = fx.group_thread();
  let record = group_update(&thread, vec![GroupUpdateItem::DisappearingMessagesEnabled {
    updater:     Updater::LocalUser,
    duration_ms: 0,
  }]);
  let ArchiveResult::Failure(errors) = fx.archive(&record, &thread) else {
    panic!("expected failure");
  };
  let kinds: Vec<_> = errors.into_iter().map(|e| e.kind).collect();
  assert_eq!(kinds, [
    ArchiveErrorKind::GroupTimerEnabledWithoutDuration,
    ArchiveErrorKind::EmptyGroupUpdate,
  ]);
}

#[test]
fn invalid_item_is_dropped_and_the_rest_kept() {
  let fx = Fixture::new();
  let thread = fx.group_thread();
  let nil = Aci(Uuid::nil());
  let record = group_update(&thread, vec![
    GroupUpdateItem::NameChanged { updater: Updater::LocalUser, new_name: "a".into() },
    GroupUpdateItem::AvatarChanged { updater: Updater::LocalUser },
    GroupUpdateItem::MemberJoined { member: Member::OtherUser(nil) },
    GroupUpdateItem::DescriptionRemoved { updater: Updater::Unknown },
    GroupUpdateItem::InviteLinkReset { updater: Updater::LocalUser },
  ]);

  let ArchiveResult::PartialSuccess(item, errors) = fx.archive(&record, &thread) else {
    panic!("expected partial success");
  };
  assert_eq!(group_updates(&item).len(), 4);
  assert_eq!(errors.len(), 1);
  assert_eq!(errors[0].interaction_id, record.id);
  assert_eq!(errors[0].kind, ArchiveErrorKind::InvalidGroupMemberAci {
    item: "member_joined",
  });
}

#[test]
fn group_update_with_no_valid_items_fails() {
  let fx = Fixture::new();
  let thread = fx.group_thread();
  let nil = Aci(Uuid::nil());
  let record = group_update(&thread, vec![GroupUpdateItem::MemberLeft {
    member: Member::OtherUser(nil),
  }]);

  let ArchiveResult::Failure(errors) = fx.archive(&record, &thread) else {
    panic!("expected failure");
  };
  assert_eq!(errors.last().map(|e| &e.kind), Some(&ArchiveErrorKind::EmptyGroupUpdate));

  let empty = group_update(&thread, Vec::new());
  let ArchiveResult::Failure(errors) = fx.archive(&empty, &thread) else {
    panic!("expected failure");
  };
  assert_eq!(errors.len(), 1);
  assert_eq!(errors[0].kind, ArchiveErrorKind::EmptyGroupUpdate);
}

#[test]
fn skipped_and_failed_items_without_successes_fail() {
  let fx = Fixture::new();
  let thread = fx.group_thread();
  let record = group_update(&thread, vec![
    GroupUpdateItem::InviteFriendsToNewlyCreatedGroup,
    GroupUpdateItem::MemberLeft { member: Member::OtherUser(Aci(Uuid::nil())) },
  ]);

  let ArchiveResult::Failure(errors) = fx.archive(&record, &thread) else {
    panic!("expected failure");
  };
  let kinds: Vec<_> = errors.into_iter().map(|e| e.kind).collect();
  assert_eq!(kinds, [
    ArchiveErrorKind::InvalidGroupMemberAci { item: "member_left" },
    ArchiveErrorKind::EmptyGroupUpdate,
  ]);
}

#[test]
fn oversized_unnamed_revocation_fails() {
  use crate::codec::group::MAX_UNNAMED_REVOKED_INVITEES;

  let mut fx = Fixture::new();
  let at_limit = vec![GroupUpdateItem::UnnamedUserInvitesWereRevoked {
    updater: Updater::Unknown,
    count:   MAX_UNNAMED_REVOKED_INVITEES,
  }];
  assert_eq!(round_trip_group(&mut fx, at_limit.clone()), vec![at_limit]);

  let thread = fx.group_thread();
  let record = group_update(&thread, vec![GroupUpdateItem::UnnamedUserInvitesWereRevoked {
    updater: Updater::LocalUser,
    count:   MAX_UNNAMED_REVOKED_INVITEES + 1,
  }]);
  let ArchiveResult::Failure(errors) = fx.archive(&record, &thread) else {
    panic!("expected failure");
  };
  assert_eq!(
    errors[0].kind,
    ArchiveErrorKind::TooManyUnnamedRevokedInvitees(MAX_UNNAMED_REVOKED_INVITEES + 1)
  );
}

#[test]
fn skippable_group_updates() {
  let fx = Fixture::new();
  let thread = fx.group_thread();

  let only_prompt = group_update(&thread, vec![GroupUpdateItem::InviteFriendsToNewlyCreatedGroup]);
  assert!(matches!(
    fx.archive(&only_prompt, &thread),
    ArchiveResult::Skipped(SkipReason::OnlySkippableGroupUpdateItems)
  ));

  let legacy = info(&thread, InfoMessage::GroupUpdate {
    metadata: Some(GroupUpdateMetadata::LegacyRawString("Alice joined".into())),
  });
  assert!(matches!(
    fx.archive(&legacy, &thread),
    ArchiveResult::Skipped(SkipReason::LegacyGroupUpdate)
  ));
}

#[test]
fn group_update_without_metadata_is_fatal() {
  let fx = Fixture::new();
  let thread = fx.group_thread();
  let record = info(&thread, InfoMessage::GroupUpdate { metadata: None });
  assert!(matches!(
    fx.archive(&record, &thread),
    ArchiveResult::Fatal(FatalError::DeveloperError(_))
  ));
}

#[test]
fn new_group_metadata_goes_through_the_provider() {
  let fx = Fixture::new();
  let thread = fx.group_thread();
  let mut group = chatlog_core::group::GroupSnapshot::default();
  group.members.insert(fx.local_aci, chatlog_core::group::MemberRole::Administrator);
  let record = info(&thread, InfoMessage::GroupUpdate {
    metadata: Some(GroupUpdateMetadata::NewGroup { group, source: Updater::LocalUser }),
  });

  let item = success(fx.archive(&record, &thread));
  assert_eq!(group_updates(&item), [GroupChangeUpdate::GroupCreationUpdate(
    wire::GroupCreationUpdate { updater_aci: Some(fx.local_aci.to_bytes().to_vec()) }
  )]);
}

#[test]
fn group_change_outside_group_thread_fails() {
  let mut fx = Fixture::new();
  let thread = fx.alice_thread();
  let item = chat_item(
    LOCAL_ID,
    ChatUpdate::GroupChange(GroupChangeChatUpdate {
      updates: vec![GroupChangeUpdate::GroupV2MigrationUpdate(wire::GroupV2MigrationUpdate {})],
    }),
  );
  let RestoreResult::Failure(errors) = fx.restore(&item, &thread) else {
    panic!("expected failure");
  };
  assert_eq!(
    errors[0].invalid_proto_data(),
    Some(&InvalidProtoData::GroupUpdateMessageInNonGroupChat)
  );
}

#[test]
fn invalid_wire_aci_fails_only_its_update() {
  let mut fx = Fixture::new();
  let thread = fx.group_thread();
  let item = chat_item(
    LOCAL_ID,
    ChatUpdate::GroupChange(GroupChangeChatUpdate {
      updates: vec![
        GroupChangeUpdate::GroupMemberLeftUpdate(wire::GroupMemberLeftUpdate { aci: vec![1, 2, 3] }),
        GroupChangeUpdate::GroupV2MigrationUpdate(wire::GroupV2MigrationUpdate {}),
      ],
    }),
  );

  let RestoreResult::PartialSuccess((), errors) = fx.restore(&item, &thread) else {
    panic!("expected partial success");
  };
  assert_eq!(
    errors[0].invalid_proto_data(),
    Some(&InvalidProtoData::InvalidAci { field: "aci" })
  );
  assert_eq!(fx.restored_group_items(&thread), vec![vec![GroupUpdateItem::WasMigrated]]);
}

// ─── Collapsing ──────────────────────────────────────────────────────────────

fn single_group_item(update: GroupChangeUpdate) -> ChatUpdateItem {
  chat_item(
    LOCAL_ID,
    ChatUpdate::GroupChange(GroupChangeChatUpdate { updates: vec![update] }),
  )
}

#[test]
fn request_and_cancel_pairs_collapse_into_one_record() {
  let mut fx = Fixture::new();
  let thread = fx.group_thread();
  let bob = fx.bob.aci.expect("bob has an aci");
  let requestor_aci = bob.to_bytes().to_vec();
  let request = single_group_item(
    GroupChangeUpdate::GroupJoinRequestUpdate(wire::GroupJoinRequestUpdate {
      requestor_aci: requestor_aci.clone(),
    }),
  );
  let cancel = single_group_item(
    GroupChangeUpdate::GroupJoinRequestCanceledUpdate(wire::GroupJoinRequestCanceledUpdate {
      requestor_aci,
    }),
  );

  const PAIRS: u32 = 5;
  assert!(fx.restore(&request, &thread).is_success());
  for _ in 0..PAIRS {
    assert!(fx.restore(&cancel, &thread).is_success());
    assert!(fx.restore(&request, &thread).is_success());
  }

  assert_eq!(fx.restored_group_items(&thread), vec![vec![
    GroupUpdateItem::SequenceOfRequestsAndCancels { requester: bob, count: PAIRS, is_tail: false },
  ]]);

  assert!(fx.restore(&cancel, &thread).is_success());
  assert_eq!(fx.restored_group_items(&thread), vec![vec![
    GroupUpdateItem::SequenceOfRequestsAndCancels {
      requester: bob,
      count:     PAIRS + 1,
      is_tail:   true,
    },
  ]]);
}

#[test]
fn non_tail_sequence_folds_back_together() {
  let mut fx = Fixture::new();
  let thread = fx.group_thread();
  let alice = fx.alice_aci;
  let sequence = GroupUpdateItem::SequenceOfRequestsAndCancels {
    requester: alice,
    count:     2,
    is_tail:   false,
  };

  let item = success(fx.archive(&group_update(&thread, vec![sequence.clone()]), &thread));
  assert_eq!(group_updates(&item).len(), 2);

  assert!(fx.restore(&item, &thread).is_success());
  assert_eq!(fx.restored_group_items(&thread), vec![vec![sequence]]);
}

#[test]
fn records_with_several_items_are_not_collapsed_into() {
  let mut fx = Fixture::new();
  let thread = fx.group_thread();
  let bob = fx.bob.aci.expect("bob has an aci");
  let first = group_update(&thread, vec![
    GroupUpdateItem::NameRemoved { updater: Updater::LocalUser },
    GroupUpdateItem::RequestedToJoin { requester: Member::OtherUser(bob) },
  ]);
  let first = success(fx.archive(&first, &thread));
  let cancel = single_group_item(
    GroupChangeUpdate::GroupJoinRequestCanceledUpdate(wire::GroupJoinRequestCanceledUpdate {
      requestor_aci: bob.to_bytes().to_vec(),
    }),
  );

  assert!(fx.restore(&first, &thread).is_success());
  assert!(fx.restore(&cancel, &thread).is_success());
  assert_eq!(fx.restored_group_items(&thread).len(), 2);
}

// ─── Forward compatibility ───────────────────────────────────────────────────

#[test]
fn unrecognized_cases_are_skipped_not_failed() {
  let mut fx = Fixture::new();
  let thread = fx.group_thread();
  let lines = [
    r#"{"author_id":1,"date_sent":1700000000000,"update":{"type":"poll_terminate"}}"#,
    r#"{"author_id":1,"date_sent":1700000000000}"#,
    r#"{"author_id":1,"date_sent":1700000000000,"update":{"type":"group_change","updates":[{"type":"group_member_label_update"}]}}"#,
    r#"{"author_id":1,"date_sent":1700000000000,"update":{"type":"group_change","updates":[{"type":"group_member_label_update"},{"type":"group_v2_migration_update"}]}}"#,
  ];
  let items: Vec<ChatUpdateItem> = lines
    .iter()
    .map(|line| serde_json::from_str(line).unwrap())
    .collect();

  let mut context = RestoringContext::new(&fx.recipients, &mut fx.store);
  let summary = batch::restore_all(&items, &thread, &mut context).unwrap();
  assert_eq!(summary.unrecognized, 3);
  assert_eq!(summary.restored, 1);
  assert_eq!(summary.failed, 0);
  assert_eq!(fx.restored_group_items(&thread), vec![vec![GroupUpdateItem::WasMigrated]]);
}

// ─── Simple updates ──────────────────────────────────────────────────────────

fn simple_type(item: &ChatUpdateItem) -> SimpleChatUpdateType {
  match &item.update {
    Some(ChatUpdate::SimpleUpdate(update)) => update.update_type,
    other => panic!("expected a simple update, got {other:?}"),
  }
}

#[test]
fn simple_update_authors() {
  let fx = Fixture::new();
  let alice = fx.alice_thread();
  let bob_aci = fx.bob.aci.expect("bob has an aci");

  let cases = [
    (
      ChatUpdateKind::Info(InfoMessage::VerificationStateChange {
        recipient:       Some(fx.bob.clone()),
        state:           VerificationState::Verified,
        is_local_change: false,
      }),
      SimpleChatUpdateType::IdentityVerified,
      BOB_ID,
    ),
    (
      ChatUpdateKind::Info(InfoMessage::PhoneNumberChange {
        aci:        Some(bob_aci),
        old_number: None,
        new_number: None,
      }),
      SimpleChatUpdateType::ChangeNumber,
      BOB_ID,
    ),
    (
      ChatUpdateKind::Info(InfoMessage::PaymentsActivated {
        sender: Some(PaymentsParticipant::LocalUser),
      }),
      SimpleChatUpdateType::PaymentsActivated,
      LOCAL_ID,
    ),
    (
      ChatUpdateKind::Info(InfoMessage::PaymentsActivationRequest {
        sender: Some(PaymentsParticipant::OtherUser(fx.alice_aci)),
      }),
      SimpleChatUpdateType::PaymentActivationRequest,
      ALICE_ID,
    ),
    (
      ChatUpdateKind::Info(InfoMessage::UnknownProtocolVersion {
        sender:           None,
        protocol_version: 7,
      }),
      SimpleChatUpdateType::UnsupportedProtocolMessage,
      LOCAL_ID,
    ),
    (
      ChatUpdateKind::Info(InfoMessage::RemoteUserEndedSession),
      SimpleChatUpdateType::EndSession,
      ALICE_ID,
    ),
    (
      ChatUpdateKind::Info(InfoMessage::LocalUserEndedSession),
      SimpleChatUpdateType::EndSession,
      LOCAL_ID,
    ),
    (
      ChatUpdateKind::Info(InfoMessage::UserJoinedService),
      SimpleChatUpdateType::JoinedSignal,
      ALICE_ID,
    ),
    (ChatUpdateKind::Info(InfoMessage::ReportedSpam), SimpleChatUpdateType::ReportedSpam, LOCAL_ID),
    (ChatUpdateKind::Info(InfoMessage::BlockedOtherUser), SimpleChatUpdateType::Blocked, LOCAL_ID),
    (
      ChatUpdateKind::Info(InfoMessage::AcceptedMessageRequest),
      SimpleChatUpdateType::MessageRequestAccepted,
      LOCAL_ID,
    ),
    (
      ChatUpdateKind::Error(ErrorMessage::NonBlockingIdentityChange {
        recipient:             Some(fx.alice.clone()),
        was_identity_verified: true,
      }),
      SimpleChatUpdateType::IdentityUpdate,
      ALICE_ID,
    ),
    (
      ChatUpdateKind::Error(ErrorMessage::SessionRefresh),
      SimpleChatUpdateType::ChatSessionRefresh,
      ALICE_ID,
    ),
    (
      ChatUpdateKind::Error(ErrorMessage::DecryptionFailure { sender: Some(fx.bob.clone()) }),
      SimpleChatUpdateType::BadDecrypt,
      BOB_ID,
    ),
  ];

  for (kind, expected_type, expected_author) in cases {
    let item = success(fx.archive(&record(&alice, kind.clone()), &alice));
    assert_eq!(simple_type(&item), expected_type, "{kind:?}");
    assert_eq!(item.author_id, expected_author, "{kind:?}");
    assert_eq!(item.date_sent, SENT_AT_MS);
  }
}

#[test]
fn simple_updates_restore_with_their_author() {
  let mut fx = Fixture::new();
  let thread = fx.alice_thread();
  let simple = |author_id, update_type| {
    chat_item(author_id, ChatUpdate::SimpleUpdate(SimpleChatUpdate { update_type }))
  };

  for item in [
    simple(ALICE_ID, SimpleChatUpdateType::IdentityVerified),
    simple(LOCAL_ID, SimpleChatUpdateType::EndSession),
    simple(ALICE_ID, SimpleChatUpdateType::EndSession),
    simple(LOCAL_ID, SimpleChatUpdateType::PaymentsActivated),
    simple(ALICE_ID, SimpleChatUpdateType::UnsupportedProtocolMessage),
    simple(LOCAL_ID, SimpleChatUpdateType::Blocked),
  ] {
    assert!(fx.restore(&item, &thread).is_success(), "{item:?}");
  }

  assert_eq!(fx.restored_kinds(&thread), [
    ChatUpdateKind::Info(InfoMessage::VerificationStateChange {
      recipient:       Some(fx.alice.clone()),
      state:           VerificationState::Verified,
      is_local_change: true,
    }),
    ChatUpdateKind::Info(InfoMessage::LocalUserEndedSession),
    ChatUpdateKind::Info(InfoMessage::RemoteUserEndedSession),
    ChatUpdateKind::Info(InfoMessage::PaymentsActivated {
      sender: Some(PaymentsParticipant::LocalUser),
    }),
    ChatUpdateKind::Info(InfoMessage::UnknownProtocolVersion {
      sender:           Some(fx.alice.clone()),
      protocol_version: i64::MAX as u64,
    }),
    ChatUpdateKind::Info(InfoMessage::BlockedOtherUser),
  ]);
}

#[test]
fn blocked_in_group_restores_as_group_block() {
  let mut fx = Fixture::new();
  let thread = fx.group_thread();
  let item = chat_item(
    LOCAL_ID,
    ChatUpdate::SimpleUpdate(SimpleChatUpdate { update_type: SimpleChatUpdateType::Blocked }),
  );
  assert!(fx.restore(&item, &thread).is_success());
  assert_eq!(fx.restored_kinds(&thread), [ChatUpdateKind::Info(InfoMessage::BlockedGroup)]);
}

#[test]
fn session_refresh_needs_a_contact_thread() {
  let fx = Fixture::new();

  let group = fx.group_thread();
  let refresh = record(&group, ChatUpdateKind::Error(ErrorMessage::SessionRefresh));
  let ArchiveResult::Failure(errors) = fx.archive(&refresh, &group) else {
    panic!("expected failure");
  };
  assert_eq!(errors[0].kind, ArchiveErrorKind::ChatUpdateNotInContactThread {
    update: "CHAT_SESSION_REFRESH",
  });

  let note = ChatThread::note_to_self();
  let refresh = record(&note, ChatUpdateKind::Error(ErrorMessage::SessionRefresh));
  assert_eq!(success(fx.archive(&refresh, &note)).author_id, LOCAL_ID);
}

#[test]
fn note_to_self_simple_updates_round_trip() {
  let mut fx = Fixture::new();
  let note = ChatThread::note_to_self();

  let kept = [
    ChatUpdateKind::Info(InfoMessage::LocalUserEndedSession),
    ChatUpdateKind::Error(ErrorMessage::SessionRefresh),
  ];
  for kind in &kept {
    let item = success(fx.archive(&record(&note, kind.clone()), &note));
    assert_eq!(item.author_id, LOCAL_ID, "{kind:?}");
    assert!(fx.restore(&item, &note).is_success(), "{kind:?}");
  }
  assert_eq!(fx.restored_kinds(&note), kept);

  for (kind, update) in [
    (InfoMessage::UserJoinedService, "JOINED_SIGNAL"),
    (InfoMessage::RemoteUserEndedSession, "END_SESSION"),
  ] {
    let ArchiveResult::Failure(errors) = fx.archive(&info(&note, kind), &note) else {
      panic!("expected failure for {update}");
    };
    assert_eq!(errors[0].kind, ArchiveErrorKind::ChatUpdateNotInContactThread { update });
  }

  let joined = chat_item(
    LOCAL_ID,
    ChatUpdate::SimpleUpdate(SimpleChatUpdate { update_type: SimpleChatUpdateType::JoinedSignal }),
  );
  let RestoreResult::Failure(errors) = fx.restore(&joined, &note) else {
    panic!("expected failure");
  };
  assert_eq!(
    errors[0].invalid_proto_data(),
    Some(&InvalidProtoData::ChatUpdateNotInContactThread { update: "JOINED_SIGNAL" })
  );
}

#[test]
fn contact_only_simple_updates_are_rejected_in_groups() {
  let mut fx = Fixture::new();
  let group = fx.group_thread();

  for (update_type, update) in [
    (SimpleChatUpdateType::ChatSessionRefresh, "CHAT_SESSION_REFRESH"),
    (SimpleChatUpdateType::JoinedSignal, "JOINED_SIGNAL"),
    (SimpleChatUpdateType::EndSession, "END_SESSION"),
  ] {
    let item = chat_item(ALICE_ID, ChatUpdate::SimpleUpdate(SimpleChatUpdate { update_type }));
    let RestoreResult::Failure(errors) = fx.restore(&item, &group) else {
      panic!("expected failure for {update}");
    };
    assert_eq!(
      errors[0].invalid_proto_data(),
      Some(&InvalidProtoData::ChatUpdateNotInContactThread { update })
    );
  }
  assert!(fx.restored_kinds(&group).is_empty());

  let local_end = record(&group, ChatUpdateKind::Info(InfoMessage::LocalUserEndedSession));
  assert!(matches!(fx.archive(&local_end, &group), ArchiveResult::Failure(_)));
}

#[test]
fn simple_update_author_must_resolve() {
  let mut fx = Fixture::new();
  let thread = fx.alice_thread();

  let stranger = ContactAddress::from_aci(Aci(Uuid::new_v4()));
  let record = record(&thread, ChatUpdateKind::Error(ErrorMessage::DecryptionFailure {
    sender: Some(stranger.clone()),
  }));
  let ArchiveResult::Failure(errors) = fx.archive(&record, &thread) else {
    panic!("expected failure");
  };
  assert!(matches!(errors[0].kind, ArchiveErrorKind::ReferencedRecipientMissing(_)));

  let item = chat_item(
    chatlog_core::id::RecipientId(99),
    ChatUpdate::SimpleUpdate(SimpleChatUpdate { update_type: SimpleChatUpdateType::BadDecrypt }),
  );
  let RestoreResult::Failure(errors) = fx.restore(&item, &thread) else {
    panic!("expected failure");
  };
  assert_eq!(
    errors[0].invalid_proto_data(),
    Some(&InvalidProtoData::RecipientIdNotFound(chatlog_core::id::RecipientId(99)))
  );

  let from_group = chat_item(
    GROUP_ID,
    ChatUpdate::SimpleUpdate(SimpleChatUpdate {
      update_type: SimpleChatUpdateType::IdentityVerified,
    }),
  );
  let RestoreResult::Failure(errors) = fx.restore(&from_group, &thread) else {
    panic!("expected failure");
  };
  assert_eq!(
    errors[0].invalid_proto_data(),
    Some(&InvalidProtoData::VerificationStateChangeNotFromContact)
  );
}

#[test]
fn missing_author_fields_fail_archive() {
  let fx = Fixture::new();
  let thread = fx.alice_thread();
  let cases = [
    (
      ChatUpdateKind::Info(InfoMessage::VerificationStateChange {
        recipient:       None,
        state:           VerificationState::Default,
        is_local_change: true,
      }),
      ArchiveErrorKind::VerificationStateUpdateMissingAuthor,
    ),
    (
      ChatUpdateKind::Info(InfoMessage::PaymentsActivated { sender: None }),
      ArchiveErrorKind::PaymentsActivatedMissingAuthor,
    ),
    (
      ChatUpdateKind::Error(ErrorMessage::NonBlockingIdentityChange {
        recipient:             None,
        was_identity_verified: false,
      }),
      ArchiveErrorKind::IdentityKeyChangeMissingAuthor,
    ),
  ];
  for (kind, expected) in cases {
    let ArchiveResult::Failure(errors) = fx.archive(&record(&thread, kind), &thread) else {
      panic!("expected failure for {expected:?}");
    };
    assert_eq!(errors[0].kind, expected);
  }
}

#[test]
fn legacy_messages_are_skipped() {
  let fx = Fixture::new();
  let thread = fx.alice_thread();

  let info = record(&thread, ChatUpdateKind::Info(InfoMessage::Legacy {
    kind: LegacyInfoKind::SyncedThread,
  }));
  assert!(matches!(
    fx.archive(&info, &thread),
    ArchiveResult::Skipped(SkipReason::LegacyInfoMessage(LegacyInfoKind::SyncedThread))
  ));

  let error = record(&thread, ChatUpdateKind::Error(ErrorMessage::Legacy {
    kind: LegacyErrorKind::DuplicateMessage,
  }));
  assert!(matches!(
    fx.archive(&error, &thread),
    ArchiveResult::Skipped(SkipReason::LegacyErrorMessage(LegacyErrorKind::DuplicateMessage))
  ));
}

#[test]
fn donation_request_restores_without_a_record() {
  let mut fx = Fixture::new();
  let thread = fx.alice_thread();
  let item = chat_item(
    LOCAL_ID,
    ChatUpdate::SimpleUpdate(SimpleChatUpdate {
      update_type: SimpleChatUpdateType::ReleaseChannelDonationRequest,
    }),
  );
  assert!(fx.restore(&item, &thread).is_success());
  assert!(fx.store.records.is_empty());
}

#[test]
fn unknown_simple_update_type_fails() {
  let mut fx = Fixture::new();
  let thread = fx.alice_thread();
  let item = chat_item(
    ALICE_ID,
    ChatUpdate::SimpleUpdate(SimpleChatUpdate { update_type: SimpleChatUpdateType::Unknown }),
  );
  let RestoreResult::Failure(errors) = fx.restore(&item, &thread) else {
    panic!("expected failure");
  };
  assert_eq!(
    errors[0].invalid_proto_data(),
    Some(&InvalidProtoData::UnrecognizedSimpleChatUpdate)
  );
}

// ─── Expiration timer ────────────────────────────────────────────────────────

#[test]
fn expiration_timer_round_trip() {
  let mut fx = Fixture::new();
  let thread = fx.alice_thread();

  let enabled = info(&thread, InfoMessage::DisappearingTimer {
    enabled:                  true,
    duration_ms:              604_800_000,
    configured_by_local_user: false,
  });
  let disabled = info(&thread, InfoMessage::DisappearingTimer {
    enabled:                  false,
    duration_ms:              604_800_000,
    configured_by_local_user: true,
  });

  let enabled_item = success(fx.archive(&enabled, &thread));
  assert_eq!(enabled_item.author_id, ALICE_ID);
  let disabled_item = success(fx.archive(&disabled, &thread));
  assert_eq!(disabled_item.author_id, LOCAL_ID);
  assert_eq!(
    disabled_item.update,
    Some(ChatUpdate::ExpirationTimerChange(ExpirationTimerChatUpdate { expires_in_ms: 0 }))
  );

  assert!(fx.restore(&enabled_item, &thread).is_success());
  assert!(fx.restore(&disabled_item, &thread).is_success());
  assert_eq!(fx.restored_kinds(&thread), [
    enabled.kind,
    ChatUpdateKind::Info(InfoMessage::DisappearingTimer {
      enabled:                  false,
      duration_ms:              0,
      configured_by_local_user: true,
    }),
  ]);
}

#[test]
fn expiration_timer_in_group_fails() {
  let mut fx = Fixture::new();
  let thread = fx.group_thread();
  let record = info(&thread, InfoMessage::DisappearingTimer {
    enabled:                  true,
    duration_ms:              1_000,
    configured_by_local_user: true,
  });
  let ArchiveResult::Failure(errors) = fx.archive(&record, &thread) else {
    panic!("expected failure");
  };
  assert_eq!(errors[0].kind, ArchiveErrorKind::DisappearingMessageConfigUpdateNotInContactThread);

  let item = chat_item(
    LOCAL_ID,
    ChatUpdate::ExpirationTimerChange(ExpirationTimerChatUpdate { expires_in_ms: 1_000 }),
  );
  let RestoreResult::Failure(errors) = fx.restore(&item, &thread) else {
    panic!("expected failure");
  };
  assert_eq!(
    errors[0].invalid_proto_data(),
    Some(&InvalidProtoData::ExpirationTimerUpdateNotInContactThread)
  );
}

// ─── Contact-thread updates ──────────────────────────────────────────────────

#[test]
fn contact_thread_updates_fail_in_groups() {
  let fx = Fixture::new();
  let thread = fx.group_thread();
  let cases = [
    (
      InfoMessage::ThreadMerge { previous_phone_number: Some("+15550000001".into()) },
      "thread merge",
    ),
    (
      InfoMessage::SessionSwitchover { phone_number: Some("+15550000001".into()) },
      "session switchover",
    ),
    (
      InfoMessage::LearnedProfileName {
        previous_name: Some(LearnedDisplayName::Username("alice.01".into())),
      },
      "learned profile",
    ),
  ];

  for (kind, update) in cases {
    let ArchiveResult::Failure(errors) = fx.archive(&info(&thread, kind), &thread) else {
      panic!("expected failure for {update}");
    };
    assert_eq!(errors[0].kind, ArchiveErrorKind::ChatUpdateNotInContactThread { update });
  }
}

#[test]
fn phone_numbers_round_trip_through_integers() {
  let mut fx = Fixture::new();
  let thread = fx.alice_thread();

  let merge = info(&thread, InfoMessage::ThreadMerge {
    previous_phone_number: Some("+447700900123".into()),
  });
  let switchover = info(&thread, InfoMessage::SessionSwitchover {
    phone_number: Some("+15551234567".into()),
  });
  let learned = info(&thread, InfoMessage::LearnedProfileName {
    previous_name: Some(LearnedDisplayName::E164("+4915112345678".into())),
  });

  let merge_item = success(fx.archive(&merge, &thread));
  assert_eq!(
    merge_item.update,
    Some(ChatUpdate::ThreadMerge(wire::ThreadMergeChatUpdate { previous_e164: 447_700_900_123 }))
  );
  let switchover_item = success(fx.archive(&switchover, &thread));
  let learned_item = success(fx.archive(&learned, &thread));
  for item in [&merge_item, &switchover_item, &learned_item] {
    assert_eq!(item.author_id, ALICE_ID);
    assert!(fx.restore(item, &thread).is_success());
  }

  assert_eq!(fx.restored_kinds(&thread), [merge.kind, switchover.kind, learned.kind]);
}

#[test]
fn malformed_phone_numbers_are_item_failures() {
  let mut fx = Fixture::new();
  let thread = fx.alice_thread();

  let merge = info(&thread, InfoMessage::ThreadMerge {
    previous_phone_number: Some("555-1234".into()),
  });
  let ArchiveResult::Failure(errors) = fx.archive(&merge, &thread) else {
    panic!("expected failure");
  };
  assert_eq!(errors[0].kind, ArchiveErrorKind::InvalidE164("555-1234".into()));

  let item = chat_item(
    ALICE_ID,
    ChatUpdate::SessionSwitchover(wire::SessionSwitchoverChatUpdate { e164: 0 }),
  );
  let RestoreResult::Failure(errors) = fx.restore(&item, &thread) else {
    panic!("expected failure");
  };
  assert_eq!(errors[0].invalid_proto_data(), Some(&InvalidProtoData::InvalidE164(0)));
}

#[test]
fn profile_change_round_trip() {
  let mut fx = Fixture::new();
  let thread = fx.group_thread();
  let change = info(&thread, InfoMessage::ProfileChange {
    address:  Some(fx.bob.clone()),
    old_name: Some("Robert".into()),
    new_name: Some("Bob".into()),
  });

  let item = success(fx.archive(&change, &thread));
  assert_eq!(item.author_id, BOB_ID);
  assert!(fx.restore(&item, &thread).is_success());
  assert_eq!(fx.restored_kinds(&thread), [change.kind]);

  let nameless = info(&thread, InfoMessage::ProfileChange {
    address:  Some(fx.bob.clone()),
    old_name: None,
    new_name: Some("Bob".into()),
  });
  let ArchiveResult::Failure(errors) = fx.archive(&nameless, &thread) else {
    panic!("expected failure");
  };
  assert_eq!(errors[0].kind, ArchiveErrorKind::ProfileChangeUpdateMissingNames);
}

#[test]
fn learned_username_must_not_be_empty() {
  let mut fx = Fixture::new();
  let thread = fx.alice_thread();
  let item = chat_item(
    ALICE_ID,
    ChatUpdate::LearnedProfileChange(wire::LearnedProfileChatUpdate {
      previous_name: Some(wire::PreviousName::Username(String::new())),
    }),
  );
  let RestoreResult::Failure(errors) = fx.restore(&item, &thread) else {
    panic!("expected failure");
  };
  assert_eq!(
    errors[0].invalid_proto_data(),
    Some(&InvalidProtoData::LearnedProfileUpdateInvalidUsername)
  );
}

// ─── Storage and batches ─────────────────────────────────────────────────────

#[test]
fn insert_failures_surface_as_restore_errors() {
  let mut fx = Fixture::new();
  fx.store.reject_insert = true;
  let thread = fx.alice_thread();
  let item = chat_item(
    LOCAL_ID,
    ChatUpdate::SimpleUpdate(SimpleChatUpdate {
      update_type: SimpleChatUpdateType::MessageRequestAccepted,
    }),
  );
  let RestoreResult::Failure(errors) = fx.restore(&item, &thread) else {
    panic!("expected failure");
  };
  assert!(matches!(errors[0].kind, RestoreErrorKind::DatabaseInsertionFailed(_)));
}

#[test]
fn archive_all_accumulates_outcomes() {
  let fx = Fixture::new();
  let thread = fx.alice_thread();
  let records = [
    info(&thread, InfoMessage::ReportedSpam),
    info(&thread, InfoMessage::Legacy { kind: LegacyInfoKind::GroupQuit }),
    info(&thread, InfoMessage::ThreadMerge { previous_phone_number: None }),
    info(&thread, InfoMessage::AcceptedMessageRequest),
  ];

  let context = ArchivingContext::new(
    &fx.recipients,
    &chatlog_core::provider::SnapshotItemBuilder,
    &thread,
  );
  let summary = batch::archive_all(&records, &context).unwrap();
  assert_eq!(summary.archived(), 2);
  assert_eq!(summary.skipped, 1);
  assert_eq!(summary.failed, 1);
  assert_eq!(summary.errors.len(), 1);
  assert_eq!(
    summary.to_string(),
    "archived 2 chat updates (0 partial), 1 failed, 1 skipped"
  );
}

#[test]
fn archive_all_stops_on_fatal() {
  let fx = Fixture::new();
  let thread = fx.group_thread();
  let records = [info(&thread, InfoMessage::GroupUpdate { metadata: None })];
  let context = ArchivingContext::new(
    &fx.recipients,
    &chatlog_core::provider::SnapshotItemBuilder,
    &thread,
  );
  assert!(matches!(
    batch::archive_all(&records, &context),
    Err(FatalError::DeveloperError(_))
  ));
}
