//! Simple chat updates: leaf events with no payload beyond an author.
//!
//! Historical records stored the actor inconsistently, so the author is
//! resolved per update type:
//!
//! | Record                              | Author                              |
//! |-------------------------------------|-------------------------------------|
//! | verification state change           | the record's recipient              |
//! | phone number change                 | the changed user's ACI              |
//! | payments request / activated        | local user or the recorded ACI      |
//! | unknown protocol version            | the sender, else the local user     |
//! | remote session ended, joined        | the 1:1 thread's other party        |
//! | local session ended                 | the local user, outside groups      |
//! | spam, blocks                        | the local user                      |
//! | identity change, decryption failure | the record's recipient / sender     |
//! | session refresh                     | the 1:1 thread's contact            |
//!
//! "Thread's contact" means the local user in note-to-self and is a failure
//! in group threads. "Other party" is a failure in note-to-self too. Restore
//! applies the same thread checks.

use chatlog_core::{
  address::{ContactAddress, RecipientAddress},
  id::RecipientId,
  record::{
    ChatUpdateKind, ChatUpdateRecord, ErrorMessage, InfoMessage, PaymentsParticipant,
    VerificationState,
  },
  store::InteractionStore,
  thread::{ChatThread, ThreadKind},
};

use crate::{
  codec::{chat_item, new_record},
  context::{ArchivingContext, RestoringContext},
  error::{
    ArchiveError, ArchiveErrorKind, ChatItemId, FatalError, InvalidProtoData, RestoreError,
  },
  result::{ArchiveResult, SkipReason},
  wire::{ChatUpdate, ChatUpdateItem, SimpleChatUpdate, SimpleChatUpdateType},
};

/// Placeholder version for restored unknown-protocol-version messages; the
/// real version is not carried in backups.
const RESTORED_PROTOCOL_VERSION: u64 = i64::MAX as u64;

// ─── Archive ─────────────────────────────────────────────────────────────────

enum Author {
  LocalUser,
  Contact(ContactAddress),
  /// The local user, in a 1:1 or note-to-self thread.
  LocalUserOutsideGroup,
  ThreadContact,
  /// The contact of a 1:1 thread with someone else.
  OtherParty,
}

pub(crate) fn archive(
  record: &ChatUpdateRecord,
  context: &ArchivingContext<'_>,
) -> ArchiveResult<ChatUpdateItem> {
  let missing = |kind| ArchiveResult::failure(ArchiveError::new(record.id, kind));

  use SimpleChatUpdateType as T;
  let (update_type, author) = match &record.kind {
    ChatUpdateKind::Info(info) => match info {
      InfoMessage::VerificationStateChange { recipient, state, .. } => {
        let Some(recipient) = recipient else {
          return missing(ArchiveErrorKind::VerificationStateUpdateMissingAuthor);
        };
        let update_type = match state {
          VerificationState::Verified => T::IdentityVerified,
          VerificationState::Default
          | VerificationState::DefaultAcknowledged
          | VerificationState::NoLongerVerified => T::IdentityDefault,
        };
        (update_type, Author::Contact(recipient.clone()))
      }
      InfoMessage::PhoneNumberChange { aci, .. } => match aci {
        Some(aci) => (T::ChangeNumber, Author::Contact(ContactAddress::from_aci(*aci))),
        None => return missing(ArchiveErrorKind::PhoneNumberChangeMissingAuthor),
      },
      InfoMessage::PaymentsActivationRequest { sender } => match sender {
        Some(sender) => (T::PaymentActivationRequest, payments_author(*sender)),
        None => return missing(ArchiveErrorKind::PaymentActivationRequestMissingAuthor),
      },
      InfoMessage::PaymentsActivated { sender } => match sender {
        Some(sender) => (T::PaymentsActivated, payments_author(*sender)),
        None => return missing(ArchiveErrorKind::PaymentsActivatedMissingAuthor),
      },
      InfoMessage::UnknownProtocolVersion { sender, .. } => {
        let author = match sender {
          Some(sender) => Author::Contact(sender.clone()),
          None => Author::LocalUser,
        };
        (T::UnsupportedProtocolMessage, author)
      }
      InfoMessage::RemoteUserEndedSession => (T::EndSession, Author::OtherParty),
      InfoMessage::LocalUserEndedSession => (T::EndSession, Author::LocalUserOutsideGroup),
      InfoMessage::UserJoinedService => (T::JoinedSignal, Author::OtherParty),
      InfoMessage::ReportedSpam => (T::ReportedSpam, Author::LocalUser),
      InfoMessage::BlockedOtherUser | InfoMessage::BlockedGroup => {
        (T::Blocked, Author::LocalUser)
      }
      InfoMessage::UnblockedOtherUser | InfoMessage::UnblockedGroup => {
        (T::Unblocked, Author::LocalUser)
      }
      InfoMessage::AcceptedMessageRequest => (T::MessageRequestAccepted, Author::LocalUser),
      InfoMessage::Legacy { kind } => {
        return ArchiveResult::Skipped(SkipReason::LegacyInfoMessage(*kind));
      }
      InfoMessage::GroupUpdate { .. }
      | InfoMessage::DisappearingTimer { .. }
      | InfoMessage::ProfileChange { .. }
      | InfoMessage::SessionSwitchover { .. }
      | InfoMessage::ThreadMerge { .. }
      | InfoMessage::LearnedProfileName { .. } => {
        return ArchiveResult::Fatal(FatalError::DeveloperError(format!(
          "{} routed to the simple chat update codec",
          record.kind.name()
        )));
      }
    },
    ChatUpdateKind::Error(error) => match error {
      ErrorMessage::NonBlockingIdentityChange { recipient, .. } => match recipient {
        Some(recipient) => (T::IdentityUpdate, Author::Contact(recipient.clone())),
        None => return missing(ArchiveErrorKind::IdentityKeyChangeMissingAuthor),
      },
      ErrorMessage::SessionRefresh => (T::ChatSessionRefresh, Author::ThreadContact),
      ErrorMessage::DecryptionFailure { sender } => match sender {
        Some(sender) => (T::BadDecrypt, Author::Contact(sender.clone())),
        None => return missing(ArchiveErrorKind::DecryptionErrorMissingAuthor),
      },
      ErrorMessage::Legacy { kind } => {
        return ArchiveResult::Skipped(SkipReason::LegacyErrorMessage(*kind));
      }
    },
  };

  let encoded = resolve_author(record, update_type, author, context).and_then(|author_id| {
    chat_item(
      record,
      author_id,
      ChatUpdate::SimpleUpdate(SimpleChatUpdate { update_type }),
    )
  });
  match encoded {
    Ok(item) => ArchiveResult::Success(item),
    Err(error) => ArchiveResult::failure(error),
  }
}

fn payments_author(sender: PaymentsParticipant) -> Author {
  match sender {
    PaymentsParticipant::LocalUser => Author::LocalUser,
    PaymentsParticipant::OtherUser(aci) => Author::Contact(ContactAddress::from_aci(aci)),
  }
}

fn resolve_author(
  record: &ChatUpdateRecord,
  update_type: SimpleChatUpdateType,
  author: Author,
  context: &ArchivingContext<'_>,
) -> Result<RecipientId, ArchiveError> {
  let not_in_contact_thread = || {
    Err(ArchiveError::new(
      record.id,
      ArchiveErrorKind::ChatUpdateNotInContactThread { update: update_type.into() },
    ))
  };

  use Author as A;
  match (author, &context.thread.kind) {
    (A::LocalUser, _) => Ok(context.local_recipient_id()),
    (A::Contact(contact), _) => context.contact_recipient_id(&contact, record.id),
    (A::LocalUserOutsideGroup | A::ThreadContact | A::OtherParty, ThreadKind::Group(_)) => {
      not_in_contact_thread()
    }
    (A::OtherParty, ThreadKind::NoteToSelf) => not_in_contact_thread(),
    (A::LocalUserOutsideGroup | A::ThreadContact, ThreadKind::NoteToSelf)
    | (A::LocalUserOutsideGroup, ThreadKind::Contact(_)) => Ok(context.local_recipient_id()),
    (A::ThreadContact | A::OtherParty, ThreadKind::Contact(contact)) => {
      context.contact_recipient_id(contact, record.id)
    }
  }
}

// ─── Restore ─────────────────────────────────────────────────────────────────

pub(crate) fn restore<S: InteractionStore>(
  update: &SimpleChatUpdate,
  item: &ChatUpdateItem,
  thread: &ChatThread,
  context: &mut RestoringContext<'_, S>,
) -> Result<(), RestoreError> {
  let chat_item_id = ChatItemId(item.date_sent);
  let fail = |reason| Err(RestoreError::new(chat_item_id, reason));
  let not_in_contact_thread = || {
    fail(InvalidProtoData::ChatUpdateNotInContactThread { update: update.update_type.into() })
  };

  let author = context.address(item.author_id, chat_item_id)?;
  let local = context.local_identifiers();
  // The local user as a contact address, for shapes that always name one.
  let author_contact = match author {
    RecipientAddress::LocalUser => Some(ContactAddress::from_aci(local.aci)),
    RecipientAddress::Contact(contact) => Some(contact.clone()),
    _ => None,
  };

  use SimpleChatUpdateType as T;
  let kind = match update.update_type {
    T::JoinedSignal => match (author, &thread.kind) {
      (_, ThreadKind::Group(_) | ThreadKind::NoteToSelf) => return not_in_contact_thread(),
      (RecipientAddress::Contact(_), ThreadKind::Contact(_)) => {
        ChatUpdateKind::Info(InfoMessage::UserJoinedService)
      }
      _ => return fail(InvalidProtoData::JoinedSignalNotFromContact),
    },
    T::IdentityUpdate => match author {
      RecipientAddress::Contact(contact) => {
        ChatUpdateKind::Error(ErrorMessage::NonBlockingIdentityChange {
          recipient:             Some(contact.clone()),
          was_identity_verified: false,
        })
      }
      _ => return fail(InvalidProtoData::IdentityUpdateNotFromContact),
    },
    T::IdentityVerified | T::IdentityDefault => match author {
      RecipientAddress::Contact(contact) => {
        ChatUpdateKind::Info(InfoMessage::VerificationStateChange {
          recipient:       Some(contact.clone()),
          state:           if update.update_type == T::IdentityVerified {
            VerificationState::Verified
          } else {
            VerificationState::Default
          },
          is_local_change: true,
        })
      }
      _ => return fail(InvalidProtoData::VerificationStateChangeNotFromContact),
    },
    T::ChangeNumber => match author {
      RecipientAddress::Contact(ContactAddress { aci: Some(aci), .. }) => {
        ChatUpdateKind::Info(InfoMessage::PhoneNumberChange {
          aci:        Some(*aci),
          old_number: None,
          new_number: None,
        })
      }
      _ => return fail(InvalidProtoData::PhoneNumberChangeNotFromContact),
    },
    T::ReleaseChannelDonationRequest => {
      tracing::debug!(%chat_item_id, "release channel donation request not restored");
      return Ok(());
    }
    T::EndSession => match (author, &thread.kind) {
      (_, ThreadKind::Group(_)) => return not_in_contact_thread(),
      (RecipientAddress::LocalUser, _) => {
        ChatUpdateKind::Info(InfoMessage::LocalUserEndedSession)
      }
      (RecipientAddress::Contact(_), ThreadKind::NoteToSelf) => return not_in_contact_thread(),
      (RecipientAddress::Contact(_), _) => {
        ChatUpdateKind::Info(InfoMessage::RemoteUserEndedSession)
      }
      _ => return fail(InvalidProtoData::EndSessionNotFromContact),
    },
    T::ChatSessionRefresh => match thread.kind {
      ThreadKind::Group(_) => return not_in_contact_thread(),
      ThreadKind::Contact(_) | ThreadKind::NoteToSelf => {
        ChatUpdateKind::Error(ErrorMessage::SessionRefresh)
      }
    },
    T::BadDecrypt => match author_contact {
      Some(sender) => ChatUpdateKind::Error(ErrorMessage::DecryptionFailure {
        sender: Some(sender),
      }),
      None => return fail(InvalidProtoData::DecryptionErrorNotFromContact),
    },
    T::PaymentsActivated | T::PaymentActivationRequest => {
      let sender = match author {
        RecipientAddress::LocalUser => PaymentsParticipant::LocalUser,
        RecipientAddress::Contact(ContactAddress { aci: Some(aci), .. }) => {
          PaymentsParticipant::OtherUser(*aci)
        }
        _ => return fail(InvalidProtoData::PaymentsActivatedNotFromAci),
      };
      let sender = Some(sender);
      ChatUpdateKind::Info(if update.update_type == T::PaymentsActivated {
        InfoMessage::PaymentsActivated { sender }
      } else {
        InfoMessage::PaymentsActivationRequest { sender }
      })
    }
    T::UnsupportedProtocolMessage => {
      let sender = match author {
        RecipientAddress::LocalUser => None,
        RecipientAddress::Contact(contact) => Some(contact.clone()),
        _ => return fail(InvalidProtoData::UnsupportedProtocolVersionNotFromContact),
      };
      ChatUpdateKind::Info(InfoMessage::UnknownProtocolVersion {
        sender,
        protocol_version: RESTORED_PROTOCOL_VERSION,
      })
    }
    T::ReportedSpam => ChatUpdateKind::Info(InfoMessage::ReportedSpam),
    T::Blocked => ChatUpdateKind::Info(if thread.is_group() {
      InfoMessage::BlockedGroup
    } else {
      InfoMessage::BlockedOtherUser
    }),
    T::Unblocked => ChatUpdateKind::Info(if thread.is_group() {
      InfoMessage::UnblockedGroup
    } else {
      InfoMessage::UnblockedOtherUser
    }),
    T::MessageRequestAccepted => ChatUpdateKind::Info(InfoMessage::AcceptedMessageRequest),
    T::Unknown => return fail(InvalidProtoData::UnrecognizedSimpleChatUpdate),
  };

  context.insert(new_record(item, thread, kind)?, chat_item_id)?;
  Ok(())
}
