//! Collapsing of restored group update items.
//!
//! Some logical events are split across several wire entries, or across
//! consecutive chat items. Restoring them verbatim would produce a record per
//! entry, so decoded items are folded together when one continues another:
//!
//! - a join request followed by its cancellation becomes a sequence of one
//!   request and cancel;
//! - a cancellation after a non-tail sequence extends it;
//! - a new request after a tail sequence marks it as non-tail;
//! - two sequences by the same requester add up;
//! - unnamed invite revocations by the same known actor add up.
//!
//! Items are first folded into the most recent record of the thread (while
//! nothing new has been kept yet), then into each other.

use chatlog_core::group::{GroupUpdateItem, Member};

/// What remains after collapsing.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Collapsed {
  /// Items that still need a record of their own.
  pub remaining:            Vec<GroupUpdateItem>,
  /// Whether `previous` was modified and must be written back.
  pub merged_into_previous: bool,
}

/// Fold `items` into `previous` (the sole item of the thread's latest group
/// update record, if any) and into each other.
pub(crate) fn collapse(
  items: Vec<GroupUpdateItem>,
  mut previous: Option<&mut GroupUpdateItem>,
) -> Collapsed {
  let mut remaining: Vec<GroupUpdateItem> = Vec::with_capacity(items.len());
  let mut merged_into_previous = false;

  for item in items {
    let into_previous = remaining.is_empty();
    let merged = match remaining.last_mut() {
      Some(last) => merge(last, &item),
      None => previous.as_deref_mut().is_some_and(|prev| merge(prev, &item)),
    };
    if merged {
      merged_into_previous |= into_previous;
    } else {
      remaining.push(item);
    }
  }

  Collapsed { remaining, merged_into_previous }
}

/// Merge `next` into `prev` if it continues it. Returns whether it did.
fn merge(prev: &mut GroupUpdateItem, next: &GroupUpdateItem) -> bool {
  use GroupUpdateItem as G;

  let merged = match (&*prev, next) {
    (
      G::RequestedToJoin { requester: Member::OtherUser(a) },
      G::RequestCanceled { requester: Member::OtherUser(b) },
    ) if a == b => G::SequenceOfRequestsAndCancels {
      requester: *a,
      count:     1,
      is_tail:   true,
    },
    (
      G::SequenceOfRequestsAndCancels { requester: a, count, is_tail: false },
      G::RequestCanceled { requester: Member::OtherUser(b) },
    ) if a == b => G::SequenceOfRequestsAndCancels {
      requester: *a,
      count:     count.saturating_add(1),
      is_tail:   true,
    },
    (
      G::SequenceOfRequestsAndCancels { requester: a, count, is_tail: true },
      G::RequestedToJoin { requester: Member::OtherUser(b) },
    ) if a == b => G::SequenceOfRequestsAndCancels {
      requester: *a,
      count:     *count,
      is_tail:   false,
    },
    (
      G::SequenceOfRequestsAndCancels { requester: a, count, is_tail: true },
      G::SequenceOfRequestsAndCancels { requester: b, count: more, is_tail },
    ) if a == b => G::SequenceOfRequestsAndCancels {
      requester: *a,
      count:     count.saturating_add(*more),
      is_tail:   *is_tail,
    },
    (
      G::UnnamedUserInvitesWereRevoked { updater: a, count },
      G::UnnamedUserInvitesWereRevoked { updater: b, count: more },
    ) if a == b && a.is_known() => G::UnnamedUserInvitesWereRevoked {
      updater: *a,
      count:   count.saturating_add(*more),
    },
    _ => return false,
  };

  *prev = merged;
  true
}
