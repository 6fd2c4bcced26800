//! Chat threads as seen by the backup codec.

use serde::{Deserialize, Serialize};

use crate::{
  address::ContactAddress,
  id::{GroupId, ThreadId},
};

/// What kind of conversation a thread is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ThreadKind {
  /// A 1:1 conversation with another user.
  Contact(ContactAddress),
  /// The local user's conversation with themself.
  NoteToSelf,
  Group(GroupId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatThread {
  pub id:   ThreadId,
  pub kind: ThreadKind,
}

impl ChatThread {
  pub fn contact(address: ContactAddress) -> Self {
    Self { id: ThreadId::new(), kind: ThreadKind::Contact(address) }
  }

  pub fn note_to_self() -> Self {
    Self { id: ThreadId::new(), kind: ThreadKind::NoteToSelf }
  }

  pub fn group(group_id: GroupId) -> Self {
    Self { id: ThreadId::new(), kind: ThreadKind::Group(group_id) }
  }

  pub fn is_group(&self) -> bool { matches!(self.kind, ThreadKind::Group(_)) }

  /// The other party of a 1:1 thread.
  pub fn contact_address(&self) -> Option<&ContactAddress> {
    match &self.kind {
      ThreadKind::Contact(address) => Some(address),
      _ => None,
    }
  }
}
