//! Recipient resolution: mapping domain addresses to backup-local recipient
//! ids and back.
//!
//! Recipients themselves are archived by another component; the chat-update
//! codec only looks them up.

use std::collections::BTreeMap;

use crate::{
  Error, Result,
  address::{ContactAddress, RecipientAddress},
  id::{LocalIdentifiers, RecipientId},
};

/// Read-only recipient lookup for one export or import pass.
pub trait RecipientContext {
  fn local_identifiers(&self) -> &LocalIdentifiers;

  /// The recipient id standing for the local user.
  fn local_recipient_id(&self) -> RecipientId;

  /// Resolve an address to its recipient id. Contact addresses that name the
  /// local account resolve to [`RecipientContext::local_recipient_id`].
  fn recipient_id(&self, address: &RecipientAddress) -> Option<RecipientId>;

  /// The inverse of [`RecipientContext::recipient_id`].
  fn address(&self, id: RecipientId) -> Option<&RecipientAddress>;

  fn contact_recipient_id(&self, contact: &ContactAddress) -> Option<RecipientId> {
    self.recipient_id(&RecipientAddress::Contact(contact.clone()))
  }
}

// ─── In-memory table ─────────────────────────────────────────────────────────

/// A [`RecipientContext`] backed by an ordered map.
#[derive(Debug, Clone)]
pub struct RecipientTable {
  local:    LocalIdentifiers,
  local_id: RecipientId,
  entries:  BTreeMap<RecipientId, RecipientAddress>,
}

impl RecipientTable {
  pub fn new(local: LocalIdentifiers, local_id: RecipientId) -> Self {
    let mut entries = BTreeMap::new();
    entries.insert(local_id, RecipientAddress::LocalUser);
    Self { local, local_id, entries }
  }

  /// Register `address` under a caller-chosen id.
  pub fn insert(&mut self, id: RecipientId, address: RecipientAddress) -> Result<()> {
    if self.entries.contains_key(&id) {
      return Err(Error::DuplicateRecipient(id));
    }
    self.entries.insert(id, address);
    Ok(())
  }

  /// Return the id for `address`, allocating the id after the highest one in
  /// use if the address is new.
  pub fn register(&mut self, address: RecipientAddress) -> Result<RecipientId> {
    if let Some(id) = self.recipient_id(&address) {
      return Ok(id);
    }
    let next = match self.entries.keys().next_back() {
      Some(last) => RecipientId(last.0.checked_add(1).ok_or(Error::RecipientIdsExhausted)?),
      None => RecipientId(1),
    };
    self.entries.insert(next, address);
    Ok(next)
  }

  pub fn iter(&self) -> impl Iterator<Item = (RecipientId, &RecipientAddress)> {
    self.entries.iter().map(|(id, address)| (*id, address))
  }
}

impl RecipientContext for RecipientTable {
  fn local_identifiers(&self) -> &LocalIdentifiers { &self.local }

  fn local_recipient_id(&self) -> RecipientId { self.local_id }

  fn recipient_id(&self, address: &RecipientAddress) -> Option<RecipientId> {
    if let RecipientAddress::Contact(contact) = address
      && contact.is_local(&self.local)
    {
      return Some(self.local_id);
    }
    self
      .entries
      .iter()
      .find(|(_, candidate)| match (address, candidate) {
        (RecipientAddress::Contact(a), RecipientAddress::Contact(b)) => a.matches(b),
        (a, b) => a == *b,
      })
      .map(|(id, _)| *id)
  }

  fn address(&self, id: RecipientId) -> Option<&RecipientAddress> {
    self.entries.get(&id)
  }
}
