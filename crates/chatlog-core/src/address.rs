//! Addresses: how the domain refers to the local user, contacts, groups and
//! the other recipient kinds a backup can reference.

use serde::{Deserialize, Serialize};

use crate::id::{Aci, DistributionListId, E164, GroupId, LocalIdentifiers, Pni};

/// A contact, known by any combination of its identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ContactAddress {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub aci:  Option<Aci>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub pni:  Option<Pni>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub e164: Option<E164>,
}

impl ContactAddress {
  pub fn from_aci(aci: Aci) -> Self { Self { aci: Some(aci), ..Self::default() } }

  pub fn from_e164(e164: E164) -> Self {
    Self { e164: Some(e164), ..Self::default() }
  }

  pub fn is_empty(&self) -> bool {
    self.aci.is_none() && self.pni.is_none() && self.e164.is_none()
  }

  /// Two addresses match when they share any identifier. ACIs are compared
  /// first and win over the weaker identifiers when both sides carry one.
  pub fn matches(&self, other: &ContactAddress) -> bool {
    if let (Some(a), Some(b)) = (self.aci, other.aci) {
      return a == b;
    }
    if let (Some(a), Some(b)) = (self.pni, other.pni)
      && a == b
    {
      return true;
    }
    matches!((&self.e164, &other.e164), (Some(a), Some(b)) if a == b)
  }

  /// Whether this address actually names the local account.
  pub fn is_local(&self, local: &LocalIdentifiers) -> bool {
    if let Some(aci) = self.aci {
      return aci == local.aci;
    }
    if let Some(pni) = self.pni
      && Some(pni) == local.pni
    {
      return true;
    }
    self.e164.is_some() && self.e164 == local.e164
  }
}

/// Anything a backup recipient id can stand for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum RecipientAddress {
  LocalUser,
  Contact(ContactAddress),
  Group(GroupId),
  ReleaseNotesChannel,
  DistributionList(DistributionListId),
}

impl RecipientAddress {
  pub fn contact(&self) -> Option<&ContactAddress> {
    match self {
      RecipientAddress::Contact(address) => Some(address),
      _ => None,
    }
  }
}
