//! Identifiers: service ids, phone numbers and the opaque ids used by
//! threads, interactions and backup-local recipients.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Service ids ─────────────────────────────────────────────────────────────

/// An account identifier. The nil UUID is never a valid ACI.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Aci(pub Uuid);

impl Aci {
  /// Decode the 16-byte binary form.
  pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
    let uuid =
      Uuid::from_slice(bytes).map_err(|_| Error::InvalidAciLength(bytes.len()))?;
    if uuid.is_nil() {
      return Err(Error::NilServiceId);
    }
    Ok(Self(uuid))
  }

  pub fn to_bytes(self) -> [u8; 16] { self.0.into_bytes() }

  pub fn is_valid(&self) -> bool { !self.0.is_nil() }
}

impl fmt::Display for Aci {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "ACI:{}", self.0)
  }
}

/// A phone-number identity.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Pni(pub Uuid);

impl Pni {
  pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
    let uuid =
      Uuid::from_slice(bytes).map_err(|_| Error::InvalidPniLength(bytes.len()))?;
    if uuid.is_nil() {
      return Err(Error::NilServiceId);
    }
    Ok(Self(uuid))
  }

  pub fn to_bytes(self) -> [u8; 16] { self.0.into_bytes() }
}

impl fmt::Display for Pni {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "PNI:{}", self.0)
  }
}

const PNI_KIND_BYTE: u8 = 0x01;
const ACI_KIND_BYTE: u8 = 0x00;

/// Either kind of service id.
///
/// The binary form is the bare 16 UUID bytes for an ACI, and a `0x01` kind
/// byte followed by the UUID bytes for a PNI. A `0x00`-prefixed ACI is
/// accepted on decode.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(tag = "kind", content = "uuid", rename_all = "snake_case")]
pub enum ServiceId {
  Aci(Aci),
  Pni(Pni),
}

impl ServiceId {
  pub fn to_bytes(self) -> Vec<u8> {
    match self {
      ServiceId::Aci(aci) => aci.to_bytes().to_vec(),
      ServiceId::Pni(pni) => {
        let mut out = Vec::with_capacity(17);
        out.push(PNI_KIND_BYTE);
        out.extend_from_slice(&pni.to_bytes());
        out
      }
    }
  }

  pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
    match bytes.len() {
      16 => Aci::from_bytes(bytes).map(ServiceId::Aci),
      17 => match bytes[0] {
        ACI_KIND_BYTE => Aci::from_bytes(&bytes[1..]).map(ServiceId::Aci),
        PNI_KIND_BYTE => Pni::from_bytes(&bytes[1..]).map(ServiceId::Pni),
        other => Err(Error::UnknownServiceIdKind(other)),
      },
      len => Err(Error::InvalidServiceIdLength(len)),
    }
  }

  pub fn aci(&self) -> Option<Aci> {
    match self {
      ServiceId::Aci(aci) => Some(*aci),
      ServiceId::Pni(_) => None,
    }
  }
}

impl From<Aci> for ServiceId {
  fn from(aci: Aci) -> Self { ServiceId::Aci(aci) }
}

impl From<Pni> for ServiceId {
  fn from(pni: Pni) -> Self { ServiceId::Pni(pni) }
}

// ─── Phone numbers ───────────────────────────────────────────────────────────

/// A validated E.164 phone number: `+` followed by 1 to 15 digits, the first
/// of which is non-zero.
///
/// The backup wire format carries these as the integer formed by the digits.
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct E164(String);

impl E164 {
  pub fn parse(input: &str) -> Result<Self> {
    let digits = input
      .strip_prefix('+')
      .ok_or_else(|| Error::InvalidE164(input.to_string()))?;
    let valid = (1..=15).contains(&digits.len())
      && digits.bytes().all(|b| b.is_ascii_digit())
      && !digits.starts_with('0');
    if !valid {
      return Err(Error::InvalidE164(input.to_string()));
    }
    Ok(Self(input.to_string()))
  }

  /// Rebuild a number from its wire integer.
  pub fn from_u64(value: u64) -> Result<Self> {
    Self::parse(&format!("+{value}")).map_err(|_| Error::InvalidE164Number(value))
  }

  /// The wire integer. At most 15 digits, so this never overflows.
  pub fn to_u64(&self) -> u64 {
    self.0[1..]
      .bytes()
      .fold(0u64, |acc, b| acc * 10 + u64::from(b - b'0'))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl FromStr for E164 {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> { Self::parse(s) }
}

impl TryFrom<String> for E164 {
  type Error = Error;

  fn try_from(value: String) -> Result<Self> { Self::parse(&value) }
}

impl From<E164> for String {
  fn from(value: E164) -> Self { value.0 }
}

impl fmt::Display for E164 {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

// ─── Opaque ids ──────────────────────────────────────────────────────────────

/// A recipient identifier local to one backup file.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RecipientId(pub u64);

impl fmt::Display for RecipientId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "recipient#{}", self.0)
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ThreadId(pub Uuid);

impl ThreadId {
  pub fn new() -> Self { Self(Uuid::new_v4()) }
}

impl Default for ThreadId {
  fn default() -> Self { Self::new() }
}

impl fmt::Display for ThreadId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct InteractionId(pub Uuid);

impl InteractionId {
  pub fn new() -> Self { Self(Uuid::new_v4()) }
}

impl Default for InteractionId {
  fn default() -> Self { Self::new() }
}

impl fmt::Display for InteractionId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Opaque group identifier bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub Vec<u8>);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DistributionListId(pub Uuid);

// ─── Local identity ──────────────────────────────────────────────────────────

/// The identifiers of the account performing the export or import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalIdentifiers {
  pub aci:  Aci,
  pub pni:  Option<Pni>,
  pub e164: Option<E164>,
}

impl LocalIdentifiers {
  pub fn new(aci: Aci) -> Self { Self { aci, pni: None, e164: None } }

  pub fn contains_service_id(&self, service_id: ServiceId) -> bool {
    match service_id {
      ServiceId::Aci(aci) => aci == self.aci,
      ServiceId::Pni(pni) => Some(pni) == self.pni,
    }
  }
}
