//! Error types for `chatlog-core`.

use thiserror::Error;

use crate::id::RecipientId;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid E.164 phone number: {0:?}")]
  InvalidE164(String),

  #[error("integer {0} is not a valid E.164 phone number")]
  InvalidE164Number(u64),

  #[error("invalid ACI: expected 16 bytes, got {0}")]
  InvalidAciLength(usize),

  #[error("invalid PNI: expected 16 bytes, got {0}")]
  InvalidPniLength(usize),

  #[error("the nil UUID is not a valid service id")]
  NilServiceId,

  #[error("invalid service id: {0} bytes")]
  InvalidServiceIdLength(usize),

  #[error("unknown service id kind byte: {0:#04x}")]
  UnknownServiceIdKind(u8),

  #[error("recipient {0} is already registered")]
  DuplicateRecipient(RecipientId),

  #[error("no recipient ids left to allocate")]
  RecipientIdsExhausted,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
