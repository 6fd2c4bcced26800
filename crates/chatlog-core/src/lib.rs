//! Core types and trait definitions for chat-update backups.
//!
//! This crate holds the domain side of the backup codec: identifiers,
//! threads, chat-update records and group-update items, plus the
//! collaborator traits the codec consumes (recipient resolution, the
//! interaction store and the group-update item provider). It performs no
//! I/O of its own.

pub mod address;
pub mod error;
pub mod group;
pub mod id;
pub mod provider;
pub mod recipient;
pub mod record;
pub mod store;
pub mod thread;

pub use error::{Error, Result};
