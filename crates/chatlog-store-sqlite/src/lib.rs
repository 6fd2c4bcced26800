//! SQLite backend for chat-update records.
//!
//! Access is synchronous: an import runs inside one
//! [`SqliteTransaction`], which is the [`InteractionStore`] the restore path
//! writes through.
//!
//! [`InteractionStore`]: chatlog_core::store::InteractionStore

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{SqliteStore, SqliteTransaction};
