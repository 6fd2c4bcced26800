//! Archiving and restoring of chat updates.
//!
//! A chat update is a system-generated timeline event (a group change, a
//! disappearing-message timer change, a safety-number change and so on).
//! [`dispatcher::archive`] turns a stored [`ChatUpdateRecord`] into a wire
//! [`ChatUpdateItem`]; [`dispatcher::restore`] does the reverse, writing into
//! an [`InteractionStore`]. [`batch`] drives either direction over a whole
//! thread.
//!
//! Both directions report per-item outcomes instead of failing: see
//! [`ArchiveResult`] and [`RestoreResult`].
//!
//! [`ChatUpdateRecord`]: chatlog_core::record::ChatUpdateRecord
//! [`ChatUpdateItem`]: wire::ChatUpdateItem
//! [`InteractionStore`]: chatlog_core::store::InteractionStore

pub mod batch;
mod codec;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod result;
pub mod wire;

#[cfg(test)]
pub(crate) mod test_helpers;
#[cfg(test)]
mod tests;

pub use batch::{ArchiveSummary, RestoreSummary, archive_all, restore_all};
pub use context::{ArchivingContext, RestoringContext};
pub use error::{
  ArchiveError, ArchiveErrorKind, ChatItemId, FatalError, InvalidProtoData, RestoreError,
  RestoreErrorKind,
};
pub use result::{ArchiveResult, RestoreResult, SkipReason, UnrecognizedVariant};
