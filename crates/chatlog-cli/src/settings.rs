//! Settings file and recipient table loading.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use chatlog_core::{
  address::RecipientAddress,
  id::{Aci, E164, LocalIdentifiers, Pni, RecipientId},
  recipient::RecipientTable,
};
use serde::Deserialize;
use uuid::Uuid;

// ─── Config ──────────────────────────────────────────────────────────────────

/// Shape of the settings file, after `CHATLOG_*` environment overrides.
#[derive(Debug, Deserialize)]
pub struct Config {
  /// Path to the SQLite database.
  #[serde(default = "default_database")]
  pub database:        PathBuf,
  pub local_aci:       Uuid,
  #[serde(default)]
  pub local_pni:       Option<Uuid>,
  #[serde(default)]
  pub local_e164:      Option<String>,
  /// JSON array of `{ "id": .., "address": .. }` entries.
  pub recipients_file: PathBuf,
}

fn default_database() -> PathBuf { PathBuf::from("chatlog.db") }

impl Config {
  pub fn load(path: &Path) -> Result<Self> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("CHATLOG"))
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise Config")
  }

  pub fn local_identifiers(&self) -> Result<LocalIdentifiers> {
    let mut local = LocalIdentifiers::new(Aci(self.local_aci));
    local.pni = self.local_pni.map(Pni);
    local.e164 = self
      .local_e164
      .as_deref()
      .map(E164::parse)
      .transpose()
      .context("invalid local_e164")?;
    Ok(local)
  }

  /// Build the recipient table from `recipients_file`. The entry whose
  /// address is the local user fixes the local recipient id; without one the
  /// local user is recipient 1.
  pub fn recipients(&self) -> Result<RecipientTable> {
    let path = &self.recipients_file;
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("failed to read recipients file {path:?}"))?;
    let entries: Vec<RecipientEntry> = serde_json::from_str(&raw)
      .with_context(|| format!("failed to parse recipients file {path:?}"))?;

    let local_id = entries
      .iter()
      .find(|e| e.address == RecipientAddress::LocalUser)
      .map(|e| e.id)
      .unwrap_or(RecipientId(1));

    let mut table = RecipientTable::new(self.local_identifiers()?, local_id);
    for entry in entries {
      if entry.address == RecipientAddress::LocalUser {
        continue;
      }
      table
        .insert(entry.id, entry.address)
        .with_context(|| format!("in recipients file {path:?}"))?;
    }
    Ok(table)
  }
}

#[derive(Debug, Deserialize)]
struct RecipientEntry {
  id:      RecipientId,
  address: RecipientAddress,
}
