//! `chatlog`: export and import chat updates between a SQLite store and the
//! JSON-lines backup format.
//!
//! # Usage
//!
//! ```
//! chatlog export --output backup.jsonl
//! chatlog --config ~/.config/chatlog.toml import backup.jsonl
//! ```

mod frame;
mod settings;

use std::{
  fs::File,
  io::{self, BufReader, BufWriter, Write},
  path::PathBuf,
};

use anyhow::{Context as _, Result};
use chatlog_backup::{ArchiveSummary, ArchivingContext, RestoreSummary, RestoringContext};
use chatlog_core::provider::SnapshotItemBuilder;
use chatlog_store_sqlite::SqliteStore;
use clap::{Parser, Subcommand};
use settings::Config;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "chatlog", version, about = "Chat update backup tool")]
struct Cli {
  /// Path to the configuration file.
  #[arg(short, long, default_value = "chatlog.toml")]
  config: PathBuf,

  /// SQLite database; overrides `database` from the config file.
  #[arg(long)]
  database: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Write every thread's chat updates as backup frames.
  Export {
    /// Output file; standard output when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,
  },
  /// Restore chat updates from backup frames into the database.
  Import {
    /// Input file; standard input when omitted.
    input: Option<PathBuf>,
  },
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let mut cfg = Config::load(&cli.config)?;
  if let Some(database) = cli.database {
    cfg.database = database;
  }

  match cli.command {
    Command::Export { output } => export(&cfg, output),
    Command::Import { input } => import(&cfg, input),
  }
}

// ─── Export ───────────────────────────────────────────────────────────────────

fn export(cfg: &Config, output: Option<PathBuf>) -> Result<()> {
  let recipients = cfg.recipients()?;
  let store = SqliteStore::open(&cfg.database)
    .with_context(|| format!("failed to open store at {:?}", cfg.database))?;

  let mut out: Box<dyn Write> = match &output {
    Some(path) => Box::new(BufWriter::new(
      File::create(path).with_context(|| format!("failed to create {path:?}"))?,
    )),
    None => Box::new(BufWriter::new(io::stdout().lock())),
  };

  let mut total = ArchiveSummary::default();
  for thread in store.threads()? {
    let records = store
      .records_in_thread(thread.id)
      .with_context(|| format!("failed to read thread {}", thread.id))?;
    let context = ArchivingContext::new(&recipients, &SnapshotItemBuilder, &thread);
    let summary = chatlog_backup::archive_all(&records, &context)
      .with_context(|| format!("export aborted in thread {}", thread.id))?;

    frame::write_thread(&mut out, &thread, &summary.items)?;
    total.absorb(summary);
  }
  out.flush().context("failed to flush output")?;

  tracing::info!("{total}");
  Ok(())
}

// ─── Import ───────────────────────────────────────────────────────────────────

fn import(cfg: &Config, input: Option<PathBuf>) -> Result<()> {
  let recipients = cfg.recipients()?;
  let threads = match &input {
    Some(path) => frame::read_threads(BufReader::new(
      File::open(path).with_context(|| format!("failed to open {path:?}"))?,
    ))?,
    None => frame::read_threads(io::stdin().lock())?,
  };

  let mut store = SqliteStore::open(&cfg.database)
    .with_context(|| format!("failed to open store at {:?}", cfg.database))?;
  let mut tx = store.transaction()?;

  let mut total = RestoreSummary::default();
  for frames in &threads {
    tx.add_thread(&frames.thread)?;
    let mut context = RestoringContext::new(&recipients, &mut tx);
    let summary = chatlog_backup::restore_all(&frames.items, &frames.thread, &mut context)
      .with_context(|| format!("import aborted in thread {}", frames.thread.id))?;
    total.absorb(summary);
  }
  tx.commit().context("failed to commit import")?;

  tracing::info!("{total}");
  Ok(())
}
