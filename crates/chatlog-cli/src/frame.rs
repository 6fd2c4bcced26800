//! The JSON-lines export format.
//!
//! Each thread is written as a `chat` frame followed by its `chat_item`
//! frames, in timeline order.

use std::io::{BufRead, Write};

use anyhow::{Context as _, Result};
use chatlog_backup::wire::ChatUpdateItem;
use chatlog_core::{id::ThreadId, thread::ChatThread};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Frame {
  Chat { thread: ChatThread },
  ChatItem { thread_id: ThreadId, item: ChatUpdateItem },
}

/// A thread and the items read for it.
#[derive(Debug)]
pub struct ThreadFrames {
  pub thread: ChatThread,
  pub items:  Vec<ChatUpdateItem>,
}

pub fn write_thread(
  out: &mut impl Write,
  thread: &ChatThread,
  items: &[ChatUpdateItem],
) -> Result<()> {
  write_frame(out, &Frame::Chat { thread: thread.clone() })?;
  for item in items {
    write_frame(out, &Frame::ChatItem { thread_id: thread.id, item: item.clone() })?;
  }
  Ok(())
}

fn write_frame(out: &mut impl Write, frame: &Frame) -> Result<()> {
  serde_json::to_writer(&mut *out, frame).context("failed to serialise frame")?;
  out.write_all(b"\n").context("failed to write frame")?;
  Ok(())
}

/// Read every frame from `input`, grouping items under their thread. Item
/// frames must follow the `chat` frame of their thread.
pub fn read_threads(input: impl BufRead) -> Result<Vec<ThreadFrames>> {
  let mut threads: Vec<ThreadFrames> = Vec::new();

  for (index, line) in input.lines().enumerate() {
    let line_no = index + 1;
    let line = line.with_context(|| format!("failed to read line {line_no}"))?;
    if line.trim().is_empty() {
      continue;
    }
    let frame: Frame = serde_json::from_str(&line)
      .with_context(|| format!("malformed frame on line {line_no}"))?;

    match frame {
      Frame::Chat { thread } => threads.push(ThreadFrames { thread, items: Vec::new() }),
      Frame::ChatItem { thread_id, item } => {
        let owner = threads
          .iter_mut()
          .rev()
          .find(|t| t.thread.id == thread_id)
          .with_context(|| format!("line {line_no}: item for unknown thread {thread_id}"))?;
        owner.items.push(item);
      }
    }
  }

  Ok(threads)
}
