//! Batch-separated script execution.
//!
//! Generated scripts may contain a separator line (`GO` by default, matched
//! case-insensitively on a line of its own). Each batch runs as its own
//! command, in order, through one reused [`Command`] whose text is swapped
//! between batches.

use std::time::Instant;

use serde::Serialize;
use tracing::debug;

use crate::core::traits::{Command, DbConnection};
use crate::error::Result;

pub const DEFAULT_BATCH_SEPARATOR: &str = "GO";

/// One batch of a script and the 1-based line it starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub line: usize,
    pub sql: String,
}

/// How long the batch starting at `line` took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchTiming {
    pub line: usize,
    pub elapsed_ms: u64,
}

/// Split `script` on separator lines. Blank batches are dropped, and the
/// text after the last separator forms a final batch.
pub fn split_batches(script: &str, separator: &str) -> Vec<Batch> {
    let mut batches = Vec::new();
    let mut current = String::new();
    let mut start = None;

    for (index, line) in script.lines().chain(std::iter::once(separator)).enumerate() {
        if line.trim().eq_ignore_ascii_case(separator) {
            if let Some(line) = start.take() {
                batches.push(Batch {
                    line,
                    sql: std::mem::take(&mut current).trim_end().to_string(),
                });
            }
            current.clear();
            continue;
        }
        if start.is_none() {
            if line.trim().is_empty() {
                continue;
            }
            start = Some(index + 1);
        }
        current.push_str(line);
        current.push('\n');
    }
    batches
}

/// Run every batch of `script` on `conn`, in order, stopping at the first
/// failure.
pub fn execute_batches(
    conn: &mut dyn DbConnection,
    script: &str,
    separator: &str,
    timeout_secs: u32,
) -> Result<Vec<BatchTiming>> {
    let mut cmd = Command::new("").with_timeout(timeout_secs);
    let mut timings = Vec::new();
    for batch in split_batches(script, separator) {
        cmd.set_text(batch.sql);
        let started = Instant::now();
        conn.execute(&cmd)?;
        let elapsed_ms = started.elapsed().as_millis() as u64;
        debug!("Batch at line {} ran in {}ms", batch.line, elapsed_ms);
        timings.push(BatchTiming {
            line: batch.line,
            elapsed_ms,
        });
    }
    Ok(timings)
}
