//! Resumable, rotation-aware scanning of one access log.
//!
//! A scan is single-shot: it resumes at the stored cursor, feeds every line
//! to the aggregator, and stops at end-of-file. When the active file was
//! rotated away since the last run, the rotated predecessor is drained first
//! (best effort), then the new file is scanned from the top.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use chrono::{DateTime, Duration as ChronoDuration, Local};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncSeekExt, BufReader};

use crate::cursor::Cursor;
use crate::error::TailError;
use crate::parse::LineParser;
use crate::window::WindowAggregator;


/// Result of one scan over a single log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOutcome {
    /// Cursor to persist for the next run.
    pub cursor: Cursor,
    /// Whether the rotated-predecessor path was taken.
    pub rotated: bool,
    /// Raw lines read across both files.
    pub lines_seen: u64,
}

/// Path of the rotated predecessor for `log_path`: the log name suffixed
/// with the previous hour as `.<YYYY-MM-DD.HH>`.
#[must_use]
pub fn rotated_log_path(log_path: &Path, now: DateTime<Local>) -> PathBuf {
    let previous_hour = now
        .checked_sub_signed(ChronoDuration::hours(1))
        .unwrap_or(now);
    let mut name = log_path.as_os_str().to_os_string();
    name.push(format!(".{}", previous_hour.format("%Y-%m-%d.%H")));
    PathBuf::from(name)
}

/// Creation time of the file as epoch seconds, or 0 when the platform does
/// not report one. Rotation is then detected by the size check alone.
fn source_ctime(metadata: &std::fs::Metadata) -> i64 {
    metadata
        .created()
        .ok()
        .and_then(|stamp| stamp.duration_since(UNIX_EPOCH).ok())
        .and_then(|elapsed| i64::try_from(elapsed.as_secs()).ok())
        .unwrap_or(0)
}

/// Scans `log_path` from the stored cursor, feeding every line to
/// `aggregator`, and returns the cursor for the next run (offset at the
/// current file's end-of-file, the planned `end_minute`, and the current
/// file's creation time).
///
/// # Errors
///
/// Returns an error when the active log cannot be opened or read. Problems
/// with the rotated predecessor are downgraded to warnings.
pub async fn scan_log(
    log_path: &Path,
    stored: Cursor,
    end_minute: i64,
    aggregator: &mut WindowAggregator,
    parser: &dyn LineParser,
) -> Result<ScanOutcome, TailError> {
    let metadata = tokio::fs::metadata(log_path)
        .await
        .map_err(|err| TailError::Stat {
            path: log_path.to_path_buf(),
            source: err,
        })?;
    let current_ctime = source_ctime(&metadata);
    let size = metadata.len();

    let rotated = stored.offset > 0
        && (size < stored.offset
            || (stored.source_ctime != 0 && current_ctime != stored.source_ctime));

    let mut lines_seen = 0u64;
    if rotated {
        let predecessor = rotated_log_path(log_path, Local::now());
        match scan_file(&predecessor, stored.offset, aggregator, parser).await {
            Ok((_, lines)) => {
                lines_seen = lines_seen.saturating_add(lines);
            }
            Err(err) => {
                tracing::warn!(
                    path = %predecessor.display(),
                    error = %err,
                    "Rotation detected but predecessor could not be scanned; continuing with the current file"
                );
            }
        }
    }

    let start_offset = if rotated { 0 } else { stored.offset };
    let (end_offset, lines) = scan_file(log_path, start_offset, aggregator, parser).await?;
    lines_seen = lines_seen.saturating_add(lines);

    Ok(ScanOutcome {
        cursor: Cursor {
            offset: end_offset,
            window_end: end_minute,
            source_ctime: current_ctime,
        },
        rotated,
        lines_seen,
    })
}

/// Reads `path` from `start_offset` to EOF line by line, tracking byte
/// offsets, and feeds each line to the aggregator. Lines are matched as
/// lossy UTF-8 so a stray invalid byte cannot abort the scan.
async fn scan_file(
    path: &Path,
    start_offset: u64,
    aggregator: &mut WindowAggregator,
    parser: &dyn LineParser,
) -> Result<(u64, u64), TailError> {
    let mut file = File::open(path).await.map_err(|err| TailError::Open {
        path: path.to_path_buf(),
        source: err,
    })?;
    if start_offset > 0 {
        file.seek(SeekFrom::Start(start_offset))
            .await
            .map_err(|err| TailError::Seek {
                path: path.to_path_buf(),
                source: err,
            })?;
    }

    let mut reader = BufReader::new(file);
    let mut buffer: Vec<u8> = Vec::with_capacity(1024);
    let mut offset = start_offset;
    let mut lines = 0u64;
    loop {
        buffer.clear();
        let bytes = reader
            .read_until(b'\n', &mut buffer)
            .await
            .map_err(|err| TailError::Read {
                path: path.to_path_buf(),
                source: err,
            })?;
        if bytes == 0 {
            break;
        }
        offset = offset.saturating_add(bytes as u64);
        lines = lines.saturating_add(1);
        let line = String::from_utf8_lossy(&buffer);
        aggregator.observe(&line, offset, parser);
    }

    Ok((offset, lines))
}
