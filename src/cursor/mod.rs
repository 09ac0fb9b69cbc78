//! Persistence of per-log scan cursors.
//!
//! A cursor is the sole state carried between runs: the byte offset reached in
//! the log, the minute boundary the last run aggregated up to, and the ctime
//! of the file those bytes belonged to (used to detect rotation).

use std::path::{Path, PathBuf};

use crate::error::CursorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    /// Byte offset reached in the active log file.
    pub offset: u64,
    /// Minute-aligned epoch second the last run aggregated up to.
    pub window_end: i64,
    /// ctime of the log file the offset belongs to.
    pub source_ctime: i64,
}

impl Cursor {
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            offset: 0,
            window_end: 0,
            source_ctime: 0,
        }
    }

    /// True before the first successful run for this log.
    #[must_use]
    pub const fn is_first_run(&self) -> bool {
        self.window_end == 0
    }
}

/// Reads and writes cursor files under a dedicated directory, one file per
/// monitored log, named after the log's file name.
#[derive(Debug, Clone)]
pub struct CursorStore {
    dir: PathBuf,
}

impl CursorStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn path_for(&self, log_name: &str) -> PathBuf {
        self.dir.join(log_name)
    }

    /// Reads the cursor for `log_name`.
    ///
    /// Never fails: an absent, unreadable, or malformed cursor file degrades
    /// to the zero cursor, which makes the next scan start from scratch.
    #[must_use]
    pub fn read(&self, log_name: &str) -> Cursor {
        let path = self.path_for(log_name);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "No usable cursor file, starting from zero");
                return Cursor::zero();
            }
        };
        match parse_record(&content) {
            Some(cursor) => cursor,
            None => {
                tracing::debug!(path = %path.display(), "Malformed cursor file, starting from zero");
                Cursor::zero()
            }
        }
    }

    /// Persists the cursor for `log_name` atomically (temp file + rename).
    ///
    /// # Errors
    ///
    /// Returns an error when the cursor directory cannot be created or the
    /// file cannot be written or renamed into place.
    pub fn write(&self, log_name: &str, cursor: &Cursor) -> Result<(), CursorError> {
        let path = self.path_for(log_name);
        let parent = path
            .parent()
            .ok_or_else(|| CursorError::NoParentDir { path: path.clone() })?;
        std::fs::create_dir_all(parent).map_err(|err| CursorError::CreateDir {
            path: parent.to_path_buf(),
            source: err,
        })?;

        let tmp_path = temp_path(&path);
        let record = format!(
            "{},{},{}",
            cursor.offset, cursor.window_end, cursor.source_ctime
        );
        std::fs::write(&tmp_path, record).map_err(|err| CursorError::WriteFile {
            path: tmp_path.clone(),
            source: err,
        })?;
        std::fs::rename(&tmp_path, &path).map_err(|err| CursorError::ReplaceFile {
            path: path.clone(),
            source: err,
        })
    }
}

fn parse_record(content: &str) -> Option<Cursor> {
    let line = content.lines().next()?;
    let mut parts = line.split(',');
    let offset = parts.next()?.trim().parse::<u64>().ok()?;
    let window_end = parts.next()?.trim().parse::<i64>().ok()?;
    let source_ctime = parts.next()?.trim().parse::<i64>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Cursor {
        offset,
        window_end,
        source_ctime,
    })
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map_or_else(
        || std::ffi::OsString::from("cursor"),
        std::ffi::OsStr::to_os_string,
    );
    name.push(".tmp");
    path.with_file_name(name)
}
