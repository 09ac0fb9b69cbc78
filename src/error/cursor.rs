use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CursorError {
    #[error("Failed to create cursor directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write cursor file '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to replace cursor file '{path}': {source}")]
    ReplaceFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Cursor path '{path}' has no parent directory.")]
    NoParentDir { path: PathBuf },
}
