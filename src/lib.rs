//! # Docvault importer
//!
//! Schema bootstrap and one-shot markdown import for the Docvault document
//! library.
//!
//! Two collaborating pieces:
//! - A SQLite-backed schema initializer that creates every table idempotently
//!   and seeds the migration markers the app expects
//! - A directory importer that mirrors a source tree into folder rows,
//!   document rows, and on-disk `.document` bundles
//!
//! The importer is a deterministic, single-threaded batch tool: it walks the
//! source directory in lexicographic order, commits each row individually,
//! and either completes or exits non-zero.

pub mod discover;
pub mod import;
pub mod sanitize;
pub mod storage;
pub mod ui;

// Re-exports for convenient access
pub use import::{ImportReport, Importer};
pub use storage::SqliteStore;

/// Result type alias for importer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for importer operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Source directory not found: {0}")]
    SourceMissing(std::path::PathBuf),

    #[error("Path is not valid UTF-8: {0}")]
    NonUtf8Path(std::path::PathBuf),
}
