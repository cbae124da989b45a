//! SQLite-backed persistence for the Docvault schema

pub mod schema;
pub mod sqlite;

pub use sqlite::{DbStats, DocumentRow, NewDocument, NewFolder, SqliteStore};
