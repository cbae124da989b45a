//! SQLite storage implementation

use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params};

use super::schema;
use crate::Result;

/// A folder row to insert. Timestamps are ISO-8601 local time strings,
/// matching what the app itself writes.
#[derive(Debug)]
pub struct NewFolder<'a> {
    pub parent_id: Option<i64>,
    pub name: &'a str,
    pub disk_path: &'a str,
    pub created_at: &'a str,
}

/// A document row to insert. `disk_path` is the bundle path relative to the
/// data directory and must already be collision-free.
#[derive(Debug)]
pub struct NewDocument<'a> {
    pub folder_id: Option<i64>,
    pub title: &'a str,
    pub disk_path: &'a str,
    pub body_preview: &'a str,
    pub body_hash: &'a str,
    pub created_at: &'a str,
}

/// A document row read back from the database
#[derive(Debug, Clone)]
pub struct DocumentRow {
    pub id: i64,
    pub folder_id: Option<i64>,
    pub title: String,
    pub disk_path: String,
    pub body_hash: String,
    pub created_at: String,
}

/// SQLite-backed storage for the Docvault schema
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a database file, creating it and its parent directories if
    /// missing, and bootstrap the schema (idempotent, safe to re-run)
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA journal_mode = WAL;")?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Create every table if absent and seed the applied-migration markers
    fn initialize_schema(&self) -> Result<()> {
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        for migration in schema::MIGRATIONS {
            self.conn.execute(
                "INSERT OR IGNORE INTO grdb_migrations (identifier) VALUES (?1)",
                [migration],
            )?;
        }
        Ok(())
    }

    // ========== Folder Operations ==========

    /// Insert a folder row, returning its assigned id
    pub fn insert_folder(&self, folder: &NewFolder) -> Result<i64> {
        self.conn.execute(
            r#"
            INSERT INTO folders (parent_id, name, disk_path, transcription_context,
                                 categorization_context, prefer_summary, minimize_before_llm,
                                 sort_order, created_at, modified_at)
            VALUES (?1, ?2, ?3, '', '', 1, 0, 0, ?4, ?4)
            "#,
            params![folder.parent_id, folder.name, folder.disk_path, folder.created_at],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    // ========== Document Operations ==========

    /// Insert a document row, returning its assigned id.
    ///
    /// Summary fields start empty and feature flags default to off; only the
    /// app flips them later.
    pub fn insert_document(&self, doc: &NewDocument) -> Result<i64> {
        self.conn.execute(
            r#"
            INSERT INTO documents (folder_id, title, document_type, disk_path, body_preview,
                                   summary_text, body_hash, summary_hash, prefer_summary,
                                   minimize_before_llm, created_at, modified_at)
            VALUES (?1, ?2, 'markdown', ?3, ?4, '', ?5, '', 0, 0, ?6, ?6)
            "#,
            params![
                doc.folder_id,
                doc.title,
                doc.disk_path,
                doc.body_preview,
                doc.body_hash,
                doc.created_at,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Get a document by its disk path
    pub fn get_document_by_disk_path(&self, disk_path: &str) -> Result<Option<DocumentRow>> {
        self.conn
            .query_row(
                "SELECT id, folder_id, title, disk_path, body_hash, created_at FROM documents WHERE disk_path = ?1",
                [disk_path],
                row_to_document,
            )
            .optional()
            .map_err(Into::into)
    }

    /// All documents in insertion order
    pub fn list_documents(&self) -> Result<Vec<DocumentRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, folder_id, title, disk_path, body_hash, created_at FROM documents ORDER BY id",
        )?;

        let docs = stmt
            .query_map([], row_to_document)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(docs)
    }

    // ========== Maintenance Operations ==========

    /// Delete all imported rows, children before parents
    pub fn clear_documents_and_folders(&self) -> Result<()> {
        for table in ["transcripts", "sources", "documents", "folders", "deletion_log"] {
            self.conn.execute(&format!("DELETE FROM {table}"), [])?;
        }
        Ok(())
    }

    /// Migration identifiers recorded as applied
    pub fn applied_migrations(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT identifier FROM grdb_migrations ORDER BY identifier")?;

        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(ids)
    }

    fn count(&self, table: &str) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {table}");
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        Ok(DbStats {
            folders: self.count("folders")?,
            documents: self.count("documents")?,
            recordings: self.count("recordings")?,
            sources: self.count("sources")?,
            transcripts: self.count("transcripts")?,
        })
    }
}

fn row_to_document(row: &rusqlite::Row) -> rusqlite::Result<DocumentRow> {
    Ok(DocumentRow {
        id: row.get(0)?,
        folder_id: row.get(1)?,
        title: row.get(2)?,
        disk_path: row.get(3)?,
        body_hash: row.get(4)?,
        created_at: row.get(5)?,
    })
}

/// Database statistics
#[derive(Debug, Clone)]
pub struct DbStats {
    pub folders: usize,
    pub documents: usize,
    pub recordings: usize,
    pub sources: usize,
    pub transcripts: usize,
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        writeln!(f, "  Folders: {}", self.folders)?;
        writeln!(f, "  Documents: {}", self.documents)?;
        writeln!(f, "  Recordings: {}", self.recordings)?;
        writeln!(f, "  Sources: {}", self.sources)?;
        writeln!(f, "  Transcripts: {}", self.transcripts)
    }
}
