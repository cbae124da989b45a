//! Database schema definitions
//!
//! The DDL must stay bit-compatible with the schema the Docvault app creates
//! for itself; the importer only bootstraps it ahead of time.

/// SQL to create the folders table
pub const CREATE_FOLDERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS folders (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    parent_id INTEGER REFERENCES folders(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    disk_path TEXT,
    transcription_context TEXT,
    categorization_context TEXT,
    prefer_summary INTEGER NOT NULL DEFAULT 1,
    minimize_before_llm INTEGER NOT NULL DEFAULT 0,
    sort_order INTEGER NOT NULL DEFAULT 0,
    created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
    modified_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
)
"#;

/// SQL to create the documents table
pub const CREATE_DOCUMENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    folder_id INTEGER REFERENCES folders(id) ON DELETE SET NULL,
    title TEXT NOT NULL DEFAULT 'Untitled',
    document_type TEXT NOT NULL DEFAULT 'markdown',
    disk_path TEXT NOT NULL UNIQUE,
    body_preview TEXT,
    summary_text TEXT,
    body_hash TEXT,
    summary_hash TEXT,
    prefer_summary INTEGER NOT NULL DEFAULT 0,
    minimize_before_llm INTEGER NOT NULL DEFAULT 0,
    created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
    modified_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
)
"#;

/// SQL to create the recordings table
pub const CREATE_RECORDINGS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS recordings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    filename TEXT UNIQUE NOT NULL,
    filepath TEXT NOT NULL,
    title TEXT,
    file_size_bytes INTEGER,
    duration_seconds INTEGER,
    created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
    modified_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
    device_serial TEXT,
    device_model TEXT,
    recording_mode TEXT
)
"#;

/// SQL to create the sources table
pub const CREATE_SOURCES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS sources (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    document_id INTEGER NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
    source_type TEXT NOT NULL DEFAULT 'recording',
    recording_id INTEGER REFERENCES recordings(id) ON DELETE SET NULL,
    disk_path TEXT NOT NULL,
    display_name TEXT,
    sort_order INTEGER NOT NULL DEFAULT 0,
    added_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
)
"#;

/// SQL to create the transcripts table
pub const CREATE_TRANSCRIPTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS transcripts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    source_id INTEGER NOT NULL REFERENCES sources(id) ON DELETE CASCADE,
    title TEXT,
    full_text TEXT,
    md_file_path TEXT,
    is_primary INTEGER NOT NULL DEFAULT 0,
    created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
    modified_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
)
"#;

/// At most one primary transcript per source
pub const CREATE_SINGLE_PRIMARY_INDEX: &str = r#"
CREATE UNIQUE INDEX IF NOT EXISTS idx_transcripts_single_primary
    ON transcripts(source_id) WHERE is_primary = 1
"#;

/// SQL to create the deletion_log table
pub const CREATE_DELETION_LOG_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS deletion_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    document_id INTEGER NOT NULL,
    document_title TEXT,
    folder_path TEXT,
    deleted_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
    trash_path TEXT NOT NULL,
    expires_at DATETIME NOT NULL,
    original_created_at DATETIME,
    original_modified_at DATETIME
)
"#;

/// SQL to create the document token cache table
pub const CREATE_DOCUMENT_TOKEN_CACHE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS document_token_cache (
    document_id INTEGER PRIMARY KEY REFERENCES documents(id) ON DELETE CASCADE,
    body_bytes INTEGER NOT NULL DEFAULT 0,
    summary_bytes INTEGER NOT NULL DEFAULT 0,
    updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
)
"#;

/// SQL to create the folder token cache table
pub const CREATE_FOLDER_TOKEN_CACHE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS folder_token_cache (
    folder_id INTEGER PRIMARY KEY REFERENCES folders(id) ON DELETE CASCADE,
    total_bytes INTEGER NOT NULL DEFAULT 0,
    document_count INTEGER NOT NULL DEFAULT 0,
    updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
)
"#;

/// SQL to create the migration-tracking table
pub const CREATE_MIGRATIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS grdb_migrations (
    identifier TEXT PRIMARY KEY NOT NULL
)
"#;

/// Migration identifiers recorded as already applied, so the app's own
/// incremental migrator recognizes a bootstrapped database as current.
pub const MIGRATIONS: &[&str] = &[
    "v1_initial",
    "v2_context_management",
    "v3_cleanup",
    "v4_fix_sources_fk",
    "v5_deletion_log_timestamps",
    "v6_hierarchical_paths",
];

/// All schema creation statements, in dependency order
pub fn all_schema_statements() -> Vec<&'static str> {
    vec![
        CREATE_FOLDERS_TABLE,
        CREATE_DOCUMENTS_TABLE,
        CREATE_RECORDINGS_TABLE,
        CREATE_SOURCES_TABLE,
        CREATE_TRANSCRIPTS_TABLE,
        CREATE_SINGLE_PRIMARY_INDEX,
        CREATE_DELETION_LOG_TABLE,
        CREATE_DOCUMENT_TOKEN_CACHE_TABLE,
        CREATE_FOLDER_TOKEN_CACHE_TABLE,
        CREATE_MIGRATIONS_TABLE,
    ]
}
