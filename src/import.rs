//! Directory import into the Docvault schema and bundle layout
//!
//! Walks a source tree of markdown files, mirrors its directories as folder
//! rows, and turns each file into a document row plus an on-disk bundle
//! (`body.md`, `summary.md`, `sources/`, `metadata.yaml`). Strictly
//! sequential; each row commits individually.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Local};
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::sanitize::{clean_title, sanitize_segment};
use crate::storage::{NewDocument, NewFolder, SqliteStore};
use crate::{Error, Result};

/// Timestamp format matching what the app writes (ISO-8601, local time)
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// File extension the importer picks up
const DOCUMENT_EXTENSION: &str = "md";

/// Length of the body preview stored on the document row, in characters
const PREVIEW_CHARS: usize = 500;

/// Handle on a folder row, memoized per import run by source-relative path
#[derive(Debug, Clone)]
struct FolderRef {
    id: i64,
    disk_path: String,
}

/// Outcome of one import pass
#[derive(Debug, Default, Clone, Copy)]
pub struct ImportReport {
    /// Matching files discovered under the source directory
    pub found: usize,
    /// Documents created
    pub imported: usize,
    /// Files skipped because they could not be read
    pub skipped: usize,
}

/// One-shot importer against a single target database
pub struct Importer {
    store: SqliteStore,
    data_dir: PathBuf,
    /// Skip all bundle writes except the metadata re-stamp. Used when
    /// fanning the same import out to a second database that shares
    /// already-materialized bundles.
    database_only: bool,
    folders: BTreeMap<String, FolderRef>,
}

impl Importer {
    /// Importer that writes both database rows and on-disk bundles
    pub fn new(store: SqliteStore, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            data_dir: data_dir.into(),
            database_only: false,
            folders: BTreeMap::new(),
        }
    }

    /// Importer that only writes database rows, re-stamping each bundle's
    /// metadata with its own row ids
    pub fn database_only(store: SqliteStore, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            database_only: true,
            ..Self::new(store, data_dir)
        }
    }

    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    /// Import every markdown file under `source_dir`, in lexicographic path
    /// order. Unreadable files are logged and skipped; anything else aborts.
    pub fn import_directory(&mut self, source_dir: &Path) -> Result<ImportReport> {
        if !source_dir.is_dir() {
            return Err(Error::SourceMissing(source_dir.to_path_buf()));
        }
        if !self.database_only {
            fs::create_dir_all(&self.data_dir)?;
        }

        let files = collect_markdown_files(source_dir);
        let mut report = ImportReport {
            found: files.len(),
            ..Default::default()
        };
        if files.is_empty() {
            return Ok(report);
        }

        let total = files.len();
        for (index, file) in files.iter().enumerate() {
            let relative = file.strip_prefix(source_dir).unwrap_or(file);
            let folder = match relative.parent() {
                Some(parent) => self.resolve_folder(parent)?,
                None => None,
            };

            let content = match fs::read_to_string(file) {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", file.display(), e);
                    report.skipped += 1;
                    continue;
                }
            };

            let file_name = file
                .file_name()
                .and_then(|s| s.to_str())
                .ok_or_else(|| Error::NonUtf8Path(file.clone()))?;
            let title = clean_title(file_name);
            let created_at = synthetic_created_at(file, total, index)?;

            self.create_document(&title, folder.as_ref(), &content, created_at)?;
            report.imported += 1;
        }

        Ok(report)
    }

    /// Map a source-relative directory path to its folder row, creating any
    /// missing ancestors. An empty path yields no folder: root-level files
    /// attach with a NULL folder id.
    fn resolve_folder(&mut self, relative_dir: &Path) -> Result<Option<FolderRef>> {
        if relative_dir.as_os_str().is_empty() {
            return Ok(None);
        }

        let mut parent: Option<FolderRef> = None;
        let mut key = String::new();

        for component in relative_dir.components() {
            let segment = component
                .as_os_str()
                .to_str()
                .ok_or_else(|| Error::NonUtf8Path(relative_dir.to_path_buf()))?;
            if !key.is_empty() {
                key.push('/');
            }
            key.push_str(segment);

            if let Some(existing) = self.folders.get(&key) {
                parent = Some(existing.clone());
                continue;
            }

            let sanitized = sanitize_segment(segment);
            let disk_path = match &parent {
                Some(p) => format!("{}/{}", p.disk_path, sanitized),
                None => sanitized,
            };
            let now = Local::now().format(TIMESTAMP_FORMAT).to_string();
            let id = self.store.insert_folder(&NewFolder {
                parent_id: parent.as_ref().map(|p| p.id),
                name: segment,
                disk_path: &disk_path,
                created_at: &now,
            })?;
            if !self.database_only {
                fs::create_dir_all(self.data_dir.join(&disk_path))?;
            }
            tracing::info!("Created folder {} (id={})", disk_path, id);

            let folder = FolderRef { id, disk_path };
            self.folders.insert(key.clone(), folder.clone());
            parent = Some(folder);
        }

        Ok(parent)
    }

    /// Create one document row and its on-disk bundle
    fn create_document(
        &mut self,
        title: &str,
        folder: Option<&FolderRef>,
        content: &str,
        created_at: DateTime<Local>,
    ) -> Result<i64> {
        let bundle = self.pick_bundle_name(&sanitize_segment(title), folder);
        let disk_path = match folder {
            Some(f) => format!("{}/{}", f.disk_path, bundle),
            None => bundle,
        };

        let created = created_at.format(TIMESTAMP_FORMAT).to_string();
        let preview: String = content.chars().take(PREVIEW_CHARS).collect();
        let id = self.store.insert_document(&NewDocument {
            folder_id: folder.map(|f| f.id),
            title,
            disk_path: &disk_path,
            body_preview: &preview,
            body_hash: &sha256_hex(content),
            created_at: &created,
        })?;

        let bundle_dir = self.data_dir.join(&disk_path);
        if !self.database_only {
            fs::create_dir_all(bundle_dir.join("sources"))?;
            fs::write(bundle_dir.join("body.md"), content)?;
            fs::write(bundle_dir.join("summary.md"), "")?;
        }
        // Re-stamped on every pass: the same bundle can back several
        // databases, each with its own row id.
        fs::write(bundle_dir.join("metadata.yaml"), metadata_yaml(id, title, &created))?;

        tracing::info!("Created document {} (id={})", disk_path, id);
        Ok(id)
    }

    /// Pick a bundle directory name that is free at the destination,
    /// appending ` 2`, ` 3`, ... to the sanitized title on collision. In
    /// database-only mode the layout is assumed already materialized and the
    /// check is skipped.
    fn pick_bundle_name(&self, sanitized_title: &str, folder: Option<&FolderRef>) -> String {
        let bundle = format!("{sanitized_title}.document");
        if self.database_only {
            return bundle;
        }

        let base_dir = match folder {
            Some(f) => self.data_dir.join(&f.disk_path),
            None => self.data_dir.clone(),
        };

        let mut bundle = bundle;
        let mut suffix = 2u32;
        while base_dir.join(&bundle).exists() {
            bundle = format!("{sanitized_title} {suffix}.document");
            suffix += 1;
        }
        bundle
    }

    /// Remove every non-hidden top-level entry under the data directory
    pub fn clear_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            return Ok(());
        }
        for entry in fs::read_dir(&self.data_dir)? {
            let entry = entry?;
            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }
            let path = entry.path();
            if entry.file_type()?.is_dir() {
                fs::remove_dir_all(&path)?;
            } else {
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }
}

/// Collect `.md` files recursively, sorted lexicographically by full path.
/// The sort governs both processing order and the synthesized chronology.
pub fn collect_markdown_files(source_dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(source_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some(DOCUMENT_EXTENSION))
        .collect();
    files.sort();
    files
}

/// Synthesize a creation timestamp: file mtime backdated by `(total - index)`
/// minutes, so equal mtimes still sort in file order. Real mtimes that are
/// already close together can land in the implausible past; accepted, the
/// app only needs a total order.
fn synthetic_created_at(path: &Path, total: usize, index: usize) -> Result<DateTime<Local>> {
    let mtime: DateTime<Local> = fs::metadata(path)?.modified()?.into();
    Ok(mtime - Duration::minutes((total - index) as i64))
}

fn sha256_hex(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

/// Three-key metadata artifact. The title is double-quoted with embedded
/// quotes and backslashes escaped; existing consumers parse exactly this
/// shape, so no serialization library is used.
fn metadata_yaml(id: i64, title: &str, created: &str) -> String {
    let escaped = title.replace('\\', "\\\\").replace('"', "\\\"");
    format!("id: {id}\ntitle: \"{escaped}\"\ncreated: {created}\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStore;
    use tempfile::TempDir;

    fn write_source(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn in_memory_importer(data_dir: &TempDir) -> Importer {
        Importer::new(SqliteStore::open_in_memory().unwrap(), data_dir.path())
    }

    #[test]
    fn test_import_builds_folder_tree_and_bundles() {
        let source = TempDir::new().unwrap();
        let data = TempDir::new().unwrap();
        write_source(source.path(), "interviews/acme/01_phone_screen.md", "# Phone screen\n");

        let mut importer = in_memory_importer(&data);
        let report = importer.import_directory(source.path()).unwrap();

        assert_eq!(report.found, 1);
        assert_eq!(report.imported, 1);
        assert_eq!(report.skipped, 0);

        let bundle = data.path().join("interviews/acme/Phone Screen.document");
        assert!(bundle.join("sources").is_dir());
        assert_eq!(fs::read_to_string(bundle.join("body.md")).unwrap(), "# Phone screen\n");
        assert_eq!(fs::read_to_string(bundle.join("summary.md")).unwrap(), "");

        let stats = importer.store().stats().unwrap();
        assert_eq!(stats.folders, 2);
        assert_eq!(stats.documents, 1);

        let doc = importer
            .store()
            .get_document_by_disk_path("interviews/acme/Phone Screen.document")
            .unwrap()
            .unwrap();
        assert_eq!(doc.title, "Phone Screen");
        assert!(doc.folder_id.is_some());

        let metadata = fs::read_to_string(bundle.join("metadata.yaml")).unwrap();
        assert!(metadata.starts_with(&format!("id: {}\n", doc.id)));
        assert!(metadata.contains("title: \"Phone Screen\"\n"));
    }

    #[test]
    fn test_root_level_files_have_no_folder() {
        let source = TempDir::new().unwrap();
        let data = TempDir::new().unwrap();
        write_source(source.path(), "readme.md", "hello");

        let mut importer = in_memory_importer(&data);
        importer.import_directory(source.path()).unwrap();

        let doc = importer
            .store()
            .get_document_by_disk_path("Readme.document")
            .unwrap()
            .unwrap();
        assert_eq!(doc.folder_id, None);
        assert!(data.path().join("Readme.document/body.md").exists());
    }

    #[test]
    fn test_repeated_directories_create_one_folder_row() {
        let source = TempDir::new().unwrap();
        let data = TempDir::new().unwrap();
        write_source(source.path(), "notes/a.md", "a");
        write_source(source.path(), "notes/b.md", "b");

        let mut importer = in_memory_importer(&data);
        importer.import_directory(source.path()).unwrap();

        let stats = importer.store().stats().unwrap();
        assert_eq!(stats.folders, 1);
        assert_eq!(stats.documents, 2);
    }

    #[test]
    fn test_colliding_titles_get_numbered_bundles() {
        let source = TempDir::new().unwrap();
        let data = TempDir::new().unwrap();
        // Both clean up to the title "Notes" inside the same folder
        write_source(source.path(), "x/02_notes.md", "first");
        write_source(source.path(), "x/notes.md", "second");

        let mut importer = in_memory_importer(&data);
        let report = importer.import_directory(source.path()).unwrap();
        assert_eq!(report.imported, 2);

        assert!(data.path().join("x/Notes.document/body.md").exists());
        assert!(data.path().join("x/Notes 2.document/body.md").exists());

        let docs = importer.store().list_documents().unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].disk_path, "x/Notes.document");
        assert_eq!(docs[1].disk_path, "x/Notes 2.document");
        assert_ne!(docs[0].id, docs[1].id);
    }

    #[test]
    fn test_lexicographic_order_becomes_increasing_created_at() {
        let source = TempDir::new().unwrap();
        let data = TempDir::new().unwrap();
        write_source(source.path(), "c.md", "3");
        write_source(source.path(), "a.md", "1");
        write_source(source.path(), "b.md", "2");

        let mut importer = in_memory_importer(&data);
        importer.import_directory(source.path()).unwrap();

        let docs = importer.store().list_documents().unwrap();
        assert_eq!(docs.len(), 3);
        assert_eq!(docs[0].title, "A");
        assert_eq!(docs[1].title, "B");
        assert_eq!(docs[2].title, "C");
        // ISO-8601 strings compare chronologically
        assert!(docs[0].created_at < docs[1].created_at);
        assert!(docs[1].created_at < docs[2].created_at);
    }

    #[test]
    fn test_collect_is_sorted_and_filtered() {
        let source = TempDir::new().unwrap();
        write_source(source.path(), "b/second.md", "2");
        write_source(source.path(), "a/first.md", "1");
        write_source(source.path(), "a/image.png", "");

        let files = collect_markdown_files(source.path());
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("a/first.md"));
        assert!(files[1].ends_with("b/second.md"));

        let empty = TempDir::new().unwrap();
        assert!(collect_markdown_files(empty.path()).is_empty());
    }

    #[test]
    fn test_empty_source_is_a_noop() {
        let source = TempDir::new().unwrap();
        let data = TempDir::new().unwrap();

        let mut importer = in_memory_importer(&data);
        let report = importer.import_directory(source.path()).unwrap();

        assert_eq!(report.found, 0);
        assert_eq!(importer.store().stats().unwrap().documents, 0);
    }

    #[test]
    fn test_missing_source_directory_errors() {
        let data = TempDir::new().unwrap();
        let mut importer = in_memory_importer(&data);

        let err = importer.import_directory(Path::new("/nonexistent/source")).unwrap_err();
        assert!(matches!(err, Error::SourceMissing(_)));
    }

    #[test]
    fn test_clear_then_import_repopulates() {
        let source = TempDir::new().unwrap();
        let data = TempDir::new().unwrap();
        write_source(source.path(), "old/stale.md", "stale");

        let mut importer = in_memory_importer(&data);
        importer.import_directory(source.path()).unwrap();

        importer.store().clear_documents_and_folders().unwrap();
        importer.clear_data_dir().unwrap();

        let stats = importer.store().stats().unwrap();
        assert_eq!(stats.folders, 0);
        assert_eq!(stats.documents, 0);
        assert_eq!(fs::read_dir(data.path()).unwrap().count(), 0);

        // Fresh run against the cleared state rebuilds a consistent tree
        let mut importer = Importer::new(
            SqliteStore::open_in_memory().unwrap(),
            data.path(),
        );
        importer.import_directory(source.path()).unwrap();
        assert!(data.path().join("old/Stale.document/body.md").exists());
        assert_eq!(importer.store().stats().unwrap().documents, 1);
    }

    #[test]
    fn test_clear_data_dir_keeps_hidden_entries() {
        let data = TempDir::new().unwrap();
        fs::write(data.path().join(".DS_Store"), "").unwrap();
        fs::create_dir(data.path().join("Old.document")).unwrap();

        let importer = in_memory_importer(&data);
        importer.clear_data_dir().unwrap();

        assert!(data.path().join(".DS_Store").exists());
        assert!(!data.path().join("Old.document").exists());
    }

    #[test]
    fn test_database_only_restamps_metadata_without_touching_bodies() {
        let source = TempDir::new().unwrap();
        let data = TempDir::new().unwrap();
        let dbs = TempDir::new().unwrap();
        write_source(source.path(), "team/plan.md", "the plan");

        // First target materializes the bundles
        let store1 = SqliteStore::open(&dbs.path().join("first.sqlite")).unwrap();
        let mut first = Importer::new(store1, data.path());
        first.import_directory(source.path()).unwrap();

        let bundle = data.path().join("team/Plan.document");
        let body_before = fs::read_to_string(bundle.join("body.md")).unwrap();

        // Second target starts its document ids past 1 so the re-stamp is
        // observable
        let store2 = SqliteStore::open(&dbs.path().join("second.sqlite")).unwrap();
        store2
            .insert_document(&NewDocument {
                folder_id: None,
                title: "Placeholder",
                disk_path: "Placeholder.document",
                body_preview: "",
                body_hash: "",
                created_at: "2024-01-01T00:00:00.000000",
            })
            .unwrap();

        let mut second = Importer::database_only(store2, data.path());
        second.import_directory(source.path()).unwrap();

        let doc = second
            .store()
            .get_document_by_disk_path("team/Plan.document")
            .unwrap()
            .unwrap();
        assert!(doc.id > 1);

        let metadata = fs::read_to_string(bundle.join("metadata.yaml")).unwrap();
        assert!(metadata.starts_with(&format!("id: {}\n", doc.id)));
        assert_eq!(fs::read_to_string(bundle.join("body.md")).unwrap(), body_before);
    }

    #[test]
    fn test_body_hash_is_sha256_of_content() {
        let source = TempDir::new().unwrap();
        let data = TempDir::new().unwrap();
        write_source(source.path(), "hello.md", "hello");

        let mut importer = in_memory_importer(&data);
        importer.import_directory(source.path()).unwrap();

        // Rows carry a content fingerprint usable for change detection
        let doc = importer
            .store()
            .get_document_by_disk_path("Hello.document")
            .unwrap()
            .unwrap();
        assert_eq!(
            doc.body_hash,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_preview_is_first_500_chars() {
        let long = "x".repeat(800);
        assert_eq!(long.chars().take(PREVIEW_CHARS).count(), 500);
    }

    #[test]
    fn test_metadata_yaml_escapes_quotes() {
        let yaml = metadata_yaml(7, r#"He said "hi" \ bye"#, "2024-01-01T00:00:00.000000");
        assert_eq!(
            yaml,
            "id: 7\ntitle: \"He said \\\"hi\\\" \\\\ bye\"\ncreated: 2024-01-01T00:00:00.000000\n"
        );
    }
}
