//! Well-known install-location probing
//!
//! The Docvault app keeps its database either inside its sandbox container
//! or directly under Application Support, depending on how it was installed.
//! The importer probes both rather than requiring an explicit path.

use std::path::PathBuf;

const BUNDLE_ID: &str = "com.docvault.app";
const APP_DIR: &str = "Docvault";

/// Candidate database locations, most specific first
pub fn database_candidates() -> Vec<PathBuf> {
    let Some(home) = dirs::home_dir() else {
        return Vec::new();
    };

    let app_support = home.join("Library").join("Application Support").join(APP_DIR);
    vec![
        // Sandboxed container
        home.join("Library")
            .join("Containers")
            .join(BUNDLE_ID)
            .join("Data")
            .join("Library")
            .join("Application Support")
            .join(APP_DIR)
            .join("docvault.sqlite"),
        // Non-sandboxed Application Support
        app_support.join("docvault.sqlite"),
        // Legacy .db extension
        app_support.join("docvault.db"),
        // Home directory fallback
        home.join(APP_DIR).join("docvault.sqlite"),
    ]
}

/// All databases that exist on this machine, in probe order
pub fn existing_databases() -> Vec<PathBuf> {
    database_candidates().into_iter().filter(|p| p.exists()).collect()
}

/// Default location used by `init` when no path is given
pub fn default_database_path() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    Some(
        home.join("Library")
            .join("Application Support")
            .join(APP_DIR)
            .join("docvault.sqlite"),
    )
}

/// The data directory where document bundles live
pub fn default_data_dir() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    let sandboxed = home
        .join("Library")
        .join("Containers")
        .join(BUNDLE_ID)
        .join("Data")
        .join(APP_DIR);
    if sandboxed.exists() {
        Some(sandboxed)
    } else {
        Some(home.join(APP_DIR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_probe_sandbox_first() {
        let candidates = database_candidates();
        if candidates.is_empty() {
            return; // no home directory in this environment
        }
        assert_eq!(candidates.len(), 4);
        assert!(candidates[0].to_string_lossy().contains("Containers"));
        assert!(candidates[2].to_string_lossy().ends_with("docvault.db"));
    }
}
