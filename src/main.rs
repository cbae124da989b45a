//! Docvault CLI - schema bootstrap and markdown import

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use docvault::storage::SqliteStore;
use docvault::ui::{self, Icons};
use docvault::{Importer, discover};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "docvault")]
#[command(version)]
#[command(about = "Schema bootstrap and markdown importer for the Docvault document library")]
#[command(long_about = r#"
docvault mirrors a directory of markdown files into a Docvault install:
directories become folder rows, files become document rows plus on-disk
.document bundles (body.md, summary.md, sources/, metadata.yaml).

Example usage:
  docvault init
  docvault import --source-dir ./notes
  docvault import --source-dir ./notes --clear -y
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the Docvault schema (idempotent, safe to re-run)
    Init {
        /// Path to the database file (defaults to the standard install location)
        #[arg(short, long)]
        database: Option<PathBuf>,
    },

    /// Import a directory tree of markdown files
    Import {
        /// Source directory containing .md files
        #[arg(short, long)]
        source_dir: PathBuf,

        /// Path to the database (default: auto-detect installed databases)
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Path to the data directory holding document bundles
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Delete all existing folders, documents and bundles first
        #[arg(long)]
        clear: bool,

        /// Skip interactive prompts (confirms --clear, selects all targets)
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Show row counts for an existing database
    Stats {
        /// Path to the database (default: first auto-detected install)
        #[arg(short, long)]
        database: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Init { database } => run_init(database),
        Commands::Import {
            source_dir,
            database,
            data_dir,
            clear,
            yes,
        } => run_import(source_dir, database, data_dir, clear, yes),
        Commands::Stats { database } => run_stats(database),
    }
}

fn run_init(database: Option<PathBuf>) -> anyhow::Result<()> {
    let path = database
        .or_else(discover::default_database_path)
        .ok_or_else(|| anyhow::anyhow!("could not determine a home directory; pass --database"))?;

    ui::status(Icons::DATABASE, "Database", &path.display().to_string());
    let store = SqliteStore::open(&path)?;
    let migrations = store.applied_migrations()?;
    ui::success(&format!("Schema ready ({} migrations recorded)", migrations.len()));
    Ok(())
}

fn run_import(
    source_dir: PathBuf,
    database: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    clear: bool,
    yes: bool,
) -> anyhow::Result<()> {
    if !source_dir.is_dir() {
        ui::error(&format!("Source directory not found: {}", source_dir.display()));
        std::process::exit(1);
    }

    let targets = match database {
        Some(path) => {
            if !path.exists() {
                ui::error(&format!("Database not found: {}", path.display()));
                ui::error("Run `docvault init` or the Docvault app first to create it.");
                std::process::exit(1);
            }
            vec![path]
        }
        None => {
            let found = discover::existing_databases();
            if found.is_empty() {
                ui::error("No Docvault database found.");
                ui::error("Pass --database, or run `docvault init` first.");
                std::process::exit(1);
            }
            select_targets(found, yes)?
        }
    };

    let data_dir = data_dir
        .or_else(discover::default_data_dir)
        .ok_or_else(|| anyhow::anyhow!("could not determine a data directory; pass --data-dir"))?;

    ui::header("Docvault import");
    ui::status(Icons::FOLDER, "Source", &source_dir.display().to_string());
    ui::status(Icons::FOLDER, "Data dir", &data_dir.display().to_string());

    if docvault::import::collect_markdown_files(&source_dir).is_empty() {
        ui::warn(&format!("No .md files found in {}", source_dir.display()));
        return Ok(());
    }

    if clear && !yes && !confirm("This will DELETE all existing folders and documents. Continue? (yes/no): ")? {
        println!("Aborted.");
        return Ok(());
    }

    for (index, target) in targets.iter().enumerate() {
        ui::status(Icons::DATABASE, "Database", &target.display().to_string());
        let store = SqliteStore::open(target)?;

        // The first target materializes bundles on disk; later targets only
        // re-stamp each bundle's metadata with their own row ids.
        let mut importer = if index == 0 {
            Importer::new(store, &data_dir)
        } else {
            Importer::database_only(store, &data_dir)
        };

        if clear {
            importer.store().clear_documents_and_folders()?;
            if index == 0 {
                importer.clear_data_dir()?;
            }
            ui::status(Icons::TRASH, "Cleared", "existing folders, documents and bundles");
        }

        let report = importer.import_directory(&source_dir)?;
        ui::summary_row("Files found:", &report.found.to_string());
        ui::summary_row("Imported:", &report.imported.to_string());
        if report.skipped > 0 {
            ui::summary_row("Skipped (unreadable):", &report.skipped.to_string());
        }
    }

    ui::success("Import complete");
    Ok(())
}

fn run_stats(database: Option<PathBuf>) -> anyhow::Result<()> {
    let path = match database {
        Some(path) => path,
        None => match discover::existing_databases().into_iter().next() {
            Some(path) => path,
            None => {
                ui::error("No Docvault database found. Pass --database.");
                std::process::exit(1);
            }
        },
    };
    if !path.exists() {
        ui::error(&format!("Database not found: {}", path.display()));
        std::process::exit(1);
    }

    let store = SqliteStore::open(&path)?;
    ui::status(Icons::STATS, "Database", &path.display().to_string());
    println!("{}", store.stats()?);
    Ok(())
}

/// Offer a choice when several installed databases exist: a single index,
/// comma-separated indices, or "all". `--yes` takes every target.
fn select_targets(found: Vec<PathBuf>, yes: bool) -> anyhow::Result<Vec<PathBuf>> {
    if found.len() == 1 || yes {
        return Ok(found);
    }

    println!("Multiple Docvault databases found:");
    for (index, path) in found.iter().enumerate() {
        println!("  {}. {}", index + 1, path.display());
    }

    let line = prompt(&format!(
        "Select target(s) [1-{}, comma-separated, or 'all']: ",
        found.len()
    ))?;
    if line.eq_ignore_ascii_case("all") {
        return Ok(found);
    }

    let mut targets = Vec::new();
    for token in line.split(',') {
        let token = token.trim();
        let index: usize = token
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid selection: {token:?}"))?;
        if index == 0 || index > found.len() {
            anyhow::bail!("selection out of range: {index}");
        }
        targets.push(found[index - 1].clone());
    }
    if targets.is_empty() {
        anyhow::bail!("no target selected");
    }
    Ok(targets)
}

fn confirm(question: &str) -> anyhow::Result<bool> {
    let answer = prompt(&format!("{} {}", Icons::WARN, question))?;
    Ok(answer.eq_ignore_ascii_case("yes"))
}

fn prompt(text: &str) -> anyhow::Result<String> {
    print!("{text}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
