//! `delve-data`: maintenance tool for Delve data sets. Creates, deletes
//! and summarizes stores and legacy archives, and drives the two import
//! paths from the command line.

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use delve_common::{StoreConfig, ViewKind};
use delve_import::legacy::{self, LegacyArchive};
use delve_import::{ImportError, ImportTask, Importer, SourceVersion, TaskStatus};
use delve_store::{Datastore, OpenStatus};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "delve-data")]
#[command(about = "Delve data set maintenance")]
struct Cli {
    /// Data set to operate on: a store directory or an archive file.
    #[arg(long, default_value = "./delve-data")]
    path: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create an empty data set.
    Create(CreateArgs),
    /// Remove a data set.
    Delete(DeleteArgs),
    /// Print row counts for a store or a legacy archive.
    Summarize,
    /// Migrate a legacy archive into the data set.
    Import(ImportArgs),
}

#[derive(Debug, Args)]
struct CreateArgs {
    /// `latest` for a current-format store, `1.5` or `1.11c` for an
    /// empty legacy archive.
    #[arg(long, default_value = "latest")]
    version: String,
}

#[derive(Debug, Args)]
struct DeleteArgs {
    /// Confirm the deletion.
    #[arg(long)]
    yes: bool,
}

#[derive(Debug, Args)]
struct ImportArgs {
    /// Legacy archive to read.
    source: PathBuf,

    /// Directory of localized text sources to install afterwards.
    #[arg(long)]
    messages: Option<PathBuf>,

    /// Copy only players and their saves into an existing store,
    /// instead of migrating everything into a fresh one.
    #[arg(long)]
    profile: bool,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Create(args) => run_create(&cli.path, &args),
        Command::Delete(args) => run_delete(&cli.path, &args),
        Command::Summarize => run_summarize(&cli.path),
        Command::Import(args) => run_import(&cli.path, &args),
    }
}

fn run_create(path: &Path, args: &CreateArgs) -> Result<()> {
    if args.version == "latest" {
        Datastore::create(StoreConfig::new(path))
            .with_context(|| format!("creating a store in {}", path.display()))?;
        println!("created an empty store in {}", path.display());
        return Ok(());
    }
    let Some(version) = SourceVersion::from_label(&args.version) else {
        bail!(
            "unknown version `{}` (expected latest, 1.5 or 1.11c)",
            args.version
        );
    };
    legacy::write_archive(path, version, &LegacyArchive::default())
        .with_context(|| format!("writing {}", path.display()))?;
    println!("created an empty {version} archive at {}", path.display());
    Ok(())
}

fn run_delete(path: &Path, args: &DeleteArgs) -> Result<()> {
    if !args.yes {
        bail!("refusing to delete {} without --yes", path.display());
    }
    if path.is_dir() {
        fs::remove_dir_all(path).with_context(|| format!("deleting {}", path.display()))?;
    } else if path.is_file() {
        fs::remove_file(path).with_context(|| format!("deleting {}", path.display()))?;
    } else {
        bail!("no data set at {}", path.display());
    }
    println!("deleted {}", path.display());
    Ok(())
}

fn run_summarize(path: &Path) -> Result<()> {
    if path.is_file() {
        let (version, archive) = legacy::read_archive(path)
            .with_context(|| format!("reading {}", path.display()))?;
        println!("{}: version {} legacy archive", path.display(), version);
        print_count("Holds", archive.holds.len());
        print_count("Levels", archive.levels.len());
        print_count("Rooms", archive.rooms.len());
        print_count("SavedGames", archive.saved_games.len());
        print_count("Demos", archive.demos.len());
        print_count("Players", archive.players.len());
        print_count("MessageTexts", archive.message_texts.len());
        return Ok(());
    }

    let (store, status) = Datastore::open(StoreConfig::new(path))
        .with_context(|| format!("opening the store in {}", path.display()))?;
    println!("{}: current-format store", path.display());
    if status == OpenStatus::RestoredFromBackup {
        println!("  restored from shadow backups");
    }
    for view in ViewKind::ALL {
        print_count(view.name(), store.row_count(view));
    }
    Ok(())
}

fn print_count(name: &str, count: usize) {
    println!("  {name:<13} {count}");
}

fn run_import(path: &Path, args: &ImportArgs) -> Result<()> {
    if args.profile {
        return run_profile_import(path, &args.source);
    }

    let mut store = Datastore::create(StoreConfig::new(path))
        .with_context(|| format!("creating a store in {}", path.display()))?;
    let mut importer = Importer::open(&args.source)
        .with_context(|| format!("opening {}", args.source.display()))?;
    println!(
        "importing version {} archive {}",
        importer.version(),
        args.source.display()
    );
    importer.run_full(&mut store, args.messages.as_deref())?;
    println!(
        "imported {} holds, {} rooms, {} players into {}",
        store.holds().len(),
        store.rooms().len(),
        store.players().len(),
        path.display()
    );
    Ok(())
}

fn run_profile_import(path: &Path, source: &Path) -> Result<()> {
    let mut task = ImportTask::new(StoreConfig::new(path));
    task.start(source)?;
    let mut last_percent = 0;
    loop {
        let report = task.tick();
        if report.percent != last_percent {
            println!("{:>3}%", report.percent);
            last_percent = report.percent;
        }
        match report.status {
            TaskStatus::InProgress => {}
            TaskStatus::Completed => break,
            TaskStatus::NotStarted | TaskStatus::Failed => match task.failure() {
                Some(failure) => bail!("profile import failed: {}", describe(failure)),
                None => bail!("profile import stopped unexpectedly"),
            },
        }
    }
    println!("profile import complete");
    Ok(())
}

/// Flattens an error and its chain into one line for terminal output.
fn describe(err: &ImportError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}
