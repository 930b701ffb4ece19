//! Csvstage: stage Kaggle dataset CSVs for local tooling.
//!
//! Csvstage resolves a Kaggle dataset reference, downloads and caches the
//! dataset archive, then copies every CSV file it contains into a flat
//! destination directory where downstream viewers pick them up.
//!
//! # Modules
//!
//! - [`hub`]: remote concerns (reference resolution, preflight listing,
//!   download-and-cache)
//! - [`stage`]: the local copy pipeline
//! - [`error`]: error types for csvstage operations

pub mod error;
pub mod hub;
pub mod stage;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use error::CsvstageError;

use hub::client::{KaggleHub, DEFAULT_BASE_URL};
use hub::{preflight, resolve, DatasetHub};

/// Dataset pulled when no reference is given on the command line.
pub const DEFAULT_DATASET: &str = "bekiremirhanakay/benchmark-dataset-for-sorting-algorithms";

/// Destination directory used when none is given on the command line.
pub const DEFAULT_DEST: &str = "data/logs";

/// File name downstream viewers load by default. Whether it exists depends
/// entirely on the upstream dataset; csvstage only reports when it is absent.
const DEFAULT_VIEWER_TARGET: &str = "viral_data.csv";

/// The csvstage CLI application.
#[derive(Parser)]
#[command(name = "csvstage")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Download a Kaggle dataset and stage its CSV files locally.
    Pull(PullArgs),
    /// List the files a Kaggle dataset advertises, without downloading.
    Files(FilesArgs),
}

/// Arguments for the pull subcommand.
#[derive(clap::Args)]
struct PullArgs {
    /// Dataset to pull ('owner/dataset' or a kaggle.com dataset URL).
    #[arg(default_value = DEFAULT_DATASET)]
    dataset: String,

    /// Directory the CSV files are staged into.
    #[arg(long, env = "CSVSTAGE_DEST", default_value = DEFAULT_DEST)]
    dest: PathBuf,

    /// Cache root for downloaded datasets.
    #[arg(long, env = "CSVSTAGE_CACHE")]
    cache_dir: Option<PathBuf>,

    /// Discard any cached copy and download again.
    #[arg(long)]
    refresh: bool,

    /// Only print the final summary line.
    #[arg(short, long)]
    quiet: bool,
}

/// Arguments for the files subcommand.
#[derive(clap::Args)]
struct FilesArgs {
    /// Dataset to list ('owner/dataset' or a kaggle.com dataset URL).
    #[arg(default_value = DEFAULT_DATASET)]
    dataset: String,
}

/// Run the csvstage CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), CsvstageError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Pull(args)) => run_pull(args),
        Some(Commands::Files(args)) => run_files(args),
        None => {
            println!("csvstage {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Stage Kaggle dataset CSVs into a local directory.");
            println!();
            println!("Run 'csvstage --help' for usage information.");
            Ok(())
        }
    }
}

/// Execute the pull subcommand.
fn run_pull(args: PullArgs) -> Result<(), CsvstageError> {
    let dataset = resolve::parse_dataset_input(&args.dataset)?;
    let hub = KaggleHub::from_env(args.cache_dir)?.refresh(args.refresh);

    if !args.quiet {
        println!("Downloading Kaggle dataset: {} ...", dataset);
    }

    let source_root = hub.dataset_download(&dataset)?;
    if !args.quiet {
        println!("Path to dataset files: {}", source_root.display());
    }

    let report = stage::stage_csv_files(&source_root, &args.dest)?;

    if !args.quiet {
        for file in &report.files {
            println!(
                "Copying {} -> {}",
                file.source.display(),
                file.target.display()
            );
        }
    }

    println!("{report}");

    let has_viewer_target = report
        .files
        .iter()
        .any(|file| file.target.file_name().and_then(|n| n.to_str()) == Some(DEFAULT_VIEWER_TARGET));
    if !args.quiet && !has_viewer_target {
        println!(
            "Note: '{DEFAULT_VIEWER_TARGET}' was not among the staged files; viewers expecting \
             the default load target need an explicit path."
        );
    }

    Ok(())
}

/// Execute the files subcommand.
fn run_files(args: FilesArgs) -> Result<(), CsvstageError> {
    let dataset = resolve::parse_dataset_input(&args.dataset)?;
    let files = preflight::list_files(&dataset, DEFAULT_BASE_URL)?;

    if files.is_empty() {
        println!("No files advertised for {}.", dataset);
        return Ok(());
    }

    for file in &files {
        match file.total_bytes {
            Some(bytes) => println!("{}  ({} bytes)", file.name, bytes),
            None => println!("{}", file.name),
        }
    }

    Ok(())
}
