//! Binary entrypoint: a headless stand-in for the GUI shell.
//!
//! Opens a folder the way the gallery would (scan and tree concurrently,
//! sweeper running) and prints what the gallery would show.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tokio_util::sync::CancellationToken;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

/// Simple CLI
#[derive(Debug, Parser)]
#[command(name = "neoview", about = "Local media browser core")]
struct Cli {
    /// Folder to open
    #[arg(value_name = "FOLDER")]
    folder: PathBuf,

    /// Path to the JSON settings store
    #[arg(short, long, value_name = "FILE", default_value = "neoview-settings.json")]
    settings: PathBuf,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("neoview={level}").parse().expect("static directive"));
    fmt().with_env_filter(filter).with_target(true).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let library = neoview::MediaLibrary::open(&cli.settings)
        .with_context(|| format!("loading settings from {}", cli.settings.display()))?;

    let cancel = CancellationToken::new();
    let sweeper = library.spawn_sweeper(cancel.clone());

    let (scanned, tree) = library
        .open_folder(&cli.folder)
        .await
        .with_context(|| format!("opening folder {}", cli.folder.display()))?;
    info!(
        files = scanned.files.len(),
        images = tree.total_image_count,
        videos = tree.total_video_count,
        folders = tree.children.len(),
        dir_reads = library.dir_reads(),
        "opened folder"
    );

    let mut files: Vec<_> = scanned.files.iter().collect();
    files.sort();
    for path in files {
        println!("{}", path.display());
    }

    cancel.cancel();
    let _ = sweeper.await;
    Ok(())
}
