// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use frontcam::Config;
use frontcam::constants::app_info;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cli;

#[derive(Parser)]
#[command(name = "frontcam")]
#[command(about = "Live preview of the front-facing camera in the terminal")]
#[command(version = app_info::version())]
#[command(subcommand_required = false)]
struct Cli {
    /// Configuration file (default: $XDG_CONFIG_HOME/frontcam/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Preview rotation in degrees, overriding the configuration
    #[arg(long, global = true, allow_negative_numbers = true)]
    orientation: Option<i32>,

    /// Show the preview unmirrored
    #[arg(long, global = true)]
    no_mirror: bool,

    /// Log to stderr instead of the log file while previewing
    #[arg(long, global = true)]
    log_stderr: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List available cameras
    List,

    /// Show the preview size and transform chosen for a display
    Plan {
        /// Display width in pixels
        #[arg(long)]
        width: u32,

        /// Display height in pixels
        #[arg(long)]
        height: u32,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // The preview owns the screen, so its logs go to a file
    let log_to_file = cli.command.is_none() && !cli.log_stderr;
    init_logging(log_to_file);

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(degrees) = cli.orientation {
        config.display_orientation = degrees;
        config.orientation()?;
    }
    if cli.no_mirror {
        config.mirror_preview = false;
    }

    match cli.command {
        Some(Commands::List) => cli::list_cameras(),
        Some(Commands::Plan { width, height }) => cli::print_plan(&config, width, height),
        None => Ok(frontcam::terminal::run(&config)?),
    }
}

/// Initialize logging
///
/// Set RUST_LOG environment variable to control log level
/// Examples: RUST_LOG=debug, RUST_LOG=frontcam=debug, RUST_LOG=info
fn init_logging(log_to_file: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    if !log_to_file {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_level(true)
            .with_writer(std::io::stderr)
            .init();
        return;
    }

    match open_log_file() {
        Some(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_level(true)
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(file))
            .init(),
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::sink)
            .init(),
    }
}

/// Open `$XDG_STATE_HOME/frontcam/frontcam.log` for appending
fn open_log_file() -> Option<std::fs::File> {
    let dir = dirs::state_dir()
        .or_else(dirs::cache_dir)?
        .join("frontcam");
    std::fs::create_dir_all(&dir).ok()?;
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("frontcam.log"))
        .ok()
}
