use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "night-audit")]
#[command(about = "Audit camera-night video and metadata uploads", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Reconcile video and metadata counts for every camera night
    Audit(AuditArgs),
    /// List camera ids found in the datapull
    ListCameras,
    /// List recorder MAC addresses per camera and capture date
    MacAddresses,
    /// Print configuration values
    PrintConfig,
    /// Copy a file from storage to the local machine
    Fetch {
        /// Path or key as reported by the listing
        path: String,
    },
}

#[derive(Debug, Args)]
pub struct AuditArgs {
    /// Write video_counts.csv, metadata_counts.csv and diagnostics.csv here
    #[arg(long)]
    pub csv_dir: Option<PathBuf>,
    /// Keep a trailing date even when no camera has video for it
    #[arg(long)]
    pub no_trim: bool,
}
