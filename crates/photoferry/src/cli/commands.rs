//! CLI command definitions.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Photoferry - upload photos and videos without duplicates
#[derive(Parser, Debug)]
#[command(name = "photoferry")]
#[command(about = "Upload photos and videos to a photo library, skipping content it already has", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file used instead of the default locations
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload a file or a directory tree
    Upload(UploadArgs),

    /// Find the library item for a content digest
    Lookup {
        /// SHA-1 digest in hex, base64 or dedup-key form
        digest: String,
    },

    /// Rebuild the identity cache from the library
    Refresh {
        /// Start over and drop entries the library no longer has
        #[arg(long)]
        replace: bool,
    },

    /// Print the content digest of a file
    Hash {
        /// File to identify
        file: PathBuf,
    },

    /// Show identity cache statistics
    CacheStats,
}

/// Arguments of `photoferry upload`
#[derive(Args, Debug, Default)]
pub struct UploadArgs {
    /// File or directory to upload
    pub target: PathBuf,

    /// Number of concurrent uploads
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Upload even when the content is already in the library
    #[arg(long)]
    pub force: bool,

    /// Skip files whose names match this glob (or regex with --regex)
    #[arg(long)]
    pub filter: Option<String>,

    /// Match the filter without regard to case
    #[arg(long)]
    pub ignore_case: bool,

    /// Treat the filter as a regular expression
    #[arg(long)]
    pub regex: bool,

    /// Keep only files matching the filter instead of skipping them
    #[arg(long)]
    pub include: bool,

    /// Do not descend into subdirectories
    #[arg(long)]
    pub no_recursive: bool,

    /// Only consider known photo and video extensions
    #[arg(long)]
    pub media_only: bool,

    /// Store in space-saving quality
    #[arg(long)]
    pub saver: bool,

    /// Count uploads against the storage quota
    #[arg(long)]
    pub use_quota: bool,

    /// Confirm cached references with the library before trusting them
    #[arg(long)]
    pub verify: bool,

    /// Show a progress bar
    #[arg(long)]
    pub progress: bool,

    /// Print a JSON summary instead of one line per file
    #[arg(long)]
    pub json: bool,
}
