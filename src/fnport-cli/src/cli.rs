//! CLI argument definitions for fnport

use clap::Parser;
use std::path::PathBuf;

use fnport::PngCompression;

#[derive(Parser, Debug)]
#[command(name = "fnport")]
#[command(about = "Classify game catalog asset dumps and export JSON metadata + icons")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory containing asset dump .json files
    pub input: Option<PathBuf>,

    /// Export root directory (default: configured path, else ./exported)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// PNG compression level for exported icons
    #[arg(long, value_enum, default_value = "default")]
    pub compression: Compression,

    /// Path to a JSON array of currently active item display names
    #[arg(long)]
    pub active_list: Option<PathBuf>,

    /// List classified assets without exporting (dry run)
    #[arg(short, long)]
    pub list: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Save the default export path to the config file
    Configure {
        /// Export root to use when --output is not given
        export_path: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Compression {
    Fast,
    Default,
    Best,
}

impl From<Compression> for PngCompression {
    fn from(value: Compression) -> Self {
        match value {
            Compression::Fast => PngCompression::Fast,
            Compression::Default => PngCompression::Default,
            Compression::Best => PngCompression::Best,
        }
    }
}
