use crate::types::OutputFormat;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Merge a forward and a reverse trace into one consensus read
    Merge(MergeOpts),

    /// Convert trace files to FASTA or FASTQ
    Export(ExportOpts),

    /// List the tag directory of a trace file
    Info(InfoOpts),
}

/// Unset scoring/threshold options fall back to the user config file and
/// then to the built-in defaults (shown in parentheses).
#[derive(clap::Args)]
pub struct MergeOpts {
    /// Forward-read trace file (.ab1)
    pub forward: String,
    /// Reverse-read trace file (.ab1)
    pub reverse: String,

    /// Output file (default: stdout)
    #[arg(short = 'o', long = "output")]
    pub output: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "fasta")]
    pub format: OutputFormat,

    /// Record name for the merged read (default: forward and reverse sample
    /// names joined with '_')
    #[arg(long)]
    pub name: Option<String>,

    /// Minimum overlap length in aligned bases (20)
    #[arg(long)]
    pub min_overlap: Option<usize>,

    /// Alignment match score (10)
    #[arg(long)]
    pub match_score: Option<i32>,

    /// Alignment mismatch score (-8)
    #[arg(long, allow_hyphen_values = true)]
    pub mismatch_score: Option<i32>,

    /// Alignment gap score (-10)
    #[arg(long, allow_hyphen_values = true)]
    pub gap_score: Option<i32>,

    /// Minimum alignment score to accept an overlap (80)
    #[arg(long)]
    pub min_score: Option<i32>,

    /// Minimum percent identity over the overlap (85.0)
    #[arg(long)]
    pub min_identity: Option<f64>,

    /// Join unmergeable reads with this many N bases instead of failing (0 = disabled)
    #[arg(long)]
    pub join_gap: Option<usize>,

    /// Quality trimming window in bases (4)
    #[arg(long)]
    pub trim_window: Option<usize>,

    /// Minimum mean window quality kept by the trimmer (22)
    #[arg(long)]
    pub trim_threshold: Option<u8>,

    /// Disable quality trimming of the inputs
    #[arg(long)]
    pub no_trim: bool,
}

#[derive(clap::Args)]
pub struct ExportOpts {
    /// Trace files to convert
    #[arg(required = true)]
    pub inputs: Vec<String>,

    /// Directory for the converted files (default: next to each input)
    #[arg(short = 'o', long = "output-dir")]
    pub output_dir: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "fastq")]
    pub format: OutputFormat,

    /// Quality-trim the reads before writing
    #[arg(long)]
    pub trim: bool,

    /// Quality trimming window in bases
    #[arg(long, default_value = "4")]
    pub trim_window: usize,

    /// Minimum mean window quality kept by the trimmer
    #[arg(long, default_value = "22")]
    pub trim_threshold: u8,
}

#[derive(clap::Args)]
pub struct InfoOpts {
    /// Trace file to inspect
    pub input: String,

    /// Emit the tag directory as JSON
    #[arg(long)]
    pub json: bool,
}
