use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "riffsplit: split WAVE files at their cue points", long_about = None)]
pub struct Cli {
    /// Log parse and write milestones (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write one WAVE file per cue point of the input
    Split {
        input: PathBuf,
        /// output directory (defaults to the input name up to its first '.')
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// prepended to every segment file name
        #[arg(long, default_value = "")]
        prefix: String,
        /// appended to every segment file name, before ".wav"
        #[arg(long, default_value = "")]
        suffix: String,
        /// plan and print the segments without writing anything
        #[arg(long)]
        dry_run: bool,
        #[arg(long)]
        json: bool,
    },

    /// Print the chunk tree, and the header of WAVE files
    Inspect {
        input: PathBuf,
        /// dump every payload byte
        #[arg(long)]
        full: bool,
    },

    /// List cue points with their labels
    Cues {
        input: PathBuf,
        #[arg(long)]
        json: bool,
    },

    /// Re-encode a WAVE file to a new path
    Rewrite { input: PathBuf, output: PathBuf },
}
