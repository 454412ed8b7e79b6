use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about = "Tools for the answers found for marshaled values")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode raw answers into the values of the marked objects
    Decode(DecodeArgs),
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Path to the answers, one JSON object with `name` and `bytes` per line
    #[arg(short, long)]
    pub input: PathBuf,
    /// Path to write the decoded assignments to, stdout if not given
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Whether to fail on the first malformed answer instead of skipping it
    #[arg(long, action)]
    pub strict: bool,
}
