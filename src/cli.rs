use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Classify form fields from weak naming signals", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Classify a captured page of field snapshots and report field intents
    Classify(ClassifyArgs),
    /// Validate a file of user override rules without classifying anything
    Lint(LintArgs),
    /// Trace one field through every classification stage
    Explain(ExplainArgs),
}

#[derive(Debug, Args)]
pub struct ClassifyArgs {
    /// Input JSON file holding an array of field snapshots
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Settings YAML file (defaults apply if omitted)
    #[arg(short, long)]
    pub settings: Option<PathBuf>,
    /// Output JSON file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Seed for option selection, for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,
    /// Render results as an aligned text table instead of JSON
    #[arg(long)]
    pub table: bool,
}

#[derive(Debug, Args)]
pub struct LintArgs {
    /// YAML file holding a list of override rules
    #[arg(short, long)]
    pub rules: PathBuf,
}

#[derive(Debug, Args)]
pub struct ExplainArgs {
    /// Input JSON file holding an array of field snapshots
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Name of the field to trace
    #[arg(short, long)]
    pub field: String,
    /// Settings YAML file (defaults apply if omitted)
    #[arg(short, long)]
    pub settings: Option<PathBuf>,
}
