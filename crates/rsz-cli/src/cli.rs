use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "rszpatch",
    about = "Diff, bundle and patch RSZ game content",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the minimal diff between a base and an edited file dump
    Diff(DiffArgs),
    /// Apply a scene diff onto a file dump
    Apply(ApplyArgs),
    /// List the object paths of a scene
    Paths(PathsArgs),
    /// Inspect a bundle
    Bundle(BundleArgs),
    /// Collect edited file dumps into a bundle
    Collect(CollectArgs),
    /// Apply a bundle onto base file dumps
    Patch(PatchArgs),
}

#[derive(Args)]
pub struct DiffArgs {
    pub base: PathBuf,
    pub edited: PathBuf,
    /// Class schema (JSON)
    #[arg(long)]
    pub schema: PathBuf,
    /// Diff the game object hierarchy instead of resources
    #[arg(long)]
    pub scene: bool,
    /// Editor config (TOML), required for resource diffs
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Native path the dumps stand for, required for resource diffs
    #[arg(long)]
    pub native: Option<String>,
}

#[derive(Args)]
pub struct ApplyArgs {
    pub base: PathBuf,
    pub diff: PathBuf,
    #[arg(long)]
    pub schema: PathBuf,
    /// Where to write the patched dump (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct PathsArgs {
    pub file: PathBuf,
}

#[derive(Args)]
pub struct BundleArgs {
    #[command(subcommand)]
    pub action: BundleAction,
}

#[derive(Subcommand)]
pub enum BundleAction {
    /// List the files and entities of a bundle
    Show { bundle: PathBuf },
    /// Find the listing that claims a native path
    Find { bundle: PathBuf, native: String },
}

#[derive(Args)]
pub struct CollectArgs {
    #[arg(long)]
    pub config: PathBuf,
    #[arg(long)]
    pub schema: PathBuf,
    /// Bundle file to create or update
    #[arg(long)]
    pub bundle: PathBuf,
    /// Directory of unmodified dumps, laid out by native path
    #[arg(long)]
    pub base_dir: PathBuf,
    /// Directory of edited dumps, laid out by native path
    #[arg(long)]
    pub edited_dir: PathBuf,
}

#[derive(Args)]
pub struct PatchArgs {
    #[arg(long)]
    pub config: PathBuf,
    #[arg(long)]
    pub schema: PathBuf,
    #[arg(long)]
    pub bundle: PathBuf,
    #[arg(long)]
    pub base_dir: PathBuf,
    /// Directory the patched dumps are written to
    #[arg(long)]
    pub out_dir: PathBuf,
}
