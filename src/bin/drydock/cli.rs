//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use drydock::core::config::{BuildKind, Linkage, Platform};

/// Drydock - A meta-build generator for C/C++ workspaces
#[derive(Parser)]
#[command(name = "drydock")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate native build projects for the workspace
    Generate(GenerateArgs),

    /// Display the resolved project graph
    Tree(TreeArgs),
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Path to drydock.toml (defaults to searching parent directories)
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Target platform (defaults to the host platform)
    #[arg(long, value_enum)]
    pub platform: Option<Platform>,

    /// Build configuration
    #[arg(long, value_enum, default_value = "release")]
    pub config: BuildKind,

    /// Linkage for auto-libraries
    #[arg(long, value_enum, default_value = "shared")]
    pub libs: Linkage,

    /// Development build: keep test applications and dev-only projects
    #[arg(long)]
    pub dev: bool,

    /// Solution output directory (defaults to .drydock/<platform>.<config>)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Runtime binary directory (defaults to <output>/bin)
    #[arg(long)]
    pub bin_dir: Option<PathBuf>,

    /// Path to a libraries.toml index (defaults to one next to drydock.toml)
    #[arg(long)]
    pub libraries: Option<PathBuf>,
}

#[derive(Args)]
pub struct TreeArgs {
    /// Path to drydock.toml (defaults to searching parent directories)
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Target platform (defaults to the host platform)
    #[arg(long, value_enum)]
    pub platform: Option<Platform>,

    /// Linkage for auto-libraries
    #[arg(long, value_enum, default_value = "shared")]
    pub libs: Linkage,
}
