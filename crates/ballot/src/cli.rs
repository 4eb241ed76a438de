use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Ballot: derived election snapshots and spec-version type overrides.
#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// Pretty-print JSON output.
    #[arg(long, global = true, env = "BALLOT_PRETTY")]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Resolve the type overrides in force at a spec version.
    Overrides(OverridesArgs),
    /// Derive election info from a node state fixture.
    Elections(ElectionsArgs),
}

#[derive(Args)]
pub struct OverridesArgs {
    /// Spec version to resolve.
    #[arg(long)]
    pub version: u32,

    /// Name of a built-in runtime table (e.g. `rococo`).
    #[arg(long, env = "BALLOT_SPEC", conflicts_with = "table")]
    pub spec: Option<String>,

    /// Path to an override table in the declarative JSON form.
    #[arg(long, env = "BALLOT_TABLE")]
    pub table: Option<PathBuf>,
}

#[derive(Args)]
pub struct ElectionsArgs {
    /// Path to a node state fixture (modules, storage, constants).
    #[arg(long, env = "BALLOT_FIXTURE")]
    pub fixture: PathBuf,

    /// Number of derived snapshots to print before exiting.
    #[arg(long, default_value = "1")]
    pub updates: usize,
}
