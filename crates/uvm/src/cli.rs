//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// uvm - download, verify and switch between application versions
#[derive(Parser, Debug)]
#[command(name = "uvm")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress informational output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a uvm config file (YAML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<Utf8PathBuf>,

    /// Read the version list from this file
    #[arg(long, global = true)]
    pub manifest: Option<Utf8PathBuf>,

    /// Directory the store, marker and alias live in (defaults to the working directory)
    #[arg(long, global = true)]
    pub base_dir: Option<Utf8PathBuf>,

    /// Defaults to `update` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download and install a version
    Install(InstallArgs),

    /// Switch to an installed version
    Use(VersionArgs),

    /// Remove an installed version that is not in use
    #[command(alias = "uninstall")]
    Clean(VersionArgs),

    /// Install and switch to the latest version
    Update,

    /// Update without prompts, optionally removing the previous version
    #[command(aliases = ["auto", "quick-update"])]
    SelfUpdate(SelfUpdateArgs),

    /// List installed versions
    #[command(alias = "ls")]
    List,

    /// List versions available in the version list
    #[command(alias = "ls-remote")]
    ListRemote,

    /// Show the active version
    Current,

    /// Print the SHA-256 and size of a file
    #[command(alias = "sha256")]
    Hash(HashArgs),

    /// Produce a version list entry for a release archive
    #[command(alias = "gen")]
    Generate(GenerateArgs),

    /// Show the state of the local installation
    #[command(alias = "check")]
    Info,
}

#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Version to install
    #[arg(id = "target_version", value_name = "VERSION")]
    pub version: String,

    /// Do not ask before reinstalling or switching
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Version identifier
    #[arg(id = "target_version", value_name = "VERSION")]
    pub version: String,
}

#[derive(Args, Debug)]
pub struct SelfUpdateArgs {
    /// Remove the previously active version after switching
    #[arg(long)]
    pub clean: bool,
}

#[derive(Args, Debug)]
pub struct HashArgs {
    /// File to hash
    pub file: Utf8PathBuf,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Version identifier for the entry
    #[arg(id = "target_version", value_name = "VERSION")]
    pub version: String,

    /// Release archive to describe
    pub archive: Utf8PathBuf,

    /// Download URL, or a bare Google Drive file id
    pub location: String,

    /// Where to write the JSON entry
    #[arg(short, long, default_value = "version_item.json")]
    pub output: Utf8PathBuf,
}
