//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::commands::fetch::FetchArgs;
use super::commands::init::InitArgs;
use super::commands::progress::ProgressArgs;

#[derive(Parser, Debug)]
#[command(name = "clover")]
#[command(about = "Clover - AI code suggestions with adaptive trust", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .clover/config.yaml and .clover/local.yaml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default .clover/config.yaml
    Init(InitArgs),

    /// Request one suggestion and optionally record a decision on it
    Fetch(FetchArgs),

    /// Show acceptance statistics and lock state for a user
    Progress(ProgressArgs),
}
