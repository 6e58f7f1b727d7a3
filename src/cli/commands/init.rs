//! Implementation of the `clover init` command.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::output::{output, CommandOutput};
use crate::infrastructure::setup::{create_config_file, create_dirs, SetupPaths};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing configuration file
    #[arg(long, short)]
    pub force: bool,

    /// Target directory (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct InitOutput {
    pub success: bool,
    pub message: String,
    pub config_file: PathBuf,
    pub directories_created: Vec<PathBuf>,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![self.message.clone()];
        if !self.directories_created.is_empty() {
            lines.push("\nCreated directories:".to_string());
            for dir in &self.directories_created {
                lines.push(format!("  - {}", dir.display()));
            }
        }
        lines.join("\n")
    }
}

pub fn execute(args: InitArgs, json_mode: bool) -> Result<()> {
    let target_path = if args.path.is_absolute() {
        args.path
    } else {
        std::env::current_dir()
            .context("Failed to get current directory")?
            .join(&args.path)
    };
    let paths = SetupPaths::new(&target_path);

    let directories_created = create_dirs(&paths)?;
    let written = create_config_file(&paths, args.force)?;

    let message = match (written, args.force) {
        (false, _) => "Configuration already exists. Use --force to overwrite.",
        (true, true) => "Configuration reset to defaults.",
        (true, false) => "Project initialized.",
    };

    output(
        &InitOutput {
            success: written,
            message: message.to_string(),
            config_file: paths.config_file,
            directories_created,
        },
        json_mode,
    );
    Ok(())
}
