//! Project setup for `clover init`.
//!
//! Creates the `.clover` directory and writes a commented default
//! configuration file that `ConfigLoader::load` picks up.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration template content
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# Clover Configuration
# Override settings by editing this file, adding .clover/local.yaml,
# or setting environment variables with the CLOVER_ prefix
#
# Example environment variables:
#   export CLOVER_MODEL__MODEL=codellama:13b
#   export CLOVER_ENGINE__BUG_PROBABILITY=0.3
#   export CLOVER_POLICY__ACCEPTANCE_THRESHOLD=10
#   export CLOVER_LOGGING__LEVEL=debug

service:
  # AI suggestion service (POST /suggestion)
  ai_base_url: "https://ai.nickrucinski.com"
  # Event log (POST /logs, POST /logs/suggestion, GET /logs/{user})
  log_base_url: "https://api.nickrucinski.com"
  # User records (GET/PATCH /users/{user})
  user_base_url: "https://api.nickrucinski.com"
  timeout_secs: 30

model:
  # ollama, openai or google
  vendor: "ollama"
  model: "codellama:7b"
  # Sampling parameters are forwarded unchanged
  # temperature: 0.2
  # top_k: 40
  # top_p: 0.9
  # max_tokens: 64

engine:
  # Quiet period after the last keystroke before a suggestion is requested
  debounce_ms: 1000
  # Chance that a suggestion takes the flawed generation path
  bug_probability: 0.5

policy:
  # Accepted suggestions per code context before the policy is applied
  acceptance_threshold: 20
  # Lock when the share of buggy acceptances exceeds this percentage
  bug_percentage: 30.0
  # Cutoff applied once a milestone was reached
  tightened_bug_percentage: 25.0
  # Also lock when the percentage equals the cutoff
  inclusive_cutoff: false
  review_url: "https://clover.nickrucinski.com/"

# Retries apply to reads only (history, lock state)
retry:
  max_retries: 2
  initial_backoff_ms: 250
  max_backoff_ms: 2000

logging:
  # trace, debug, info, warn, error
  level: "info"
  # json or pretty
  format: "pretty"
  # Rolling JSON log files are written here when set
  # log_dir: ".clover/logs"
"#;

/// Setup paths and directories
#[derive(Debug, Clone)]
pub struct SetupPaths {
    pub config_dir: PathBuf,
    pub config_file: PathBuf,
    pub log_dir: PathBuf,
}

impl SetupPaths {
    /// Paths rooted at `root`.
    pub fn new(root: &Path) -> Self {
        let config_dir = root.join(".clover");
        Self {
            config_file: config_dir.join("config.yaml"),
            log_dir: config_dir.join("logs"),
            config_dir,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.config_file.exists()
    }
}

/// Create the configuration and log directories.
///
/// Returns the directories that did not exist before.
pub fn create_dirs(paths: &SetupPaths) -> Result<Vec<PathBuf>> {
    let mut created = Vec::new();
    for dir in [&paths.config_dir, &paths.log_dir] {
        if !dir.exists() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            created.push(dir.clone());
        }
    }
    Ok(created)
}

/// Write the default configuration file.
///
/// An existing file is only replaced with `force`. Returns whether the file
/// was written.
pub fn create_config_file(paths: &SetupPaths, force: bool) -> Result<bool> {
    if paths.config_file.exists() && !force {
        return Ok(false);
    }

    fs::write(&paths.config_file, DEFAULT_CONFIG_TEMPLATE).context("Failed to write config file")?;

    Ok(true)
}
