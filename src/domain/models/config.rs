use serde::{Deserialize, Serialize};

/// Main configuration structure for Clover
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Remote service endpoints
    #[serde(default)]
    pub service: ServiceConfig,

    /// Model selection and sampling parameters
    #[serde(default)]
    pub model: ModelConfig,

    /// Debounce and bug injection settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Lock policy thresholds
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Retry policy for idempotent reads
    #[serde(default)]
    pub retry: RetryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote service endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ServiceConfig {
    /// Base URL of the AI suggestion service (`POST /suggestion`)
    #[serde(default = "default_ai_base_url")]
    pub ai_base_url: String,

    /// Base URL of the logging collaborator (`/logs`, `/logs/suggestion`)
    #[serde(default = "default_log_base_url")]
    pub log_base_url: String,

    /// Base URL of the user record store (`/users/{id}`)
    #[serde(default = "default_user_base_url")]
    pub user_base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_ai_base_url() -> String {
    "https://ai.nickrucinski.com".to_string()
}

fn default_log_base_url() -> String {
    "https://api.nickrucinski.com".to_string()
}

fn default_user_base_url() -> String {
    "https://api.nickrucinski.com".to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            ai_base_url: default_ai_base_url(),
            log_base_url: default_log_base_url(),
            user_base_url: default_user_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Model selection and sampling parameters.
///
/// Sampling values are forwarded to the AI service as-is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct ModelConfig {
    /// Vendor name understood by the AI service (ollama, openai, google)
    #[serde(default = "default_vendor")]
    pub vendor: String,

    /// Model identifier for the selected vendor
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_vendor() -> String {
    "ollama".to_string()
}

fn default_model() -> String {
    "codellama:7b".to_string()
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            vendor: default_vendor(),
            model: default_model(),
            temperature: None,
            top_k: None,
            top_p: None,
            max_tokens: None,
        }
    }
}

/// Debounce and bug injection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EngineConfig {
    /// Quiet period after the last edit before a fetch may fire
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Probability (0.0-1.0) that a request takes the flawed generation path
    #[serde(default = "default_bug_probability")]
    pub bug_probability: f64,
}

const fn default_debounce_ms() -> u64 {
    1000
}

const fn default_bug_probability() -> f64 {
    0.5
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            bug_probability: default_bug_probability(),
        }
    }
}

/// Lock policy thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PolicyConfig {
    /// Accepted suggestions per code context before the policy is evaluated
    #[serde(default = "default_acceptance_threshold")]
    pub acceptance_threshold: usize,

    /// Bug percentage above which the user gets locked
    #[serde(default = "default_bug_percentage")]
    pub bug_percentage: f64,

    /// Cutoff used after the user has passed a milestone (unset keeps the original)
    #[serde(default = "default_tightened_bug_percentage")]
    pub tightened_bug_percentage: Option<f64>,

    /// Lock when the percentage equals the cutoff, not only when it exceeds it
    #[serde(default)]
    pub inclusive_cutoff: bool,

    /// Where lock and milestone notifications send the user
    #[serde(default = "default_review_url")]
    pub review_url: String,
}

const fn default_acceptance_threshold() -> usize {
    20
}

const fn default_bug_percentage() -> f64 {
    30.0
}

#[allow(clippy::unnecessary_wraps)]
const fn default_tightened_bug_percentage() -> Option<f64> {
    Some(25.0)
}

fn default_review_url() -> String {
    "https://clover.nickrucinski.com/".to_string()
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            acceptance_threshold: default_acceptance_threshold(),
            bug_percentage: default_bug_percentage(),
            tightened_bug_percentage: default_tightened_bug_percentage(),
            inclusive_cutoff: false,
            review_url: default_review_url(),
        }
    }
}

/// Retry policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial backoff delay in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff delay in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

const fn default_max_retries() -> u32 {
    2
}

const fn default_initial_backoff_ms() -> u64 {
    250
}

const fn default_max_backoff_ms() -> u64 {
    2_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stdout only when unset
    #[serde(default)]
    pub log_dir: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
        }
    }
}
