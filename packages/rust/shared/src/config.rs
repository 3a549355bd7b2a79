//! Application configuration for SeoScribe.
//!
//! User config lives at `~/.seoscribe/seoscribe.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SeoScribeError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "seoscribe.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".seoscribe";

// ---------------------------------------------------------------------------
// Config structs (matching seoscribe.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Completion API settings.
    #[serde(default)]
    pub llm: LlmSection,

    /// Content harvesting settings.
    #[serde(default)]
    pub harvest: HarvestSection,

    /// Search provider settings.
    #[serde(default)]
    pub search: SearchSection,

    /// Internal link finder settings.
    #[serde(default)]
    pub links: LinksSection,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Root directory for per-topic artifact folders.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Number of search-result pages to harvest.
    #[serde(default = "default_desired_pages")]
    pub desired_pages: usize,

    /// Internal links to collect per extracted keyword.
    #[serde(default = "default_links_per_keyword")]
    pub links_per_keyword: usize,

    /// Whether `run` expands the outline into a full article.
    #[serde(default)]
    pub expand_article: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            desired_pages: default_desired_pages(),
            links_per_keyword: default_links_per_keyword(),
            expand_article: false,
        }
    }
}

fn default_output_dir() -> String {
    "seoscribe-output".into()
}
fn default_desired_pages() -> usize {
    4
}
fn default_links_per_keyword() -> usize {
    3
}

/// `[llm]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSection {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Base URL of an OpenAI-compatible chat completions API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model identifier sent with every request.
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Output budget for the metadata request.
    #[serde(default = "default_metadata_max_tokens")]
    pub metadata_max_tokens: u32,

    /// Output budget for the outline request.
    #[serde(default = "default_outline_max_tokens")]
    pub outline_max_tokens: u32,

    /// Output budget for each article section.
    #[serde(default = "default_section_max_tokens")]
    pub section_max_tokens: u32,

    /// HTTP timeout for a single completion request.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Harvested text beyond this many characters is cut before prompting.
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            metadata_max_tokens: default_metadata_max_tokens(),
            outline_max_tokens: default_outline_max_tokens(),
            section_max_tokens: default_section_max_tokens(),
            request_timeout_secs: default_request_timeout(),
            max_context_chars: default_max_context_chars(),
        }
    }
}

fn default_api_key_env() -> String {
    "OPENROUTER_API_KEY".into()
}
fn default_base_url() -> String {
    "https://openrouter.ai/api/v1".into()
}
fn default_model() -> String {
    "openai/gpt-4".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_metadata_max_tokens() -> u32 {
    300
}
fn default_outline_max_tokens() -> u32 {
    1000
}
fn default_section_max_tokens() -> u32 {
    1500
}
fn default_request_timeout() -> u64 {
    120
}
fn default_max_context_chars() -> usize {
    24_000
}

/// `[harvest]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestSection {
    /// Timeout for each page fetch.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    /// URLs containing any of these substrings are never harvested.
    #[serde(default = "default_excluded_domains")]
    pub excluded_domains: Vec<String>,

    /// Floor on the number of candidate URLs requested from search.
    #[serde(default = "default_min_candidates")]
    pub min_candidates: usize,

    /// Allow fetching loopback/private-network hosts.
    #[serde(default)]
    pub allow_private_hosts: bool,
}

impl Default for HarvestSection {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: default_fetch_timeout(),
            excluded_domains: default_excluded_domains(),
            min_candidates: default_min_candidates(),
            allow_private_hosts: false,
        }
    }
}

fn default_fetch_timeout() -> u64 {
    15
}
fn default_excluded_domains() -> Vec<String> {
    vec!["wikipedia.org".into()]
}
fn default_min_candidates() -> usize {
    10
}

/// `[search]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSection {
    /// HTML search endpoint.
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,

    /// Maximum result pages requested per query.
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Timeout for each search request.
    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u64,
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            endpoint: default_search_endpoint(),
            max_pages: default_max_pages(),
            timeout_secs: default_search_timeout(),
        }
    }
}

fn default_search_endpoint() -> String {
    "https://html.duckduckgo.com/html/".into()
}
fn default_max_pages() -> usize {
    5
}
fn default_search_timeout() -> u64 {
    15
}

/// `[links]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinksSection {
    /// Substring a result URL must contain to count as an internal link.
    #[serde(default = "default_path_marker")]
    pub path_marker: String,
}

impl Default for LinksSection {
    fn default() -> Self {
        Self {
            path_marker: default_path_marker(),
        }
    }
}

fn default_path_marker() -> String {
    "articles".into()
}

// ---------------------------------------------------------------------------
// Runtime configs (merged from config file + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime harvesting configuration.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    pub fetch_timeout: Duration,
    pub excluded_domains: Vec<String>,
    pub min_candidates: usize,
    pub allow_private_hosts: bool,
}

impl From<&AppConfig> for HarvestConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            fetch_timeout: Duration::from_secs(config.harvest.fetch_timeout_secs),
            excluded_domains: config.harvest.excluded_domains.clone(),
            min_candidates: config.harvest.min_candidates,
            allow_private_hosts: config.harvest.allow_private_hosts,
        }
    }
}

/// Runtime search provider configuration.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub endpoint: String,
    pub max_pages: usize,
    pub timeout: Duration,
}

impl From<&AppConfig> for SearchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            endpoint: config.search.endpoint.clone(),
            max_pages: config.search.max_pages,
            timeout: Duration::from_secs(config.search.timeout_secs),
        }
    }
}

/// Runtime link finder configuration.
#[derive(Debug, Clone)]
pub struct LinkConfig {
    pub path_marker: String,
    pub per_keyword_cap: usize,
}

impl From<&AppConfig> for LinkConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            path_marker: config.links.path_marker.to_lowercase(),
            per_keyword_cap: config.defaults.links_per_keyword,
        }
    }
}

/// Runtime completion API configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key_env: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub metadata_max_tokens: u32,
    pub outline_max_tokens: u32,
    pub section_max_tokens: u32,
    pub request_timeout: Duration,
    pub max_context_chars: usize,
}

impl From<&AppConfig> for LlmConfig {
    fn from(config: &AppConfig) -> Self {
        let llm = &config.llm;
        Self {
            api_key_env: llm.api_key_env.clone(),
            base_url: llm.base_url.trim_end_matches('/').to_string(),
            model: llm.model.clone(),
            temperature: llm.temperature,
            metadata_max_tokens: llm.metadata_max_tokens,
            outline_max_tokens: llm.outline_max_tokens,
            section_max_tokens: llm.section_max_tokens,
            request_timeout: Duration::from_secs(llm.request_timeout_secs),
            max_context_chars: llm.max_context_chars,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.seoscribe/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| SeoScribeError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.seoscribe/seoscribe.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| SeoScribeError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        SeoScribeError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| SeoScribeError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| SeoScribeError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| SeoScribeError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Check that the completion API key env var is set and non-empty.
pub fn validate_api_key(config: &AppConfig) -> Result<()> {
    let var_name = &config.llm.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(()),
        _ => Err(SeoScribeError::config(format!(
            "completion API key not found. Set the {var_name} environment variable."
        ))),
    }
}
