//! Configuration loading and resolution
//!
//! Configuration file resolution follows this priority order:
//! 1. Command-line argument (highest priority)
//! 2. `HOLDINGS_CONFIG` environment variable
//! 3. User config file (`<config dir>/holdings-exchange/config.toml`)
//! 4. Compiled defaults (fallback)
//!
//! An explicitly named file (CLI or ENV) that cannot be read or parsed is an
//! error. The implicit user config file degrades gracefully: a broken file is
//! reported with a warning and the compiled defaults are used instead.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the configuration file
pub const CONFIG_ENV_VAR: &str = "HOLDINGS_CONFIG";

/// Directory name used under the platform config directory
pub const APP_DIR_NAME: &str = "holdings-exchange";

/// Full configuration loaded from TOML
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Review service (record source)
    pub review: ReviewConfig,
    /// Search API
    pub api: ApiConfig,
    /// Pipeline behaviour
    pub app: AppConfig,
    /// Google Scholar institutional holdings output
    pub xml_holdings: XmlHoldingsConfig,
    /// Google Scholar institutional links output
    pub xml_links: XmlLinksConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Review service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Base URL of the review service
    pub url: String,
    /// Response timeout in milliseconds
    pub timeout_ms: u64,
    /// Default `maxSize` parameter sent to the review service
    pub max_size: u32,
    /// Short field codes used by the review service
    pub fields: FieldCodes,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            url: "https://revue-sommaire.data.istex.fr".to_string(),
            timeout_ms: 60_000,
            max_size: 5000,
            fields: FieldCodes::default(),
        }
    }
}

/// Opaque short codes naming record fields in review service documents
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct FieldCodes {
    pub record_type: String,
    pub title: String,
    pub contributor: String,
    pub corpus: String,
    pub issn: String,
    pub e_issn: String,
    pub isbn: String,
    pub e_isbn: String,
    pub query: String,
    pub start_date: String,
    pub end_date: String,
    pub publisher: String,
    pub title_id: String,
    pub preceded_by: String,
    pub followed_by: String,
    pub rights: String,
    pub parent_publication_title_id: String,
}

impl Default for FieldCodes {
    fn default() -> Self {
        Self {
            record_type: "WmzM".to_string(),
            title: "XXRn".to_string(),
            contributor: "Ai4O".to_string(),
            corpus: "aCG7".to_string(),
            issn: "nC6e".to_string(),
            e_issn: "auA7".to_string(),
            isbn: "hLNF".to_string(),
            e_isbn: "YDZ9".to_string(),
            query: "BZSn".to_string(),
            start_date: "Rijz".to_string(),
            end_date: "ZLPq".to_string(),
            publisher: "UVFW".to_string(),
            title_id: "V7IG".to_string(),
            preceded_by: "izmJ".to_string(),
            followed_by: "FdsN".to_string(),
            rights: "Fr7z".to_string(),
            parent_publication_title_id: "XX3r".to_string(),
        }
    }
}

/// Search API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the search API
    pub url: String,
    /// Total request timeout in milliseconds
    pub timeout_ms: u64,
    /// Connection timeout in milliseconds
    pub connect_timeout_ms: u64,
    /// Optional client-side rate limit
    pub requests_per_second: Option<u32>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: "https://api.istex.fr".to_string(),
            timeout_ms: 30_000,
            connect_timeout_ms: 5_000,
            requests_per_second: None,
        }
    }
}

/// Pipeline configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Caller identifier sent to both services
    pub sid: String,
    /// Records processed concurrently (must be > 0)
    pub parallel: usize,
    /// Collect coverage engine timings in the run report
    pub profile: bool,
    /// Consecutive transport failures tolerated before the run aborts
    pub max_consecutive_transport_failures: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sid: "holdings-exchange".to_string(),
            parallel: 5,
            profile: false,
            max_consecutive_transport_failures: 10,
        }
    }
}

/// Institutional holdings XML output configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct XmlHoldingsConfig {
    /// Maximum size of one holdings file in bytes (0 = no splitting)
    pub max_size: usize,
    /// DTD location written into the document type declaration
    pub dtd: String,
    /// Output directory for holdings files
    pub output_path: PathBuf,
    /// Institution tag embedded in holdings file names
    pub institution: String,
}

impl Default for XmlHoldingsConfig {
    fn default() -> Self {
        Self {
            max_size: 5 * 1024 * 1024,
            dtd: "http://scholar.google.com/scholar/institutional_holdings.dtd".to_string(),
            output_path: PathBuf::from("output/google-scholar"),
            institution: "FRANCE_ISTEX".to_string(),
        }
    }
}

/// Institutional links XML output configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct XmlLinksConfig {
    pub dtd: String,
    /// Base URL the holdings file names are resolved against
    pub base_url: String,
    pub contacts: Vec<String>,
    pub institution: String,
    pub keywords: String,
    pub link_label: String,
    pub openurl_base: String,
    pub openurl_options: Vec<String>,
}

impl Default for XmlLinksConfig {
    fn default() -> Self {
        Self {
            dtd: "http://scholar.google.com/scholar/institutional_links.dtd".to_string(),
            base_url: "https://www.istex.fr/".to_string(),
            contacts: Vec::new(),
            institution: "ISTEX".to_string(),
            keywords: "ISTEX France".to_string(),
            link_label: "[PDF] ISTEX".to_string(),
            openurl_base: "https://view.istex.fr/document/openurl?auth=ip,fede&".to_string(),
            openurl_options: vec![
                "pmid".to_string(),
                "doi".to_string(),
                "book-title".to_string(),
                "journal-title".to_string(),
            ],
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Read TOML failed ({}): {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Check values that cannot be expressed by the type system
    pub fn validate(&self) -> Result<()> {
        if self.app.parallel == 0 {
            return Err(Error::Config("app.parallel must be greater than 0".to_string()));
        }
        if self.review.url.trim().is_empty() {
            return Err(Error::Config("review.url must not be empty".to_string()));
        }
        if self.api.url.trim().is_empty() {
            return Err(Error::Config("api.url must not be empty".to_string()));
        }
        if self.api.requests_per_second == Some(0) {
            return Err(Error::Config(
                "api.requests_per_second must be greater than 0 when set".to_string(),
            ));
        }
        Ok(())
    }
}

/// Where the effective configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    CommandLine(PathBuf),
    Environment(PathBuf),
    UserFile(PathBuf),
    Defaults,
}

/// Resolves and loads the configuration following the priority order
pub struct ConfigResolver {
    env_var_name: String,
    user_config_path: Option<PathBuf>,
}

impl ConfigResolver {
    /// Resolver using the standard environment variable and user config path
    pub fn new() -> Self {
        Self {
            env_var_name: CONFIG_ENV_VAR.to_string(),
            user_config_path: default_user_config_path(),
        }
    }

    /// Override the user config file location
    pub fn with_user_config_path(mut self, path: Option<PathBuf>) -> Self {
        self.user_config_path = path;
        self
    }

    /// Determine which configuration source applies
    pub fn resolve_source(&self, cli_arg: Option<&Path>) -> ConfigSource {
        // Priority 1: Command-line argument
        if let Some(path) = cli_arg {
            return ConfigSource::CommandLine(path.to_path_buf());
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(&self.env_var_name) {
            if !path.trim().is_empty() {
                return ConfigSource::Environment(PathBuf::from(path));
            }
        }

        // Priority 3: User config file
        if let Some(path) = &self.user_config_path {
            if path.exists() {
                return ConfigSource::UserFile(path.clone());
            }
        }

        // Priority 4: Compiled defaults
        ConfigSource::Defaults
    }

    /// Load the effective configuration
    pub fn load(&self, cli_arg: Option<&Path>) -> Result<(TomlConfig, ConfigSource)> {
        let source = self.resolve_source(cli_arg);

        let config = match &source {
            ConfigSource::CommandLine(path) | ConfigSource::Environment(path) => {
                let config = TomlConfig::from_file(path)?;
                info!("Configuration loaded from {}", path.display());
                config
            }
            ConfigSource::UserFile(path) => match TomlConfig::from_file(path) {
                Ok(config) => {
                    info!("Configuration loaded from {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("Ignoring user config file, using defaults: {}", e);
                    TomlConfig::default()
                }
            },
            ConfigSource::Defaults => {
                info!("No configuration file found, using compiled defaults");
                TomlConfig::default()
            }
        };

        Ok((config, source))
    }
}

impl Default for ConfigResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Get the user configuration file path for the platform
fn default_user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join("config.toml"))
}
