//! Configuration loading and root folder resolution
//!
//! Bootstrap configuration lives in a TOML settings file and is resolved once
//! at startup into an explicit [`Config`] passed to the web layer.
//!
//! Settings file location, in priority order:
//! 1. Command-line argument
//! 2. `CTX_CONFIG` environment variable
//! 3. `<config_dir>/contextualise/settings.toml`
//!
//! Root folder, in priority order:
//! 1. Command-line argument
//! 2. `CTX_ROOT_FOLDER` environment variable
//! 3. `root_folder` key of the settings file
//! 4. OS-dependent compiled default
//!
//! A missing settings file is not an error: compiled defaults are used and the
//! caller is told so through [`ConfigSource::Defaults`].

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming the settings file
pub const CONFIG_ENV_VAR: &str = "CTX_CONFIG";

/// Environment variable naming the root folder
pub const ROOT_FOLDER_ENV_VAR: &str = "CTX_ROOT_FOLDER";

const APP_DIR: &str = "contextualise";
const SETTINGS_FILE: &str = "settings.toml";
const DATABASE_FILE: &str = "contextualise.db";
const RESOURCES_DIR: &str = "resources";

/// Settings file contents
///
/// Every section is optional; absent keys fall back to compiled defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub root_folder: Option<PathBuf>,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub email: Option<EmailConfig>,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum request body size in bytes (image uploads)
    #[serde(default = "default_max_content_length")]
    pub max_content_length: usize,

    /// Directory for uploaded resources; defaults to `<root>/resources`
    #[serde(default)]
    pub resources_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_content_length: default_max_content_length(),
            resources_dir: None,
        }
    }
}

/// Topic store database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database file; defaults to `<root>/contextualise.db`
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_connections: default_max_connections(),
        }
    }
}

/// Outbound mail credentials
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    pub username: String,
    pub password: String,
    pub server: String,
    #[serde(default = "default_mail_port")]
    pub port: u16,
    pub sender: String,
    #[serde(default)]
    pub use_ssl: bool,
}

/// Authentication and session settings
#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// Whether `/auth/register` accepts new users
    #[serde(default = "default_true")]
    pub registerable: bool,

    #[serde(default = "default_session_lifetime")]
    pub session_lifetime_seconds: i64,

    /// Redirect target after a successful login
    #[serde(default = "default_post_login_view")]
    pub post_login_view: String,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            registerable: true,
            session_lifetime_seconds: default_session_lifetime(),
            post_login_view: default_post_login_view(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_max_content_length() -> usize {
    2 * 1024 * 1024 // 2 megabytes
}

fn default_max_connections() -> u32 {
    10
}

fn default_mail_port() -> u16 {
    587
}

fn default_true() -> bool {
    true
}

fn default_session_lifetime() -> i64 {
    14 * 24 * 60 * 60
}

fn default_post_login_view() -> String {
    "/maps".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Fully resolved application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub root_folder: PathBuf,
    pub database_path: PathBuf,
    pub resources_dir: PathBuf,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub email: Option<EmailConfig>,
    pub security: SecurityConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Resolve paths against the root folder and validate settings
    pub fn from_toml(toml: TomlConfig, root_folder: PathBuf) -> Result<Self> {
        if toml.server.port == 0 {
            return Err(Error::Config("server.port must be non-zero".to_string()));
        }
        if toml.server.max_content_length == 0 {
            return Err(Error::Config(
                "server.max_content_length must be greater than zero".to_string(),
            ));
        }
        if toml.database.max_connections == 0 {
            return Err(Error::Config(
                "database.max_connections must be greater than zero".to_string(),
            ));
        }
        if toml.security.session_lifetime_seconds <= 0 {
            return Err(Error::Config(
                "security.session_lifetime_seconds must be positive".to_string(),
            ));
        }
        if !toml.security.post_login_view.starts_with('/') {
            return Err(Error::Config(format!(
                "security.post_login_view must be an absolute path, got '{}'",
                toml.security.post_login_view
            )));
        }

        let database_path = toml
            .database
            .path
            .clone()
            .unwrap_or_else(|| root_folder.join(DATABASE_FILE));
        let resources_dir = toml
            .server
            .resources_dir
            .clone()
            .unwrap_or_else(|| root_folder.join(RESOURCES_DIR));

        Ok(Self {
            root_folder,
            database_path,
            resources_dir,
            server: toml.server,
            database: toml.database,
            email: toml.email,
            security: toml.security,
            logging: toml.logging,
        })
    }

    /// `host:port` for the TCP listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Where the configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from this settings file
    File(PathBuf),
    /// No settings file found at this location (or none resolvable)
    Defaults(Option<PathBuf>),
}

/// Result of [`load`]
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub source: ConfigSource,
}

/// Load and resolve configuration
///
/// `cli_config` and `cli_root` are the command-line overrides, if given.
pub fn load(cli_config: Option<&Path>, cli_root: Option<&Path>) -> Result<LoadedConfig> {
    let config_path = resolve_config_path(cli_config);

    let (toml, source) = match config_path {
        Some(path) if path.exists() => (load_toml_config(&path)?, ConfigSource::File(path)),
        // An explicitly requested file must exist
        Some(path) if cli_config.is_some() => {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        other => (TomlConfig::default(), ConfigSource::Defaults(other)),
    };

    let root_folder = resolve_root_folder(cli_root, toml.root_folder.as_deref());
    let config = Config::from_toml(toml, root_folder)?;

    Ok(LoadedConfig { config, source })
}

/// Read and parse a settings file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    parse_toml_config(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Parse settings file contents
pub fn parse_toml_config(content: &str) -> std::result::Result<TomlConfig, toml::de::Error> {
    toml::from_str(content)
}

/// Resolve the settings file path (CLI > ENV > platform config dir)
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    dirs::config_dir().map(|d| d.join(APP_DIR).join(SETTINGS_FILE))
}

/// Resolve the root folder (CLI > ENV > TOML > compiled default)
pub fn resolve_root_folder(cli_arg: Option<&Path>, toml_root: Option<&Path>) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV_VAR) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = toml_root {
        return path.to_path_buf();
    }

    default_root_folder()
}

/// OS-dependent default root folder
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("./contextualise_data"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_resolve_under_root() {
        let config = Config::from_toml(TomlConfig::default(), PathBuf::from("/srv/ctx")).unwrap();

        assert_eq!(config.database_path, PathBuf::from("/srv/ctx/contextualise.db"));
        assert_eq!(config.resources_dir, PathBuf::from("/srv/ctx/resources"));
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.max_content_length, 2 * 1024 * 1024);
        assert_eq!(config.security.post_login_view, "/maps");
        assert!(config.security.registerable);
        assert!(config.email.is_none());
        assert_eq!(config.bind_address(), "127.0.0.1:5000");
    }

    #[test]
    fn test_parse_full_settings_file() {
        let toml = parse_toml_config(
            r#"
            root_folder = "/data/ctx"

            [server]
            host = "0.0.0.0"
            port = 8080
            max_content_length = 1024

            [database]
            path = "/var/db/topics.db"
            max_connections = 4

            [email]
            username = "mailer"
            password = "secret"
            server = "smtp.example.org"
            sender = "noreply@example.org"

            [security]
            registerable = false

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        let config = Config::from_toml(toml, PathBuf::from("/data/ctx")).unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.database_path, PathBuf::from("/var/db/topics.db"));
        assert_eq!(config.database.max_connections, 4);
        assert!(!config.security.registerable);
        assert_eq!(config.logging.level, "debug");

        let email = config.email.expect("email section");
        assert_eq!(email.port, 587);
        assert!(!email.use_ssl);
        assert_eq!(email.sender, "noreply@example.org");
    }

    #[test]
    fn test_email_section_requires_credentials() {
        let result = parse_toml_config(
            r#"
            [email]
            server = "smtp.example.org"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut toml = TomlConfig::default();
        toml.server.port = 0;
        assert!(matches!(
            Config::from_toml(toml, PathBuf::from("/tmp")),
            Err(Error::Config(_))
        ));

        let mut toml = TomlConfig::default();
        toml.security.post_login_view = "maps".to_string();
        assert!(matches!(
            Config::from_toml(toml, PathBuf::from("/tmp")),
            Err(Error::Config(_))
        ));

        let mut toml = TomlConfig::default();
        toml.security.session_lifetime_seconds = 0;
        assert!(Config::from_toml(toml, PathBuf::from("/tmp")).is_err());
    }
}
