//! Ingester configuration.
//!
//! Built in layers: defaults, an optional YAML file, environment variables,
//! an optional database secrets file, then command-line flags (applied in
//! `main`).

use anyhow::{Context, Result};
use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_DATABASE: &str = "gliders";
const DEFAULT_PORT: u16 = 5432;

/// Top-level ingester configuration.
#[derive(Debug, Clone)]
pub struct IngesterConfig {
    /// Database connection options
    pub database: PgConnectOptions,

    /// Root searched for near-real-time mission gridfiles
    pub nrt_root: PathBuf,

    /// Root searched for completed mission gridfiles
    pub complete_root: PathBuf,

    /// Append log lines to this file instead of stdout
    pub log_file: Option<PathBuf>,

    /// trace, debug, info, warn or error
    pub log_level: String,
}

impl Default for IngesterConfig {
    fn default() -> Self {
        Self {
            database: PgConnectOptions::new_without_pgpass()
                .host("localhost")
                .port(DEFAULT_PORT)
                .username("postgres")
                .password("postgres")
                .database(DEFAULT_DATABASE),
            nrt_root: PathBuf::from("/data/nrt_data"),
            complete_root: PathBuf::from("/data/complete_mission"),
            log_file: None,
            log_level: "info".to_string(),
        }
    }
}

/// Fields accepted in the YAML config file. All optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub database_url: Option<String>,
    pub nrt_root: Option<PathBuf>,
    pub complete_root: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl IngesterConfig {
    /// Load configuration from an optional YAML file, the environment and an
    /// optional secrets file.
    pub fn load(config_path: Option<&Path>, secrets_path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path {
            config.apply_file(load_file_config(path)?)?;
        }

        config.apply_vars(|name| env::var(name).ok())?;

        if let Some(path) = secrets_path {
            config.database = load_secrets(path)?.connect_options()?;
        }

        Ok(config)
    }

    fn apply_file(&mut self, file: FileConfig) -> Result<()> {
        if let Some(url) = file.database_url {
            self.database = parse_database_url(&url).context("Invalid database_url in config file")?;
        }
        if let Some(root) = file.nrt_root {
            self.nrt_root = root;
        }
        if let Some(root) = file.complete_root {
            self.complete_root = root;
        }
        if file.log_file.is_some() {
            self.log_file = file.log_file;
        }
        if let Some(level) = file.log_level {
            self.log_level = level;
        }
        Ok(())
    }

    fn apply_vars<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database = parse_database_url(&url).context("Invalid DATABASE_URL")?;
        }
        if let Some(root) = lookup("GLIDER_NRT_ROOT") {
            self.nrt_root = PathBuf::from(root);
        }
        if let Some(root) = lookup("GLIDER_COMPLETE_ROOT") {
            self.complete_root = PathBuf::from(root);
        }
        if let Some(file) = lookup("GLIDER_LOG_FILE") {
            self.log_file = Some(PathBuf::from(file));
        }
        Ok(())
    }
}

// ============================================================================
// YAML config file
// ============================================================================

/// Load and parse a YAML config file with environment variable substitution.
pub fn load_file_config<P: AsRef<Path>>(path: P) -> Result<FileConfig> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read config from {:?}", path.as_ref()))?;

    parse_file_config(&content)
        .with_context(|| format!("Failed to parse config from {:?}", path.as_ref()))
}

fn parse_file_config(content: &str) -> Result<FileConfig> {
    let expanded = expand_env_vars(content)?;
    if expanded.trim().is_empty() {
        return Ok(FileConfig::default());
    }
    Ok(serde_yaml::from_str(&expanded)?)
}

/// Expand environment variables in YAML content.
/// Supports ${VAR} and ${VAR:-default} syntax
fn expand_env_vars(content: &str) -> Result<String> {
    let mut result = String::new();
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'

            let mut var_expr = String::new();
            let mut brace_count = 1;

            while brace_count > 0 {
                match chars.next() {
                    Some('{') => {
                        brace_count += 1;
                        var_expr.push('{');
                    }
                    Some('}') => {
                        brace_count -= 1;
                        if brace_count > 0 {
                            var_expr.push('}');
                        }
                    }
                    Some(c) => var_expr.push(c),
                    None => anyhow::bail!("Unclosed variable substitution: ${{{}", var_expr),
                }
            }

            result.push_str(&resolve_var_expr(&var_expr)?);
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}

/// Resolve a variable expression (`VAR` or `VAR:-default`).
fn resolve_var_expr(expr: &str) -> Result<String> {
    if let Some((var_name, default)) = expr.split_once(":-") {
        match env::var(var_name.trim()) {
            Ok(val) if !val.is_empty() => Ok(val),
            _ => Ok(default.to_string()),
        }
    } else {
        env::var(expr.trim()).with_context(|| format!("Environment variable {} not set", expr))
    }
}

// ============================================================================
// Database secrets
// ============================================================================

/// Database credentials kept outside the main config file.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSecrets {
    #[serde(alias = "mongo_user")]
    pub user: String,
    #[serde(alias = "mongo_password")]
    pub password: String,
    #[serde(alias = "mongo_port")]
    pub port: PortValue,
    #[serde(alias = "mongo_server")]
    pub server: String,
    #[serde(default)]
    pub database: Option<String>,
}

/// A port written either as a number or as numeric text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PortValue {
    Number(u16),
    Text(String),
}

impl PortValue {
    pub fn as_u16(&self) -> Result<u16> {
        match self {
            PortValue::Number(port) => Ok(*port),
            PortValue::Text(text) => text
                .trim()
                .parse()
                .with_context(|| format!("Invalid database port '{}'", text)),
        }
    }
}

impl DatabaseSecrets {
    /// Connection options for these credentials. Reserved URL characters in
    /// the user or password need no escaping.
    pub fn connect_options(&self) -> Result<PgConnectOptions> {
        Ok(PgConnectOptions::new_without_pgpass()
            .host(&self.server)
            .port(self.port.as_u16()?)
            .username(&self.user)
            .password(&self.password)
            .database(self.database.as_deref().unwrap_or(DEFAULT_DATABASE)))
    }
}

fn parse_database_url(url: &str) -> Result<PgConnectOptions> {
    // The parse error may contain the password
    url.parse::<PgConnectOptions>()
        .map_err(|_| anyhow::anyhow!("not a valid postgres connection URL"))
}

pub fn load_secrets<P: AsRef<Path>>(path: P) -> Result<DatabaseSecrets> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read secrets from {:?}", path.as_ref()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse secrets from {:?}", path.as_ref()))
}
