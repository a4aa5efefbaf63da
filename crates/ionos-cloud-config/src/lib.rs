pub mod error;

pub use error::*;

use ionos_cloud::{Credentials, Timeouts};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Products whose base URL can be overridden
pub const PRODUCTS: &[&str] = &["monitoring", "object_storage_management"];

const CONFIG_FILE_ENV: &str = "IONOS_CONFIG_FILE";
const TOKEN_ENV: &str = "IONOS_TOKEN";
const USERNAME_ENV: &str = "IONOS_USERNAME";
const PASSWORD_ENV: &str = "IONOS_PASSWORD";
const TIMEOUT_ENV: &str = "IONOS_TIMEOUT";

/// Environment variable overriding a product's endpoint table,
/// e.g. `monitoring` -> `IONOS_API_URL_MONITORING`
pub fn endpoint_env_var(product: &str) -> String {
    format!("IONOS_API_URL_{}", product.to_ascii_uppercase())
}

/// Contents of the optional YAML config file
///
/// ```yaml
/// token: eyJ0eXAiOi...
/// endpoints:
///   monitoring: https://monitoring.de-txl.ionos.com
/// timeout: 20m
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub endpoints: BTreeMap<String, String>,
    pub timeout: Option<String>,
}

/// Settings shared by every product client
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub credentials: Credentials,

    /// Product key -> base URL that replaces the location table
    pub endpoint_overrides: BTreeMap<String, String>,

    pub timeouts: Timeouts,
}

impl ProviderConfig {
    /// Load from the config file (if any) and the environment; environment wins
    pub fn load() -> Result<Self> {
        let file = match find_config_file()? {
            Some(path) => {
                tracing::debug!("Loading config file: {}", path.display());
                let content = std::fs::read_to_string(&path)?;
                Some(serde_yaml::from_str::<FileConfig>(&content)?)
            }
            None => None,
        };
        Self::from_sources(file.unwrap_or_default(), |key| std::env::var(key).ok())
    }

    /// Merge a parsed file with a variable lookup
    pub fn from_sources(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let credentials = match (env(TOKEN_ENV), env(USERNAME_ENV), env(PASSWORD_ENV)) {
            (Some(token), _, _) => Credentials::Token(token),
            (None, Some(username), Some(password)) => Credentials::Basic { username, password },
            _ => match (file.token, file.username, file.password) {
                (Some(token), _, _) => Credentials::Token(token),
                (None, Some(username), Some(password)) => {
                    Credentials::Basic { username, password }
                }
                _ => return Err(ConfigError::MissingCredentials),
            },
        };

        let mut endpoint_overrides = file.endpoints;
        for product in PRODUCTS {
            if let Some(url) = env(&endpoint_env_var(product)) {
                endpoint_overrides.insert(product.to_string(), url);
            }
        }

        let timeouts = match env(TIMEOUT_ENV).or(file.timeout) {
            Some(value) => Timeouts::uniform(parse_duration(&value)?),
            None => Timeouts::default(),
        };

        Ok(Self {
            credentials,
            endpoint_overrides,
            timeouts,
        })
    }

    pub fn endpoint_override(&self, product: &str) -> Option<&str> {
        self.endpoint_overrides.get(product).map(String::as_str)
    }
}

/// Locate the config file.
///
/// 1. `IONOS_CONFIG_FILE` (must exist when set)
/// 2. `<config dir>/ionoscloud/config.yaml`
pub fn find_config_file() -> Result<Option<PathBuf>> {
    if let Ok(path) = std::env::var(CONFIG_FILE_ENV) {
        if !path.trim().is_empty() {
            let path = PathBuf::from(path);
            if path.exists() {
                return Ok(Some(path));
            }
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
    }

    Ok(dirs::config_dir()
        .map(|dir| dir.join("ionoscloud").join("config.yaml"))
        .filter(|path| path.exists()))
}

/// Upper bound for operation timeouts
pub const MAX_TIMEOUT: Duration = Duration::from_secs(30 * 24 * 3600);

/// Parse `90s`, `10m`, `1h`, `500ms` or a bare number of seconds
pub fn parse_duration(value: &str) -> Result<Duration> {
    let trimmed = value.trim();
    let invalid = |reason: &str| ConfigError::InvalidTimeout {
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split);
    let number: u64 = number.parse().map_err(|_| invalid("expected a number"))?;

    let scaled = |factor: u64| {
        number
            .checked_mul(factor)
            .map(Duration::from_secs)
            .ok_or_else(|| invalid("value is too large"))
    };
    let duration = match unit.trim() {
        "" | "s" => Duration::from_secs(number),
        "ms" => Duration::from_millis(number),
        "m" => scaled(60)?,
        "h" => scaled(3600)?,
        _ => return Err(invalid("unit must be one of ms, s, m, h")),
    };
    if duration.is_zero() {
        return Err(invalid("must be greater than zero"));
    }
    if duration > MAX_TIMEOUT {
        return Err(invalid("must not exceed 30 days"));
    }
    Ok(duration)
}
