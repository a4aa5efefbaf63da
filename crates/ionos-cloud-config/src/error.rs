use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "No IONOS credentials found. Set IONOS_TOKEN, or IONOS_USERNAME and IONOS_PASSWORD, \
         or put them in the config file (IONOS_CONFIG_FILE or ~/.config/ionoscloud/config.yaml)"
    )]
    MissingCredentials,

    #[error("Config file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid timeout {value:?}: {reason}")]
    InvalidTimeout { value: String, reason: String },

    #[error("Config file parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
