use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),
}
