use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    // IO
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Settings
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Settings file not found at {0}; run `sentinela init` first")]
    ConfigNotFound(String),

    #[error("Unknown setting: {0}")]
    UnknownSetting(String),

    #[error("Invalid value for {key}: {reason}")]
    InvalidSetting { key: String, reason: String },

    // Crypto
    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("Decryption error: {0}")]
    Decryption(String),

    // Input validation
    #[error("Invalid input: {0}")]
    Validation(String),

    // TOML
    #[error("TOML deserialization error: {0}")]
    TomlDe(String),

    #[error("TOML serialization error: {0}")]
    TomlSer(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
