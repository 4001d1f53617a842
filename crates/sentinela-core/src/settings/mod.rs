pub mod credentials;

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Every key accepted by [`Settings::get`] and [`Settings::set`].
pub const SETTING_KEYS: &[&str] = &[
    "api.prinad_url",
    "api.ecl_url",
    "api.propensao_url",
    "api.analytics_url",
    "api.timeout_secs",
    "llm.provider",
    "llm.model",
    "llm.api_key",
    "server.listen_addr",
    "server.jwt_secret",
    "server.db_path",
];

/// Top-level Sentinela settings stored as TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub server: ServerSettings,
    /// Role → permission overrides. Empty means the built-in table applies.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub roles: BTreeMap<String, Vec<String>>,
}

/// Base URLs of the external risk backends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// PRINAD classification service.
    #[serde(default = "default_prinad_url")]
    pub prinad_url: String,
    /// ECL calculation service.
    #[serde(default = "default_ecl_url")]
    pub ecl_url: String,
    /// Limit propensity service.
    #[serde(default = "default_propensao_url")]
    pub propensao_url: String,
    /// Model analytics (served by PRINAD by default).
    #[serde(default = "default_analytics_url")]
    pub analytics_url: String,
    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            prinad_url: default_prinad_url(),
            ecl_url: default_ecl_url(),
            propensao_url: default_propensao_url(),
            analytics_url: default_analytics_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    #[serde(default = "default_llm_provider")]
    pub provider: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// Plaintext or `enc:` encrypted API key.
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            model: default_llm_model(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// HMAC key for session tokens. Missing from the file means one is
    /// generated and written back on load.
    #[serde(default)]
    pub jwt_secret: String,
    /// SQLite database holding users and the audit log.
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

/// The default has no JWT secret; [`Settings::load`] and
/// [`Settings::default_settings`] fill one in.
impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            jwt_secret: String::new(),
            db_path: default_db_path(),
        }
    }
}

fn default_prinad_url() -> String {
    "http://localhost:8000".to_string()
}
fn default_ecl_url() -> String {
    "http://localhost:8001".to_string()
}
fn default_propensao_url() -> String {
    "http://localhost:8002".to_string()
}
fn default_analytics_url() -> String {
    "http://localhost:8000".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_llm_provider() -> String {
    "openai".to_string()
}
fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_listen_addr() -> String {
    "127.0.0.1:9470".to_string()
}

/// Shortest JWT secret accepted from settings.
pub const MIN_JWT_SECRET_LEN: usize = 16;

fn generate_jwt_secret() -> String {
    let mut secret = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut secret);
    hex::encode(secret)
}
fn default_db_path() -> String {
    "sentinela.db".to_string()
}

impl Settings {
    /// Load settings from a TOML file.
    ///
    /// A file without `server.jwt_secret` gets a random one, saved back so
    /// issued tokens survive a restart. A secret shorter than
    /// [`MIN_JWT_SECRET_LEN`] is rejected.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        let mut settings: Self =
            toml::from_str(&content).map_err(|e| CoreError::TomlDe(e.to_string()))?;
        if settings.server.jwt_secret.is_empty() {
            tracing::warn!(
                "no server.jwt_secret in {}, generating one",
                path.display()
            );
            settings.server.jwt_secret = generate_jwt_secret();
            settings.save(path)?;
        } else if settings.server.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(invalid(
                "server.jwt_secret",
                "must be at least 16 characters",
            ));
        }
        Ok(settings)
    }

    /// Load settings, falling back to defaults when the file is missing.
    pub fn load_or_default(path: &Path, base_dir: &Path) -> Result<Self> {
        match Self::load(path) {
            Err(CoreError::ConfigNotFound(_)) => {
                tracing::debug!("no settings at {}, using defaults", path.display());
                Ok(Self::default_settings(base_dir))
            }
            other => other,
        }
    }

    /// Save settings to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| CoreError::TomlSer(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Default settings for `sentinela init`, with a freshly generated JWT secret.
    pub fn default_settings(base_dir: &Path) -> Self {
        Self {
            api: ApiSettings::default(),
            llm: LlmSettings::default(),
            server: ServerSettings {
                listen_addr: default_listen_addr(),
                jwt_secret: generate_jwt_secret(),
                db_path: base_dir.join("sentinela.db").display().to_string(),
            },
            roles: BTreeMap::new(),
        }
    }

    /// Restore every key to its default, keeping the database location and
    /// JWT secret so existing sessions and records stay valid.
    pub fn reset(&mut self) {
        self.api = ApiSettings::default();
        self.llm = LlmSettings::default();
        self.server.listen_addr = default_listen_addr();
        self.roles.clear();
    }

    /// Resolve the settings file path: `<base_dir>/settings.toml`
    pub fn default_path(base_dir: &Path) -> PathBuf {
        base_dir.join("settings.toml")
    }

    /// Resolve the default home directory: `~/.sentinela`
    pub fn default_base_dir() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|h| h.join(".sentinela"))
            .ok_or_else(|| CoreError::Config("Cannot determine home directory".to_string()))
    }

    pub fn keys() -> &'static [&'static str] {
        SETTING_KEYS
    }

    /// Read one setting by dotted key. Unset optional values are `None`.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let value = match key {
            "api.prinad_url" => Some(self.api.prinad_url.clone()),
            "api.ecl_url" => Some(self.api.ecl_url.clone()),
            "api.propensao_url" => Some(self.api.propensao_url.clone()),
            "api.analytics_url" => Some(self.api.analytics_url.clone()),
            "api.timeout_secs" => Some(self.api.timeout_secs.to_string()),
            "llm.provider" => Some(self.llm.provider.clone()),
            "llm.model" => Some(self.llm.model.clone()),
            "llm.api_key" => self.llm.api_key.clone(),
            "server.listen_addr" => Some(self.server.listen_addr.clone()),
            "server.jwt_secret" => Some(self.server.jwt_secret.clone()),
            "server.db_path" => Some(self.server.db_path.clone()),
            _ => return Err(CoreError::UnknownSetting(key.to_string())),
        };
        Ok(value)
    }

    /// Write one setting by dotted key. Values are validated before they are
    /// stored; an empty value clears `llm.api_key`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "api.prinad_url" => self.api.prinad_url = parse_base_url(key, value)?,
            "api.ecl_url" => self.api.ecl_url = parse_base_url(key, value)?,
            "api.propensao_url" => self.api.propensao_url = parse_base_url(key, value)?,
            "api.analytics_url" => self.api.analytics_url = parse_base_url(key, value)?,
            "api.timeout_secs" => {
                let secs: u64 = value.parse().map_err(|_| invalid(key, "not a number"))?;
                if secs == 0 {
                    return Err(invalid(key, "must be greater than zero"));
                }
                self.api.timeout_secs = secs;
            }
            "llm.provider" => self.llm.provider = non_empty(key, value)?,
            "llm.model" => self.llm.model = non_empty(key, value)?,
            "llm.api_key" => {
                self.llm.api_key = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            "server.listen_addr" => {
                value
                    .parse::<SocketAddr>()
                    .map_err(|e| invalid(key, &e.to_string()))?;
                self.server.listen_addr = value.to_string();
            }
            "server.jwt_secret" => {
                if value.len() < MIN_JWT_SECRET_LEN {
                    return Err(invalid(key, "must be at least 16 characters"));
                }
                self.server.jwt_secret = value.to_string();
            }
            "server.db_path" => self.server.db_path = non_empty(key, value)?,
            _ => return Err(CoreError::UnknownSetting(key.to_string())),
        }
        tracing::debug!(key, "setting updated");
        Ok(())
    }

    /// Store the LLM API key encrypted under `passphrase`.
    pub fn set_llm_api_key_encrypted(&mut self, api_key: &str, passphrase: &str) -> Result<()> {
        let key = credentials::derive_key(passphrase)?;
        self.llm.api_key = Some(credentials::encrypt_credential(api_key, &key)?);
        Ok(())
    }

    /// Resolve the LLM API key, decrypting it when it is stored encrypted.
    pub fn llm_api_key(&self, passphrase: Option<&str>) -> Result<Option<String>> {
        let Some(stored) = self.llm.api_key.as_deref() else {
            return Ok(None);
        };
        if !credentials::is_encrypted(stored) {
            return Ok(Some(stored.to_string()));
        }
        let passphrase = passphrase.ok_or_else(|| {
            CoreError::Decryption("llm.api_key is encrypted; a passphrase is required".into())
        })?;
        let key = credentials::derive_key(passphrase)?;
        credentials::decrypt_credential(stored, &key).map(Some)
    }

    /// Copy of the settings safe to display: secrets are masked.
    pub fn redacted(&self) -> Self {
        let mut out = self.clone();
        out.llm.api_key = out.llm.api_key.as_deref().map(credentials::mask_secret);
        out.server.jwt_secret = credentials::mask_secret(&out.server.jwt_secret);
        out
    }
}

fn invalid(key: &str, reason: &str) -> CoreError {
    CoreError::InvalidSetting {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn non_empty(key: &str, value: &str) -> Result<String> {
    if value.is_empty() {
        return Err(invalid(key, "must not be empty"));
    }
    Ok(value.to_string())
}

fn parse_base_url(key: &str, value: &str) -> Result<String> {
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        return Err(invalid(key, "must start with http:// or https://"));
    }
    let trimmed = value.trim_end_matches('/');
    if trimmed.ends_with("://") {
        return Err(invalid(key, "missing host"));
    }
    Ok(trimmed.to_string())
}
