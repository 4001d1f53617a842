use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use sentinela_auth::{AuditLog, AuthError, AuthState, RoleTable, UserStore};
use sentinela_client::Backends;
use sentinela_core::Settings;
use sentinela_core::settings::MIN_JWT_SECRET_LEN;

use crate::error::ApiResult;

pub struct AppState {
    settings: RwLock<Settings>,
    backends: RwLock<Backends>,
    /// Serializes read-modify-write cycles on `settings`, including the save.
    settings_update: tokio::sync::Mutex<()>,
    /// Where `PUT /api/settings` persists changes; `None` keeps them in memory.
    pub settings_path: Option<PathBuf>,
    pub users: Arc<dyn UserStore>,
    pub audit: Arc<dyn AuditLog>,
    pub roles: Arc<RoleTable>,
    pub jwt_secret: String,
}

impl AppState {
    pub fn new(
        settings: Settings,
        settings_path: Option<PathBuf>,
        users: Arc<dyn UserStore>,
        audit: Arc<dyn AuditLog>,
        roles: Arc<RoleTable>,
    ) -> anyhow::Result<Self> {
        anyhow::ensure!(
            settings.server.jwt_secret.len() >= MIN_JWT_SECRET_LEN,
            "server.jwt_secret must be at least {MIN_JWT_SECRET_LEN} characters"
        );
        let backends = Backends::from_settings(&settings.api)?;
        Ok(Self {
            jwt_secret: settings.server.jwt_secret.clone(),
            settings: RwLock::new(settings),
            backends: RwLock::new(backends),
            settings_update: tokio::sync::Mutex::new(()),
            settings_path,
            users,
            audit,
            roles,
        })
    }

    pub fn auth_state(&self) -> AuthState {
        AuthState {
            jwt_secret: self.jwt_secret.clone(),
            roles: self.roles.clone(),
            users: self.users.clone(),
        }
    }

    pub fn settings(&self) -> Result<Settings, AuthError> {
        self.settings
            .read()
            .map(|s| s.clone())
            .map_err(|_| AuthError::Internal("settings lock poisoned".into()))
    }

    /// Apply `change` to the current settings, then rebuild the backend
    /// clients, persist to `settings_path` and swap the result in. Concurrent
    /// updates run one after another, each seeing the previous one's result.
    pub async fn update_settings<F>(&self, change: F) -> ApiResult<Settings>
    where
        F: FnOnce(&mut Settings) -> ApiResult<()>,
    {
        let _guard = self.settings_update.lock().await;
        let mut settings = self.settings()?;
        change(&mut settings)?;
        let backends = Backends::from_settings(&settings.api)?;
        if let Some(path) = &self.settings_path {
            settings.save(path)?;
            tracing::info!(path = %path.display(), "settings saved");
        }
        self.replace_settings(settings.clone(), backends)?;
        Ok(settings)
    }

    fn replace_settings(&self, settings: Settings, backends: Backends) -> Result<(), AuthError> {
        let mut current = self
            .settings
            .write()
            .map_err(|_| AuthError::Internal("settings lock poisoned".into()))?;
        let mut clients = self
            .backends
            .write()
            .map_err(|_| AuthError::Internal("backend lock poisoned".into()))?;
        *current = settings;
        *clients = backends;
        Ok(())
    }

    /// Snapshot of the backend clients; cloning shares the connection pool.
    pub fn backends(&self) -> Result<Backends, AuthError> {
        self.backends
            .read()
            .map(|b| b.clone())
            .map_err(|_| AuthError::Internal("backend lock poisoned".into()))
    }
}
