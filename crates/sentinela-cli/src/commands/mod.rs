pub mod audit;
pub mod classify;
pub mod config;
pub mod ecl;
pub mod health;
pub mod init;
pub mod pipeline;
pub mod propensity;
pub mod roles;
pub mod serve;
pub mod users;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Result, bail};

use sentinela_auth::audit::actions;
use sentinela_auth::{
    AuditLog, AuthError, RoleTable, Session, SessionContext, SqliteAuthStore, UserStore,
    authenticate, require_permission, require_writable,
};
use sentinela_client::Backends;
use sentinela_core::Settings;

/// Login details from flags or the environment; missing values are prompted.
pub struct Credentials {
    pub matricula: Option<String>,
    pub password: Option<String>,
}

pub fn load_settings(base_dir: &Path) -> Result<(Settings, PathBuf)> {
    let path = Settings::default_path(base_dir);
    let settings = Settings::load(&path)?;
    Ok((settings, path))
}

pub async fn open_store(settings: &Settings) -> Result<Arc<SqliteAuthStore>> {
    let store = Arc::new(SqliteAuthStore::open(&settings.server.db_path)?);
    store.migrate().await?;
    Ok(store)
}

/// A logged-in CLI invocation. Every gated command opens one and calls
/// [`Context::finish`] when done so the logout is recorded.
pub struct Context {
    pub base_dir: PathBuf,
    pub settings: Settings,
    pub store: Arc<SqliteAuthStore>,
    session: SessionContext,
}

impl Context {
    pub async fn login(base_dir: &Path, creds: &Credentials) -> Result<Self> {
        let (settings, _) = load_settings(base_dir)?;
        let store = open_store(&settings).await?;
        let roles = Arc::new(RoleTable::from_overrides(&settings.roles)?);

        let matricula = crate::prompt("Matricula", &creds.matricula)?;
        let password = crate::prompt_secret("Password", &creds.password)?;
        let user = match authenticate(store.as_ref(), &matricula, &password).await {
            Ok(user) => user,
            Err(AuthError::InvalidCredentials) => {
                store
                    .append(matricula.trim(), actions::LOGIN_FAILED, "cli", "")
                    .await?;
                bail!("invalid matricula or password");
            }
            Err(e) => return Err(e.into()),
        };

        let mut session = SessionContext::new(roles, store.clone());
        session.login(user).await?;
        Ok(Self {
            base_dir: base_dir.to_path_buf(),
            settings,
            store,
            session,
        })
    }

    pub fn session(&self) -> &Session {
        self.session.session()
    }

    pub fn require(&self, permission: &str) -> Result<()> {
        require_permission(self.session(), permission)?;
        Ok(())
    }

    pub fn require_writable(&self, permission: &str) -> Result<()> {
        require_writable(self.session(), permission)?;
        Ok(())
    }

    pub async fn record(&self, action: &str, resource: &str, details: &str) -> Result<()> {
        self.session.add_audit_log(action, resource, details).await?;
        Ok(())
    }

    pub fn backends(&self) -> Result<Backends> {
        Ok(Backends::from_settings(&self.settings.api)?)
    }

    /// Record the logout and pass `outcome` through. A failed command keeps
    /// its own error; a logout failure only surfaces when the command worked.
    pub async fn finish<T>(mut self, outcome: Result<T>) -> Result<T> {
        let logout = self.session.logout().await;
        match (outcome, logout) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => Err(e.into()),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(logout_err)) => {
                tracing::warn!(error = %logout_err, "logout could not be recorded");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use sentinela_auth::{CreateUserRequest, Role};
    use tempfile::TempDir;

    /// Logged-in context whose audit table is dropped once `login` has been
    /// recorded, so the logout append fails.
    async fn context_with_broken_audit(tmp: &TempDir) -> Context {
        let db = tmp.path().join("sentinela.db");
        let mut settings = Settings::default_settings(tmp.path());
        settings.server.db_path = db.display().to_string();
        let store = open_store(&settings).await.unwrap();
        let user = store
            .create_user(
                &CreateUserRequest {
                    name: "Eva Prado".into(),
                    email: "eva@banco.example".into(),
                    matricula: "F0500".into(),
                    role: Role::Gestor,
                    password: "unused-password".into(),
                },
                "not-a-hash",
            )
            .await
            .unwrap();
        let mut session = SessionContext::new(Arc::new(RoleTable::builtin()), store.clone());
        session.login(user).await.unwrap();

        rusqlite::Connection::open(&db)
            .unwrap()
            .execute_batch("DROP TABLE audit_log;")
            .unwrap();

        Context {
            base_dir: tmp.path().to_path_buf(),
            settings,
            store,
            session,
        }
    }

    #[tokio::test]
    async fn command_error_survives_a_failed_logout() {
        let tmp = TempDir::new().unwrap();
        let ctx = context_with_broken_audit(&tmp).await;
        let err = ctx
            .finish::<()>(Err(anyhow!("prinad unreachable")))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "prinad unreachable");
    }

    #[tokio::test]
    async fn failed_logout_surfaces_after_success() {
        let tmp = TempDir::new().unwrap();
        let ctx = context_with_broken_audit(&tmp).await;
        assert!(ctx.finish(Ok(7)).await.is_err());
    }
}
