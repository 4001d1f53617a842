pub mod seed;
pub mod sqlite;

pub use sqlite::SqliteAuthStore;

use async_trait::async_trait;

use crate::error::AuthError;
use crate::password::verify_password;
use crate::roles::Role;
use crate::types::*;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(
        &self,
        req: &CreateUserRequest,
        password_hash: &str,
    ) -> Result<User, AuthError>;
    async fn get_user_by_id(&self, id: &str) -> Result<User, AuthError>;
    async fn get_user_by_matricula(&self, matricula: &str) -> Result<User, AuthError>;
    async fn list_users(&self) -> Result<Vec<User>, AuthError>;
    async fn update_user(&self, id: &str, req: &UpdateUserRequest) -> Result<User, AuthError>;
    async fn get_password_hash(&self, user_id: &str) -> Result<String, AuthError>;
    async fn user_count(&self) -> Result<u64, AuthError>;
    async fn count_by_role(&self, role: Role) -> Result<u64, AuthError>;

    // Lifecycle
    async fn migrate(&self) -> Result<(), AuthError>;
}

/// Check a matricula/password pair. Unknown users, inactive users and wrong
/// passwords are indistinguishable to the caller.
pub async fn authenticate(
    store: &dyn UserStore,
    matricula: &str,
    password: &str,
) -> Result<User, AuthError> {
    let user = match store.get_user_by_matricula(matricula.trim()).await {
        Ok(u) => u,
        Err(AuthError::UserNotFound) => return Err(AuthError::InvalidCredentials),
        Err(e) => return Err(e),
    };
    if !user.is_active {
        tracing::warn!(matricula = %user.matricula, "login attempt on inactive account");
        return Err(AuthError::InvalidCredentials);
    }
    let hash = store.get_password_hash(&user.id).await?;
    if !verify_password(password, &hash)? {
        return Err(AuthError::InvalidCredentials);
    }
    Ok(user)
}
