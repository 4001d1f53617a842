use crate::error::AuthError;
use crate::password::hash_password;
use crate::roles::Role;
use crate::store::UserStore;
use crate::types::{CreateUserRequest, User};

/// Create the first administrator when no account exists yet.
/// Returns `None` when the store already has users.
pub async fn seed_admin(
    store: &dyn UserStore,
    matricula: &str,
    name: &str,
    email: &str,
    password: &str,
) -> Result<Option<User>, AuthError> {
    if store.user_count().await? > 0 {
        return Ok(None);
    }
    let req = CreateUserRequest {
        name: name.to_string(),
        email: email.to_string(),
        matricula: matricula.to_string(),
        role: Role::Admin,
        password: password.to_string(),
    };
    req.validate()?;
    let hash = hash_password(password)?;
    let user = store.create_user(&req, &hash).await?;
    tracing::info!(matricula = %user.matricula, "seeded initial administrator");
    Ok(Some(user))
}
