use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::roles::Role;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Employee registration number; unique, used as the login name.
    pub matricula: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub matricula: String,
    pub role: Role,
    pub password: String,
}

impl CreateUserRequest {
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.name.trim().is_empty() {
            return Err(AuthError::InvalidInput("name required".into()));
        }
        if !self.email.contains('@') {
            return Err(AuthError::InvalidInput(format!(
                "invalid email: {}",
                self.email
            )));
        }
        if self.matricula.trim().is_empty()
            || !self.matricula.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(AuthError::InvalidInput(
                "matricula must be non-empty and alphanumeric".into(),
            ));
        }
        crate::password::check_policy(&self.password)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUserRequest {
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub matricula: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req() -> CreateUserRequest {
        CreateUserRequest {
            name: "Ana Lima".into(),
            email: "ana.lima@banco.example".into(),
            matricula: "F0001".into(),
            role: Role::Analista,
            password: "s3nha-forte".into(),
        }
    }

    #[test]
    fn valid_request() {
        assert!(req().validate().is_ok());
    }

    #[test]
    fn invalid_fields() {
        let mut r = req();
        r.email = "ana".into();
        assert!(r.validate().is_err());

        let mut r = req();
        r.matricula = "F 01".into();
        assert!(r.validate().is_err());

        let mut r = req();
        r.password = "123".into();
        assert!(r.validate().is_err());
    }
}
