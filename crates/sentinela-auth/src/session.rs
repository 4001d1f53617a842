//! Session state, passed explicitly instead of living in a global.
//!
//! [`Session`] is an immutable snapshot of who is acting and what they may
//! do. [`SessionContext`] owns the lifecycle (`login`, `logout`) for
//! long-lived callers such as the CLI; the web server builds a fresh
//! `Session` per request instead.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::audit::{AuditEntry, AuditLog, actions};
use crate::error::AuthError;
use crate::permissions::has_permission;
use crate::roles::{Role, RoleTable};
use crate::types::User;

#[derive(Debug, Clone, PartialEq)]
struct Identity {
    user: User,
    permissions: BTreeSet<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    identity: Option<Identity>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Resolve the user's permissions from their role.
    pub fn authenticated(user: User, roles: &RoleTable) -> Self {
        let permissions = roles.permissions_for(user.role);
        Self {
            identity: Some(Identity { user, permissions }),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    pub fn user(&self) -> Option<&User> {
        self.identity.as_ref().map(|i| &i.user)
    }

    pub fn role(&self) -> Option<Role> {
        self.user().map(|u| u.role)
    }

    pub fn permissions(&self) -> Vec<String> {
        self.identity
            .as_ref()
            .map(|i| i.permissions.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Anonymous sessions hold no permissions.
    pub fn check_permission(&self, permission: &str) -> bool {
        self.identity
            .as_ref()
            .is_some_and(|i| has_permission(&i.permissions, permission))
    }

    pub fn is_read_only(&self) -> bool {
        self.role().is_some_and(Role::is_read_only)
    }

    /// Name recorded in the audit log.
    pub fn actor(&self) -> &str {
        self.user().map(|u| u.matricula.as_str()).unwrap_or("anonymous")
    }
}

pub struct SessionContext {
    roles: Arc<RoleTable>,
    audit: Arc<dyn AuditLog>,
    session: Session,
}

impl SessionContext {
    pub fn new(roles: Arc<RoleTable>, audit: Arc<dyn AuditLog>) -> Self {
        Self {
            roles,
            audit,
            session: Session::anonymous(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn audit(&self) -> &Arc<dyn AuditLog> {
        &self.audit
    }

    /// Replace the current session with `user` and record the login.
    pub async fn login(&mut self, user: User) -> Result<&Session, AuthError> {
        if !user.is_active {
            return Err(AuthError::AccountDisabled(user.matricula));
        }
        self.session = Session::authenticated(user, &self.roles);
        self.add_audit_log(actions::LOGIN, "session", "").await?;
        tracing::info!(user = %self.session.actor(), "session started");
        Ok(&self.session)
    }

    /// Record the logout (if anyone was logged in) and drop the session.
    pub async fn logout(&mut self) -> Result<(), AuthError> {
        if self.session.is_authenticated() {
            self.add_audit_log(actions::LOGOUT, "session", "").await?;
            tracing::info!(user = %self.session.actor(), "session ended");
        }
        self.session = Session::anonymous();
        Ok(())
    }

    pub fn check_permission(&self, permission: &str) -> bool {
        self.session.check_permission(permission)
    }

    pub async fn add_audit_log(
        &self,
        action: &str,
        resource: &str,
        details: &str,
    ) -> Result<AuditEntry, AuthError> {
        self.audit
            .append(self.session.actor(), action, resource, details)
            .await
    }
}
