//! Render-or-not decisions over a [`Session`].
//!
//! Gates are pure: the outcome depends only on the session and the gate's
//! own request, and evaluating one has no side effects. Anonymous sessions
//! never pass a [`PermissionGate`] or [`RoleGate`].

use std::collections::BTreeSet;

use crate::error::AuthError;
use crate::roles::Role;
use crate::session::Session;

pub trait Gate {
    fn allows(&self, session: &Session) -> bool;

    /// `content` when the gate passes, `fallback` otherwise.
    fn render<T>(&self, session: &Session, content: T, fallback: T) -> T
    where
        Self: Sized,
    {
        if self.allows(session) { content } else { fallback }
    }

    /// Lazy variant of [`Gate::render`]; only the chosen branch is built.
    fn render_with<T>(
        &self,
        session: &Session,
        content: impl FnOnce() -> T,
        fallback: impl FnOnce() -> T,
    ) -> T
    where
        Self: Sized,
    {
        if self.allows(session) {
            content()
        } else {
            fallback()
        }
    }

    /// Gate without a fallback: nothing is rendered on failure.
    fn render_opt<T>(&self, session: &Session, content: T) -> Option<T>
    where
        Self: Sized,
    {
        self.allows(session).then_some(content)
    }
}

/// How a multi-permission request is matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Match {
    /// At least one listed permission.
    #[default]
    Any,
    /// Every listed permission.
    All,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionGate {
    permissions: Vec<String>,
    mode: Match,
}

impl PermissionGate {
    pub fn new(permission: &str) -> Self {
        Self {
            permissions: vec![permission.to_string()],
            mode: Match::Any,
        }
    }

    pub fn any_of<I, S>(permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            permissions: permissions.into_iter().map(Into::into).collect(),
            mode: Match::Any,
        }
    }

    pub fn all_of<I, S>(permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            mode: Match::All,
            ..Self::any_of(permissions)
        }
    }

    pub fn require_all(mut self, require_all: bool) -> Self {
        self.mode = if require_all { Match::All } else { Match::Any };
        self
    }

    pub fn permissions(&self) -> &[String] {
        &self.permissions
    }

    pub fn mode(&self) -> Match {
        self.mode
    }

    /// Like [`Gate::allows`] but distinguishes "not logged in" from "lacks
    /// permission", for callers that report an error instead of rendering a
    /// fallback.
    pub fn check(&self, session: &Session) -> Result<(), AuthError> {
        if !session.is_authenticated() {
            return Err(AuthError::NotAuthenticated);
        }
        if self.allows(session) {
            return Ok(());
        }
        let joiner = match self.mode {
            Match::Any => " or ",
            Match::All => " and ",
        };
        Err(AuthError::PermissionDenied(format!(
            "missing permission: {}",
            self.permissions.join(joiner)
        )))
    }
}

impl Gate for PermissionGate {
    fn allows(&self, session: &Session) -> bool {
        if !session.is_authenticated() {
            return false;
        }
        match self.mode {
            Match::Any => self.permissions.iter().any(|p| session.check_permission(p)),
            Match::All => self.permissions.iter().all(|p| session.check_permission(p)),
        }
    }
}

/// Exact role membership, ignoring the permission table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGate {
    allowed: BTreeSet<Role>,
}

impl RoleGate {
    pub fn new(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            allowed: roles.into_iter().collect(),
        }
    }
}

impl Gate for RoleGate {
    fn allows(&self, session: &Session) -> bool {
        session.role().is_some_and(|r| self.allowed.contains(&r))
    }
}

pub const READ_ONLY_NOTICE: &str = "Auditors have read-only access; this action is disabled.";

/// Content as handed back by [`ReadOnlyGate::wrap`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guarded<T> {
    /// Usable as-is.
    Interactive(T),
    /// Rendered unchanged but with interaction suppressed.
    ReadOnly { content: T, notice: &'static str },
}

impl<T> Guarded<T> {
    pub fn is_interactive(&self) -> bool {
        matches!(self, Guarded::Interactive(_))
    }

    pub fn content(&self) -> &T {
        match self {
            Guarded::Interactive(c) | Guarded::ReadOnly { content: c, .. } => c,
        }
    }

    pub fn notice(&self) -> Option<&'static str> {
        match self {
            Guarded::Interactive(_) => None,
            Guarded::ReadOnly { notice, .. } => Some(notice),
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Guarded::Interactive(c) | Guarded::ReadOnly { content: c, .. } => c,
        }
    }
}

/// Disables interaction for read-only roles; everyone else passes through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOnlyGate;

impl ReadOnlyGate {
    pub fn wrap<T>(&self, session: &Session, content: T) -> Guarded<T> {
        if session.is_read_only() {
            Guarded::ReadOnly {
                content,
                notice: READ_ONLY_NOTICE,
            }
        } else {
            Guarded::Interactive(content)
        }
    }

    /// Error form used by mutating operations.
    pub fn check(&self, session: &Session) -> Result<(), AuthError> {
        if session.is_read_only() {
            return Err(AuthError::ReadOnly(format!(
                "{} cannot modify data",
                session.role().map(|r| r.as_str()).unwrap_or("role")
            )));
        }
        Ok(())
    }
}
