//! Roles and the role → permission table.
//!
//! The table is built once at startup (built-in defaults, optionally
//! overridden from settings) and only queried afterwards.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::permissions::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Credit analyst: runs classifications and simulations.
    Analista,
    /// Portfolio manager: analyst rights plus analytics, pipeline and exports.
    Gestor,
    /// Auditor: reads everything relevant, changes nothing.
    Auditor,
    /// Administrator: every permission.
    Admin,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Analista, Role::Gestor, Role::Auditor, Role::Admin];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Analista => "ANALISTA",
            Role::Gestor => "GESTOR",
            Role::Auditor => "AUDITOR",
            Role::Admin => "ADMIN",
        }
    }

    /// Auditors never mutate anything, whatever the table grants them.
    pub fn is_read_only(self) -> bool {
        matches!(self, Role::Auditor)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ANALISTA" => Ok(Role::Analista),
            "GESTOR" => Ok(Role::Gestor),
            "AUDITOR" => Ok(Role::Auditor),
            "ADMIN" => Ok(Role::Admin),
            other => Err(AuthError::InvalidInput(format!("unknown role: {other}"))),
        }
    }
}

const ANALISTA_PERMISSIONS: &[&str] = &[
    VIEW_DASHBOARD,
    VIEW_PRINAD,
    VIEW_ECL,
    VIEW_PROPENSAO,
    RUN_CLASSIFICATION,
    SIMULATE_LIMITS,
    EXPORT_CSV,
];

const GESTOR_PERMISSIONS: &[&str] = &[
    VIEW_DASHBOARD,
    VIEW_PRINAD,
    VIEW_ECL,
    VIEW_PROPENSAO,
    VIEW_ANALYTICS,
    RUN_CLASSIFICATION,
    RUN_PIPELINE,
    SIMULATE_LIMITS,
    EXPORT_CSV,
    EXPORT_REPORT,
    EXPORT_BACEN,
    VIEW_SETTINGS,
];

const AUDITOR_PERMISSIONS: &[&str] = &[
    VIEW_DASHBOARD,
    VIEW_PRINAD,
    VIEW_ECL,
    VIEW_PROPENSAO,
    VIEW_ANALYTICS,
    EXPORT_CSV,
    EXPORT_REPORT,
    VIEW_AUDIT,
    VIEW_SETTINGS,
];

const ADMIN_PERMISSIONS: &[&str] = &[WILDCARD];

#[derive(Debug, Clone)]
pub struct RoleTable {
    grants: HashMap<Role, BTreeSet<String>>,
}

impl RoleTable {
    pub fn builtin() -> Self {
        let grants = Role::ALL
            .iter()
            .map(|role| {
                let perms: &[&str] = match role {
                    Role::Analista => ANALISTA_PERMISSIONS,
                    Role::Gestor => GESTOR_PERMISSIONS,
                    Role::Auditor => AUDITOR_PERMISSIONS,
                    Role::Admin => ADMIN_PERMISSIONS,
                };
                (*role, perms.iter().map(|p| p.to_string()).collect())
            })
            .collect();
        Self { grants }
    }

    /// Built-in table with the listed roles replaced wholesale.
    pub fn from_overrides(overrides: &BTreeMap<String, Vec<String>>) -> Result<Self, AuthError> {
        let mut table = Self::builtin();
        for (name, perms) in overrides {
            let role: Role = name.parse()?;
            for p in perms {
                if !is_known(p) {
                    tracing::warn!(role = %role, permission = %p, "permission not in the built-in vocabulary");
                }
            }
            table
                .grants
                .insert(role, perms.iter().map(|p| p.trim().to_string()).collect());
            tracing::info!(role = %role, count = perms.len(), "role permissions overridden");
        }
        Ok(table)
    }

    pub fn permissions_for(&self, role: Role) -> BTreeSet<String> {
        self.grants.get(&role).cloned().unwrap_or_default()
    }

    pub fn grants(&self, role: Role, permission: &str) -> bool {
        self.grants
            .get(&role)
            .is_some_and(|perms| has_permission(perms, permission))
    }
}

impl Default for RoleTable {
    fn default() -> Self {
        Self::builtin()
    }
}
