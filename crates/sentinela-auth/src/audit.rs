//! Append-only audit log.
//!
//! Entries are never mutated or deleted and are listed in insertion order.
//! No retention is applied; callers page through the log instead.

use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Upper bound for one page of [`AuditLog::list`].
pub const MAX_PAGE: u32 = 500;

/// Action names recorded by this application.
pub mod actions {
    pub const LOGIN: &str = "LOGIN";
    pub const LOGIN_FAILED: &str = "LOGIN_FAILED";
    pub const LOGOUT: &str = "LOGOUT";
    pub const VIEW_AUDIT: &str = "VIEW_AUDIT";
    pub const EXPORT_CSV: &str = "EXPORT_CSV";
    pub const EXPORT_REPORT: &str = "EXPORT_REPORT";
    pub const UPDATE_SETTINGS: &str = "UPDATE_SETTINGS";
    pub const CREATE_USER: &str = "CREATE_USER";
    pub const UPDATE_USER: &str = "UPDATE_USER";
    pub const RUN_PIPELINE: &str = "RUN_PIPELINE";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: i64,
    pub timestamp: String,
    #[serde(rename = "usuario")]
    pub user: String,
    #[serde(rename = "acao")]
    pub action: String,
    #[serde(rename = "recurso")]
    pub resource: String,
    #[serde(rename = "detalhes")]
    pub details: String,
}

#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Record one action and return the stored entry.
    async fn append(
        &self,
        user: &str,
        action: &str,
        resource: &str,
        details: &str,
    ) -> Result<AuditEntry, AuthError>;

    /// Entries in insertion order, starting at `offset`.
    async fn list(&self, limit: u32, offset: u32) -> Result<Vec<AuditEntry>, AuthError>;

    async fn count(&self) -> Result<u64, AuthError>;
}

pub(crate) fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Process-local log, cleared only by [`InMemoryAuditLog::reset`].
#[derive(Debug, Default)]
pub struct InMemoryAuditLog {
    entries: Mutex<Vec<AuditEntry>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session reset: drops every entry.
    pub fn reset(&self) -> Result<(), AuthError> {
        self.lock()?.clear();
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<AuditEntry>>, AuthError> {
        self.entries
            .lock()
            .map_err(|_| AuthError::Internal("audit log lock poisoned".into()))
    }
}

#[async_trait]
impl AuditLog for InMemoryAuditLog {
    async fn append(
        &self,
        user: &str,
        action: &str,
        resource: &str,
        details: &str,
    ) -> Result<AuditEntry, AuthError> {
        let mut entries = self.lock()?;
        let entry = AuditEntry {
            id: entries.len() as i64 + 1,
            timestamp: now_timestamp(),
            user: user.to_string(),
            action: action.to_string(),
            resource: resource.to_string(),
            details: details.to_string(),
        };
        entries.push(entry.clone());
        Ok(entry)
    }

    async fn list(&self, limit: u32, offset: u32) -> Result<Vec<AuditEntry>, AuthError> {
        let entries = self.lock()?;
        Ok(entries
            .iter()
            .skip(offset as usize)
            .take(limit.min(MAX_PAGE) as usize)
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<u64, AuthError> {
        Ok(self.lock()?.len() as u64)
    }
}

fn csv_field(value: &str) -> String {
    if value.contains(&[',', '"', '\n', '\r'][..]) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Render entries as CSV with a header row.
pub fn to_csv(entries: &[AuditEntry]) -> String {
    let mut out = String::from("id,timestamp,usuario,acao,recurso,detalhes\n");
    for e in entries {
        let row = [
            e.id.to_string(),
            csv_field(&e.timestamp),
            csv_field(&e.user),
            csv_field(&e.action),
            csv_field(&e.resource),
            csv_field(&e.details),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}
