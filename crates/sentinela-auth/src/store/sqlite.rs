use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::Connection;

use super::UserStore;
use crate::audit::{AuditEntry, AuditLog, MAX_PAGE, now_timestamp};
use crate::error::AuthError;
use crate::roles::Role;
use crate::types::*;

/// Users and the audit log in one SQLite database.
pub struct SqliteAuthStore {
    conn: Mutex<Connection>,
}

impl SqliteAuthStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    pub fn open(path: &str) -> Result<Self, AuthError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        Ok(Self::new(conn))
    }

    pub fn open_in_memory() -> Result<Self, AuthError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self::new(conn))
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, AuthError> {
        self.conn
            .lock()
            .map_err(|_| AuthError::Internal("database lock poisoned".into()))
    }
}

const MIGRATE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    matricula TEXT UNIQUE NOT NULL,
    role TEXT NOT NULL CHECK (role IN ('ANALISTA', 'GESTOR', 'AUDITOR', 'ADMIN')),
    password_hash TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS audit_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp TEXT NOT NULL,
    usuario TEXT NOT NULL,
    acao TEXT NOT NULL,
    recurso TEXT NOT NULL,
    detalhes TEXT NOT NULL DEFAULT ''
);

CREATE TRIGGER IF NOT EXISTS audit_log_no_update
BEFORE UPDATE ON audit_log
BEGIN
    SELECT RAISE(ABORT, 'audit log is append-only');
END;

CREATE TRIGGER IF NOT EXISTS audit_log_no_delete
BEFORE DELETE ON audit_log
BEGIN
    SELECT RAISE(ABORT, 'audit log is append-only');
END;
"#;

const USER_COLUMNS: &str = "id, name, email, matricula, role, is_active, created_at";

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let role: String = row.get(4)?;
    let role = role.parse::<Role>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        matricula: row.get(3)?,
        role,
        is_active: row.get::<_, i32>(5)? != 0,
        created_at: row.get(6)?,
    })
}

fn not_found(e: rusqlite::Error) -> AuthError {
    match e {
        rusqlite::Error::QueryReturnedNoRows => AuthError::UserNotFound,
        _ => AuthError::Database(e.to_string()),
    }
}

#[async_trait]
impl UserStore for SqliteAuthStore {
    async fn migrate(&self) -> Result<(), AuthError> {
        let conn = self.conn()?;
        conn.execute_batch(MIGRATE_SQL)?;
        Ok(())
    }

    async fn create_user(
        &self,
        req: &CreateUserRequest,
        password_hash: &str,
    ) -> Result<User, AuthError> {
        let id = {
            let conn = self.conn()?;
            let id = uuid::Uuid::now_v7().to_string();
            conn.execute(
                "INSERT INTO users (id, name, email, matricula, role, password_hash)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    id,
                    req.name.trim(),
                    req.email.trim(),
                    req.matricula.trim(),
                    req.role.as_str(),
                    password_hash
                ],
            )
            .map_err(|e| {
                if let rusqlite::Error::SqliteFailure(ref err, _) = e {
                    if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE {
                        return AuthError::DuplicateMatricula(req.matricula.trim().to_string());
                    }
                }
                AuthError::Database(e.to_string())
            })?;
            id
        };
        self.get_user_by_id(&id).await
    }

    async fn get_user_by_id(&self, id: &str) -> Result<User, AuthError> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            [id],
            row_to_user,
        )
        .map_err(not_found)
    }

    async fn get_user_by_matricula(&self, matricula: &str) -> Result<User, AuthError> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE matricula = ?1"),
            [matricula],
            row_to_user,
        )
        .map_err(not_found)
    }

    async fn list_users(&self) -> Result<Vec<User>, AuthError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY matricula"
        ))?;
        let users = stmt
            .query_map([], row_to_user)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    async fn update_user(&self, id: &str, req: &UpdateUserRequest) -> Result<User, AuthError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let current = tx
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                [id],
                row_to_user,
            )
            .map_err(not_found)?;
        let loses_admin = current.role == Role::Admin
            && current.is_active
            && (req.role.is_some_and(|r| r != Role::Admin) || req.is_active == Some(false));
        if loses_admin {
            let admins: u64 = tx.query_row(
                "SELECT COUNT(*) FROM users WHERE role = ?1 AND is_active = 1",
                [Role::Admin.as_str()],
                |row| row.get(0),
            )?;
            if admins <= 1 {
                return Err(AuthError::LastAdministrator);
            }
        }

        if let Some(role) = req.role {
            tx.execute(
                "UPDATE users SET role = ?1, updated_at = datetime('now') WHERE id = ?2",
                rusqlite::params![role.as_str(), id],
            )?;
        }
        if let Some(is_active) = req.is_active {
            tx.execute(
                "UPDATE users SET is_active = ?1, updated_at = datetime('now') WHERE id = ?2",
                rusqlite::params![is_active as i32, id],
            )?;
        }
        let updated = tx
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                [id],
                row_to_user,
            )
            .map_err(not_found)?;
        tx.commit()?;
        Ok(updated)
    }

    async fn get_password_hash(&self, user_id: &str) -> Result<String, AuthError> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT password_hash FROM users WHERE id = ?1",
            [user_id],
            |row| row.get(0),
        )
        .map_err(not_found)
    }

    async fn user_count(&self) -> Result<u64, AuthError> {
        let conn = self.conn()?;
        let count: u64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count)
    }

    async fn count_by_role(&self, role: Role) -> Result<u64, AuthError> {
        let conn = self.conn()?;
        let count: u64 = conn.query_row(
            "SELECT COUNT(*) FROM users WHERE role = ?1 AND is_active = 1",
            [role.as_str()],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

#[async_trait]
impl AuditLog for SqliteAuthStore {
    async fn append(
        &self,
        user: &str,
        action: &str,
        resource: &str,
        details: &str,
    ) -> Result<AuditEntry, AuthError> {
        let conn = self.conn()?;
        let timestamp = now_timestamp();
        conn.execute(
            "INSERT INTO audit_log (timestamp, usuario, acao, recurso, detalhes)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![timestamp, user, action, resource, details],
        )?;
        Ok(AuditEntry {
            id: conn.last_insert_rowid(),
            timestamp,
            user: user.to_string(),
            action: action.to_string(),
            resource: resource.to_string(),
            details: details.to_string(),
        })
    }

    async fn list(&self, limit: u32, offset: u32) -> Result<Vec<AuditEntry>, AuthError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, timestamp, usuario, acao, recurso, detalhes
             FROM audit_log ORDER BY id ASC LIMIT ?1 OFFSET ?2",
        )?;
        let entries = stmt
            .query_map(rusqlite::params![limit.min(MAX_PAGE), offset], |row| {
                Ok(AuditEntry {
                    id: row.get(0)?,
                    timestamp: row.get(1)?,
                    user: row.get(2)?,
                    action: row.get(3)?,
                    resource: row.get(4)?,
                    details: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    async fn count(&self) -> Result<u64, AuthError> {
        let conn = self.conn()?;
        let count: u64 = conn.query_row("SELECT COUNT(*) FROM audit_log", [], |row| row.get(0))?;
        Ok(count)
    }
}
