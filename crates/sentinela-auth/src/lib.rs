pub mod audit;
pub mod error;
pub mod gate;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod permissions;
pub mod roles;
pub mod session;
pub mod store;
pub mod types;

pub use audit::{AuditEntry, AuditLog, InMemoryAuditLog};
pub use error::AuthError;
pub use gate::{Gate, Guarded, Match, PermissionGate, ReadOnlyGate, RoleGate};
pub use jwt::{SessionClaims, create_jwt, verify_jwt};
pub use middleware::{AuthState, require_permission, require_writable};
pub use password::{hash_password, verify_password};
pub use permissions::{PERMISSIONS, has_permission};
pub use roles::{Role, RoleTable};
pub use session::{Session, SessionContext};
pub use store::{SqliteAuthStore, UserStore, authenticate};
pub use types::*;
