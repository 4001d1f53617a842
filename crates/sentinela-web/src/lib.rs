//! HTTP API for the risk dashboard.
//!
//! Every route resolves a [`sentinela_auth::Session`] from the bearer token,
//! checks its permission gate and, for mutating routes, the read-only gate.

pub mod error;
pub mod navigation;
pub mod routes;
pub mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use sentinela_auth::{RoleTable, SqliteAuthStore, UserStore};
use sentinela_core::Settings;

pub use error::{ApiError, ApiResult};
pub use routes::build_router;
pub use state::AppState;

/// Open the database named in `settings`, then serve the API until the
/// listener fails.
pub async fn start_web_server(settings: Settings, settings_path: PathBuf) -> anyhow::Result<()> {
    let store = Arc::new(SqliteAuthStore::open(&settings.server.db_path)?);
    store.migrate().await?;

    let roles = Arc::new(RoleTable::from_overrides(&settings.roles)?);
    let addr: SocketAddr = settings.server.listen_addr.parse()?;

    let state = Arc::new(AppState::new(
        settings,
        Some(settings_path),
        store.clone(),
        store,
        roles,
    )?);
    let app = build_router(state);

    tracing::info!("Starting web interface on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
