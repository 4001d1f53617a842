use axum::Json;

use sentinela_auth::Session;

use crate::navigation::{NavItem, navigation};

/// Anonymous callers get an empty menu rather than an error.
pub async fn get_navigation(session: Session) -> Json<Vec<NavItem>> {
    Json(navigation(&session))
}
