use anyhow::Result;
use std::path::Path;

use super::load_settings;

pub async fn run(base_dir: &Path) -> Result<()> {
    let (settings, path) = load_settings(base_dir)?;
    tracing::info!(settings = %path.display(), db = %settings.server.db_path, "starting server");
    sentinela_web::start_web_server(settings, path).await
}
