use anyhow::Result;
use std::path::Path;

use sentinela_auth::permissions::VIEW_DASHBOARD;

use super::{Context, Credentials};

pub async fn run(base_dir: &Path, creds: &Credentials) -> Result<()> {
    let ctx = Context::login(base_dir, creds).await?;
    let outcome = check(&ctx).await;
    ctx.finish(outcome).await
}

async fn check(ctx: &Context) -> Result<()> {
    ctx.require(VIEW_DASHBOARD)?;
    let prinad = ctx.backends()?.prinad;
    println!("PRINAD: {}", prinad.base_url());

    let status = prinad.health().await?;
    println!("  Status:  {}", status.status);
    if let Some(versao) = &status.versao {
        println!("  Version: {versao}");
    }
    for (k, v) in &status.detalhes {
        println!("  {k}: {v}");
    }
    if !status.is_healthy() {
        anyhow::bail!("PRINAD reports status '{}'", status.status);
    }
    Ok(())
}
