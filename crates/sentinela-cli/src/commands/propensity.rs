use anyhow::Result;
use std::path::Path;

use sentinela_auth::permissions::VIEW_PROPENSAO;

use super::{Context, Credentials};

pub async fn products(base_dir: &Path, creds: &Credentials) -> Result<()> {
    let ctx = Context::login(base_dir, creds).await?;
    let outcome = list_products(&ctx).await;
    ctx.finish(outcome).await
}

async fn list_products(ctx: &Context) -> Result<()> {
    ctx.require(VIEW_PROPENSAO)?;
    let products = ctx.backends()?.propensao.produtos().await?;
    if products.is_empty() {
        println!("No products available.");
        return Ok(());
    }
    for p in &products {
        match &p.descricao {
            Some(desc) => println!("  {:<16} {} - {desc}", p.codigo, p.nome),
            None => println!("  {:<16} {}", p.codigo, p.nome),
        }
    }
    Ok(())
}
