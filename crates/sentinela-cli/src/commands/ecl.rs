use anyhow::{Result, anyhow};
use std::path::Path;

use sentinela_auth::permissions::VIEW_ECL;
use sentinela_core::Validate;
use sentinela_core::report::format_brl;
use sentinela_core::risk::Stage;
use sentinela_core::types::ecl::EclDirectRequest;

use super::{Context, Credentials};

pub async fn direct(
    base_dir: &Path,
    creds: &Credentials,
    pd: f64,
    lgd: f64,
    ead: f64,
    stage: u8,
) -> Result<()> {
    let estagio = Stage::try_from(stage).map_err(|e| anyhow!(e))?;
    let req = EclDirectRequest {
        pd,
        lgd,
        ead,
        estagio,
    };
    req.validate()?;

    let ctx = Context::login(base_dir, creds).await?;
    let outcome = calculate(&ctx, &req).await;
    ctx.finish(outcome).await
}

async fn calculate(ctx: &Context, req: &EclDirectRequest) -> Result<()> {
    ctx.require(VIEW_ECL)?;
    let result = ctx.backends()?.ecl.calcular_direto(req).await?;

    println!("PD:       {:.4}", result.pd);
    println!("LGD:      {:.4}", result.lgd);
    println!("EAD:      {}", format_brl(result.ead));
    println!("ECL:      {}", format_brl(result.ecl));
    println!("Stage:    {} ({} ECL)", result.estagio, result.estagio.horizon());
    if !result.is_consistent(0.01) {
        tracing::warn!(
            expected = req.estimate(),
            reported = result.ecl,
            "backend ECL differs from PD x LGD x EAD"
        );
    }
    Ok(())
}

pub async fn groups(base_dir: &Path, creds: &Credentials) -> Result<()> {
    let ctx = Context::login(base_dir, creds).await?;
    let outcome = list_groups(&ctx).await;
    ctx.finish(outcome).await
}

async fn list_groups(ctx: &Context) -> Result<()> {
    ctx.require(VIEW_ECL)?;
    let groups = ctx.backends()?.ecl.grupos_homogeneos().await?;
    println!("{:<10} {:<8} NAME", "ID", "LGD");
    for g in &groups {
        println!("{:<10} {:<8.4} {}", g.id, g.lgd, g.nome);
        if let Some(desc) = &g.descricao {
            println!("{:<19} {desc}", "");
        }
    }
    Ok(())
}
