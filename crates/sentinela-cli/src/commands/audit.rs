use anyhow::Result;
use std::path::Path;

use sentinela_auth::audit::{MAX_PAGE, actions, to_csv};
use sentinela_auth::permissions::{EXPORT_CSV, VIEW_AUDIT};
use sentinela_auth::{AuditLog, PermissionGate};

use super::{Context, Credentials};

pub async fn list(
    base_dir: &Path,
    creds: &Credentials,
    limit: u32,
    offset: u32,
    csv: bool,
) -> Result<()> {
    let ctx = Context::login(base_dir, creds).await?;
    let outcome = if csv {
        export(&ctx).await
    } else {
        print_page(&ctx, limit, offset).await
    };
    ctx.finish(outcome).await
}

async fn print_page(ctx: &Context, limit: u32, offset: u32) -> Result<()> {
    ctx.require(VIEW_AUDIT)?;
    let total = ctx.store.count().await?;
    let entries = ctx.store.list(limit, offset).await?;
    ctx.record(actions::VIEW_AUDIT, "audit", "").await?;

    for e in &entries {
        println!(
            "{:>6}  {}  {:<10} {:<16} {:<14} {}",
            e.id, e.timestamp, e.user, e.action, e.resource, e.details
        );
    }
    println!(
        "\nShowing {} of {} entries (offset {}, page limit {})",
        entries.len(),
        total,
        offset,
        limit.min(MAX_PAGE)
    );
    Ok(())
}

async fn export(ctx: &Context) -> Result<()> {
    PermissionGate::all_of([VIEW_AUDIT, EXPORT_CSV]).check(ctx.session())?;
    let mut entries = Vec::new();
    loop {
        let page = ctx.store.list(MAX_PAGE, entries.len() as u32).await?;
        let done = page.len() < MAX_PAGE as usize;
        entries.extend(page);
        if done {
            break;
        }
    }
    ctx.record(
        actions::EXPORT_CSV,
        "audit",
        &format!("rows={}", entries.len()),
    )
    .await?;
    print!("{}", to_csv(&entries));
    Ok(())
}
