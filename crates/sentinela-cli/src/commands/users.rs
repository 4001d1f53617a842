use anyhow::Result;
use std::path::Path;

use sentinela_auth::audit::actions;
use sentinela_auth::permissions::MANAGE_USERS;
use sentinela_auth::{CreateUserRequest, UserStore, hash_password};

use super::{Context, Credentials};

pub async fn add(base_dir: &Path, creds: &Credentials, req: CreateUserRequest) -> Result<()> {
    let ctx = Context::login(base_dir, creds).await?;
    let outcome = create(&ctx, &req).await;
    ctx.finish(outcome).await
}

async fn create(ctx: &Context, req: &CreateUserRequest) -> Result<()> {
    ctx.require_writable(MANAGE_USERS)?;
    req.validate()?;
    let hash = hash_password(&req.password)?;
    let user = ctx.store.create_user(req, &hash).await?;
    ctx.record(
        actions::CREATE_USER,
        &user.matricula,
        &format!("role={}", user.role),
    )
    .await?;
    println!("Created {} ({}, {})", user.matricula, user.name, user.role);
    Ok(())
}

pub async fn list(base_dir: &Path, creds: &Credentials) -> Result<()> {
    let ctx = Context::login(base_dir, creds).await?;
    let outcome = print_users(&ctx).await;
    ctx.finish(outcome).await
}

async fn print_users(ctx: &Context) -> Result<()> {
    ctx.require(MANAGE_USERS)?;
    let users = ctx.store.list_users().await?;
    println!(
        "{:<12} {:<10} {:<8} {:<28} NAME",
        "MATRICULA", "ROLE", "ACTIVE", "EMAIL"
    );
    for u in &users {
        println!(
            "{:<12} {:<10} {:<8} {:<28} {}",
            u.matricula,
            u.role.as_str(),
            if u.is_active { "yes" } else { "no" },
            u.email,
            u.name
        );
    }
    println!("\n{} user(s)", users.len());
    Ok(())
}
