use anyhow::{Result, bail};
use std::path::Path;

use sentinela_core::settings::credentials::mask_secret;

use super::load_settings;

pub fn show(base_dir: &Path) -> Result<()> {
    let (settings, path) = load_settings(base_dir)?;
    let shown = settings.redacted();

    println!("Settings: {}", path.display());
    println!();
    for key in sentinela_core::Settings::keys() {
        let value = shown.get(key)?.unwrap_or_else(|| "(unset)".to_string());
        println!("  {key:<20} {value}");
    }
    println!();

    if settings.roles.is_empty() {
        println!("  Roles: built-in table (see `sentinela roles`)");
    } else {
        println!("  Role overrides ({}):", settings.roles.len());
        for (role, perms) in &settings.roles {
            println!("    - {role}: {}", perms.join(", "));
        }
    }

    Ok(())
}

pub fn get(base_dir: &Path, key: &str) -> Result<()> {
    let (settings, _) = load_settings(base_dir)?;
    let value = settings.get(key)?;
    match value {
        Some(v) if is_secret(key) => println!("{}", mask_secret(&v)),
        Some(v) => println!("{v}"),
        None => println!("(unset)"),
    }
    Ok(())
}

pub fn set(
    base_dir: &Path,
    key: &str,
    value: &str,
    encrypt: bool,
    passphrase: &Option<String>,
) -> Result<()> {
    let (mut settings, path) = load_settings(base_dir)?;
    if encrypt {
        if key != "llm.api_key" {
            bail!("--encrypt only applies to llm.api_key");
        }
        let passphrase = crate::prompt_secret("Passphrase", passphrase)?;
        settings.set_llm_api_key_encrypted(value, &passphrase)?;
    } else {
        settings.set(key, value)?;
    }
    settings.save(&path)?;
    tracing::info!(key, "setting saved");
    println!("{key} updated");
    Ok(())
}

pub fn reset(base_dir: &Path) -> Result<()> {
    let (mut settings, path) = load_settings(base_dir)?;
    settings.reset();
    settings.save(&path)?;
    println!("Settings reset to defaults (database and JWT secret kept)");
    Ok(())
}

fn is_secret(key: &str) -> bool {
    matches!(key, "llm.api_key" | "server.jwt_secret")
}
