use anyhow::Result;
use std::path::Path;

use sentinela_auth::UserStore;
use sentinela_auth::store::seed::seed_admin;
use sentinela_core::Settings;

use super::{Credentials, open_store};

pub async fn run(
    base_dir: &Path,
    creds: &Credentials,
    admin_name: &str,
    admin_email: &str,
) -> Result<()> {
    println!("Initializing Sentinela in {}", base_dir.display());

    std::fs::create_dir_all(base_dir)?;

    let settings_path = Settings::default_path(base_dir);
    if settings_path.exists() {
        println!("Settings already exist at {}", settings_path.display());
    } else {
        let settings = Settings::default_settings(base_dir);
        settings.save(&settings_path)?;
        println!("Created settings: {}", settings_path.display());
    }

    let settings = Settings::load(&settings_path)?;
    let store = open_store(&settings).await?;
    println!("Initialized database: {}", settings.server.db_path);

    if store.user_count().await? > 0 {
        println!("Users already exist; no administrator created.");
    } else {
        let matricula = crate::prompt("Administrator matricula", &creds.matricula)?;
        let password = crate::prompt_secret("Administrator password", &creds.password)?;
        if let Some(admin) =
            seed_admin(store.as_ref(), &matricula, admin_name, admin_email, &password).await?
        {
            println!("Created administrator {} ({})", admin.matricula, admin.role);
        }
    }

    println!("\nSentinela initialized. Next steps:");
    println!("  1. Point [api] at the risk backends in {}", settings_path.display());
    println!("  2. Run `sentinela users add` to create analyst accounts");
    println!("  3. Run `sentinela serve` to start the API");

    Ok(())
}
