use anyhow::Result;
use std::path::Path;

use sentinela_auth::permissions::PERMISSIONS;
use sentinela_auth::{Role, RoleTable};

use super::load_settings;

pub fn run(base_dir: &Path) -> Result<()> {
    let (settings, _) = load_settings(base_dir)?;
    let table = RoleTable::from_overrides(&settings.roles)?;

    for role in Role::ALL {
        let perms = table.permissions_for(role);
        let suffix = if role.is_read_only() { " (read-only)" } else { "" };
        println!("{role}{suffix}");
        for p in &perms {
            println!("  - {p}");
        }
        println!();
    }

    println!("Permissions:");
    for (name, description) in PERMISSIONS {
        println!("  {name:<20} {description}");
    }
    Ok(())
}
