use crate::output::print_json;
use anyhow::Context;
use std::path::Path;
use trak_core::types::Role;
use trak_core::user::User;

/// `trak init` — create the workspace skeleton and seed the first admin
/// account. Without an existing admin there would be nobody to approve
/// anyone else.
pub fn run(
    root: &Path,
    name: Option<&str>,
    admin_name: &str,
    admin_email: &str,
    admin_password: &str,
    json: bool,
) -> anyhow::Result<()> {
    let workspace = match name {
        Some(n) => n.to_string(),
        None => root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "workspace".to_string()),
    };

    let config = trak_core::config::init_workspace(root, &workspace)
        .context("failed to initialize workspace")?;

    let admin = match User::find_by_email(root, admin_email)? {
        Some(existing) => existing,
        None => User::create_approved(root, admin_name, admin_email, admin_password, Role::Admin, None)
            .context("failed to create admin account")?,
    };

    if json {
        print_json(&serde_json::json!({
            "workspace": config.workspace,
            "admin": { "id": admin.id, "email": admin.email },
        }))?;
    } else {
        println!("Initialized workspace '{}'", config.workspace);
        println!("Admin account: {} ({})", admin.name, admin.email);
    }
    Ok(())
}
