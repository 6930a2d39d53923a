use anyhow::{bail, Context};
use std::path::Path;
use trak_core::user::User;

/// Resolve the acting user for a permission-gated command.
///
/// No password is asked locally; the account must exist and be approved,
/// and every decision runs against the freshly loaded record.
pub fn resolve(root: &Path, email: Option<&str>) -> anyhow::Result<User> {
    let email = email.context("this command needs an acting user: pass --as <email>")?;
    let user = User::find_by_email(root, email)?
        .with_context(|| format!("no account for email: {email}"))?;
    if !user.approved {
        bail!("account '{email}' is pending approval");
    }
    Ok(user)
}
