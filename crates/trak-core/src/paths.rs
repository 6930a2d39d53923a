use crate::error::{Result, TrakError};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const TRAK_DIR: &str = ".trak";
pub const USERS_DIR: &str = ".trak/users";
pub const TEAMS_DIR: &str = ".trak/teams";
pub const PROJECTS_DIR: &str = ".trak/projects";
pub const TICKETS_DIR: &str = ".trak/tickets";
pub const NOTIFICATIONS_DIR: &str = ".trak/notifications";

pub const CONFIG_FILE: &str = ".trak/config.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn trak_dir(root: &Path) -> PathBuf {
    root.join(TRAK_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn user_path(root: &Path, id: u32) -> PathBuf {
    root.join(USERS_DIR).join(format!("{id}.yaml"))
}

pub fn team_path(root: &Path, id: u32) -> PathBuf {
    root.join(TEAMS_DIR).join(format!("{id}.yaml"))
}

pub fn project_path(root: &Path, id: u32) -> PathBuf {
    root.join(PROJECTS_DIR).join(format!("{id}.yaml"))
}

pub fn ticket_path(root: &Path, id: u32) -> PathBuf {
    root.join(TICKETS_DIR).join(format!("{id}.yaml"))
}

pub fn notification_path(root: &Path, id: u32) -> PathBuf {
    root.join(NOTIFICATIONS_DIR).join(format!("{id}.yaml"))
}

// ---------------------------------------------------------------------------
// Id allocation
// ---------------------------------------------------------------------------

/// Next id for an entity directory: one past the highest `<id>.yaml` present.
/// A missing directory yields 1.
pub fn next_id(dir: &Path) -> Result<u32> {
    if !dir.exists() {
        return Ok(1);
    }
    let mut max = 0u32;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if let Some(stem) = name.strip_suffix(".yaml") {
            if let Ok(n) = stem.parse::<u32>() {
                if n > max {
                    max = n;
                }
            }
        }
    }
    Ok(max + 1)
}

/// List every id present in an entity directory, ascending.
pub fn list_ids(dir: &Path) -> Result<Vec<u32>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut ids = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if let Some(stem) = name.strip_suffix(".yaml") {
            if let Ok(n) = stem.parse::<u32>() {
                ids.push(n);
            }
        }
    }
    ids.sort_unstable();
    Ok(ids)
}

// ---------------------------------------------------------------------------
// Input validation
// ---------------------------------------------------------------------------

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_re() -> &'static Regex {
    EMAIL_RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap())
}

pub fn validate_email(email: &str) -> Result<()> {
    if email.is_empty() || email.len() > 254 || !email_re().is_match(email) {
        return Err(TrakError::InvalidEmail(email.to_string()));
    }
    Ok(())
}

/// Display names carry assignee matching, so they must be non-empty and
/// free of leading/trailing whitespace.
pub fn validate_display_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > 128 || name.trim() != name {
        return Err(TrakError::InvalidName(name.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
