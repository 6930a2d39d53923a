use crate::error::{Result, TrakError};
use crate::paths;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Workspace configuration, written once by `trak init`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    pub workspace: String,
    pub created_at: DateTime<Utc>,
}

fn default_version() -> u32 {
    1
}

impl Config {
    pub fn new(workspace: impl Into<String>) -> Self {
        Self {
            version: 1,
            workspace: workspace.into(),
            created_at: Utc::now(),
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(TrakError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&data)?;
        Ok(config)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }
}

/// Create the workspace skeleton: config file plus one directory per entity
/// type. Idempotent on directories; refuses to clobber an existing config.
pub fn init_workspace(root: &Path, workspace: &str) -> Result<Config> {
    let cfg_path = paths::config_path(root);
    if cfg_path.exists() {
        let existing = Config::load(root)?;
        return Ok(existing);
    }
    for dir in [
        paths::USERS_DIR,
        paths::TEAMS_DIR,
        paths::PROJECTS_DIR,
        paths::TICKETS_DIR,
        paths::NOTIFICATIONS_DIR,
    ] {
        crate::io::ensure_dir(&root.join(dir))?;
    }
    let config = Config::new(workspace);
    config.save(root)?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
