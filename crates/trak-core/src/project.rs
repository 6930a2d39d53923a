use crate::error::{Result, TrakError};
use crate::paths;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Owning team. Ticket team scope derives from this.
    pub team_id: u32,
    /// Project-level lead. May differ from the owning team's manager.
    pub team_lead_id: u32,
    /// Free-form label ("Active", "Completed", ...). Defaults to Active.
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// Fields for `Project::create`.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
    pub team_id: u32,
    pub team_lead_id: u32,
    pub status: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub deadline: Option<NaiveDate>,
}

impl Project {
    pub fn create(root: &Path, new: NewProject) -> Result<Self> {
        if Self::list(root)?.iter().any(|p| p.name == new.name) {
            return Err(TrakError::ProjectExists(new.name));
        }
        // The owning team must exist.
        crate::team::Team::load(root, new.team_id)?;

        let project = Self {
            id: paths::next_id(&root.join(paths::PROJECTS_DIR))?,
            name: new.name,
            description: new.description,
            team_id: new.team_id,
            team_lead_id: new.team_lead_id,
            status: new.status.unwrap_or_else(|| "Active".to_string()),
            start_date: new.start_date,
            deadline: new.deadline,
            created_at: Utc::now(),
        };
        project.save(root)?;
        Ok(project)
    }

    pub fn load(root: &Path, id: u32) -> Result<Self> {
        let path = paths::project_path(root, id);
        if !path.exists() {
            return Err(TrakError::ProjectNotFound(id));
        }
        let data = std::fs::read_to_string(&path)?;
        let project: Project = serde_yaml::from_str(&data)?;
        Ok(project)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::project_path(root, self.id);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn list(root: &Path) -> Result<Vec<Self>> {
        let dir = root.join(paths::PROJECTS_DIR);
        let mut projects = Vec::new();
        for id in paths::list_ids(&dir)? {
            projects.push(Self::load(root, id)?);
        }
        Ok(projects)
    }
}

// ---------------------------------------------------------------------------
// Listing filters
// ---------------------------------------------------------------------------

/// Optional narrowing applied after visibility scoping: lead, status, team,
/// and a case-insensitive name/description search.
#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    pub team_lead_id: Option<u32>,
    pub status: Option<String>,
    pub team_id: Option<u32>,
    pub search: Option<String>,
}

pub fn apply_filter<'a>(projects: Vec<&'a Project>, filter: &ProjectFilter) -> Vec<&'a Project> {
    let query = filter.search.as_deref().map(str::to_lowercase);
    projects
        .into_iter()
        .filter(|p| filter.team_lead_id.is_none_or(|id| p.team_lead_id == id))
        .filter(|p| filter.status.as_deref().is_none_or(|s| p.status == s))
        .filter(|p| filter.team_id.is_none_or(|id| p.team_id == id))
        .filter(|p| {
            let Some(q) = query.as_deref() else { return true };
            p.name.to_lowercase().contains(q)
                || p.description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(q))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
