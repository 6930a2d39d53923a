use crate::error::{Result, TrakError};
use crate::paths;
use crate::types::Role;
use crate::user::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Team
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: u32,
    pub name: String,
    /// The team's manager. Distinct from a project's `team_lead_id`, which
    /// is assigned per project and may point at a manager from another team.
    pub manager_id: u32,
    pub created_at: DateTime<Utc>,
}

impl Team {
    pub fn create(root: &Path, name: impl Into<String>, manager_id: u32) -> Result<Self> {
        let name = name.into();
        if Self::list(root)?.iter().any(|t| t.name == name) {
            return Err(TrakError::TeamExists(name));
        }
        let team = Self {
            id: paths::next_id(&root.join(paths::TEAMS_DIR))?,
            name,
            manager_id,
            created_at: Utc::now(),
        };
        team.save(root)?;
        Ok(team)
    }

    pub fn load(root: &Path, id: u32) -> Result<Self> {
        let path = paths::team_path(root, id);
        if !path.exists() {
            return Err(TrakError::TeamNotFound(id));
        }
        let data = std::fs::read_to_string(&path)?;
        let team: Team = serde_yaml::from_str(&data)?;
        Ok(team)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::team_path(root, self.id);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn list(root: &Path) -> Result<Vec<Self>> {
        let dir = root.join(paths::TEAMS_DIR);
        let mut teams = Vec::new();
        for id in paths::list_ids(&dir)? {
            teams.push(Self::load(root, id)?);
        }
        Ok(teams)
    }
}

// ---------------------------------------------------------------------------
// Manager reassignment
// ---------------------------------------------------------------------------

/// Hand the team to a new manager. The target must already be an approved
/// member of the team; their role is promoted to manager if needed.
///
/// Returns the updated team, the new manager, and the remaining approved
/// members so the caller can fan out notifications.
pub fn assign_manager(root: &Path, team_id: u32, user_id: u32) -> Result<(Team, User, Vec<User>)> {
    let mut team = Team::load(root, team_id)?;
    let mut user = User::load(root, user_id)?;
    if user.team_id != Some(team_id) {
        return Err(TrakError::NotTeamMember {
            user: user_id,
            team: team_id,
        });
    }

    if user.role != Role::Manager {
        user.role = Role::Manager;
    }
    user.save(root)?;

    team.manager_id = user.id;
    team.save(root)?;

    let others = User::members_of(root, team_id)?
        .into_iter()
        .filter(|m| m.id != user.id)
        .collect();
    Ok((team, user, others))
}

/// Move approved users into a team. Unknown ids are a hard error so a typo
/// cannot silently strand half the member list.
pub fn add_members(root: &Path, team_id: u32, user_ids: &[u32]) -> Result<()> {
    // Team must exist before anyone is attached to it.
    Team::load(root, team_id)?;
    for &id in user_ids {
        let mut user = User::load(root, id)?;
        user.team_id = Some(team_id);
        user.save(root)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn seed_manager(root: &Path) -> User {
        User::create_approved(root, "Meg", "meg@example.com", "pw", Role::Manager, None).unwrap()
    }

    #[test]
    fn create_and_load() {
        let dir = TempDir::new().unwrap();
        let meg = seed_manager(dir.path());
        let team = Team::create(dir.path(), "alpha", meg.id).unwrap();
        assert_eq!(team.id, 1);

        let loaded = Team::load(dir.path(), 1).unwrap();
        assert_eq!(loaded.name, "alpha");
        assert_eq!(loaded.manager_id, meg.id);
    }

    #[test]
    fn duplicate_name_rejected() {
        let dir = TempDir::new().unwrap();
        let meg = seed_manager(dir.path());
        Team::create(dir.path(), "alpha", meg.id).unwrap();
        assert!(matches!(
            Team::create(dir.path(), "alpha", meg.id),
            Err(TrakError::TeamExists(_))
        ));
    }

    #[test]
    fn assign_manager_promotes_developer() {
        let dir = TempDir::new().unwrap();
        let meg = seed_manager(dir.path());
        let team = Team::create(dir.path(), "alpha", meg.id).unwrap();
        let dev = User::create_approved(
            dir.path(),
            "Dev",
            "dev@example.com",
            "pw",
            Role::Developer,
            Some(team.id),
        )
        .unwrap();
        let other = User::create_approved(
            dir.path(),
            "Oda",
            "oda@example.com",
            "pw",
            Role::Developer,
            Some(team.id),
        )
        .unwrap();

        let (team, lead, others) = assign_manager(dir.path(), team.id, dev.id).unwrap();
        assert_eq!(team.manager_id, dev.id);
        assert_eq!(lead.role, Role::Manager);
        assert_eq!(others.len(), 1);
        assert_eq!(others[0].id, other.id);

        // Promotion is persisted.
        assert_eq!(User::load(dir.path(), dev.id).unwrap().role, Role::Manager);
    }

    #[test]
    fn assign_manager_rejects_outsider() {
        let dir = TempDir::new().unwrap();
        let meg = seed_manager(dir.path());
        let team = Team::create(dir.path(), "alpha", meg.id).unwrap();
        let outsider =
            User::create_approved(dir.path(), "Out", "out@example.com", "pw", Role::Developer, None)
                .unwrap();
        assert!(matches!(
            assign_manager(dir.path(), team.id, outsider.id),
            Err(TrakError::NotTeamMember { .. })
        ));
    }

    #[test]
    fn add_members_sets_team() {
        let dir = TempDir::new().unwrap();
        let meg = seed_manager(dir.path());
        let team = Team::create(dir.path(), "alpha", meg.id).unwrap();
        let dev =
            User::create_approved(dir.path(), "Dev", "dev@example.com", "pw", Role::Developer, None)
                .unwrap();
        add_members(dir.path(), team.id, &[dev.id]).unwrap();
        assert_eq!(User::load(dir.path(), dev.id).unwrap().team_id, Some(team.id));
    }

    #[test]
    fn add_members_unknown_team_errors() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            add_members(dir.path(), 99, &[]),
            Err(TrakError::TeamNotFound(99))
        ));
    }
}
