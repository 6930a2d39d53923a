use crate::access;
use crate::error::Result;
use crate::project::Project;
use crate::team::Team;
use crate::ticket::Ticket;
use crate::user::User;
use serde::Serialize;
use std::path::Path;

// ---------------------------------------------------------------------------
// SearchResults
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Serialize)]
pub struct SearchResults {
    pub tickets: Vec<Ticket>,
    pub projects: Vec<Project>,
    pub users: Vec<UserHit>,
    pub teams: Vec<Team>,
}

/// User search hit without the credential fields.
#[derive(Debug, Serialize)]
pub struct UserHit {
    pub id: u32,
    pub name: String,
    pub email: String,
    pub role: crate::types::Role,
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Case-insensitive substring search across every entity type, scoped to
/// what the actor may see. An empty query returns nothing.
pub fn search(root: &Path, query: &str, actor: &User) -> Result<SearchResults> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Ok(SearchResults::default());
    }
    let q = query.as_str();

    let projects = Project::list(root)?;
    let index = access::ProjectIndex::new(&projects);

    let tickets: Vec<Ticket> = Ticket::list(root)?
        .into_iter()
        .filter(|t| {
            t.title.to_lowercase().contains(q)
                || t.description.as_deref().is_some_and(|d| d.to_lowercase().contains(q))
                || t.assignee.to_lowercase().contains(q)
                || t.kind.as_str().contains(q)
        })
        .filter(|t| access::can_view(t, index.project_of(t), actor))
        .collect();

    let matched_projects: Vec<Project> = access::visible_projects(&projects, actor)
        .into_iter()
        .filter(|p| {
            p.name.to_lowercase().contains(q)
                || p.description.as_deref().is_some_and(|d| d.to_lowercase().contains(q))
                || p.status.to_lowercase().contains(q)
        })
        .cloned()
        .collect();

    let users: Vec<UserHit> = if access::can_search_users(actor) {
        User::list(root)?
            .into_iter()
            .filter(|u| {
                u.name.to_lowercase().contains(q)
                    || u.email.to_lowercase().contains(q)
                    || u.role.as_str().contains(q)
            })
            .map(|u| UserHit {
                id: u.id,
                name: u.name,
                email: u.email,
                role: u.role,
            })
            .collect()
    } else {
        Vec::new()
    };

    let all_teams = Team::list(root)?;
    let teams: Vec<Team> = access::visible_teams(&all_teams, actor)
        .into_iter()
        .filter(|t| t.name.to_lowercase().contains(q))
        .cloned()
        .collect();

    Ok(SearchResults {
        tickets,
        projects: matched_projects,
        users,
        teams,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
