use crate::access;
use crate::error::Result;
use crate::project::Project;
use crate::team::Team;
use crate::ticket::Ticket;
use crate::types::{Role, TicketStatus};
use crate::user::User;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct Summary {
    pub total_tickets: usize,
    pub completed_tickets: usize,
    /// Count per board column, keyed by column label, all four always present.
    pub by_status: BTreeMap<String, usize>,
    pub by_priority: BTreeMap<String, usize>,
    pub by_kind: BTreeMap<String, usize>,
    /// Per-team totals; only populated for admins and managers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_stats: Option<BTreeMap<String, TeamStats>>,
}

#[derive(Debug, Serialize)]
pub struct TeamStats {
    pub total: usize,
    pub completed: usize,
}

// ---------------------------------------------------------------------------
// Computation
// ---------------------------------------------------------------------------

/// Aggregate counts over the tickets the actor may view.
pub fn summarize(root: &Path, actor: &User) -> Result<Summary> {
    let projects = Project::list(root)?;
    let index = access::ProjectIndex::new(&projects);
    let tickets = Ticket::list(root)?;
    let visible = access::visible_tickets(&tickets, &index, actor);

    let total_tickets = visible.len();
    let completed_tickets = visible
        .iter()
        .filter(|t| t.status == TicketStatus::Done)
        .count();

    let mut by_status: BTreeMap<String, usize> = TicketStatus::all()
        .iter()
        .map(|s| (s.as_str().to_string(), 0))
        .collect();
    let mut by_priority: BTreeMap<String, usize> = BTreeMap::new();
    let mut by_kind: BTreeMap<String, usize> = BTreeMap::new();
    for t in &visible {
        *by_status.entry(t.status.as_str().to_string()).or_default() += 1;
        *by_priority.entry(t.priority.as_str().to_string()).or_default() += 1;
        *by_kind.entry(t.kind.as_str().to_string()).or_default() += 1;
    }

    let team_stats = match actor.role {
        Role::Admin | Role::Manager => {
            let mut stats: BTreeMap<String, TeamStats> = BTreeMap::new();
            for team in Team::list(root)? {
                let team_tickets: Vec<_> = visible
                    .iter()
                    .filter(|t| index.project_of(t).is_some_and(|p| p.team_id == team.id))
                    .collect();
                if team_tickets.is_empty() {
                    continue;
                }
                let completed = team_tickets
                    .iter()
                    .filter(|t| t.status == TicketStatus::Done)
                    .count();
                stats.insert(
                    team.name.clone(),
                    TeamStats {
                        total: team_tickets.len(),
                        completed,
                    },
                );
            }
            Some(stats)
        }
        Role::Developer | Role::Visitor => None,
    };

    Ok(Summary {
        total_tickets,
        completed_tickets,
        by_status,
        by_priority,
        by_kind,
        team_stats,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
