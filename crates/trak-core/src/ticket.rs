use crate::error::{Result, TrakError};
use crate::paths;
use crate::types::{Priority, TicketKind, TicketStatus};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Ticket
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: u32,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub kind: TicketKind,
    pub priority: Priority,
    /// Assignee display name. Historical schema: matching is by name, not
    /// by user id, so two users sharing a name are indistinguishable here.
    pub assignee: String,
    pub status: TicketStatus,
    pub public: bool,
    /// Owning project. A projectless ticket has no team scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<u32>,
    /// Parent ticket for the epic/feature/story hierarchy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// Fields for `Ticket::create`.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub title: String,
    pub description: Option<String>,
    pub kind: TicketKind,
    pub priority: Priority,
    pub assignee: String,
    pub public: bool,
    pub project_id: Option<u32>,
    pub parent_id: Option<u32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Ticket {
    /// Create a ticket on the To Do column. The owning project, when given,
    /// must exist; the parent, when given, must be a kind that can have
    /// children.
    pub fn create(root: &Path, new: NewTicket) -> Result<Self> {
        if let Some(project_id) = new.project_id {
            crate::project::Project::load(root, project_id)?;
        }
        if let Some(parent_id) = new.parent_id {
            let parent = Self::load(root, parent_id)?;
            if !parent.kind.can_have_children() {
                return Err(TrakError::InvalidKind(format!(
                    "parent ticket {parent_id} is a {}, only epics and features take children",
                    parent.kind
                )));
            }
        }
        let ticket = Self {
            id: paths::next_id(&root.join(paths::TICKETS_DIR))?,
            title: new.title,
            description: new.description,
            kind: new.kind,
            priority: new.priority,
            assignee: new.assignee,
            status: TicketStatus::ToDo,
            public: new.public,
            project_id: new.project_id,
            parent_id: new.parent_id,
            start_date: new.start_date,
            end_date: new.end_date,
            created_at: Utc::now(),
        };
        ticket.save(root)?;
        Ok(ticket)
    }

    pub fn load(root: &Path, id: u32) -> Result<Self> {
        let path = paths::ticket_path(root, id);
        if !path.exists() {
            return Err(TrakError::TicketNotFound(id));
        }
        let data = std::fs::read_to_string(&path)?;
        let ticket: Ticket = serde_yaml::from_str(&data)?;
        Ok(ticket)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::ticket_path(root, self.id);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn list(root: &Path) -> Result<Vec<Self>> {
        let dir = root.join(paths::TICKETS_DIR);
        let mut tickets = Vec::new();
        for id in paths::list_ids(&dir)? {
            tickets.push(Self::load(root, id)?);
        }
        Ok(tickets)
    }

    pub fn list_by_project(root: &Path, project_id: u32) -> Result<Vec<Self>> {
        Ok(Self::list(root)?
            .into_iter()
            .filter(|t| t.project_id == Some(project_id))
            .collect())
    }

    // ---------------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------------

    /// Move the ticket to another column. Any of the four statuses is a
    /// valid target; the board fixes the set, not the transitions.
    pub fn set_status(&mut self, status: TicketStatus) {
        self.status = status;
    }

    pub fn reassign(&mut self, assignee: impl Into<String>) {
        self.assignee = assignee.into();
    }
}

// ---------------------------------------------------------------------------
// Board and hierarchy views
// ---------------------------------------------------------------------------

/// Group tickets into the four board columns, preserving input order within
/// each column.
pub fn board<'a, I>(tickets: I) -> Vec<(TicketStatus, Vec<&'a Ticket>)>
where
    I: IntoIterator<Item = &'a Ticket>,
{
    let mut columns: Vec<(TicketStatus, Vec<&Ticket>)> = TicketStatus::all()
        .iter()
        .map(|&s| (s, Vec::new()))
        .collect();
    for ticket in tickets {
        if let Some((_, column)) = columns.iter_mut().find(|(s, _)| *s == ticket.status) {
            column.push(ticket);
        }
    }
    columns
}

/// Direct children of a parent ticket.
pub fn children<'a>(tickets: &'a [Ticket], parent_id: u32) -> Vec<&'a Ticket> {
    tickets
        .iter()
        .filter(|t| t.parent_id == Some(parent_id))
        .collect()
}

/// Split tickets into hierarchy tiers: epics, features, and everything else
/// (stories, tasks, bugs).
pub fn hierarchy(tickets: &[Ticket]) -> (Vec<&Ticket>, Vec<&Ticket>, Vec<&Ticket>) {
    let mut epics = Vec::new();
    let mut features = Vec::new();
    let mut stories = Vec::new();
    for t in tickets {
        match t.kind {
            TicketKind::Epic => epics.push(t),
            TicketKind::Feature => features.push(t),
            TicketKind::Story | TicketKind::Task | TicketKind::Bug => stories.push(t),
        }
    }
    (epics, features, stories)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
