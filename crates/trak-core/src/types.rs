use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Closed set of account roles. Every access decision matches exhaustively
/// on this enum — adding a role is a compile-time-checked change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Manager,
    Developer,
    Visitor,
}

impl Role {
    pub fn all() -> &'static [Role] {
        &[Role::Admin, Role::Manager, Role::Developer, Role::Visitor]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Developer => "developer",
            Role::Visitor => "visitor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = crate::error::TrakError;

    /// Case-insensitive: registration forms historically submitted
    /// "Visitor" and "visitor" interchangeably.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "developer" => Ok(Role::Developer),
            "visitor" => Ok(Role::Visitor),
            _ => Err(crate::error::TrakError::InvalidRole(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// TicketStatus
// ---------------------------------------------------------------------------

/// Board columns, in display order. Tickets may move to any column; the
/// workflow fixes the set and ordering, not a transition relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketStatus {
    #[serde(rename = "To Do")]
    ToDo,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "In Review")]
    InReview,
    #[serde(rename = "Done")]
    Done,
}

impl TicketStatus {
    pub fn all() -> &'static [TicketStatus] {
        &[
            TicketStatus::ToDo,
            TicketStatus::InProgress,
            TicketStatus::InReview,
            TicketStatus::Done,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TicketStatus::ToDo => "To Do",
            TicketStatus::InProgress => "In Progress",
            TicketStatus::InReview => "In Review",
            TicketStatus::Done => "Done",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TicketStatus {
    type Err = crate::error::TrakError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "To Do" => Ok(TicketStatus::ToDo),
            "In Progress" => Ok(TicketStatus::InProgress),
            "In Review" => Ok(TicketStatus::InReview),
            "Done" => Ok(TicketStatus::Done),
            _ => Err(crate::error::TrakError::InvalidStatus(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// TicketKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketKind {
    Epic,
    Feature,
    Story,
    Task,
    Bug,
}

impl TicketKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TicketKind::Epic => "epic",
            TicketKind::Feature => "feature",
            TicketKind::Story => "story",
            TicketKind::Task => "task",
            TicketKind::Bug => "bug",
        }
    }

    /// Epics and features may parent other tickets.
    pub fn can_have_children(self) -> bool {
        matches!(self, TicketKind::Epic | TicketKind::Feature)
    }
}

impl fmt::Display for TicketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TicketKind {
    type Err = crate::error::TrakError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "epic" => Ok(TicketKind::Epic),
            "feature" => Ok(TicketKind::Feature),
            "story" => Ok(TicketKind::Story),
            "task" => Ok(TicketKind::Task),
            "bug" => Ok(TicketKind::Bug),
            _ => Err(crate::error::TrakError::InvalidKind(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = crate::error::TrakError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "critical" => Ok(Priority::Critical),
            _ => Err(crate::error::TrakError::InvalidPriority(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
