use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrakError {
    #[error("not initialized: run 'trak init'")]
    NotInitialized,

    #[error("user not found: {0}")]
    UserNotFound(u32),

    #[error("no account for email: {0}")]
    EmailNotFound(String),

    #[error("a user with email '{0}' already exists")]
    EmailExists(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account '{0}' is pending approval")]
    NotApproved(String),

    #[error("team not found: {0}")]
    TeamNotFound(u32),

    #[error("team already exists: {0}")]
    TeamExists(String),

    #[error("user {user} is not a member of team {team}")]
    NotTeamMember { user: u32, team: u32 },

    #[error("project not found: {0}")]
    ProjectNotFound(u32),

    #[error("project already exists: {0}")]
    ProjectExists(String),

    #[error("ticket not found: {0}")]
    TicketNotFound(u32),

    #[error("notification not found: {0}")]
    NotificationNotFound(u32),

    #[error("invalid role: {0}")]
    InvalidRole(String),

    #[error("invalid ticket status: {0}")]
    InvalidStatus(String),

    #[error("invalid ticket kind: {0}")]
    InvalidKind(String),

    #[error("invalid priority: {0}")]
    InvalidPriority(String),

    #[error("invalid display name: {0:?}")]
    InvalidName(String),

    #[error("invalid email address: {0:?}")]
    InvalidEmail(String),

    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TrakError>;
