pub mod auth;
pub mod notifications;
pub mod projects;
pub mod search;
pub mod summary;
pub mod teams;
pub mod tickets;
pub mod users;

use trak_core::user::User;

/// User payload without credential fields.
pub(crate) fn user_json(user: &User) -> serde_json::Value {
    serde_json::json!({
        "id": user.id,
        "name": user.name,
        "email": user.email,
        "role": user.role,
        "team_id": user.team_id,
        "approved": user.approved,
    })
}
