use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;

use crate::auth;
use crate::error::ApiError;
use crate::routes::user_json;
use crate::state::AppState;
use trak_core::access;
use trak_core::notify::Notification;
use trak_core::team::{self, Team};
use trak_core::types::Role;
use trak_core::user::User;

/// GET /api/teams — the actor's visible teams with their approved members.
pub async fn list(
    State(app): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let actor = auth::require_user(&app, &headers).await?;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let teams = Team::list(&root)?;
        let visible = access::visible_teams(&teams, &actor);
        let mut list = Vec::new();
        for team in visible {
            let members: Vec<serde_json::Value> = User::members_of(&root, team.id)?
                .iter()
                .map(user_json)
                .collect();
            list.push(serde_json::json!({
                "id": team.id,
                "name": team.name,
                "manager_id": team.manager_id,
                "members": members,
            }));
        }
        Ok::<_, ApiError>(serde_json::json!(list))
    })
    .await
    .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

#[derive(serde::Deserialize)]
pub struct CreateTeamBody {
    pub name: String,
    pub manager_id: u32,
    #[serde(default)]
    pub member_ids: Vec<u32>,
}

/// POST /api/teams — create a team and attach members. Admin only.
pub async fn create(
    State(app): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateTeamBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let actor = auth::require_user(&app, &headers).await?;
    if !access::can_create_team(&actor) {
        return Err(ApiError::forbidden());
    }
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let created = Team::create(&root, body.name, body.manager_id)?;
        team::add_members(&root, created.id, &body.member_ids)?;
        Ok::<_, ApiError>(serde_json::json!({
            "id": created.id,
            "name": created.name,
            "manager_id": created.manager_id,
        }))
    })
    .await
    .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// GET /api/teams/:id/members — approved members with a manager flag.
/// For admins and the team's own manager.
pub async fn members(
    State(app): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<u32>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let actor = auth::require_user(&app, &headers).await?;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let team = Team::load(&root, id)?;
        if !access::can_manage_team(&team, &actor) {
            return Err(ApiError::forbidden());
        }
        let members: Vec<serde_json::Value> = User::members_of(&root, id)?
            .iter()
            .map(|m| {
                serde_json::json!({
                    "id": m.id,
                    "name": m.name,
                    "role": m.role,
                    "is_manager": m.id == team.manager_id,
                })
            })
            .collect();
        Ok::<_, ApiError>(serde_json::json!(members))
    })
    .await
    .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

#[derive(serde::Deserialize)]
pub struct SetManagerBody {
    pub user_id: u32,
}

/// POST /api/teams/:id/manager — hand the team to a new manager and notify
/// the team. For admins and the team's current manager.
pub async fn set_manager(
    State(app): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<u32>,
    Json(body): Json<SetManagerBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let actor = auth::require_user(&app, &headers).await?;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let team = Team::load(&root, id)?;
        if !access::can_manage_team(&team, &actor) {
            return Err(ApiError::forbidden());
        }
        let (updated, lead, others) = team::assign_manager(&root, id, body.user_id)?;

        Notification::create(
            &root,
            lead.id,
            format!("You have been assigned as Team Lead for {}", updated.name),
            Some("/teams".to_string()),
        )?;
        for member in &others {
            Notification::create(
                &root,
                member.id,
                format!("{} is now the Team Lead for {}", lead.name, updated.name),
                Some("/teams".to_string()),
            )?;
        }

        Ok::<_, ApiError>(serde_json::json!({
            "id": updated.id,
            "manager_id": updated.manager_id,
        }))
    })
    .await
    .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

// ---------------------------------------------------------------------------
// Registration approval
// ---------------------------------------------------------------------------

/// GET /api/teams/:id/pending — registrations waiting on this team.
///
/// Managers see only pending developers; admin approval is required for
/// manager and visitor registrations.
pub async fn pending(
    State(app): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<u32>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let actor = auth::require_user(&app, &headers).await?;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let team = Team::load(&root, id).ok();
        if !access::can_approve_user(team.as_ref(), &actor) {
            return Err(ApiError::forbidden());
        }
        let mut pending = User::pending_for_team(&root, id)?;
        if actor.role == Role::Manager {
            pending.retain(|u| u.role == Role::Developer);
        }
        let list: Vec<serde_json::Value> = pending.iter().map(user_json).collect();
        Ok::<_, ApiError>(serde_json::json!(list))
    })
    .await
    .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// POST /api/teams/:id/approve/:user_id — approve a pending registration.
pub async fn approve(
    State(app): State<AppState>,
    headers: HeaderMap,
    Path((id, user_id)): Path<(u32, u32)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let actor = auth::require_user(&app, &headers).await?;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let team = Team::load(&root, id).ok();
        if !access::can_approve_user(team.as_ref(), &actor) {
            return Err(ApiError::forbidden());
        }
        let candidate = User::load(&root, user_id)?;
        if candidate.team_id != Some(id) {
            return Err(ApiError::bad_request("user is not registered for this team"));
        }

        let user = User::approve(&root, user_id)?;
        let team_name = team.map(|t| t.name).unwrap_or_else(|| format!("team {id}"));
        Notification::create(
            &root,
            user.id,
            format!("Your account has been approved for team {team_name}"),
            Some("/board".to_string()),
        )?;

        Ok::<_, ApiError>(serde_json::json!({
            "id": user.id,
            "approved": user.approved,
        }))
    })
    .await
    .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// POST /api/teams/:id/disapprove/:user_id — reject and delete a pending
/// registration.
pub async fn disapprove(
    State(app): State<AppState>,
    headers: HeaderMap,
    Path((id, user_id)): Path<(u32, u32)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let actor = auth::require_user(&app, &headers).await?;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let team = Team::load(&root, id).ok();
        if !access::can_approve_user(team.as_ref(), &actor) {
            return Err(ApiError::forbidden());
        }
        let candidate = User::load(&root, user_id)?;
        if candidate.team_id != Some(id) {
            return Err(ApiError::bad_request("user is not registered for this team"));
        }
        let removed = User::disapprove(&root, user_id)?;
        Ok::<_, ApiError>(serde_json::json!({
            "id": removed.id,
            "removed": true,
        }))
    })
    .await
    .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
