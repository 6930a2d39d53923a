use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use crate::auth;
use crate::error::ApiError;
use crate::routes::user_json;
use crate::state::AppState;
use trak_core::notify::Notification;
use trak_core::types::Role;
use trak_core::user::User;

#[derive(serde::Deserialize)]
pub struct RegisterBody {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    #[serde(default)]
    pub team_id: Option<u32>,
}

/// POST /api/register — create a pending account.
pub async fn register(
    State(app): State<AppState>,
    Json(body): Json<RegisterBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let role: Role = body.role.parse()?;
        if role == Role::Admin {
            return Err(ApiError::bad_request("admin accounts cannot self-register"));
        }
        let user = User::register(&root, body.name, body.email, &body.password, role, body.team_id)?;
        Ok::<_, ApiError>(serde_json::json!({
            "id": user.id,
            "name": user.name,
            "role": user.role,
            "approved": user.approved,
        }))
    })
    .await
    .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

#[derive(serde::Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

/// POST /api/login — check credentials and open a session.
///
/// Bad credentials are 401; a valid but unapproved account is 403 so the
/// client can tell the user to wait for approval.
pub async fn login(
    State(app): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let root = app.root.clone();
    let user = tokio::task::spawn_blocking(move || User::login(&root, &body.email, &body.password))
        .await
        .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    let token = auth::new_session_token();
    app.sessions.write().await.insert(token.clone(), user.id);
    tracing::info!(user = %user.email, "login");

    Ok(Json(serde_json::json!({
        "token": token,
        "user": user_json(&user),
    })))
}

/// POST /api/logout — drop the session for the presented token.
pub async fn logout(
    State(app): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let token = auth::extract_token(&headers).ok_or_else(ApiError::unauthorized)?;
    app.sessions.write().await.remove(&token);
    Ok(Json(serde_json::json!({ "status": "ok" })))
}

/// GET /api/me — the acting user plus their unread notification count.
pub async fn me(
    State(app): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let actor = auth::require_user(&app, &headers).await?;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let unread = Notification::unread_count(&root, actor.id)?;
        Ok::<_, ApiError>(serde_json::json!({
            "user": user_json(&actor),
            "unread_notifications": unread,
        }))
    })
    .await
    .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
