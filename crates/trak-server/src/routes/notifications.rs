use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;

use crate::auth;
use crate::error::ApiError;
use crate::state::AppState;
use trak_core::notify::Notification;

/// GET /api/notifications — the actor's notifications, newest first.
pub async fn list(
    State(app): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let actor = auth::require_user(&app, &headers).await?;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let notifications = Notification::list_for_user(&root, actor.id)?;
        Ok::<_, ApiError>(serde_json::to_value(&notifications)?)
    })
    .await
    .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// POST /api/notifications/:id/read — mark one of the actor's own
/// notifications as read. Anyone else's is 403.
pub async fn mark_read(
    State(app): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<u32>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let actor = auth::require_user(&app, &headers).await?;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut notification = Notification::load(&root, id)?;
        if notification.user_id != actor.id {
            return Err(ApiError::forbidden());
        }
        notification.mark_read(&root)?;
        Ok::<_, ApiError>(serde_json::json!({ "id": id, "read": true }))
    })
    .await
    .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// POST /api/notifications/read_all — mark everything read.
pub async fn mark_all_read(
    State(app): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let actor = auth::require_user(&app, &headers).await?;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let changed = Notification::mark_all_read(&root, actor.id)?;
        Ok::<_, ApiError>(serde_json::json!({ "marked": changed }))
    })
    .await
    .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
