use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use crate::auth;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/summary — ticket counts over the actor's visible tickets, with
/// per-team stats for admins and managers.
pub async fn summary(
    State(app): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let actor = auth::require_user(&app, &headers).await?;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let summary = trak_core::summary::summarize(&root, &actor)?;
        Ok::<_, ApiError>(serde_json::to_value(&summary)?)
    })
    .await
    .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
