use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use crate::auth;
use crate::error::ApiError;
use crate::state::AppState;
use trak_core::user::User;

/// GET /api/people — every approved user, as name/role pairs for assignment
/// pickers and the teams page.
pub async fn people(
    State(app): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    auth::require_user(&app, &headers).await?;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let people: Vec<serde_json::Value> = User::list(&root)?
            .iter()
            .filter(|u| u.approved)
            .map(|u| {
                serde_json::json!({
                    "id": u.id,
                    "name": u.name,
                    "role": u.role,
                })
            })
            .collect();
        Ok::<_, ApiError>(serde_json::json!(people))
    })
    .await
    .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
