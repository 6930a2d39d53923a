use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;

use crate::auth;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// GET /api/search?q= — cross-entity search scoped to the actor's
/// visibility.
pub async fn search(
    State(app): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SearchQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let actor = auth::require_user(&app, &headers).await?;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let results = trak_core::search::search(&root, &query.q, &actor)?;
        Ok::<_, ApiError>(serde_json::to_value(&results)?)
    })
    .await
    .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
