use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::NaiveDate;

use crate::auth;
use crate::error::ApiError;
use crate::state::AppState;
use trak_core::access;
use trak_core::project::{self, NewProject, Project, ProjectFilter};
use trak_core::ticket::{self, Ticket};

fn parse_date(value: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    match value {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ApiError::bad_request(format!("invalid date: {s}"))),
    }
}

#[derive(serde::Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub team_lead: Option<u32>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub team_id: Option<u32>,
    #[serde(default)]
    pub search: Option<String>,
}

/// GET /api/projects — the actor's visible projects, optionally narrowed by
/// lead, status, team, or a name/description search.
pub async fn list(
    State(app): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let actor = auth::require_user(&app, &headers).await?;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let projects = Project::list(&root)?;
        let visible = access::visible_projects(&projects, &actor);
        let filtered = project::apply_filter(
            visible,
            &ProjectFilter {
                team_lead_id: query.team_lead,
                status: query.status,
                team_id: query.team_id,
                search: query.search,
            },
        );
        Ok::<_, ApiError>(serde_json::to_value(&filtered)?)
    })
    .await
    .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

#[derive(serde::Deserialize)]
pub struct CreateProjectBody {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub team_id: u32,
    pub team_lead_id: u32,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub deadline: Option<String>,
}

/// POST /api/projects — create a project. Admins and managers only.
pub async fn create(
    State(app): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateProjectBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let actor = auth::require_user(&app, &headers).await?;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        if !access::can_create_project(&actor) {
            return Err(ApiError::forbidden());
        }
        let start_date = parse_date(body.start_date.as_deref())?;
        let deadline = parse_date(body.deadline.as_deref())?;
        let project = Project::create(
            &root,
            NewProject {
                name: body.name,
                description: body.description,
                team_id: body.team_id,
                team_lead_id: body.team_lead_id,
                status: body.status,
                start_date,
                deadline,
            },
        )?;
        Ok::<_, ApiError>(serde_json::to_value(&project)?)
    })
    .await
    .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// GET /api/projects/:id/board — one project's tickets, visibility-filtered
/// and grouped by status.
pub async fn board(
    State(app): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<u32>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let actor = auth::require_user(&app, &headers).await?;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let project = Project::load(&root, id)?;
        let tickets = Ticket::list_by_project(&root, id)?;
        let visible: Vec<&Ticket> = tickets
            .iter()
            .filter(|t| access::can_view(t, Some(&project), &actor))
            .collect();

        let mut map = serde_json::Map::new();
        for (status, column) in ticket::board(visible) {
            map.insert(
                status.as_str().to_string(),
                serde_json::to_value(&column)?,
            );
        }
        Ok::<_, ApiError>(serde_json::json!({
            "project": { "id": project.id, "name": project.name },
            "tickets": serde_json::Value::Object(map),
        }))
    })
    .await
    .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
