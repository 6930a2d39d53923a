use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::NaiveDate;

use crate::auth;
use crate::error::ApiError;
use crate::state::AppState;
use trak_core::access;
use trak_core::notify::Notification;
use trak_core::project::Project;
use trak_core::ticket::{self, NewTicket, Ticket};
use trak_core::types::{Priority, TicketKind, TicketStatus};
use trak_core::user::User;

fn parse_date(value: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    match value {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ApiError::bad_request(format!("invalid date: {s}"))),
    }
}

/// Board columns as a JSON object keyed by status label.
fn board_json(columns: Vec<(TicketStatus, Vec<&Ticket>)>) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    for (status, tickets) in columns {
        let list: Vec<serde_json::Value> = tickets
            .iter()
            .map(|t| serde_json::to_value(t).unwrap_or(serde_json::Value::Null))
            .collect();
        map.insert(status.as_str().to_string(), serde_json::Value::Array(list));
    }
    serde_json::Value::Object(map)
}

/// First approved-or-not user matching an assignee display name. Display
/// names are not unique; ties resolve to the lowest id, same as the
/// historical schema.
fn find_by_name(root: &std::path::Path, name: &str) -> Result<Option<User>, ApiError> {
    Ok(User::list(root)?.into_iter().find(|u| u.name == name))
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// GET /api/board — the actor's visible tickets, grouped by status.
pub async fn board(
    State(app): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let actor = auth::require_user(&app, &headers).await?;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let projects = Project::list(&root)?;
        let index = access::ProjectIndex::new(&projects);
        let tickets = Ticket::list(&root)?;
        let visible = access::visible_tickets(&tickets, &index, &actor);
        Ok::<_, ApiError>(board_json(ticket::board(visible)))
    })
    .await
    .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// GET /api/tickets — flat list of every ticket. Admin only.
pub async fn list_all(
    State(app): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let actor = auth::require_user(&app, &headers).await?;
    if !access::can_list_all_tickets(&actor) {
        return Err(ApiError::forbidden());
    }
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let tickets = Ticket::list(&root)?;
        Ok::<_, ApiError>(serde_json::to_value(&tickets)?)
    })
    .await
    .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// GET /api/hierarchy — visible tickets grouped into epic/feature/story
/// tiers. Visitors are locked out of this view entirely.
pub async fn hierarchy(
    State(app): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let actor = auth::require_user(&app, &headers).await?;
    if !access::can_view_hierarchy(&actor) {
        return Err(ApiError::forbidden());
    }
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let projects = Project::list(&root)?;
        let index = access::ProjectIndex::new(&projects);
        let tickets = Ticket::list(&root)?;
        let visible: Vec<Ticket> = access::visible_tickets(&tickets, &index, &actor)
            .into_iter()
            .cloned()
            .collect();
        let (epics, features, stories) = ticket::hierarchy(&visible);
        Ok::<_, ApiError>(serde_json::json!({
            "epics": epics,
            "features": features,
            "stories": stories,
        }))
    })
    .await
    .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// GET /api/tickets/:id/children — a parent ticket with its visible children.
pub async fn children(
    State(app): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<u32>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let actor = auth::require_user(&app, &headers).await?;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let parent = Ticket::load(&root, id)?;
        let projects = Project::list(&root)?;
        let index = access::ProjectIndex::new(&projects);
        if !access::can_view(&parent, index.project_of(&parent), &actor) {
            return Err(ApiError::forbidden());
        }
        let tickets = Ticket::list(&root)?;
        let children: Vec<&Ticket> = ticket::children(&tickets, id)
            .into_iter()
            .filter(|c| access::can_view(c, index.project_of(c), &actor))
            .collect();
        Ok::<_, ApiError>(serde_json::json!({
            "parent": {
                "id": parent.id,
                "title": parent.title,
                "kind": parent.kind,
            },
            "children": children,
        }))
    })
    .await
    .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize)]
pub struct CreateTicketBody {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub kind: String,
    pub priority: String,
    pub assignee_id: u32,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub project_id: Option<u32>,
    #[serde(default)]
    pub parent_id: Option<u32>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// POST /api/tickets — file a new ticket on the To Do column.
pub async fn create(
    State(app): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateTicketBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let actor = auth::require_user(&app, &headers).await?;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        if !access::can_create_ticket(&actor) {
            return Err(ApiError::forbidden());
        }
        let kind: TicketKind = body.kind.parse()?;
        let priority: Priority = body.priority.parse()?;
        let start_date = parse_date(body.start_date.as_deref())?;
        let end_date = parse_date(body.end_date.as_deref())?;

        // The assignee must come from the actor's assignable pool.
        let users = User::list(&root)?;
        let assignee = access::assignable_users(&users, &actor)
            .into_iter()
            .find(|u| u.id == body.assignee_id)
            .ok_or_else(ApiError::forbidden)?;

        let ticket = Ticket::create(
            &root,
            NewTicket {
                title: body.title,
                description: body.description,
                kind,
                priority,
                assignee: assignee.name.clone(),
                public: body.public,
                project_id: body.project_id,
                parent_id: body.parent_id,
                start_date,
                end_date,
            },
        )?;
        Ok::<_, ApiError>(serde_json::to_value(&ticket)?)
    })
    .await
    .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize)]
pub struct StatusBody {
    pub status: String,
}

/// POST /api/tickets/:id/status — move a ticket to another column.
pub async fn set_status(
    State(app): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<u32>,
    Json(body): Json<StatusBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let actor = auth::require_user(&app, &headers).await?;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let new_status: TicketStatus = body.status.parse()?;
        let mut ticket = Ticket::load(&root, id)?;
        let projects = Project::list(&root)?;
        let index = access::ProjectIndex::new(&projects);
        if !access::can_edit(&ticket, index.project_of(&ticket), &actor) {
            return Err(ApiError::forbidden());
        }

        let old_status = ticket.status;
        ticket.set_status(new_status);
        ticket.save(&root)?;

        // Notify the assignee after the permitted mutation lands.
        if let Some(assignee) = find_by_name(&root, &ticket.assignee)? {
            Notification::create(
                &root,
                assignee.id,
                format!(
                    "Ticket \"{}\" status changed from {} to {}",
                    ticket.title, old_status, new_status
                ),
                Some("/board".to_string()),
            )?;
        }

        Ok::<_, ApiError>(serde_json::json!({
            "id": ticket.id,
            "status": ticket.status,
        }))
    })
    .await
    .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

#[derive(serde::Deserialize)]
pub struct ReassignBody {
    pub assignee_id: u32,
}

/// POST /api/tickets/:id/reassign — hand the ticket to another user.
pub async fn reassign(
    State(app): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<u32>,
    Json(body): Json<ReassignBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let actor = auth::require_user(&app, &headers).await?;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut ticket = Ticket::load(&root, id)?;
        let projects = Project::list(&root)?;
        let index = access::ProjectIndex::new(&projects);
        if !access::can_reassign(&ticket, index.project_of(&ticket), &actor) {
            return Err(ApiError::forbidden());
        }

        let new_assignee = User::load(&root, body.assignee_id)?;
        ticket.reassign(new_assignee.name.clone());
        ticket.save(&root)?;

        Notification::create(
            &root,
            new_assignee.id,
            format!("You have been assigned ticket: {}", ticket.title),
            Some("/board".to_string()),
        )?;

        Ok::<_, ApiError>(serde_json::json!({
            "id": ticket.id,
            "assignee": ticket.assignee,
        }))
    })
    .await
    .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
