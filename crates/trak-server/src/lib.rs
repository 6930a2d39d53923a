pub mod auth;
pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(root: PathBuf) -> Router {
    let app_state = state::AppState::new(root);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Accounts and sessions
        .route("/api/register", post(routes::auth::register))
        .route("/api/login", post(routes::auth::login))
        .route("/api/logout", post(routes::auth::logout))
        .route("/api/me", get(routes::auth::me))
        // Tickets
        .route("/api/board", get(routes::tickets::board))
        .route("/api/tickets", get(routes::tickets::list_all))
        .route("/api/tickets", post(routes::tickets::create))
        .route(
            "/api/tickets/{id}/status",
            post(routes::tickets::set_status),
        )
        .route(
            "/api/tickets/{id}/reassign",
            post(routes::tickets::reassign),
        )
        .route(
            "/api/tickets/{id}/children",
            get(routes::tickets::children),
        )
        .route("/api/hierarchy", get(routes::tickets::hierarchy))
        // Projects
        .route("/api/projects", get(routes::projects::list))
        .route("/api/projects", post(routes::projects::create))
        .route("/api/projects/{id}/board", get(routes::projects::board))
        // Teams
        .route("/api/teams", get(routes::teams::list))
        .route("/api/teams", post(routes::teams::create))
        .route("/api/teams/{id}/members", get(routes::teams::members))
        .route("/api/teams/{id}/manager", post(routes::teams::set_manager))
        .route("/api/teams/{id}/pending", get(routes::teams::pending))
        .route(
            "/api/teams/{id}/approve/{user_id}",
            post(routes::teams::approve),
        )
        .route(
            "/api/teams/{id}/disapprove/{user_id}",
            post(routes::teams::disapprove),
        )
        // People
        .route("/api/people", get(routes::users::people))
        // Notifications
        .route("/api/notifications", get(routes::notifications::list))
        .route(
            "/api/notifications/{id}/read",
            post(routes::notifications::mark_read),
        )
        .route(
            "/api/notifications/read_all",
            post(routes::notifications::mark_all_read),
        )
        // Search and summary
        .route("/api/search", get(routes::search::search))
        .route("/api/summary", get(routes::summary::summary))
        .layer(cors)
        .with_state(app_state)
}

/// Start the trak API server.
pub async fn serve(root: PathBuf, port: u16) -> anyhow::Result<()> {
    let app = build_router(root);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let actual_port = listener.local_addr()?.port();

    tracing::info!("trak API server listening on http://localhost:{actual_port}");

    axum::serve(listener, app).await?;
    Ok(())
}
