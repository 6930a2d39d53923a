use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use trak_core::error::TrakError;

// ---------------------------------------------------------------------------
// Sentinel errors for explicit statuses
// ---------------------------------------------------------------------------

/// Private sentinel carrying an explicit HTTP 401 through the
/// `anyhow::Error` chain. "Not authenticated" is a different surface than
/// "authenticated but forbidden" — the engine only speaks booleans, so the
/// request layer owns this distinction.
#[derive(Debug)]
struct UnauthorizedError;

impl std::fmt::Display for UnauthorizedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("authentication required")
    }
}

impl std::error::Error for UnauthorizedError {}

/// Private sentinel carrying an explicit HTTP 403: the actor is known, but
/// the access engine said no.
#[derive(Debug)]
struct ForbiddenError;

impl std::fmt::Display for ForbiddenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("permission denied")
    }
}

impl std::error::Error for ForbiddenError {}

/// Private sentinel for an explicit HTTP 400 with a custom message.
#[derive(Debug)]
struct BadRequestError(String);

impl std::fmt::Display for BadRequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for BadRequestError {}

// ---------------------------------------------------------------------------
// ApiError — unified error type for HTTP responses
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct ApiError(pub anyhow::Error);

impl ApiError {
    /// 401 — no (valid) session.
    pub fn unauthorized() -> Self {
        Self(UnauthorizedError.into())
    }

    /// 403 — the access engine denied the action.
    pub fn forbidden() -> Self {
        Self(ForbiddenError.into())
    }

    /// 400 with a custom message.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(BadRequestError(msg.into()).into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Explicit sentinels first, then the domain error taxonomy.
        if self.0.downcast_ref::<UnauthorizedError>().is_some() {
            let body = serde_json::json!({ "error": "authentication required" });
            return (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response();
        }
        if self.0.downcast_ref::<ForbiddenError>().is_some() {
            let body = serde_json::json!({ "error": "permission denied" });
            return (StatusCode::FORBIDDEN, axum::Json(body)).into_response();
        }
        if let Some(b) = self.0.downcast_ref::<BadRequestError>() {
            let body = serde_json::json!({ "error": b.0.clone() });
            return (StatusCode::BAD_REQUEST, axum::Json(body)).into_response();
        }

        let status = if let Some(e) = self.0.downcast_ref::<TrakError>() {
            match e {
                TrakError::NotInitialized => StatusCode::BAD_REQUEST,
                TrakError::UserNotFound(_)
                | TrakError::EmailNotFound(_)
                | TrakError::TeamNotFound(_)
                | TrakError::ProjectNotFound(_)
                | TrakError::TicketNotFound(_)
                | TrakError::NotificationNotFound(_) => StatusCode::NOT_FOUND,
                TrakError::EmailExists(_)
                | TrakError::TeamExists(_)
                | TrakError::ProjectExists(_) => StatusCode::CONFLICT,
                TrakError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                TrakError::NotApproved(_) => StatusCode::FORBIDDEN,
                TrakError::NotTeamMember { .. } => StatusCode::BAD_REQUEST,
                TrakError::InvalidRole(_)
                | TrakError::InvalidStatus(_)
                | TrakError::InvalidKind(_)
                | TrakError::InvalidPriority(_)
                | TrakError::InvalidName(_)
                | TrakError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
                TrakError::PasswordHash(_)
                | TrakError::Io(_)
                | TrakError::Yaml(_)
                | TrakError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
            }
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
