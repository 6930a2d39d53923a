use crate::error::ApiError;
use crate::state::AppState;
use axum::http::HeaderMap;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use trak_core::user::User;

// ---------------------------------------------------------------------------
// Session tokens
// ---------------------------------------------------------------------------

/// Opaque session token: 32 random bytes, URL-safe base64.
pub fn new_session_token() -> String {
    let bytes: [u8; 32] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Pull the session token from the request: `Authorization: Bearer <token>`
/// first, then a `trak_session` cookie.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        if let Some(token) = value.strip_prefix("Bearer ") {
            return Some(token.to_string());
        }
    }
    if let Some(cookies) = headers.get("cookie").and_then(|v| v.to_str().ok()) {
        for part in cookies.split(';') {
            if let Some(val) = part.trim().strip_prefix("trak_session=") {
                return Some(val.to_string());
            }
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Actor resolution
// ---------------------------------------------------------------------------

/// Resolve the acting user for a request, or 401.
///
/// The user record is re-read from the store on every call; a session whose
/// user has since been deleted (e.g. a disapproved registration) is invalid.
pub async fn require_user(app: &AppState, headers: &HeaderMap) -> Result<User, ApiError> {
    let token = extract_token(headers).ok_or_else(ApiError::unauthorized)?;
    let user_id = {
        let sessions = app.sessions.read().await;
        sessions.get(&token).copied()
    }
    .ok_or_else(ApiError::unauthorized)?;

    let root = app.root.clone();
    let user = tokio::task::spawn_blocking(move || User::load(&root, user_id))
        .await
        .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))?
        .map_err(|_| ApiError::unauthorized())?;
    Ok(user)
}
