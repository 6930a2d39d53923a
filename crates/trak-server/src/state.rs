use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared application state passed to all route handlers.
///
/// Sessions are an in-memory token → user-id map; the user record itself is
/// loaded fresh from the store on every request, so a session never carries
/// a stale role.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    pub sessions: Arc<RwLock<HashMap<String, u32>>>,
}

impl AppState {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}
