use crate::error::{Result, TrakError};
use crate::paths;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Notification
// ---------------------------------------------------------------------------

/// A persisted in-app notification. Delivery beyond the store (email, push)
/// is somebody else's problem; fan-out ends here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: u32,
    pub user_id: u32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn create(
        root: &Path,
        user_id: u32,
        message: impl Into<String>,
        link: Option<String>,
    ) -> Result<Self> {
        let notification = Self {
            id: paths::next_id(&root.join(paths::NOTIFICATIONS_DIR))?,
            user_id,
            message: message.into(),
            link,
            read: false,
            created_at: Utc::now(),
        };
        notification.save(root)?;
        Ok(notification)
    }

    pub fn load(root: &Path, id: u32) -> Result<Self> {
        let path = paths::notification_path(root, id);
        if !path.exists() {
            return Err(TrakError::NotificationNotFound(id));
        }
        let data = std::fs::read_to_string(&path)?;
        let notification: Notification = serde_yaml::from_str(&data)?;
        Ok(notification)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::notification_path(root, self.id);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// A user's notifications, newest first.
    pub fn list_for_user(root: &Path, user_id: u32) -> Result<Vec<Self>> {
        let dir = root.join(paths::NOTIFICATIONS_DIR);
        let mut list = Vec::new();
        for id in paths::list_ids(&dir)? {
            let n = Self::load(root, id)?;
            if n.user_id == user_id {
                list.push(n);
            }
        }
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(list)
    }

    pub fn unread_count(root: &Path, user_id: u32) -> Result<usize> {
        Ok(Self::list_for_user(root, user_id)?
            .iter()
            .filter(|n| !n.read)
            .count())
    }

    pub fn mark_read(&mut self, root: &Path) -> Result<()> {
        self.read = true;
        self.save(root)
    }

    /// Mark every unread notification for a user. Returns how many changed.
    pub fn mark_all_read(root: &Path, user_id: u32) -> Result<usize> {
        let mut count = 0;
        for mut n in Self::list_for_user(root, user_id)? {
            if !n.read {
                n.mark_read(root)?;
                count += 1;
            }
        }
        Ok(count)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn create_and_list_newest_first() {
        let dir = TempDir::new().unwrap();
        Notification::create(dir.path(), 1, "first", None).unwrap();
        Notification::create(dir.path(), 1, "second", Some("/board".to_string())).unwrap();
        Notification::create(dir.path(), 2, "other user", None).unwrap();

        let list = Notification::list_for_user(dir.path(), 1).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].message, "second");
        assert_eq!(list[0].link.as_deref(), Some("/board"));
        assert_eq!(list[1].message, "first");
    }

    #[test]
    fn unread_count_and_mark_all() {
        let dir = TempDir::new().unwrap();
        Notification::create(dir.path(), 1, "a", None).unwrap();
        Notification::create(dir.path(), 1, "b", None).unwrap();
        assert_eq!(Notification::unread_count(dir.path(), 1).unwrap(), 2);

        let changed = Notification::mark_all_read(dir.path(), 1).unwrap();
        assert_eq!(changed, 2);
        assert_eq!(Notification::unread_count(dir.path(), 1).unwrap(), 0);

        // Second pass is a no-op.
        assert_eq!(Notification::mark_all_read(dir.path(), 1).unwrap(), 0);
    }

    #[test]
    fn mark_single_read_persists() {
        let dir = TempDir::new().unwrap();
        let mut n = Notification::create(dir.path(), 1, "a", None).unwrap();
        n.mark_read(dir.path()).unwrap();
        assert!(Notification::load(dir.path(), n.id).unwrap().read);
    }

    #[test]
    fn load_missing_errors() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Notification::load(dir.path(), 7),
            Err(TrakError::NotificationNotFound(7))
        ));
    }
}
