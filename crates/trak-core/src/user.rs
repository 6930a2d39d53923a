use crate::error::{Result, TrakError};
use crate::paths;
use crate::types::Role;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// An account. Also the "actor" handed to the access engine: every request
/// loads the user fresh from disk, so decisions never run against a cached
/// role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u32,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<u32>,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    // ---------------------------------------------------------------------------
    // Registration
    // ---------------------------------------------------------------------------

    /// Register a new account, pending approval. Visitors never carry a team
    /// regardless of what the caller passes.
    pub fn register(
        root: &Path,
        name: impl Into<String>,
        email: impl Into<String>,
        password: &str,
        role: Role,
        team_id: Option<u32>,
    ) -> Result<Self> {
        let name = name.into();
        let email = email.into();
        paths::validate_display_name(&name)?;
        paths::validate_email(&email)?;

        if Self::find_by_email(root, &email)?.is_some() {
            return Err(TrakError::EmailExists(email));
        }

        let team_id = if role == Role::Visitor { None } else { team_id };
        let user = Self {
            id: paths::next_id(&root.join(paths::USERS_DIR))?,
            name,
            email,
            password_hash: hash_password(password)?,
            role,
            team_id,
            approved: false,
            created_at: Utc::now(),
        };
        user.save(root)?;
        Ok(user)
    }

    /// Create a pre-approved account. Used by `trak init` to seed the first
    /// admin, which would otherwise have nobody to approve it.
    pub fn create_approved(
        root: &Path,
        name: impl Into<String>,
        email: impl Into<String>,
        password: &str,
        role: Role,
        team_id: Option<u32>,
    ) -> Result<Self> {
        let mut user = Self::register(root, name, email, password, role, team_id)?;
        user.approved = true;
        user.save(root)?;
        Ok(user)
    }

    // ---------------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------------

    pub fn load(root: &Path, id: u32) -> Result<Self> {
        let path = paths::user_path(root, id);
        if !path.exists() {
            return Err(TrakError::UserNotFound(id));
        }
        let data = std::fs::read_to_string(&path)?;
        let user: User = serde_yaml::from_str(&data)?;
        Ok(user)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::user_path(root, self.id);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn list(root: &Path) -> Result<Vec<Self>> {
        let dir = root.join(paths::USERS_DIR);
        let mut users = Vec::new();
        for id in paths::list_ids(&dir)? {
            users.push(Self::load(root, id)?);
        }
        Ok(users)
    }

    pub fn find_by_email(root: &Path, email: &str) -> Result<Option<Self>> {
        Ok(Self::list(root)?.into_iter().find(|u| u.email == email))
    }

    /// Approved members of a team, in id order.
    pub fn members_of(root: &Path, team_id: u32) -> Result<Vec<Self>> {
        Ok(Self::list(root)?
            .into_iter()
            .filter(|u| u.approved && u.team_id == Some(team_id))
            .collect())
    }

    /// Unapproved registrations waiting on a team's manager (or an admin).
    pub fn pending_for_team(root: &Path, team_id: u32) -> Result<Vec<Self>> {
        Ok(Self::list(root)?
            .into_iter()
            .filter(|u| !u.approved && u.team_id == Some(team_id))
            .collect())
    }

    // ---------------------------------------------------------------------------
    // Approval
    // ---------------------------------------------------------------------------

    /// Approve a pending registration and return the updated record so the
    /// caller can notify the user.
    pub fn approve(root: &Path, id: u32) -> Result<Self> {
        let mut user = Self::load(root, id)?;
        user.approved = true;
        user.save(root)?;
        Ok(user)
    }

    /// Reject a pending registration. The record is deleted outright so the
    /// request disappears from every pending list.
    pub fn disapprove(root: &Path, id: u32) -> Result<Self> {
        let user = Self::load(root, id)?;
        std::fs::remove_file(paths::user_path(root, id))?;
        Ok(user)
    }

    // ---------------------------------------------------------------------------
    // Credentials
    // ---------------------------------------------------------------------------

    pub fn verify_password(&self, password: &str) -> bool {
        PasswordHash::new(&self.password_hash)
            .and_then(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed))
            .is_ok()
    }

    /// Check credentials and approval for login. Distinguishes bad
    /// credentials from a pending account so the caller can surface each.
    pub fn login(root: &Path, email: &str, password: &str) -> Result<Self> {
        let user = Self::find_by_email(root, email)?.ok_or(TrakError::InvalidCredentials)?;
        if !user.verify_password(password) {
            return Err(TrakError::InvalidCredentials);
        }
        if !user.approved {
            return Err(TrakError::NotApproved(user.email.clone()));
        }
        Ok(user)
    }
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| TrakError::PasswordHash(e.to_string()))?;
    Ok(hash.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn register_and_load() {
        let dir = TempDir::new().unwrap();
        let user =
            User::register(dir.path(), "Bob", "bob@example.com", "hunter2", Role::Developer, Some(5))
                .unwrap();
        assert_eq!(user.id, 1);
        assert!(!user.approved);

        let loaded = User::load(dir.path(), 1).unwrap();
        assert_eq!(loaded.name, "Bob");
        assert_eq!(loaded.team_id, Some(5));
        assert!(loaded.verify_password("hunter2"));
        assert!(!loaded.verify_password("wrong"));
    }

    #[test]
    fn duplicate_email_rejected() {
        let dir = TempDir::new().unwrap();
        User::register(dir.path(), "Bob", "bob@example.com", "pw", Role::Developer, None).unwrap();
        let err =
            User::register(dir.path(), "Bobby", "bob@example.com", "pw2", Role::Manager, None);
        assert!(matches!(err, Err(TrakError::EmailExists(_))));
    }

    #[test]
    fn visitor_never_gets_a_team() {
        let dir = TempDir::new().unwrap();
        let user =
            User::register(dir.path(), "Vi", "vi@example.com", "pw", Role::Visitor, Some(3))
                .unwrap();
        assert_eq!(user.team_id, None);
    }

    #[test]
    fn login_pending_account_rejected() {
        let dir = TempDir::new().unwrap();
        User::register(dir.path(), "Bob", "bob@example.com", "pw", Role::Developer, None).unwrap();
        assert!(matches!(
            User::login(dir.path(), "bob@example.com", "pw"),
            Err(TrakError::NotApproved(_))
        ));

        User::approve(dir.path(), 1).unwrap();
        let user = User::login(dir.path(), "bob@example.com", "pw").unwrap();
        assert_eq!(user.name, "Bob");
    }

    #[test]
    fn login_wrong_password_is_invalid_credentials() {
        let dir = TempDir::new().unwrap();
        User::create_approved(dir.path(), "Bob", "bob@example.com", "pw", Role::Developer, None)
            .unwrap();
        assert!(matches!(
            User::login(dir.path(), "bob@example.com", "nope"),
            Err(TrakError::InvalidCredentials)
        ));
        assert!(matches!(
            User::login(dir.path(), "ghost@example.com", "pw"),
            Err(TrakError::InvalidCredentials)
        ));
    }

    #[test]
    fn disapprove_deletes_record() {
        let dir = TempDir::new().unwrap();
        User::register(dir.path(), "Bob", "bob@example.com", "pw", Role::Developer, Some(1))
            .unwrap();
        User::disapprove(dir.path(), 1).unwrap();
        assert!(matches!(User::load(dir.path(), 1), Err(TrakError::UserNotFound(1))));
        // A later registration does not reuse the id's email slot.
        assert!(User::find_by_email(dir.path(), "bob@example.com").unwrap().is_none());
    }

    #[test]
    fn members_and_pending_are_disjoint() {
        let dir = TempDir::new().unwrap();
        User::create_approved(dir.path(), "Ann", "ann@example.com", "pw", Role::Developer, Some(2))
            .unwrap();
        User::register(dir.path(), "Ben", "ben@example.com", "pw", Role::Developer, Some(2))
            .unwrap();
        User::register(dir.path(), "Cat", "cat@example.com", "pw", Role::Developer, Some(9))
            .unwrap();

        let members = User::members_of(dir.path(), 2).unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].name, "Ann");

        let pending = User::pending_for_team(dir.path(), 2).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].name, "Ben");
    }

    #[test]
    fn ids_increment() {
        let dir = TempDir::new().unwrap();
        let a = User::register(dir.path(), "A", "a@example.com", "pw", Role::Developer, None)
            .unwrap();
        let b = User::register(dir.path(), "B", "b@example.com", "pw", Role::Developer, None)
            .unwrap();
        assert_eq!((a.id, b.id), (1, 2));
    }
}
