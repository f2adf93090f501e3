//! Token-to-identity session table.
//!
//! Seeded once at startup from the secrets file; entries never expire (no
//! TTL, no cap) and live until overwritten by a registration with the same
//! token or the process exits. Bootstrap is an explicit awaited step, so
//! there is no window in which lookups run against an unseeded map.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::sync::RwLock;

/// Resolved caller identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub name: String,
    pub admin: bool,
    pub id: i64,
}

/// On-disk shape of the secrets file: one static admin token plus the
/// numeric-id allowlist.
#[derive(Debug, Deserialize)]
struct Secrets {
    token: String,
    #[serde(default)]
    admin: Vec<i64>,
}

/// Errors surfaced by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The token is not in the map; the caller has to log in again.
    #[error("please log in again")]
    NotAuthenticated,

    /// The secrets file could not be read or parsed at bootstrap.
    #[error("failed to load secrets from {}: {message}", .path.display())]
    Secrets { path: PathBuf, message: String },
}

/// Process-lifetime map from opaque token to identity.
///
/// The allowlist is fixed at bootstrap; only the token map changes
/// afterwards, and each token's slot is replaced atomically under the lock.
pub struct SessionMap {
    users: RwLock<HashMap<String, UserInfo>>,
    admin_ids: Vec<i64>,
}

impl SessionMap {
    /// Read the secrets file and install the static admin credential.
    pub async fn bootstrap(secrets_path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let path = secrets_path.as_ref();
        let secrets_err = |message: String| SessionError::Secrets {
            path: path.to_path_buf(),
            message,
        };

        let bytes = fs::read(path).await.map_err(|e| secrets_err(e.to_string()))?;
        let secrets: Secrets =
            serde_json::from_slice(&bytes).map_err(|e| secrets_err(e.to_string()))?;

        let mut users = HashMap::new();
        users.insert(
            secrets.token,
            UserInfo {
                name: "admin".to_string(),
                admin: true,
                id: 0,
            },
        );
        tracing::info!(
            admin_ids = secrets.admin.len(),
            "session map bootstrapped from {}",
            path.display()
        );

        Ok(Self {
            users: RwLock::new(users),
            admin_ids: secrets.admin,
        })
    }

    /// A map with no static credential and the given allowlist (for tests
    /// and embedders that manage secrets themselves).
    pub fn with_admin_ids(admin_ids: Vec<i64>) -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            admin_ids,
        }
    }

    /// Resolve a token to the identity registered for it.
    pub async fn lookup(&self, token: &str) -> Result<UserInfo, SessionError> {
        self.users
            .read()
            .await
            .get(token)
            .cloned()
            .ok_or(SessionError::NotAuthenticated)
    }

    /// Register (or overwrite) the identity behind `token`.
    ///
    /// A false `admin` flag is recomputed from the allowlist; the flag is
    /// only ever upgraded by this check, never downgraded, so callers cannot
    /// self-declare admin status without an allowlisted id.
    pub async fn register(&self, token: String, mut info: UserInfo) {
        if !info.admin {
            info.admin = self.admin_ids.contains(&info.id);
        }
        tracing::debug!(name = %info.name, admin = info.admin, "registered session token");
        self.users.write().await.insert(token, info);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn user(name: &str, admin: bool, id: i64) -> UserInfo {
        UserInfo {
            name: name.to_string(),
            admin,
            id,
        }
    }

    #[tokio::test]
    async fn bootstrap_installs_static_admin_token() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("setting.json");
        std::fs::write(&path, br#"{ "token": "s3cret", "admin": [5, 9] }"#).unwrap();

        let sessions = SessionMap::bootstrap(&path).await.unwrap();
        let info = sessions.lookup("s3cret").await.unwrap();
        assert_eq!(info.name, "admin");
        assert!(info.admin);
    }

    #[tokio::test]
    async fn bootstrap_fails_on_missing_or_malformed_secrets() {
        let dir = TempDir::new().unwrap();

        let missing = SessionMap::bootstrap(dir.path().join("nope.json")).await;
        assert!(matches!(missing, Err(SessionError::Secrets { .. })));

        let path = dir.path().join("setting.json");
        std::fs::write(&path, b"not json").unwrap();
        let malformed = SessionMap::bootstrap(&path).await;
        assert!(matches!(malformed, Err(SessionError::Secrets { .. })));
    }

    #[tokio::test]
    async fn unknown_token_is_not_authenticated() {
        let sessions = SessionMap::with_admin_ids(vec![]);
        let err = sessions.lookup("missing").await.unwrap_err();
        assert!(matches!(err, SessionError::NotAuthenticated));
        assert_eq!(err.to_string(), "please log in again");
    }

    #[tokio::test]
    async fn admin_flag_is_upgraded_for_allowlisted_ids_only() {
        let sessions = SessionMap::with_admin_ids(vec![5]);

        sessions
            .register("tok-5".to_string(), user("eve", false, 5))
            .await;
        assert!(sessions.lookup("tok-5").await.unwrap().admin);

        sessions
            .register("tok-7".to_string(), user("mallory", false, 7))
            .await;
        assert!(!sessions.lookup("tok-7").await.unwrap().admin);
    }

    #[tokio::test]
    async fn admin_flag_is_never_downgraded() {
        // An identity arriving with admin already set keeps it even when the
        // id is not allowlisted; the check only upgrades.
        let sessions = SessionMap::with_admin_ids(vec![]);
        sessions
            .register("tok".to_string(), user("root", true, 99))
            .await;
        assert!(sessions.lookup("tok").await.unwrap().admin);
    }

    #[tokio::test]
    async fn reregistering_a_token_overwrites_the_identity() {
        let sessions = SessionMap::with_admin_ids(vec![]);
        sessions
            .register("tok".to_string(), user("first", false, 1))
            .await;
        sessions
            .register("tok".to_string(), user("second", false, 2))
            .await;

        let info = sessions.lookup("tok").await.unwrap();
        assert_eq!(info.name, "second");
        assert_eq!(info.id, 2);
    }
}
