//! Locally persisted session: the bearer token plus the cached user profile.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::{fs, sync::RwLock};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Consumer,
    Business,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: i64,
    #[serde(default)]
    pub email: Option<String>,
    pub role: UserRole,
}

impl SessionUser {
    pub fn new(id: i64, role: UserRole) -> Self {
        Self {
            id,
            email: None,
            role,
        }
    }
}

pub fn ensure_role(user: Option<&SessionUser>, role: UserRole) -> bool {
    user.is_some_and(|u| u.role == role)
}

/// On-disk shape of the session blob.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredSession {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<SessionUser>,
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn token(&self) -> AppResult<Option<String>>;

    async fn user(&self) -> AppResult<Option<SessionUser>>;
}

/// Token or a hard local failure; never reaches the network without one.
pub async fn require_token(store: &dyn SessionStore) -> AppResult<String> {
    match store.token().await? {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(AppError::Session),
    }
}

pub async fn require_user(store: &dyn SessionStore) -> AppResult<SessionUser> {
    store.user().await?.ok_or(AppError::Session)
}

/// Session persisted as JSON by the login flow.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn load(&self) -> AppResult<StoredSession> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(StoredSession::default());
            }
            Err(err) => return Err(AppError::Internal(err.into())),
        };
        Ok(serde_json::from_str(&raw)?)
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn token(&self) -> AppResult<Option<String>> {
        Ok(self.load().await?.token)
    }

    async fn user(&self) -> AppResult<Option<SessionUser>> {
        Ok(self.load().await?.user)
    }
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: RwLock<StoredSession>,
}

impl MemorySessionStore {
    pub fn new(token: Option<String>, user: Option<SessionUser>) -> Self {
        Self {
            inner: RwLock::new(StoredSession { token, user }),
        }
    }

    pub fn signed_in(token: impl Into<String>, user: SessionUser) -> Self {
        Self::new(Some(token.into()), Some(user))
    }

    pub async fn sign_out(&self) {
        *self.inner.write().await = StoredSession::default();
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn token(&self) -> AppResult<Option<String>> {
        Ok(self.inner.read().await.token.clone())
    }

    async fn user(&self) -> AppResult<Option<SessionUser>> {
        Ok(self.inner.read().await.user.clone())
    }
}
