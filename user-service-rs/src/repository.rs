//! Document-store seam for users.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::model::User;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("document store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<User>, RepositoryError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, RepositoryError>;
}

/// In-memory user directory.
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory with the fixture accounts the sibling services expect.
    pub fn seeded() -> Self {
        Self {
            users: RwLock::new(vec![
                User::new("admin", "admin", Some("admin@example.com")),
                User::new("u-1", "alice", Some("alice@example.com")),
                User::new("u-2", "bob", None),
            ]),
        }
    }

    pub async fn add(&self, user: User) {
        self.users.write().await.push(user);
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_all(&self) -> Result<Vec<User>, RepositoryError> {
        Ok(self.users.read().await.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, RepositoryError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|user| user.id == id).cloned())
    }
}
