use tokio::sync::RwLock;

use crate::{
    error::ApiError,
    model::{User, UserId},
};

/// In-memory credential store. Users are only ever appended, so an id is
/// the user's position in the list plus one.
pub struct UserStore {
    users: RwLock<Vec<User>>,
    bcrypt_cost: u32,
}

impl UserStore {
    pub fn new(bcrypt_cost: u32) -> Self {
        Self {
            users: RwLock::new(Vec::new()),
            bcrypt_cost,
        }
    }

    /// Creates a user with a salted bcrypt hash of `password`.
    ///
    /// Fails with [`ApiError::DuplicateUsername`] when the exact (case-sensitive)
    /// username is already taken.
    pub async fn register(&self, username: &str, password: &str) -> Result<User, ApiError> {
        if self.find(username).await.is_some() {
            return Err(ApiError::DuplicateUsername);
        }

        // bcrypt is CPU-bound: run it on the blocking pool, outside the lock.
        let raw = password.to_owned();
        let cost = self.bcrypt_cost;
        let password_hash = tokio::task::spawn_blocking(move || bcrypt::hash(raw, cost)).await??;

        let mut users = self.users.write().await;
        // Someone may have taken the name while we were hashing.
        if users.iter().any(|u| u.username == username) {
            return Err(ApiError::DuplicateUsername);
        }

        let user = User {
            id: users.len() as UserId + 1,
            username: username.to_owned(),
            password_hash,
        };
        users.push(user.clone());
        tracing::info!(user_id = user.id, "registered user");

        Ok(user)
    }

    /// Checks a username/password pair and returns the user's id.
    ///
    /// Unknown users and wrong passwords both yield [`ApiError::AuthFailure`].
    pub async fn verify(&self, username: &str, password: &str) -> Result<UserId, ApiError> {
        let Some(user) = self.find(username).await else {
            tracing::warn!("login attempt for unknown user");
            return Err(ApiError::AuthFailure);
        };

        let raw = password.to_owned();
        let hash = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || bcrypt::verify(raw, &hash)).await??;

        if matches {
            Ok(user.id)
        } else {
            tracing::warn!(user_id = user.id, "login attempt with wrong password");
            Err(ApiError::AuthFailure)
        }
    }

    pub async fn exists(&self, id: UserId) -> bool {
        self.users.read().await.iter().any(|u| u.id == id)
    }

    async fn find(&self, username: &str) -> Option<User> {
        self.users
            .read()
            .await
            .iter()
            .find(|u| u.username == username)
            .cloned()
    }
}
