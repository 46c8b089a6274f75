pub mod config;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod model;
pub mod route;
pub mod schema;
pub mod todo_store;
pub mod token;
pub mod user_store;

use crate::{
    config::Config, error::ApiError, todo_store::TodoStore, token::TokenService,
    user_store::UserStore,
};

// Accounts the service can start with when SEED_DEMO_USERS is set
const DEMO_USERS: [(&str, &str); 2] = [("user1", "password1"), ("user2", "password2")];

// Struct representing the application state
pub struct AppState {
    pub users: UserStore,
    pub tokens: TokenService,
    pub todos: TodoStore,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            users: UserStore::new(config.bcrypt_cost),
            tokens: TokenService::new(&config.jwt_secret, config.access_token_ttl_secs),
            todos: TodoStore::new(),
        }
    }

    pub async fn seed_demo_users(&self) -> Result<(), ApiError> {
        for (username, password) in DEMO_USERS {
            let user = self.users.register(username, password).await?;
            tracing::info!(user_id = user.id, username, "seeded demo user");
        }
        Ok(())
    }
}
