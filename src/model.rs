use serde::Serialize;

pub type UserId = u64;
pub type TodoId = u64;

#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub password_hash: String,
}

// Data model representing a Todo item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub completed: bool,
    pub user_id: UserId,
}

// Identity attached to a request by the auth middleware
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub id: UserId,
}
