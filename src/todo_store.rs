use tokio::sync::RwLock;

use crate::{
    error::ApiError,
    model::{Todo, TodoId, UserId},
};

struct TodoTable {
    next_id: TodoId,
    todos: Vec<Todo>,
}

/// Owner-scoped todo storage. Every lookup matches on both the todo id and
/// the owning user, so another user's todo is indistinguishable from a
/// missing one.
pub struct TodoStore {
    table: RwLock<TodoTable>,
}

impl Default for TodoStore {
    fn default() -> Self {
        Self {
            table: RwLock::new(TodoTable {
                next_id: 1,
                todos: Vec::new(),
            }),
        }
    }
}

impl TodoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids come from a counter, so deleting a todo never frees its id.
    pub async fn create(&self, user_id: UserId, title: &str) -> Todo {
        let mut table = self.table.write().await;
        let todo = Todo {
            id: table.next_id,
            title: title.to_owned(),
            completed: false,
            user_id,
        };
        table.next_id += 1;
        table.todos.push(todo.clone());
        tracing::debug!(todo_id = todo.id, user_id, "created todo");
        todo
    }

    pub async fn list(&self, user_id: UserId) -> Vec<Todo> {
        self.table
            .read()
            .await
            .todos
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect()
    }

    pub async fn get(&self, user_id: UserId, id: TodoId) -> Result<Todo, ApiError> {
        self.table
            .read()
            .await
            .todos
            .iter()
            .find(|t| t.id == id && t.user_id == user_id)
            .cloned()
            .ok_or(ApiError::NotFound)
    }

    /// Partial update. `None` keeps the stored value; so does an empty title.
    pub async fn update(
        &self,
        user_id: UserId,
        id: TodoId,
        title: Option<&str>,
        completed: Option<bool>,
    ) -> Result<Todo, ApiError> {
        let mut table = self.table.write().await;
        let todo = table
            .todos
            .iter_mut()
            .find(|t| t.id == id && t.user_id == user_id)
            .ok_or(ApiError::NotFound)?;

        if let Some(title) = title.filter(|t| !t.is_empty()) {
            todo.title = title.to_owned();
        }
        if let Some(completed) = completed {
            todo.completed = completed;
        }
        tracing::debug!(todo_id = id, user_id, "updated todo");

        Ok(todo.clone())
    }

    pub async fn delete(&self, user_id: UserId, id: TodoId) -> Result<Todo, ApiError> {
        let mut table = self.table.write().await;
        let index = table
            .todos
            .iter()
            .position(|t| t.id == id && t.user_id == user_id)
            .ok_or(ApiError::NotFound)?;

        let todo = table.todos.remove(index);
        tracing::debug!(todo_id = id, user_id, "deleted todo");
        Ok(todo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: UserId = 1;
    const BOB: UserId = 2;

    #[tokio::test]
    async fn create_starts_incomplete_and_lists_in_insertion_order() {
        let store = TodoStore::new();
        let milk = store.create(ALICE, "buy milk").await;
        store.create(BOB, "walk dog").await;
        let bread = store.create(ALICE, "buy bread").await;

        assert_eq!(
            milk,
            Todo {
                id: 1,
                title: "buy milk".to_string(),
                completed: false,
                user_id: ALICE,
            }
        );
        assert_eq!(store.list(ALICE).await, vec![milk, bread]);
        assert_eq!(store.list(BOB).await.len(), 1);
    }

    #[tokio::test]
    async fn other_users_todo_is_not_found() {
        let store = TodoStore::new();
        let todo = store.create(ALICE, "secret plan").await;

        assert!(matches!(store.get(BOB, todo.id).await, Err(ApiError::NotFound)));
        assert!(matches!(
            store.update(BOB, todo.id, Some("hijacked"), Some(true)).await,
            Err(ApiError::NotFound)
        ));
        assert!(matches!(store.delete(BOB, todo.id).await, Err(ApiError::NotFound)));

        // Untouched for the owner.
        assert_eq!(store.get(ALICE, todo.id).await.unwrap(), todo);
    }

    #[tokio::test]
    async fn update_only_touches_supplied_fields() {
        let store = TodoStore::new();
        let todo = store.create(ALICE, "draft").await;

        let renamed = store.update(ALICE, todo.id, Some("final"), None).await.unwrap();
        assert_eq!(renamed.title, "final");
        assert!(!renamed.completed);

        let done = store.update(ALICE, todo.id, None, Some(true)).await.unwrap();
        assert_eq!(done.title, "final");
        assert!(done.completed);
    }

    #[tokio::test]
    async fn empty_title_on_update_keeps_previous_title() {
        let store = TodoStore::new();
        let todo = store.create(ALICE, "keep me").await;

        let updated = store.update(ALICE, todo.id, Some(""), Some(true)).await.unwrap();
        assert_eq!(updated.title, "keep me");
        assert!(updated.completed);
    }

    #[tokio::test]
    async fn delete_returns_record_and_ids_are_not_reused() {
        let store = TodoStore::new();
        store.create(ALICE, "one").await;
        let two = store.create(ALICE, "two").await;

        let deleted = store.delete(ALICE, two.id).await.unwrap();
        assert_eq!(deleted, two);
        assert!(matches!(store.get(ALICE, two.id).await, Err(ApiError::NotFound)));

        let three = store.create(ALICE, "three").await;
        assert_eq!(three.id, 3);
    }
}
