use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde_json::json;

use crate::{
    error::ApiError,
    model::{CurrentUser, TodoId},
    schema::{
        CreateTodoSchema, LoginSchema, RefreshSchema, SignupSchema, UpdateTodoSchema,
        ValidatedJson,
    },
    AppState,
};

// Handler for the health checker route
pub async fn health_checker_handler() -> impl IntoResponse {
    const MESSAGE: &str = "Todo API with JWT auth, Rust and Axum";

    Json(json!({
        "status": "success",
        "message": MESSAGE
    }))
}

pub async fn handler_404() -> ApiError {
    ApiError::RouteNotFound
}

pub async fn signup(
    State(data): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<SignupSchema>,
) -> Result<impl IntoResponse, ApiError> {
    let username = body.username.unwrap_or_default();
    let password = body.password.unwrap_or_default();

    let user = data.users.register(&username, &password).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": user.id, "username": user.username })),
    ))
}

pub async fn login(
    State(data): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<LoginSchema>,
) -> Result<impl IntoResponse, ApiError> {
    let username = body.username.unwrap_or_default();
    let password = body.password.unwrap_or_default();

    let user_id = data.users.verify(&username, &password).await?;

    let token = data.tokens.issue_access_token(user_id)?;
    let refresh_token = data.tokens.issue_refresh_token(user_id)?;
    data.tokens.bind_refresh(&refresh_token, user_id).await;
    tracing::info!(user_id, "user logged in");

    Ok(Json(json!({ "token": token, "refreshToken": refresh_token })))
}

pub async fn refresh(
    State(data): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<RefreshSchema>,
) -> Result<impl IntoResponse, ApiError> {
    let refresh_token = body.refresh_token.unwrap_or_default();
    let token = data.tokens.refresh(&refresh_token, &data.users).await?;

    Ok(Json(json!({ "token": token })))
}

// Handler for getting all Todo items of the caller
pub async fn get_todos(
    State(data): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> impl IntoResponse {
    Json(data.todos.list(user.id).await)
}

pub async fn create_todo(
    State(data): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(body): ValidatedJson<CreateTodoSchema>,
) -> impl IntoResponse {
    let title = body.title.unwrap_or_default();
    Json(data.todos.create(user.id, &title).await)
}

pub async fn get_todo(
    Path(id): Path<String>,
    State(data): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let todo = data.todos.get(user.id, parse_todo_id(&id)?).await?;
    Ok(Json(todo))
}

pub async fn update_todo(
    Path(id): Path<String>,
    State(data): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(body): ValidatedJson<UpdateTodoSchema>,
) -> Result<impl IntoResponse, ApiError> {
    let todo = data
        .todos
        .update(
            user.id,
            parse_todo_id(&id)?,
            body.title.as_deref(),
            body.completed(),
        )
        .await?;
    Ok(Json(todo))
}

pub async fn delete_todo(
    Path(id): Path<String>,
    State(data): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let todo = data.todos.delete(user.id, parse_todo_id(&id)?).await?;
    Ok(Json(todo))
}

// A non-numeric id can't name any todo.
fn parse_todo_id(raw: &str) -> Result<TodoId, ApiError> {
    raw.parse().map_err(|_| ApiError::NotFound)
}
