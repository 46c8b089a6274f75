use axum::{
    async_trait,
    body::HttpBody,
    extract::{rejection::JsonRejection, FromRequest},
    http::Request,
    BoxError, Json,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

/// Request bodies check themselves before a handler sees them. The first
/// failing rule becomes the 400 message.
pub trait Validate {
    fn validate(&self) -> Result<(), ApiError>;
}

fn required(field: &Option<String>, message: &str) -> Result<(), ApiError> {
    match field.as_deref() {
        Some(value) if !value.is_empty() => Ok(()),
        _ => Err(ApiError::Validation(message.to_string())),
    }
}

#[derive(Debug, serde::Deserialize)]
pub struct SignupSchema {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl Validate for SignupSchema {
    fn validate(&self) -> Result<(), ApiError> {
        required(&self.username, "Username is required")?;
        required(&self.password, "Password is required")
    }
}

#[derive(Debug, serde::Deserialize)]
pub struct LoginSchema {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl Validate for LoginSchema {
    fn validate(&self) -> Result<(), ApiError> {
        required(&self.username, "Username is required")?;
        required(&self.password, "Password is required")
    }
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshSchema {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl Validate for RefreshSchema {
    fn validate(&self) -> Result<(), ApiError> {
        required(&self.refresh_token, "Refresh token is required")
    }
}

// Struct representing the request body for creating a new Todo
#[derive(Debug, serde::Deserialize)]
pub struct CreateTodoSchema {
    #[serde(default)]
    pub title: Option<String>,
}

impl Validate for CreateTodoSchema {
    fn validate(&self) -> Result<(), ApiError> {
        required(&self.title, "Title is required")
    }
}

// Struct representing the request body for updating a Todo.
// `completed` stays untyped so a non-boolean gets our message, not serde's.
#[derive(Debug, serde::Deserialize)]
pub struct UpdateTodoSchema {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub completed: Option<Value>,
}

impl UpdateTodoSchema {
    pub fn completed(&self) -> Option<bool> {
        self.completed.as_ref().and_then(Value::as_bool)
    }
}

impl Validate for UpdateTodoSchema {
    fn validate(&self) -> Result<(), ApiError> {
        if self.title.is_some() {
            required(&self.title, "Title is required")?;
        }
        match &self.completed {
            None | Some(Value::Bool(_)) => Ok(()),
            Some(_) => Err(ApiError::Validation(
                "Completed must be a boolean value".to_string(),
            )),
        }
    }
}

/// `Json<T>` that also runs [`Validate`]. Malformed JSON is reported in the
/// same `{message}` shape as a failed rule.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S, B> FromRequest<S, B> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
    B: HttpBody + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request<B>, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| ApiError::Validation(rejection.body_text()))?;
        value.validate()?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn message<T: DeserializeOwned + Validate>(body: Value) -> Option<String> {
        let schema: T = serde_json::from_value(body).unwrap();
        match schema.validate() {
            Ok(()) => None,
            Err(ApiError::Validation(message)) => Some(message),
            Err(other) => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn signup_reports_first_failing_rule() {
        assert_eq!(
            message::<SignupSchema>(json!({})).as_deref(),
            Some("Username is required")
        );
        assert_eq!(
            message::<SignupSchema>(json!({ "username": "alice", "password": "" })).as_deref(),
            Some("Password is required")
        );
        assert_eq!(
            message::<SignupSchema>(json!({ "username": "alice", "password": "pw" })),
            None
        );
    }

    #[test]
    fn refresh_token_is_required() {
        assert_eq!(
            message::<RefreshSchema>(json!({ "refreshToken": "" })).as_deref(),
            Some("Refresh token is required")
        );
        assert_eq!(message::<RefreshSchema>(json!({ "refreshToken": "abc" })), None);
    }

    #[test]
    fn create_todo_needs_a_title() {
        assert_eq!(
            message::<CreateTodoSchema>(json!({ "title": "" })).as_deref(),
            Some("Title is required")
        );
    }

    #[test]
    fn update_todo_fields_are_optional_but_checked() {
        assert_eq!(message::<UpdateTodoSchema>(json!({})), None);
        assert_eq!(
            message::<UpdateTodoSchema>(json!({ "title": "" })).as_deref(),
            Some("Title is required")
        );
        assert_eq!(
            message::<UpdateTodoSchema>(json!({ "completed": "yes" })).as_deref(),
            Some("Completed must be a boolean value")
        );

        let schema: UpdateTodoSchema = serde_json::from_value(json!({ "completed": true })).unwrap();
        assert_eq!(schema.completed(), Some(true));
    }
}
