use std::sync::Arc;

use axum::{
    extract::State,
    http::{self, HeaderMap, Request},
    middleware::Next,
    response::Response,
};

use crate::{
    error::ApiError,
    model::{CurrentUser, UserId},
    token::TokenService,
    AppState,
};

/// Pulls the bearer token out of `Authorization` and resolves it to a user id.
///
/// A missing header, another scheme or an empty token is `Unauthorized`;
/// a token the service rejects is `InvalidToken`.
pub fn authorize(headers: &HeaderMap, tokens: &TokenService) -> Result<UserId, ApiError> {
    let token = headers
        .get(http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|value| value.split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim())
        .filter(|token| !token.is_empty())
        .ok_or(ApiError::Unauthorized)?;

    tokens.verify_access(token)
}

pub async fn mw_require_auth<B>(
    State(state): State<Arc<AppState>>,
    mut request: Request<B>,
    next: Next<B>,
) -> Result<Response, ApiError> {
    let id = authorize(request.headers(), &state.tokens).map_err(|e| {
        tracing::warn!(path = %request.uri().path(), error = %e, "rejected request");
        e
    })?;

    request.extensions_mut().insert(CurrentUser { id });

    Ok(next.run(request).await)
}
