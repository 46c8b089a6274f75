use std::{any::Any, sync::Arc};

use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method, StatusCode,
    },
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

use crate::{handler::*, middleware::mw_require_auth, AppState};

pub fn create_router(app_state: Arc<AppState>, cors_origin: HeaderValue) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_credentials(true)
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE]);

    // Each method router falls back to the JSON 404 too, so a known path
    // with an unsupported method answers like an unknown path.
    let protected = Router::new()
        .route(
            "/todos",
            get(get_todos).post(create_todo).fallback(handler_404),
        )
        .route(
            "/todos/:id",
            get(get_todo)
                .put(update_todo)
                .delete(delete_todo)
                .fallback(handler_404),
        )
        .route_layer(from_fn_with_state(app_state.clone(), mw_require_auth));

    Router::new()
        .merge(protected)
        .route("/signup", post(signup).fallback(handler_404))
        .route("/login", post(login).fallback(handler_404))
        .route("/refresh", post(refresh).fallback(handler_404))
        .route("/", get(health_checker_handler).fallback(handler_404))
        .fallback(handler_404)
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic))
}

fn handle_panic(_err: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!("handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "message": "Internal server error" })),
    )
        .into_response()
}
