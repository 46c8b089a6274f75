use std::sync::Arc;

use anyhow::Context;
use axum::{http::HeaderValue, Server};
use tracing_subscriber::EnvFilter;

use axum_todo_auth::{config::Config, route::create_router, AppState};

// Entry point of the application
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("axum_todo_auth=debug,tower_http=debug")),
        )
        .init();

    let config = Config::from_env()?;

    let app_state = Arc::new(AppState::new(&config));
    if config.seed_demo_users {
        app_state
            .seed_demo_users()
            .await
            .context("failed to seed demo users")?;
    }

    let cors_origin = config
        .cors_origin
        .parse::<HeaderValue>()
        .context("CORS_ORIGIN is not a valid header value")?;
    let app = create_router(app_state, cors_origin);

    let addr = config.addr()?;
    tracing::info!(%addr, "server listening");

    Server::bind(&addr).serve(app.into_make_service()).await?;
    Ok(())
}
