use axum::{middleware, routing::get, routing::post, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::infrastructure::config::Config;
use crate::infrastructure::db::DbPool;
use crate::{
    controllers::{health, narration::NarrationController},
    infrastructure::auth::{api_token_middleware, request_id_middleware},
};

/// All routes with their middleware
pub fn build_router(
    pool: Arc<DbPool>,
    config: Arc<Config>,
    narration_controller: Arc<NarrationController>,
) -> Router {
    // Narration trigger (optional shared-secret)
    let narration_routes = Router::new()
        .route("/api/narrations", post(NarrationController::start))
        .with_state(narration_controller)
        .layer(middleware::from_fn_with_state(
            config.clone(),
            api_token_middleware,
        ));

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::health_ready))
        .with_state(pool)
        .merge(narration_routes)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server with all routes configured
pub async fn start_http_server(
    pool: Arc<DbPool>,
    config: Arc<Config>,
    narration_controller: Arc<NarrationController>,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_router(pool, config.clone(), narration_controller);

    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
