//! HTTP surface for the category service.

mod error;
mod handlers;
mod middleware;
mod models;

pub use error::{ApiError, ApiErrorBody, ApiErrorMessage, codes};
pub use models::{CreateCategoryRequest, UpdateCategoryRequest};

use std::future::IntoFuture;
use std::time::Duration;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::application::categories::CategoryService;
use crate::config::ServerSettings;
use crate::infra::error::InfraError;

#[derive(Clone)]
pub struct HttpState {
    pub categories: CategoryService,
}

impl HttpState {
    pub fn new(categories: CategoryService) -> Self {
        Self { categories }
    }
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route(
            "/categories",
            post(handlers::create_category).get(handlers::list_categories),
        )
        .route(
            "/categories/{id}",
            get(handlers::get_category)
                .put(handlers::update_category)
                .delete(handlers::delete_category),
        )
        .route("/categories/{id}/lineage", get(handlers::category_lineage))
        .with_state(state)
        .layer(axum_middleware::from_fn(middleware::log_responses))
        .layer(axum_middleware::from_fn(middleware::set_request_context))
}

/// Serves `router` until Ctrl-C, then allows in-flight requests the configured grace period.
pub async fn serve(settings: &ServerSettings, router: Router) -> Result<(), InfraError> {
    let listener = TcpListener::bind(settings.addr).await?;
    let local_addr = listener.local_addr()?;
    info!(addr = %local_addr, "Listening for HTTP requests");

    let serving = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .into_future();

    tokio::select! {
        result = serving => result.map_err(InfraError::from),
        _ = drain_deadline(settings.graceful_shutdown) => {
            warn!(
                grace_ms = settings.graceful_shutdown.as_millis() as u64,
                "Graceful shutdown period elapsed with requests still in flight"
            );
            Ok(())
        }
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, draining connections");
}

async fn drain_deadline(grace: Duration) {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
    tokio::time::sleep(grace).await;
}
