use std::path::Path;

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer};
use crate::handlers::{
    create_admin_code, create_event, delete_admin_code, delete_event, health_check,
    list_admin_codes, list_events, verify_code,
};
use crate::services::AppState;

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/verify-code", post(verify_code))
        .route("/events", get(list_events).post(create_event))
        .route("/events/:id", delete(delete_event))
        .route("/admin-codes", get(list_admin_codes).post(create_admin_code))
        .route("/admin-codes/:code", delete(delete_admin_code))
}

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes())
        .layer(create_security_headers_layer())
        .with_state(state)
        .layer(create_cors_layer())
        .layer(TraceLayer::new_for_http())
}

/// Serves the site's static files for every non-API path, falling back to
/// `index.html` so client-side links resolve.
pub fn with_static_site(router: Router, static_dir: &Path) -> Router {
    if !static_dir.is_dir() {
        tracing::warn!("Static directory {} not found, serving API only", static_dir.display());
        return router;
    }

    let index = static_dir.join("index.html");
    router.fallback_service(ServeDir::new(static_dir).fallback(ServeFile::new(index)))
}
