use axum::{
    Json, Router,
    http::{StatusCode, Uri},
    routing::get,
};

use crate::{
    response::{ApiResponse, Meta},
    spa::spa_service,
    state::AppState,
};

pub mod auth;
pub mod dashboard;
pub mod doc;
pub mod health;
pub mod inventory;
pub mod invoices;
pub mod products;
pub mod profile;
pub mod sales;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/protected-test", get(health::protected_test))
        .route("/profile", get(profile::get_profile))
        .route("/dashboard", get(dashboard::dashboard))
        .nest("/auth", auth::router())
        .nest("/products", products::router())
        .nest("/inventory", inventory::router())
        .nest("/sales", sales::router())
        .nest("/invoices", invoices::router())
        .fallback(not_found)
}

/// API under `/api`, docs under `/docs`, and the single-page app for every other path.
pub fn create_app(state: AppState) -> Router {
    let spa = spa_service(&state.config.static_dir);
    Router::new()
        .nest("/api", create_api_router())
        .merge(doc::scalar_docs())
        .fallback_service(spa)
        .with_state(state)
}

pub async fn not_found(uri: Uri) -> (StatusCode, Json<ApiResponse<serde_json::Value>>) {
    let body = ApiResponse::success(
        "Not Found",
        serde_json::json!({ "path": uri.path() }),
        Some(Meta::empty()),
    );
    (StatusCode::NOT_FOUND, Json(body))
}
