use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::inventory::{AdjustmentResult, ApplyCountsRequest, JournalList, ProductList},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::inventory_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_inventory))
        .route("/adjustments", post(apply_counts))
        .route("/{id}/journal", get(product_journal))
}

#[utoipa::path(
    get,
    path = "/api/inventory",
    responses(
        (status = 200, description = "Current stock levels", body = ApiResponse<ProductList>),
        (status = 401, description = "Not signed in")
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn list_inventory(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = inventory_service::product_listing(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/inventory/adjustments",
    request_body = ApplyCountsRequest,
    responses(
        (status = 200, description = "Counts applied as journal adjustments", body = ApiResponse<AdjustmentResult>),
        (status = 400, description = "Invalid counts"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Unknown product"),
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn apply_counts(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ApplyCountsRequest>,
) -> AppResult<Json<ApiResponse<AdjustmentResult>>> {
    let resp = inventory_service::apply_physical_counts(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/inventory/{id}/journal",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Journal history, newest first", body = ApiResponse<JournalList>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn product_journal(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<JournalList>>> {
    let resp = inventory_service::product_journal(&state, &user, id).await?;
    Ok(Json(resp))
}
