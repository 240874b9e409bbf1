use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::inventory::ProductList,
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::inventory_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_products))
}

#[utoipa::path(
    get,
    path = "/api/products",
    responses(
        (status = 200, description = "Products ordered by display name", body = ApiResponse<ProductList>),
        (status = 401, description = "Not signed in")
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = inventory_service::product_listing(&state).await?;
    Ok(Json(resp))
}
