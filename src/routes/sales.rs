use axum::{Json, Router, extract::State, http::StatusCode, routing::post};

use crate::{
    dto::sales::{RecordSaleRequest, RecordedSale},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::sale_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(record_sale))
}

#[utoipa::path(
    post,
    path = "/api/sales",
    request_body = RecordSaleRequest,
    responses(
        (status = 201, description = "Sale recorded", body = ApiResponse<RecordedSale>),
        (status = 400, description = "Empty cart, missing name or insufficient stock"),
        (status = 401, description = "Not signed in"),
    ),
    security(("bearer_auth" = [])),
    tag = "Sales"
)]
pub async fn record_sale(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<RecordSaleRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<RecordedSale>>)> {
    let resp = sale_service::record_sale(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}
