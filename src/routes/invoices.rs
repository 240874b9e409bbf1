use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::sales::{InvoiceList, InvoiceReceipt},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::invoice_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_invoices))
        .route("/{id}/receipt", get(get_receipt))
}

#[utoipa::path(
    get,
    path = "/api/invoices",
    responses(
        (status = 200, description = "Invoices, newest first", body = ApiResponse<InvoiceList>),
        (status = 401, description = "Not signed in"),
    ),
    security(("bearer_auth" = [])),
    tag = "Invoices"
)]
pub async fn list_invoices(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<ApiResponse<InvoiceList>>> {
    let resp = invoice_service::list_invoices(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/invoices/{id}/receipt",
    params(
        ("id" = Uuid, Path, description = "Invoice ID")
    ),
    responses(
        (status = 200, description = "Invoice with recomputed receipt", body = ApiResponse<InvoiceReceipt>),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Invoices"
)]
pub async fn get_receipt(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<InvoiceReceipt>>> {
    let resp = invoice_service::get_receipt(&state, id).await?;
    Ok(Json(resp))
}
