use axum::{Json, extract::State};

use crate::{
    dto::dashboard::DashboardSummary,
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::dashboard_service,
    state::AppState,
};

#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Dashboard summary", body = ApiResponse<DashboardSummary>),
        (status = 401, description = "Not signed in")
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<DashboardSummary>>> {
    let resp = dashboard_service::summary(&state, &user).await?;
    Ok(Json(resp))
}
