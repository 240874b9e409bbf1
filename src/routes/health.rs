use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    dto::auth::AuthenticatedEcho,
    error::AppResult,
    middleware::auth::AuthUser,
    response::{ApiResponse, Meta},
    services::auth_service::find_profile,
    state::AppState,
};

#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthData {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "OK", body = ApiResponse<HealthData>),
    ),
    tag = "Health"
)]
pub async fn health_check() -> Json<ApiResponse<HealthData>> {
    let data = HealthData {
        status: "ok".to_string(),
        timestamp: Utc::now(),
    };

    Json(ApiResponse::success(
        "Server is running",
        data,
        Some(Meta::empty()),
    ))
}

#[utoipa::path(
    get,
    path = "/api/protected-test",
    responses(
        (status = 200, description = "Token accepted", body = ApiResponse<AuthenticatedEcho>),
        (status = 401, description = "Missing, invalid or revoked token"),
    ),
    security(("bearer_auth" = [])),
    tag = "Health"
)]
pub async fn protected_test(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<AuthenticatedEcho>>> {
    let profile = find_profile(&state, user.user_id).await?;
    let message = format!("Hello {}, you are authenticated", profile.email);
    let data = AuthenticatedEcho {
        user_id: profile.id,
        email: profile.email,
    };
    Ok(Json(ApiResponse::success(message, data, Some(Meta::empty()))))
}
