use axum::{Json, extract::State};

use crate::{
    error::AppResult,
    middleware::auth::AuthUser,
    models::UserProfile,
    response::{ApiResponse, Meta},
    services::auth_service::find_profile,
    state::AppState,
};

#[utoipa::path(
    get,
    path = "/api/profile",
    responses(
        (status = 200, description = "Read-only profile", body = ApiResponse<UserProfile>),
        (status = 401, description = "Not signed in")
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<UserProfile>>> {
    let profile = find_profile(&state, user.user_id).await?;
    Ok(Json(ApiResponse::success("Profile", profile, Some(Meta::empty()))))
}
