use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::{
    dto::auth::{Claims, SessionInfo, SignInRequest, SignInResponse},
    entity::{
        Sessions, Users,
        sessions::ActiveModel as SessionActive,
        users::Column as UserCol,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::UserProfile,
    response::{ApiResponse, Meta},
    state::AppState,
};

const INVALID_CREDENTIALS: &str = "Invalid login credentials";

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

pub async fn sign_in(
    state: &AppState,
    payload: SignInRequest,
) -> AppResult<ApiResponse<SignInResponse>> {
    let SignInRequest { email, password } = payload;
    let email = email.trim().to_lowercase();

    let user = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?;

    let user = match user {
        Some(u) => u,
        None => {
            tracing::info!("sign-in rejected: unknown email");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
        }
    };

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    let argon2 = Argon2::default();
    if argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        tracing::info!(user_id = %user.id, "sign-in rejected: wrong password");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    }

    let expires_at = Utc::now()
        .checked_add_signed(Duration::hours(state.config.session_ttl_hours))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let session = SessionActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.id),
        expires_at: Set(expires_at.into()),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    let claims = Claims {
        sub: user.id.to_string(),
        sid: session.id.to_string(),
        role: user.role.clone(),
        exp: expires_at.timestamp() as usize,
    };

    let access_token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;

    tracing::info!(user_id = %user.id, session_id = %session.id, "signed in");

    let resp = SignInResponse {
        access_token,
        token_type: "Bearer".into(),
        expires_at,
        profile: UserProfile::from(user),
    };

    Ok(ApiResponse::success(
        "Signed in",
        resp,
        Some(Meta::empty()),
    ))
}

/// Revokes the caller's session. Tokens issued for it stop working at once.
pub async fn sign_out(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<serde_json::Value>> {
    Sessions::delete_by_id(user.session_id)
        .exec(&state.orm)
        .await?;

    tracing::info!(user_id = %user.user_id, session_id = %user.session_id, "signed out");
    Ok(ApiResponse::success(
        "Signed out",
        serde_json::json!({ "session_id": user.session_id }),
        Some(Meta::empty()),
    ))
}

pub async fn current_session(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<SessionInfo>> {
    let session = Sessions::find_by_id(user.session_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Session expired or signed out".into()))?;
    let profile = find_profile(state, user.user_id).await?;

    Ok(ApiResponse::success(
        "Session",
        SessionInfo {
            session_id: session.id,
            expires_at: session.expires_at.with_timezone(&Utc),
            profile,
        },
        Some(Meta::empty()),
    ))
}

pub async fn find_profile(state: &AppState, user_id: Uuid) -> AppResult<UserProfile> {
    Users::find_by_id(user_id)
        .one(&state.orm)
        .await?
        .map(UserProfile::from)
        .ok_or(AppError::NotFound)
}
