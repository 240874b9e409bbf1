use axum::{extract::FromRequestParts, http::header};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, Validation, decode};
use sea_orm::EntityTrait;
use uuid::Uuid;

use crate::{
    dto::auth::Claims,
    entity::Sessions,
    error::AppError,
    models::Role,
    state::AppState,
};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub session_id: Uuid,
    pub role: Role,
}

pub fn ensure_role(user: &AuthUser, role: Role) -> Result<(), AppError> {
    if user.role != role {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, Role::Admin)
}

/// Pulls the raw token out of an `Authorization: Bearer …` header value.
pub fn bearer_token(value: &str) -> Result<&str, AppError> {
    let (scheme, token) = value
        .split_once(' ')
        .ok_or_else(|| AppError::Unauthorized("Invalid Authorization scheme".into()))?;
    if !scheme.eq_ignore_ascii_case("Bearer") || token.trim().is_empty() {
        return Err(AppError::Unauthorized("Invalid Authorization scheme".into()));
    }
    Ok(token.trim())
}

pub fn decode_claims(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

        let token = bearer_token(auth_str)?;
        let claims = decode_claims(token, &state.config.jwt_secret)?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Unauthorized("Invalid user id in token".into()))?;
        let session_id = Uuid::parse_str(&claims.sid)
            .map_err(|_| AppError::Unauthorized("Invalid session id in token".into()))?;

        // Signed tokens outlive sign-out; the session row is the source of truth.
        let session = Sessions::find_by_id(session_id).one(&state.orm).await?;
        let session = match session {
            Some(s) if s.user_id == user_id && s.expires_at.with_timezone(&Utc) > Utc::now() => s,
            _ => {
                tracing::debug!(%session_id, "rejected token for missing or expired session");
                return Err(AppError::Unauthorized("Session expired or signed out".into()));
            }
        };

        Ok(AuthUser {
            user_id,
            session_id: session.id,
            role: Role::from_db(&claims.role),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_scheme_is_required() {
        assert_eq!(bearer_token("Bearer abc").unwrap(), "abc");
        assert_eq!(bearer_token("bearer  abc ").unwrap(), "abc");
        assert!(bearer_token("Basic abc").is_err());
        assert!(bearer_token("Bearer").is_err());
        assert!(bearer_token("Bearer   ").is_err());
    }

    #[test]
    fn admin_gate() {
        let mut user = AuthUser {
            user_id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            role: Role::Standard,
        };
        assert!(matches!(ensure_admin(&user), Err(AppError::Forbidden)));
        user.role = Role::Admin;
        assert!(ensure_admin(&user).is_ok());
    }
}
