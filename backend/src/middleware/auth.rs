use actix_web::HttpRequest;
use sqlx::SqlitePool;

use crate::services::auth as auth_service;

/// Resolve the bearer access token on a request to the authenticated user.
///
/// Every failure mode (missing header, malformed header, bad signature,
/// expired token, unknown subject) collapses into the same error so the
/// response leaks nothing about which step failed.
pub async fn authenticate(
    req: &HttpRequest,
    pool: &SqlitePool,
    jwt_secret: &str,
) -> Result<shared::User, AuthMiddlewareError> {
    let auth_header = req
        .headers()
        .get("Authorization")
        .ok_or(AuthMiddlewareError::MissingToken)?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AuthMiddlewareError::InvalidToken)?;

    if !auth_str.starts_with("Bearer ") {
        return Err(AuthMiddlewareError::InvalidToken);
    }

    let token = &auth_str[7..];

    let username = auth_service::verify_access_token(token, jwt_secret)
        .map_err(|_| AuthMiddlewareError::InvalidToken)?;

    // A deleted user may still hold a syntactically valid token.
    auth_service::get_user_by_username(pool, &username)
        .await
        .map_err(|_| AuthMiddlewareError::InvalidToken)?
        .ok_or(AuthMiddlewareError::InvalidToken)
}

#[derive(Debug)]
pub enum AuthMiddlewareError {
    MissingToken,
    InvalidToken,
}

impl std::fmt::Display for AuthMiddlewareError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthMiddlewareError::MissingToken => write!(f, "Missing authorization token"),
            AuthMiddlewareError::InvalidToken => write!(f, "Invalid authorization token"),
        }
    }
}

impl std::error::Error for AuthMiddlewareError {}
