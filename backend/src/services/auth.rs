use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{RefreshTokenRow, UserRow};
use shared::{CreateUserRequest, User};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Username or email already registered")]
    DuplicateUser,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Password hashing error")]
    HashingError,
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

/// Hash a password with a fresh random salt. Two calls on the same input
/// produce different strings; both verify.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    Ok(argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| AuthError::HashingError)?
        .to_string())
}

/// Verify a password against a stored PHC hash string. A malformed hash
/// verifies as false rather than erroring.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Register a new user. Uniqueness of username and email is enforced by the
/// store; a constraint violation (including one from a concurrent
/// registration) surfaces as `DuplicateUser`.
pub async fn register_user(pool: &SqlitePool, request: &CreateUserRequest) -> Result<User, AuthError> {
    let password_hash = hash_password(&request.password)?;

    let id = Uuid::new_v4();
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO users (id, username, email, password_hash, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(&request.username)
    .bind(&request.email)
    .bind(&password_hash)
    .bind(now)
    .execute(pool)
    .await;

    match result {
        Ok(_) => {}
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            return Err(AuthError::DuplicateUser);
        }
        Err(e) => return Err(e.into()),
    }

    Ok(User {
        id,
        username: request.username.clone(),
        email: request.email.clone(),
        created_at: now,
    })
}

pub async fn authenticate_user(
    pool: &SqlitePool,
    username: &str,
    password: &str,
) -> Result<User, AuthError> {
    let user: UserRow = sqlx::query_as("SELECT * FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !verify_password(password, &user.password_hash) {
        return Err(AuthError::InvalidCredentials);
    }

    Ok(user.to_shared())
}

pub async fn get_user_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>, AuthError> {
    let user: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await?;

    Ok(user.map(|u| u.to_shared()))
}

pub fn create_access_token(
    username: &str,
    secret: &str,
    expire_minutes: i64,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let exp = now + Duration::minutes(expire_minutes);

    let claims = Claims {
        sub: username.to_string(),
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Verify an access token and return its subject (the username). Expired,
/// tampered, and malformed tokens all fail the same way.
pub fn verify_access_token(token: &str, secret: &str) -> Result<String, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AuthError::InvalidToken)?;

    Ok(token_data.claims.sub)
}

/// Issue an opaque refresh token for a user: 32 random bytes, URL-safe
/// base64, persisted with a fixed expiry. The raw token is the secret and is
/// returned to the caller.
pub async fn create_refresh_token(
    pool: &SqlitePool,
    user_id: &Uuid,
    expire_days: i64,
) -> Result<String, AuthError> {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    let token = URL_SAFE_NO_PAD.encode(bytes);

    let now = Utc::now();
    let expires_at = now + Duration::days(expire_days);

    sqlx::query(
        r#"
        INSERT INTO refresh_tokens (token, user_id, expires_at, is_active, created_at)
        VALUES (?, ?, ?, TRUE, ?)
        "#,
    )
    .bind(&token)
    .bind(user_id.to_string())
    .bind(expires_at)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(token)
}

/// Resolve a refresh token to its owning user. Only active, unexpired tokens
/// resolve; anything else is `None`.
pub async fn verify_refresh_token(pool: &SqlitePool, token: &str) -> Result<Option<User>, AuthError> {
    let row: Option<RefreshTokenRow> = sqlx::query_as(
        "SELECT * FROM refresh_tokens WHERE token = ? AND is_active = TRUE AND expires_at > ?",
    )
    .bind(token)
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let user: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(&row.user_id)
        .fetch_optional(pool)
        .await?;

    Ok(user.map(|u| u.to_shared()))
}

/// Deactivate a refresh token. Returns false when no matching active token
/// exists.
pub async fn revoke_refresh_token(pool: &SqlitePool, token: &str) -> Result<bool, AuthError> {
    let result = sqlx::query(
        "UPDATE refresh_tokens SET is_active = FALSE WHERE token = ? AND is_active = TRUE",
    )
    .bind(token)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Deactivate every active refresh token belonging to a user
/// (logout-everywhere).
pub async fn revoke_all_refresh_tokens(pool: &SqlitePool, user_id: &Uuid) -> Result<u64, AuthError> {
    let result = sqlx::query(
        "UPDATE refresh_tokens SET is_active = FALSE WHERE user_id = ? AND is_active = TRUE",
    )
    .bind(user_id.to_string())
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Delete all refresh tokens whose expiry has passed, active or not.
/// Invoked by the periodic maintenance sweep.
pub async fn cleanup_expired_refresh_tokens(pool: &SqlitePool) -> Result<u64, AuthError> {
    let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at <= ?")
        .bind(Utc::now())
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
