use std::sync::Arc;

use actix_web::web;
use chrono::NaiveDate;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::middleware::RateLimiter;
use crate::models::AppState;
use shared::{CreateTrackerRequest, CreateUserRequest, User};

/// Fresh in-memory database with the full migration schema applied. A single
/// connection keeps every query in the test on the same in-memory store.
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("failed to open in-memory database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("failed to run migrations");

    pool
}

pub async fn register_test_user(pool: &SqlitePool, username: &str) -> User {
    crate::services::auth::register_user(
        pool,
        &CreateUserRequest {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: "password123".to_string(),
        },
    )
    .await
    .expect("failed to register test user")
}

pub fn test_app_state(pool: SqlitePool) -> web::Data<AppState> {
    web::Data::new(AppState {
        db: pool,
        config: Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: "test-secret".to_string(),
            access_token_expire_minutes: 30,
            refresh_token_expire_days: 7,
            cors_origins: Vec::new(),
        },
        login_rate_limiter: Arc::new(RateLimiter::new(5, 15 * 60)),
    })
}

pub fn test_tracker_request(name: &str) -> CreateTrackerRequest {
    CreateTrackerRequest {
        start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
        budget: 300.0,
        name: name.to_string(),
        description: None,
    }
}
