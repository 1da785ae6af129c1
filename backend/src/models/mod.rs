use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Config;
use crate::middleware::RateLimiter;

pub mod expense;
pub mod refresh_token;
pub mod tracker;
pub mod user;

pub use expense::*;
pub use refresh_token::*;
pub use tracker::*;
pub use user::*;

/// Application state shared across all handlers
pub struct AppState {
    pub db: SqlitePool,
    pub config: Config,
    pub login_rate_limiter: Arc<RateLimiter>,
}
