use actix_web::{web, HttpResponse, Result};

use shared::{
    AccessTokenResponse, ApiError, CreateUserRequest, LoginRequest, MessageResponse,
    RefreshTokenRequest, TokenPairResponse,
};

use crate::handlers::unauthorized;
use crate::models::AppState;
use crate::services::auth as auth_service;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/register", web::post().to(register))
        .route("/login", web::post().to(login))
        .route("/refresh", web::post().to(refresh))
        .route("/logout", web::post().to(logout))
        .route("/logout-all", web::post().to(logout_all))
        .route("/me", web::get().to(me));
}

async fn register(
    state: web::Data<AppState>,
    body: web::Json<CreateUserRequest>,
) -> Result<HttpResponse> {
    let request = body.into_inner();

    if request.username.is_empty() || request.email.is_empty() || request.password.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiError {
            error: "validation_error".to_string(),
            message: "Username, email, and password are required".to_string(),
        }));
    }

    if request.password.len() < 8 {
        return Ok(HttpResponse::BadRequest().json(ApiError {
            error: "validation_error".to_string(),
            message: "Password must be at least 8 characters".to_string(),
        }));
    }

    match auth_service::register_user(&state.db, &request).await {
        Ok(user) => Ok(HttpResponse::Ok().json(user)),
        Err(auth_service::AuthError::DuplicateUser) => {
            Ok(HttpResponse::BadRequest().json(ApiError {
                error: "duplicate_resource".to_string(),
                message: "Username or email already registered".to_string(),
            }))
        }
        Err(e) => {
            log::error!("Registration error: {:?}", e);
            Ok(HttpResponse::InternalServerError().json(ApiError {
                error: "internal_error".to_string(),
                message: "Failed to register user".to_string(),
            }))
        }
    }
}

async fn login(state: web::Data<AppState>, body: web::Json<LoginRequest>) -> Result<HttpResponse> {
    let request = body.into_inner();

    if !state.login_rate_limiter.allow(&request.username) {
        return Ok(HttpResponse::TooManyRequests().json(ApiError {
            error: "rate_limited".to_string(),
            message: "Too many failed login attempts, try again later".to_string(),
        }));
    }

    let user = match auth_service::authenticate_user(&state.db, &request.username, &request.password)
        .await
    {
        Ok(user) => user,
        Err(auth_service::AuthError::InvalidCredentials) => {
            state.login_rate_limiter.record_failure(&request.username);
            return Ok(HttpResponse::Unauthorized().json(ApiError {
                error: "authentication_error".to_string(),
                message: "Incorrect username or password".to_string(),
            }));
        }
        Err(e) => {
            log::error!("Login error: {:?}", e);
            return Ok(HttpResponse::InternalServerError().json(ApiError {
                error: "internal_error".to_string(),
                message: "Failed to log in".to_string(),
            }));
        }
    };

    state.login_rate_limiter.reset(&request.username);

    let access_token = match auth_service::create_access_token(
        &user.username,
        &state.config.jwt_secret,
        state.config.access_token_expire_minutes,
    ) {
        Ok(token) => token,
        Err(e) => {
            log::error!("Access token creation error: {:?}", e);
            return Ok(HttpResponse::InternalServerError().json(ApiError {
                error: "internal_error".to_string(),
                message: "Failed to create token".to_string(),
            }));
        }
    };

    match auth_service::create_refresh_token(
        &state.db,
        &user.id,
        state.config.refresh_token_expire_days,
    )
    .await
    {
        Ok(refresh_token) => Ok(HttpResponse::Ok().json(TokenPairResponse {
            access_token,
            refresh_token,
            token_type: "bearer".to_string(),
        })),
        Err(e) => {
            log::error!("Refresh token creation error: {:?}", e);
            Ok(HttpResponse::InternalServerError().json(ApiError {
                error: "internal_error".to_string(),
                message: "Failed to create token".to_string(),
            }))
        }
    }
}

async fn refresh(
    state: web::Data<AppState>,
    body: web::Json<RefreshTokenRequest>,
) -> Result<HttpResponse> {
    let request = body.into_inner();

    match auth_service::verify_refresh_token(&state.db, &request.refresh_token).await {
        Ok(Some(user)) => {
            match auth_service::create_access_token(
                &user.username,
                &state.config.jwt_secret,
                state.config.access_token_expire_minutes,
            ) {
                Ok(access_token) => Ok(HttpResponse::Ok().json(AccessTokenResponse {
                    access_token,
                    token_type: "bearer".to_string(),
                })),
                Err(e) => {
                    log::error!("Access token creation error: {:?}", e);
                    Ok(HttpResponse::InternalServerError().json(ApiError {
                        error: "internal_error".to_string(),
                        message: "Failed to create token".to_string(),
                    }))
                }
            }
        }
        Ok(None) => Ok(HttpResponse::Unauthorized().json(ApiError {
            error: "invalid_refresh_token".to_string(),
            message: "Invalid or expired refresh token".to_string(),
        })),
        Err(e) => {
            log::error!("Refresh token verification error: {:?}", e);
            Ok(HttpResponse::InternalServerError().json(ApiError {
                error: "internal_error".to_string(),
                message: "Failed to refresh token".to_string(),
            }))
        }
    }
}

async fn logout(
    state: web::Data<AppState>,
    body: web::Json<RefreshTokenRequest>,
) -> Result<HttpResponse> {
    let request = body.into_inner();

    match auth_service::revoke_refresh_token(&state.db, &request.refresh_token).await {
        Ok(true) => Ok(HttpResponse::Ok().json(MessageResponse {
            message: "Successfully logged out".to_string(),
        })),
        Ok(false) => Ok(HttpResponse::BadRequest().json(ApiError {
            error: "invalid_refresh_token".to_string(),
            message: "Invalid refresh token".to_string(),
        })),
        Err(e) => {
            log::error!("Logout error: {:?}", e);
            Ok(HttpResponse::InternalServerError().json(ApiError {
                error: "internal_error".to_string(),
                message: "Failed to log out".to_string(),
            }))
        }
    }
}

async fn logout_all(
    state: web::Data<AppState>,
    req: actix_web::HttpRequest,
) -> Result<HttpResponse> {
    let user = match crate::middleware::auth::authenticate(&req, &state.db, &state.config.jwt_secret)
        .await
    {
        Ok(user) => user,
        Err(_) => return Ok(unauthorized()),
    };

    match auth_service::revoke_all_refresh_tokens(&state.db, &user.id).await {
        Ok(_) => Ok(HttpResponse::Ok().json(MessageResponse {
            message: "Logged out of all sessions".to_string(),
        })),
        Err(e) => {
            log::error!("Logout-all error: {:?}", e);
            Ok(HttpResponse::InternalServerError().json(ApiError {
                error: "internal_error".to_string(),
                message: "Failed to log out".to_string(),
            }))
        }
    }
}

async fn me(state: web::Data<AppState>, req: actix_web::HttpRequest) -> Result<HttpResponse> {
    match crate::middleware::auth::authenticate(&req, &state.db, &state.config.jwt_secret).await {
        Ok(user) => Ok(HttpResponse::Ok().json(user)),
        Err(_) => Ok(unauthorized()),
    }
}
