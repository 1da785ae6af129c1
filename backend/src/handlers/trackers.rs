use actix_web::{web, HttpResponse, Result};
use chrono::Utc;
use uuid::Uuid;

use shared::{ApiError, CreateTrackerRequest, DailyExpensesResponse, TrackerWithExpenses, UpdateTrackerRequest};

use crate::handlers::unauthorized;
use crate::models::AppState;
use crate::services::{
    expenses as expenses_service, stats as stats_service, trackers as trackers_service,
};

/// Number of expenses returned by the recent-expenses endpoint.
const RECENT_EXPENSES_LIMIT: i64 = 5;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/trackers")
            .route("", web::get().to(list_trackers))
            .route("", web::post().to(create_tracker))
            .route("/{tracker_id}", web::get().to(get_tracker))
            .route("/{tracker_id}", web::patch().to(update_tracker))
            .route("/{tracker_id}/stats", web::get().to(tracker_stats))
            .route("/{tracker_id}/expenses", web::get().to(recent_expenses))
            .route("/{tracker_id}/daily-expenses", web::get().to(daily_expenses)),
    );
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiError {
        error: "not_found".to_string(),
        message: "Tracker not found".to_string(),
    })
}

fn forbidden() -> HttpResponse {
    HttpResponse::Forbidden().json(ApiError {
        error: "forbidden".to_string(),
        message: "Not authorized to access this tracker".to_string(),
    })
}

fn internal_error() -> HttpResponse {
    HttpResponse::InternalServerError().json(ApiError {
        error: "internal_error".to_string(),
        message: "An error occurred, please try again later".to_string(),
    })
}

// An unparseable id can name no tracker, so it reads as not-found rather
// than bad-request.
fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw).ok()
}

async fn list_trackers(state: web::Data<AppState>, req: actix_web::HttpRequest) -> Result<HttpResponse> {
    let user = match crate::middleware::auth::authenticate(&req, &state.db, &state.config.jwt_secret).await {
        Ok(user) => user,
        Err(_) => return Ok(unauthorized()),
    };

    match trackers_service::list_trackers(&state.db, &user.id).await {
        Ok(trackers) => Ok(HttpResponse::Ok().json(trackers)),
        Err(e) => {
            log::error!("Error listing trackers: {:?}", e);
            Ok(internal_error())
        }
    }
}

async fn create_tracker(
    state: web::Data<AppState>,
    req: actix_web::HttpRequest,
    body: web::Json<CreateTrackerRequest>,
) -> Result<HttpResponse> {
    let user = match crate::middleware::auth::authenticate(&req, &state.db, &state.config.jwt_secret).await {
        Ok(user) => user,
        Err(_) => return Ok(unauthorized()),
    };

    match trackers_service::create_tracker(&state.db, &user.id, &body.into_inner()).await {
        Ok(tracker) => Ok(HttpResponse::Ok().json(tracker)),
        Err(trackers_service::TrackerError::Validation(message)) => {
            Ok(HttpResponse::BadRequest().json(ApiError {
                error: "validation_error".to_string(),
                message,
            }))
        }
        Err(e) => {
            log::error!("Error creating tracker: {:?}", e);
            Ok(internal_error())
        }
    }
}

async fn get_tracker(
    state: web::Data<AppState>,
    req: actix_web::HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let user = match crate::middleware::auth::authenticate(&req, &state.db, &state.config.jwt_secret).await {
        Ok(user) => user,
        Err(_) => return Ok(unauthorized()),
    };

    let Some(tracker_id) = parse_id(&path.into_inner()) else {
        return Ok(not_found());
    };

    let tracker = match trackers_service::get_owned_tracker(&state.db, &tracker_id, &user.id).await {
        Ok(tracker) => tracker,
        Err(trackers_service::TrackerError::NotFound) => return Ok(not_found()),
        Err(trackers_service::TrackerError::NotOwner) => return Ok(forbidden()),
        Err(e) => {
            log::error!("Error fetching tracker: {:?}", e);
            return Ok(internal_error());
        }
    };

    match expenses_service::list_expenses(&state.db, &tracker_id).await {
        Ok(expenses) => Ok(HttpResponse::Ok().json(TrackerWithExpenses {
            id: tracker.id,
            user_id: tracker.user_id,
            start_date: tracker.start_date,
            end_date: tracker.end_date,
            budget: tracker.budget,
            name: tracker.name,
            description: tracker.description,
            created_at: tracker.created_at,
            expenses,
        })),
        Err(e) => {
            log::error!("Error fetching tracker expenses: {:?}", e);
            Ok(internal_error())
        }
    }
}

async fn update_tracker(
    state: web::Data<AppState>,
    req: actix_web::HttpRequest,
    path: web::Path<String>,
    body: web::Json<UpdateTrackerRequest>,
) -> Result<HttpResponse> {
    let user = match crate::middleware::auth::authenticate(&req, &state.db, &state.config.jwt_secret).await {
        Ok(user) => user,
        Err(_) => return Ok(unauthorized()),
    };

    let Some(tracker_id) = parse_id(&path.into_inner()) else {
        return Ok(not_found());
    };

    match trackers_service::update_tracker(&state.db, &tracker_id, &user.id, &body.into_inner()).await
    {
        Ok(tracker) => Ok(HttpResponse::Ok().json(tracker)),
        Err(trackers_service::TrackerError::NotFound) => Ok(not_found()),
        Err(trackers_service::TrackerError::Validation(message)) => {
            Ok(HttpResponse::BadRequest().json(ApiError {
                error: "validation_error".to_string(),
                message,
            }))
        }
        Err(e) => {
            log::error!("Error updating tracker: {:?}", e);
            Ok(internal_error())
        }
    }
}

async fn tracker_stats(
    state: web::Data<AppState>,
    req: actix_web::HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let user = match crate::middleware::auth::authenticate(&req, &state.db, &state.config.jwt_secret).await {
        Ok(user) => user,
        Err(_) => return Ok(unauthorized()),
    };

    let Some(tracker_id) = parse_id(&path.into_inner()) else {
        return Ok(not_found());
    };

    let tracker = match trackers_service::get_owned_tracker(&state.db, &tracker_id, &user.id).await {
        Ok(tracker) => tracker,
        Err(trackers_service::TrackerError::NotFound) => return Ok(not_found()),
        Err(trackers_service::TrackerError::NotOwner) => return Ok(forbidden()),
        Err(e) => {
            log::error!("Error fetching tracker: {:?}", e);
            return Ok(internal_error());
        }
    };

    match expenses_service::list_expenses(&state.db, &tracker_id).await {
        Ok(expenses) => {
            let today = Utc::now().date_naive();
            let stats = stats_service::compute_stats(&tracker, &expenses, today);
            Ok(HttpResponse::Ok().json(stats))
        }
        Err(e) => {
            log::error!("Error fetching tracker expenses: {:?}", e);
            Ok(internal_error())
        }
    }
}

async fn recent_expenses(
    state: web::Data<AppState>,
    req: actix_web::HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let user = match crate::middleware::auth::authenticate(&req, &state.db, &state.config.jwt_secret).await {
        Ok(user) => user,
        Err(_) => return Ok(unauthorized()),
    };

    let Some(tracker_id) = parse_id(&path.into_inner()) else {
        return Ok(not_found());
    };

    match trackers_service::get_owned_tracker(&state.db, &tracker_id, &user.id).await {
        Ok(_) => {}
        Err(trackers_service::TrackerError::NotFound) => return Ok(not_found()),
        Err(trackers_service::TrackerError::NotOwner) => return Ok(forbidden()),
        Err(e) => {
            log::error!("Error fetching tracker: {:?}", e);
            return Ok(internal_error());
        }
    }

    match expenses_service::recent_expenses(&state.db, &tracker_id, RECENT_EXPENSES_LIMIT).await {
        Ok(expenses) => Ok(HttpResponse::Ok().json(expenses)),
        Err(e) => {
            log::error!("Error fetching recent expenses: {:?}", e);
            Ok(internal_error())
        }
    }
}

async fn daily_expenses(
    state: web::Data<AppState>,
    req: actix_web::HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let user = match crate::middleware::auth::authenticate(&req, &state.db, &state.config.jwt_secret).await {
        Ok(user) => user,
        Err(_) => return Ok(unauthorized()),
    };

    let Some(tracker_id) = parse_id(&path.into_inner()) else {
        return Ok(not_found());
    };

    // This route keeps the owner-filtered lookup shape: a tracker owned by
    // someone else reads the same as one that does not exist.
    match trackers_service::get_owned_tracker(&state.db, &tracker_id, &user.id).await {
        Ok(_) => {}
        Err(trackers_service::TrackerError::NotFound)
        | Err(trackers_service::TrackerError::NotOwner) => return Ok(not_found()),
        Err(e) => {
            log::error!("Error fetching tracker: {:?}", e);
            return Ok(internal_error());
        }
    }

    match expenses_service::daily_expenses(&state.db, &tracker_id).await {
        Ok(daily) => Ok(HttpResponse::Ok().json(DailyExpensesResponse {
            daily_expenses: daily,
        })),
        Err(e) => {
            log::error!("Error fetching daily expenses: {:?}", e);
            Ok(internal_error())
        }
    }
}
