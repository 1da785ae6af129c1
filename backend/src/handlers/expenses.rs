use actix_web::{web, HttpResponse, Result};
use uuid::Uuid;

use shared::{ApiError, CreateExpenseRequest};

use crate::handlers::unauthorized;
use crate::models::AppState;
use crate::services::expenses as expenses_service;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/expenses")
            .route("", web::post().to(create_expense))
            .route("/{expense_id}", web::delete().to(delete_expense)),
    );
}

async fn create_expense(
    state: web::Data<AppState>,
    req: actix_web::HttpRequest,
    body: web::Json<CreateExpenseRequest>,
) -> Result<HttpResponse> {
    let user = match crate::middleware::auth::authenticate(&req, &state.db, &state.config.jwt_secret).await {
        Ok(user) => user,
        Err(_) => return Ok(unauthorized()),
    };

    match expenses_service::create_expense(&state.db, &user.id, &body.into_inner()).await {
        Ok(expense) => Ok(HttpResponse::Created().json(expense)),
        Err(expenses_service::ExpenseError::TrackerNotFound) => {
            Ok(HttpResponse::NotFound().json(ApiError {
                error: "not_found".to_string(),
                message: "Tracker not found".to_string(),
            }))
        }
        Err(expenses_service::ExpenseError::NotOwner) => {
            Ok(HttpResponse::Forbidden().json(ApiError {
                error: "forbidden".to_string(),
                message: "Not authorized to add expenses to this tracker".to_string(),
            }))
        }
        Err(expenses_service::ExpenseError::Validation(message)) => {
            Ok(HttpResponse::BadRequest().json(ApiError {
                error: "validation_error".to_string(),
                message,
            }))
        }
        Err(e) => {
            log::error!("Error creating expense: {:?}", e);
            Ok(HttpResponse::InternalServerError().json(ApiError {
                error: "internal_error".to_string(),
                message: "Failed to create expense".to_string(),
            }))
        }
    }
}

async fn delete_expense(
    state: web::Data<AppState>,
    req: actix_web::HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let user = match crate::middleware::auth::authenticate(&req, &state.db, &state.config.jwt_secret).await {
        Ok(user) => user,
        Err(_) => return Ok(unauthorized()),
    };

    let Ok(expense_id) = Uuid::parse_str(&path.into_inner()) else {
        return Ok(HttpResponse::NotFound().json(ApiError {
            error: "not_found".to_string(),
            message: "Expense not found".to_string(),
        }));
    };

    match expenses_service::delete_expense(&state.db, &expense_id, &user.id).await {
        Ok(()) => Ok(HttpResponse::NoContent().finish()),
        Err(expenses_service::ExpenseError::NotFound) => {
            Ok(HttpResponse::NotFound().json(ApiError {
                error: "not_found".to_string(),
                message: "Expense not found".to_string(),
            }))
        }
        Err(expenses_service::ExpenseError::NotOwner) => {
            Ok(HttpResponse::Forbidden().json(ApiError {
                error: "forbidden".to_string(),
                message: "Not authorized to delete this expense".to_string(),
            }))
        }
        Err(e) => {
            log::error!("Error deleting expense: {:?}", e);
            Ok(HttpResponse::InternalServerError().json(ApiError {
                error: "internal_error".to_string(),
                message: "Failed to delete expense".to_string(),
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{auth as auth_service, expenses as expenses_svc, trackers as trackers_service};
    use crate::test_util::{register_test_user, test_app_state, test_pool, test_tracker_request};
    use actix_web::{http::StatusCode, test, App};

    fn bearer(username: &str) -> String {
        let token = auth_service::create_access_token(username, "test-secret", 30).unwrap();
        format!("Bearer {token}")
    }

    #[actix_web::test]
    async fn test_create_and_delete_expense_status_codes() {
        let pool = test_pool().await;
        let alice = register_test_user(&pool, "alice").await;
        register_test_user(&pool, "bob").await;
        let tracker = trackers_service::create_tracker(&pool, &alice.id, &test_tracker_request("January"))
            .await
            .unwrap();

        let state = test_app_state(pool.clone());
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(super::configure),
        )
        .await;

        // Created expense: 201.
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/expenses")
                .insert_header(("Authorization", bearer("alice")))
                .set_json(serde_json::json!({
                    "tracker_id": tracker.id,
                    "description": "Coffee",
                    "amount": 4.5,
                    "date": "2025-01-05",
                }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let expense: shared::Expense = test::read_body_json(resp).await;

        // Bob cannot post to Alice's tracker: 403.
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/expenses")
                .insert_header(("Authorization", bearer("bob")))
                .set_json(serde_json::json!({
                    "tracker_id": tracker.id,
                    "description": "Sneaky",
                    "amount": 1.0,
                    "date": "2025-01-05",
                }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        // Missing tracker: 404.
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/expenses")
                .insert_header(("Authorization", bearer("alice")))
                .set_json(serde_json::json!({
                    "tracker_id": Uuid::new_v4(),
                    "description": "Orphan",
                    "amount": 1.0,
                    "date": "2025-01-05",
                }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        // Non-positive amount: 400.
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/expenses")
                .insert_header(("Authorization", bearer("alice")))
                .set_json(serde_json::json!({
                    "tracker_id": tracker.id,
                    "description": "Free?",
                    "amount": -2.0,
                    "date": "2025-01-05",
                }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        // Bob cannot delete Alice's expense: 403, and it survives.
        let resp = test::call_service(
            &app,
            test::TestRequest::delete()
                .uri(&format!("/expenses/{}", expense.id))
                .insert_header(("Authorization", bearer("bob")))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        // The owner deletes it: 204, then a retry is 404.
        let resp = test::call_service(
            &app,
            test::TestRequest::delete()
                .uri(&format!("/expenses/{}", expense.id))
                .insert_header(("Authorization", bearer("alice")))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let resp = test::call_service(
            &app,
            test::TestRequest::delete()
                .uri(&format!("/expenses/{}", expense.id))
                .insert_header(("Authorization", bearer("alice")))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let remaining = expenses_svc::list_expenses(&pool, &tracker.id).await.unwrap();
        assert!(remaining.is_empty());
    }
}
