use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::TrackerRow;
use shared::{CreateTrackerRequest, Tracker, UpdateTrackerRequest};

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Tracker not found")]
    NotFound,
    #[error("Not authorized to access this tracker")]
    NotOwner,
    #[error("{0}")]
    Validation(String),
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

fn validate_fields(
    name: &str,
    budget: f64,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<(), TrackerError> {
    if name.trim().is_empty() {
        return Err(TrackerError::Validation(
            "Tracker name must not be empty".to_string(),
        ));
    }
    if budget <= 0.0 {
        return Err(TrackerError::Validation(
            "Budget must be greater than zero".to_string(),
        ));
    }
    if start_date > end_date {
        return Err(TrackerError::Validation(
            "Start date must not be after end date".to_string(),
        ));
    }
    Ok(())
}

pub async fn create_tracker(
    pool: &SqlitePool,
    user_id: &Uuid,
    request: &CreateTrackerRequest,
) -> Result<Tracker, TrackerError> {
    validate_fields(
        &request.name,
        request.budget,
        request.start_date,
        request.end_date,
    )?;

    let id = Uuid::new_v4();
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO trackers (id, user_id, start_date, end_date, budget, name, description, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(user_id.to_string())
    .bind(request.start_date)
    .bind(request.end_date)
    .bind(request.budget)
    .bind(&request.name)
    .bind(&request.description)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(Tracker {
        id,
        user_id: *user_id,
        start_date: request.start_date,
        end_date: request.end_date,
        budget: request.budget,
        name: request.name.clone(),
        description: request.description.clone(),
        created_at: now,
    })
}

pub async fn list_trackers(pool: &SqlitePool, user_id: &Uuid) -> Result<Vec<Tracker>, TrackerError> {
    let rows: Vec<TrackerRow> =
        sqlx::query_as("SELECT * FROM trackers WHERE user_id = ? ORDER BY created_at DESC")
            .bind(user_id.to_string())
            .fetch_all(pool)
            .await?;

    Ok(rows.iter().map(|r| r.to_shared()).collect())
}

/// Resolve a tracker and enforce ownership: a missing tracker is `NotFound`,
/// an existing tracker owned by someone else is `NotOwner`. The two outcomes
/// stay distinguishable (404 vs 403) per the observed API contract.
pub async fn get_owned_tracker(
    pool: &SqlitePool,
    tracker_id: &Uuid,
    user_id: &Uuid,
) -> Result<Tracker, TrackerError> {
    let row: TrackerRow = sqlx::query_as("SELECT * FROM trackers WHERE id = ?")
        .bind(tracker_id.to_string())
        .fetch_optional(pool)
        .await?
        .ok_or(TrackerError::NotFound)?;

    if row.user_id != user_id.to_string() {
        return Err(TrackerError::NotOwner);
    }

    Ok(row.to_shared())
}

/// Partial update: only the supplied fields change, and the resulting state
/// must still satisfy the field invariants. An explicit null description
/// clears it. The lookup is owner-filtered, so a tracker owned by someone
/// else reports `NotFound`.
pub async fn update_tracker(
    pool: &SqlitePool,
    tracker_id: &Uuid,
    user_id: &Uuid,
    request: &UpdateTrackerRequest,
) -> Result<Tracker, TrackerError> {
    let mut tracker: TrackerRow =
        sqlx::query_as("SELECT * FROM trackers WHERE id = ? AND user_id = ?")
            .bind(tracker_id.to_string())
            .bind(user_id.to_string())
            .fetch_optional(pool)
            .await?
            .ok_or(TrackerError::NotFound)?;

    if let Some(start_date) = request.start_date {
        tracker.start_date = start_date;
    }
    if let Some(end_date) = request.end_date {
        tracker.end_date = end_date;
    }
    if let Some(budget) = request.budget {
        tracker.budget = budget;
    }
    if let Some(ref name) = request.name {
        tracker.name = name.clone();
    }
    if let Some(ref description) = request.description {
        tracker.description = description.clone();
    }

    validate_fields(
        &tracker.name,
        tracker.budget,
        tracker.start_date,
        tracker.end_date,
    )?;

    sqlx::query(
        r#"
        UPDATE trackers SET start_date = ?, end_date = ?, budget = ?, name = ?, description = ?
        WHERE id = ?
        "#,
    )
    .bind(tracker.start_date)
    .bind(tracker.end_date)
    .bind(tracker.budget)
    .bind(&tracker.name)
    .bind(&tracker.description)
    .bind(tracker_id.to_string())
    .execute(pool)
    .await?;

    Ok(tracker.to_shared())
}
