use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{ExpenseRow, TrackerRow};
use crate::services::stats::round2;
use shared::{CreateExpenseRequest, DailyExpenseGroup, DailyExpenseTransaction, Expense};

#[derive(Debug, Error)]
pub enum ExpenseError {
    #[error("Expense not found")]
    NotFound,
    #[error("Tracker not found")]
    TrackerNotFound,
    #[error("Not authorized")]
    NotOwner,
    #[error("{0}")]
    Validation(String),
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Create an expense against a tracker the caller owns. Tracker resolution
/// happens before the ownership check, so a missing tracker and a foreign
/// tracker stay distinguishable.
pub async fn create_expense(
    pool: &SqlitePool,
    user_id: &Uuid,
    request: &CreateExpenseRequest,
) -> Result<Expense, ExpenseError> {
    let tracker: TrackerRow = sqlx::query_as("SELECT * FROM trackers WHERE id = ?")
        .bind(request.tracker_id.to_string())
        .fetch_optional(pool)
        .await?
        .ok_or(ExpenseError::TrackerNotFound)?;

    if tracker.user_id != user_id.to_string() {
        return Err(ExpenseError::NotOwner);
    }

    if request.description.trim().is_empty() {
        return Err(ExpenseError::Validation(
            "Expense description must not be empty".to_string(),
        ));
    }
    if request.amount <= 0.0 {
        return Err(ExpenseError::Validation(
            "Expense amount must be greater than zero".to_string(),
        ));
    }

    let id = Uuid::new_v4();
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO expenses (id, tracker_id, description, amount, date, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(request.tracker_id.to_string())
    .bind(&request.description)
    .bind(request.amount)
    .bind(request.date)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(Expense {
        id,
        tracker_id: request.tracker_id,
        description: request.description.clone(),
        amount: request.amount,
        date: request.date,
        created_at: now,
    })
}

/// Delete an expense. Ownership is checked transitively through the parent
/// tracker; an expense whose tracker the caller does not own is `NotOwner`.
pub async fn delete_expense(
    pool: &SqlitePool,
    expense_id: &Uuid,
    user_id: &Uuid,
) -> Result<(), ExpenseError> {
    let expense: ExpenseRow = sqlx::query_as("SELECT * FROM expenses WHERE id = ?")
        .bind(expense_id.to_string())
        .fetch_optional(pool)
        .await?
        .ok_or(ExpenseError::NotFound)?;

    let owned_tracker: Option<TrackerRow> =
        sqlx::query_as("SELECT * FROM trackers WHERE id = ? AND user_id = ?")
            .bind(&expense.tracker_id)
            .bind(user_id.to_string())
            .fetch_optional(pool)
            .await?;

    if owned_tracker.is_none() {
        return Err(ExpenseError::NotOwner);
    }

    sqlx::query("DELETE FROM expenses WHERE id = ?")
        .bind(expense_id.to_string())
        .execute(pool)
        .await?;

    Ok(())
}

/// All expenses for a tracker, newest first.
pub async fn list_expenses(pool: &SqlitePool, tracker_id: &Uuid) -> Result<Vec<Expense>, ExpenseError> {
    let rows: Vec<ExpenseRow> = sqlx::query_as(
        "SELECT * FROM expenses WHERE tracker_id = ? ORDER BY date DESC, created_at DESC",
    )
    .bind(tracker_id.to_string())
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(|r| r.to_shared()).collect())
}

/// The most recently logged expenses for a tracker.
pub async fn recent_expenses(
    pool: &SqlitePool,
    tracker_id: &Uuid,
    limit: i64,
) -> Result<Vec<Expense>, ExpenseError> {
    let rows: Vec<ExpenseRow> = sqlx::query_as(
        "SELECT * FROM expenses WHERE tracker_id = ? ORDER BY created_at DESC, id DESC LIMIT ?",
    )
    .bind(tracker_id.to_string())
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(|r| r.to_shared()).collect())
}

/// Group a tracker's expenses by day, most recent day first, limited to the
/// five most recent days. Each group carries its per-transaction breakdown
/// and a rounded day total.
pub async fn daily_expenses(
    pool: &SqlitePool,
    tracker_id: &Uuid,
) -> Result<Vec<DailyExpenseGroup>, ExpenseError> {
    let rows: Vec<ExpenseRow> = sqlx::query_as(
        "SELECT * FROM expenses WHERE tracker_id = ? ORDER BY date DESC, created_at DESC",
    )
    .bind(tracker_id.to_string())
    .fetch_all(pool)
    .await?;

    // Rows arrive sorted by date, so each expense either extends the last
    // group or opens a new day.
    let mut groups: Vec<DailyExpenseGroup> = Vec::new();
    for row in &rows {
        let expense = row.to_shared();
        if let Some(group) = groups.last_mut() {
            if group.date == expense.date {
                group.total_amount += expense.amount;
                group.transactions.push(DailyExpenseTransaction {
                    id: expense.id,
                    name: expense.description,
                    amount: expense.amount,
                });
                continue;
            }
        }
        if groups.len() == 5 {
            break;
        }
        groups.push(DailyExpenseGroup {
            date: expense.date,
            total_amount: expense.amount,
            transactions: vec![DailyExpenseTransaction {
                id: expense.id,
                name: expense.description,
                amount: expense.amount,
            }],
        });
    }

    for group in &mut groups {
        group.total_amount = round2(group.total_amount);
    }

    Ok(groups)
}
