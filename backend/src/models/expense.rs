use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for expenses
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ExpenseRow {
    pub id: String,
    pub tracker_id: String,
    pub description: String,
    pub amount: f64,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl ExpenseRow {
    pub fn to_shared(&self) -> shared::Expense {
        shared::Expense {
            id: Uuid::parse_str(&self.id).unwrap(),
            tracker_id: Uuid::parse_str(&self.tracker_id).unwrap(),
            description: self.description.clone(),
            amount: self.amount,
            date: self.date,
            created_at: self.created_at,
        }
    }
}
