use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for expense trackers
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TrackerRow {
    pub id: String,
    pub user_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub budget: f64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TrackerRow {
    pub fn to_shared(&self) -> shared::Tracker {
        shared::Tracker {
            id: Uuid::parse_str(&self.id).unwrap(),
            user_id: Uuid::parse_str(&self.user_id).unwrap(),
            start_date: self.start_date,
            end_date: self.end_date,
            budget: self.budget,
            name: self.name.clone(),
            description: self.description.clone(),
            created_at: self.created_at,
        }
    }
}
