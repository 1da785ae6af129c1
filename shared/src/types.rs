use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

// ============================================================================
// User Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

// ============================================================================
// Token Types
// ============================================================================

/// Returned by POST /login: a short-lived JWT plus a long-lived opaque
/// refresh token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

/// Returned by POST /refresh: a fresh access token only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

// ============================================================================
// Tracker Types
// ============================================================================

/// A budget period a user defines to monitor spending: an inclusive date
/// range plus a budget amount.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tracker {
    pub id: Uuid,
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub budget: f64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTrackerRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub budget: f64,
    pub name: String,
    pub description: Option<String>,
}

// Distinguishes an absent field from an explicit null: an absent field stays
// `None`, while null deserializes to `Some(None)`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// PATCH body: only supplied fields are changed. Sending `"description": null`
/// clears the description; omitting the field leaves it alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTrackerRequest {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub budget: Option<f64>,
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerWithExpenses {
    pub id: Uuid,
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub budget: f64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expenses: Vec<Expense>,
}

// ============================================================================
// Expense Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub tracker_id: Uuid,
    pub description: String,
    pub amount: f64,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateExpenseRequest {
    pub tracker_id: Uuid,
    pub description: String,
    pub amount: f64,
    pub date: NaiveDate,
}

// ============================================================================
// Statistics Types
// ============================================================================

/// Budget-pacing metrics derived from a tracker and its expenses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerStats {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub budget: f64,
    pub remaining_days: i64,
    pub target_expenditure_per_day: f64,
    pub average_expenditure_per_day: f64,
    pub total_expenditure: f64,
    pub todays_expenditure: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyExpenseTransaction {
    pub id: Uuid,
    pub name: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyExpenseGroup {
    pub date: NaiveDate,
    pub total_amount: f64,
    pub transactions: Vec<DailyExpenseTransaction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyExpensesResponse {
    pub daily_expenses: Vec<DailyExpenseGroup>,
}

// ============================================================================
// API Response Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub message: String,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_tracker_request_default_is_empty() {
        let update = UpdateTrackerRequest::default();
        assert!(update.start_date.is_none());
        assert!(update.end_date.is_none());
        assert!(update.budget.is_none());
        assert!(update.name.is_none());
        assert!(update.description.is_none());
    }

    #[test]
    fn test_tracker_serializes_dates_as_iso() {
        let tracker = Tracker {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
            budget: 500.0,
            name: "January".to_string(),
            description: None,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&tracker).unwrap();
        assert_eq!(json["start_date"], "2025-01-01");
        assert_eq!(json["end_date"], "2025-01-31");
    }

    #[test]
    fn test_update_tracker_request_partial_deserialization() {
        let update: UpdateTrackerRequest = serde_json::from_str(r#"{"budget": 500}"#).unwrap();
        assert_eq!(update.budget, Some(500.0));
        assert!(update.start_date.is_none());
        assert!(update.name.is_none());
        assert!(update.description.is_none());
    }

    #[test]
    fn test_update_tracker_request_null_vs_absent_description() {
        // Absent: leave the description alone.
        let update: UpdateTrackerRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(update.description, None);

        // Explicit null: clear it.
        let update: UpdateTrackerRequest =
            serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(update.description, Some(None));

        // A value: set it.
        let update: UpdateTrackerRequest =
            serde_json::from_str(r#"{"description": "notes"}"#).unwrap();
        assert_eq!(update.description, Some(Some("notes".to_string())));
    }
}
