use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobPostingRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub company: String,
    pub description: String,
    pub experience_level: String,
    /// JSON array of technology names.
    pub tech_stack: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
