use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

pub const OP_PENDING: &str = "pending";
pub const OP_PROCESSING: &str = "processing";
pub const OP_COMPLETED: &str = "completed";
pub const OP_FAILED: &str = "failed";

pub const OP_TYPE_QUESTION_GENERATION: &str = "question_generation";
pub const OP_TYPE_FEEDBACK_ANALYSIS: &str = "feedback_analysis";

/// Generic async-job row. Handlers insert it as `pending` and return its id;
/// a spawned task moves it to `processing` then `completed`/`failed`, and
/// clients poll `GET /api/v1/operations/:id`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OperationRow {
    pub id: Uuid,
    pub operation_type: String,
    pub status: String,
    pub result: Option<Value>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
