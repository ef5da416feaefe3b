use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Session status values. Transitions are enforced in `sessions::handlers`.
pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_PAUSED: &str = "paused";
pub const STATUS_COMPLETED: &str = "completed";

/// An interview run against one job posting.
///
/// Retakes form a linear chain: every session in a chain carries the id of
/// the chain's very first session in `original_session_id` (NULL on the
/// first session itself), so the whole chain is a single query.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewSessionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub job_posting_id: Uuid,
    pub status: String,
    pub current_question_number: i32,
    pub retake_number: i32,
    pub original_session_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const MESSAGE_QUESTION: &str = "question";
pub const MESSAGE_ANSWER: &str = "answer";

/// A single transcript entry. `question_type` is set only on questions.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SessionMessageRow {
    pub id: Uuid,
    pub session_id: Uuid,
    pub message_type: String,
    pub content: String,
    pub question_type: Option<String>,
    pub created_at: DateTime<Utc>,
}
