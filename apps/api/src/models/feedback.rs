use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Stored scoring for one completed session (one-to-one via UNIQUE session_id).
/// All scores are 0-100 integers.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewFeedbackRow {
    pub id: Uuid,
    pub session_id: Uuid,
    pub technical_score: i32,
    pub communication_score: i32,
    pub problem_solving_score: i32,
    pub structure_score: i32,
    pub overall_score: i32,
    pub technical_feedback: String,
    pub communication_feedback: String,
    pub problem_solving_feedback: String,
    pub structure_feedback: String,
    pub overall_comments: String,
    /// JSON array of strings.
    pub knowledge_gaps: Value,
    /// JSON array of strings.
    pub learning_recommendations: Value,
    pub created_at: DateTime<Utc>,
}
