//! Feedback analysis — scores a completed interview on four dimensions and
//! persists the one-per-session feedback row. Runs inside an operation like
//! question generation.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::interview::prompts::{FEEDBACK_PROMPT_TEMPLATE, FEEDBACK_SYSTEM};
use crate::interview::questions::{render_job_posting, render_transcript};
use crate::llm::LlmClient;
use crate::models::feedback::InterviewFeedbackRow;
use crate::models::job_posting::JobPostingRow;
use crate::models::session::SessionMessageRow;

/// The LLM's answer shape for feedback analysis. Mirrors the stored row.
#[derive(Debug, Serialize, Deserialize)]
pub struct FeedbackPayload {
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
    pub knowledge_gaps: Vec<String>,
    pub learning_recommendations: Vec<String>,
}

pub struct FeedbackJob {
    pub session_id: Uuid,
    pub prompt: String,
}

pub fn prepare_feedback_job(
    session_id: Uuid,
    posting: &JobPostingRow,
    resume_content: &str,
    transcript: &[SessionMessageRow],
) -> FeedbackJob {
    let prompt = FEEDBACK_PROMPT_TEMPLATE
        .replace("{job_posting}", &render_job_posting(posting))
        .replace("{resume}", resume_content)
        .replace("{transcript}", &render_transcript(transcript));

    FeedbackJob { session_id, prompt }
}

/// Runs the LLM call, validates the scores, and persists the feedback row.
/// Executed inside `spawn_operation`.
pub async fn run_feedback_job(pool: PgPool, llm: LlmClient, job: FeedbackJob) -> Result<Value> {
    let payload: FeedbackPayload = llm
        .call_json(&job.prompt, FEEDBACK_SYSTEM)
        .await
        .map_err(|e| anyhow!(e.user_message()))?;

    validate_scores(&payload)?;

    let feedback: InterviewFeedbackRow = sqlx::query_as(
        r#"
        INSERT INTO interview_feedback
            (id, session_id,
             technical_score, communication_score, problem_solving_score,
             structure_score, overall_score,
             technical_feedback, communication_feedback, problem_solving_feedback,
             structure_feedback, overall_comments,
             knowledge_gaps, learning_recommendations)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(job.session_id)
    .bind(payload.technical_score)
    .bind(payload.communication_score)
    .bind(payload.problem_solving_score)
    .bind(payload.structure_score)
    .bind(payload.overall_score)
    .bind(&payload.technical_feedback)
    .bind(&payload.communication_feedback)
    .bind(&payload.problem_solving_feedback)
    .bind(&payload.structure_feedback)
    .bind(&payload.overall_comments)
    .bind(Value::from(payload.knowledge_gaps.clone()))
    .bind(Value::from(payload.learning_recommendations.clone()))
    .fetch_one(&pool)
    .await
    .context("Failed to save the generated feedback")?;

    info!(
        "Stored feedback for session {} (overall {})",
        job.session_id, feedback.overall_score
    );

    serde_json::to_value(&feedback).context("Failed to serialize feedback")
}

/// All five scores must be 0-100 integers; out-of-range output fails the
/// operation rather than storing nonsense.
fn validate_scores(payload: &FeedbackPayload) -> Result<()> {
    let scores = [
        ("technical_score", payload.technical_score),
        ("communication_score", payload.communication_score),
        ("problem_solving_score", payload.problem_solving_score),
        ("structure_score", payload.structure_score),
        ("overall_score", payload.overall_score),
    ];
    for (name, value) in scores {
        if !(0..=100).contains(&value) {
            return Err(anyhow!(
                "The AI service returned an invalid {name} ({value}). Please try again."
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> FeedbackPayload {
        FeedbackPayload {
            technical_score: 75,
            communication_score: 80,
            problem_solving_score: 70,
            structure_score: 65,
            overall_score: 72,
            technical_feedback: "Solid fundamentals.".to_string(),
            communication_feedback: "Clear delivery.".to_string(),
            problem_solving_feedback: "Good decomposition.".to_string(),
            structure_feedback: "Answers rambled at times.".to_string(),
            overall_comments: "Practice tighter answers.".to_string(),
            knowledge_gaps: vec!["Database indexing".to_string()],
            learning_recommendations: vec!["Work through an indexing tutorial".to_string()],
        }
    }

    #[test]
    fn test_validate_scores_accepts_range() {
        assert!(validate_scores(&payload()).is_ok());

        let mut edge = payload();
        edge.technical_score = 0;
        edge.overall_score = 100;
        assert!(validate_scores(&edge).is_ok());
    }

    #[test]
    fn test_validate_scores_rejects_out_of_range() {
        let mut over = payload();
        over.communication_score = 101;
        assert!(validate_scores(&over).is_err());

        let mut under = payload();
        under.overall_score = -1;
        assert!(validate_scores(&under).is_err());
    }

    #[test]
    fn test_payload_requires_all_dimensions() {
        // Missing structure_score must fail deserialization
        let bad = serde_json::json!({
            "technical_score": 75,
            "communication_score": 80,
            "problem_solving_score": 70,
            "overall_score": 72,
            "technical_feedback": "a",
            "communication_feedback": "b",
            "problem_solving_feedback": "c",
            "structure_feedback": "d",
            "overall_comments": "e",
            "knowledge_gaps": [],
            "learning_recommendations": []
        });
        assert!(serde_json::from_value::<FeedbackPayload>(bad).is_err());
    }

    #[test]
    fn test_feedback_prompt_contains_transcript() {
        use crate::models::session::{MESSAGE_ANSWER, MESSAGE_QUESTION};
        use chrono::Utc;
        use serde_json::json;

        let posting = JobPostingRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Backend Engineer".to_string(),
            company: "Acme".to_string(),
            description: "Own the billing APIs.".to_string(),
            experience_level: "senior".to_string(),
            tech_stack: json!(["Rust"]),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let transcript = vec![
            SessionMessageRow {
                id: Uuid::new_v4(),
                session_id: Uuid::new_v4(),
                message_type: MESSAGE_QUESTION.to_string(),
                content: "Why Rust?".to_string(),
                question_type: Some("technical".to_string()),
                created_at: Utc::now(),
            },
            SessionMessageRow {
                id: Uuid::new_v4(),
                session_id: Uuid::new_v4(),
                message_type: MESSAGE_ANSWER.to_string(),
                content: "Memory safety.".to_string(),
                question_type: None,
                created_at: Utc::now(),
            },
        ];

        let job = prepare_feedback_job(Uuid::new_v4(), &posting, "resume text", &transcript);
        assert!(job.prompt.contains("Why Rust?"));
        assert!(job.prompt.contains("Memory safety."));
        assert!(job.prompt.contains("resume text"));
        assert!(!job.prompt.contains("{transcript}"));
    }
}
