//! Question generation — builds the dual-context prompt (job posting +
//! résumé + transcript so far) and runs the LLM call inside an operation.
//!
//! Flow: handler validates + gathers context → spawn_operation →
//! LLM call → INSERT question message → bump current_question_number →
//! operation result {question, question_type, question_number}.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::interview::prompts::{QUESTION_PROMPT_TEMPLATE, QUESTION_SYSTEM};
use crate::llm::LlmClient;
use crate::models::job_posting::JobPostingRow;
use crate::models::session::{SessionMessageRow, MESSAGE_QUESTION};
use crate::sessions::lineage::{question_type_for, QuestionType};

/// The LLM's answer shape for a question turn.
#[derive(Debug, Deserialize)]
struct GeneratedQuestion {
    question: String,
}

/// Everything the background task needs, gathered by the handler while the
/// request-scoped validation (ownership, status, API key) still applies.
pub struct QuestionJob {
    pub session_id: Uuid,
    pub question_number: i32,
    pub question_type: QuestionType,
    pub prompt: String,
}

/// Prepares the prompt and rotation slot for the next question.
/// `question_number` is the 1-based number the new question will have.
pub fn prepare_question_job(
    session_id: Uuid,
    current_question_number: i32,
    posting: &JobPostingRow,
    resume_content: &str,
    transcript: &[SessionMessageRow],
) -> Result<QuestionJob> {
    let question_number = current_question_number + 1;
    let question_type = question_type_for(question_number)
        .ok_or_else(|| anyhow!("Invalid question number {question_number}"))?;

    let prompt = QUESTION_PROMPT_TEMPLATE
        .replace("{question_number}", &question_number.to_string())
        .replace("{question_type}", question_type.as_str())
        .replace("{job_posting}", &render_job_posting(posting))
        .replace("{resume}", resume_content)
        .replace("{transcript}", &render_transcript(transcript));

    Ok(QuestionJob {
        session_id,
        question_number,
        question_type,
        prompt,
    })
}

/// Runs the LLM call and persists the new question. Executed inside
/// `spawn_operation`; the returned JSON becomes the operation result and
/// error strings become the user-visible error_message.
pub async fn run_question_job(pool: PgPool, llm: LlmClient, job: QuestionJob) -> Result<Value> {
    let generated: GeneratedQuestion = llm
        .call_json(&job.prompt, QUESTION_SYSTEM)
        .await
        .map_err(|e| anyhow!(e.user_message()))?;

    let question = generated.question.trim().to_string();
    if question.is_empty() {
        return Err(anyhow!(
            "The AI service returned an empty question. Please try again."
        ));
    }

    let mut tx = pool.begin().await.context("Failed to start transaction")?;

    sqlx::query(
        r#"
        INSERT INTO session_messages (id, session_id, message_type, content, question_type)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(job.session_id)
    .bind(MESSAGE_QUESTION)
    .bind(&question)
    .bind(job.question_type.as_str())
    .execute(&mut *tx)
    .await
    .context("Failed to save the generated question")?;

    sqlx::query(
        r#"
        UPDATE interview_sessions
        SET current_question_number = $1, updated_at = now()
        WHERE id = $2
        "#,
    )
    .bind(job.question_number)
    .bind(job.session_id)
    .execute(&mut *tx)
    .await
    .context("Failed to advance the session")?;

    tx.commit().await.context("Failed to commit")?;

    info!(
        "Generated {} question #{} for session {}",
        job.question_type.as_str(),
        job.question_number,
        job.session_id
    );

    Ok(json!({
        "question": question,
        "question_type": job.question_type.as_str(),
        "question_number": job.question_number,
    }))
}

/// Renders the posting for prompt inclusion.
pub fn render_job_posting(posting: &JobPostingRow) -> String {
    let tech_stack = posting
        .tech_stack
        .as_array()
        .map(|a| {
            a.iter()
                .filter_map(|v| v.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default();

    format!(
        "Title: {}\nCompany: {}\nExperience level: {}\nTech stack: {}\n\n{}",
        posting.title, posting.company, posting.experience_level, tech_stack, posting.description
    )
}

/// Renders the Q&A transcript for prompt inclusion, oldest first.
pub fn render_transcript(messages: &[SessionMessageRow]) -> String {
    if messages.is_empty() {
        return "(no questions asked yet)".to_string();
    }
    messages
        .iter()
        .map(|m| {
            let speaker = if m.message_type == MESSAGE_QUESTION {
                match &m.question_type {
                    Some(t) => format!("INTERVIEWER ({t})"),
                    None => "INTERVIEWER".to_string(),
                }
            } else {
                "CANDIDATE".to_string()
            };
            format!("{speaker}: {}", m.content)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::session::MESSAGE_ANSWER;
    use chrono::Utc;

    fn posting() -> JobPostingRow {
        JobPostingRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Backend Engineer".to_string(),
            company: "Acme".to_string(),
            description: "Own the billing APIs.".to_string(),
            experience_level: "senior".to_string(),
            tech_stack: json!(["Rust", "PostgreSQL"]),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn message(message_type: &str, content: &str, question_type: Option<&str>) -> SessionMessageRow {
        SessionMessageRow {
            id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            message_type: message_type.to_string(),
            content: content.to_string(),
            question_type: question_type.map(str::to_string),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_prompt_contains_both_contexts() {
        let job = prepare_question_job(
            Uuid::new_v4(),
            0,
            &posting(),
            "8 years of Rust. Built payment systems.",
            &[],
        )
        .unwrap();

        assert_eq!(job.question_number, 1);
        assert_eq!(job.question_type, QuestionType::Technical);
        assert!(job.prompt.contains("Own the billing APIs."));
        assert!(job.prompt.contains("Built payment systems."));
        assert!(job.prompt.contains("Rust, PostgreSQL"));
        assert!(job.prompt.contains("(no questions asked yet)"));
        assert!(!job.prompt.contains("{job_posting}"));
        assert!(!job.prompt.contains("{resume}"));
    }

    #[test]
    fn test_rotation_follows_question_number() {
        let p = posting();
        let second = prepare_question_job(Uuid::new_v4(), 1, &p, "resume", &[]).unwrap();
        assert_eq!(second.question_type, QuestionType::Behavioral);
        let third = prepare_question_job(Uuid::new_v4(), 2, &p, "resume", &[]).unwrap();
        assert_eq!(third.question_type, QuestionType::Situational);
        let fourth = prepare_question_job(Uuid::new_v4(), 3, &p, "resume", &[]).unwrap();
        assert_eq!(fourth.question_type, QuestionType::Technical);
    }

    #[test]
    fn test_transcript_rendering_labels_speakers() {
        let messages = vec![
            message(MESSAGE_QUESTION, "Why Rust?", Some("technical")),
            message(MESSAGE_ANSWER, "Memory safety without GC.", None),
        ];
        let rendered = render_transcript(&messages);
        assert!(rendered.contains("INTERVIEWER (technical): Why Rust?"));
        assert!(rendered.contains("CANDIDATE: Memory safety without GC."));
    }

    #[test]
    fn test_render_job_posting_handles_empty_tech_stack() {
        let mut p = posting();
        p.tech_stack = json!([]);
        let rendered = render_job_posting(&p);
        assert!(rendered.contains("Tech stack: \n"));
        assert!(rendered.contains("Backend Engineer"));
    }
}
