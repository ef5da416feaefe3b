//! Axum route handlers for question generation and feedback analysis.
//!
//! Both endpoints validate synchronously, then hand the LLM call to an
//! operation and return 202 with the operation id for polling.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::extract::AuthUser;
use crate::auth::handlers::fetch_user;
use crate::crypto::ApiKeyCipher;
use crate::errors::AppError;
use crate::interview::feedback::prepare_feedback_job;
use crate::interview::questions::prepare_question_job;
use crate::interview::{feedback, questions};
use crate::jobs::handlers::fetch_job_posting;
use crate::llm::LlmClient;
use crate::models::feedback::InterviewFeedbackRow;
use crate::models::operation::{OP_TYPE_FEEDBACK_ANALYSIS, OP_TYPE_QUESTION_GENERATION};
use crate::models::session::{
    InterviewSessionRow, MESSAGE_ANSWER, STATUS_ACTIVE, STATUS_COMPLETED,
};
use crate::operations::{create_operation, spawn_operation};
use crate::resume::handlers::fetch_resume;
use crate::sessions::handlers::{fetch_messages, fetch_session};
use crate::sessions::transcript::may_ask_next_question;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct OperationAccepted {
    pub operation_id: Uuid,
    pub status: String,
}

/// POST /api/v1/sessions/:id/questions
///
/// Requires an active session, a stored API key, a résumé, and no pending
/// unanswered question. Returns 202 + operation id.
pub async fn handle_generate_question(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<OperationAccepted>), AppError> {
    let session = fetch_session(&state, auth.user_id, id).await?;
    if session.status != STATUS_ACTIVE {
        return Err(AppError::Conflict(
            "Questions can only be generated for an active session".to_string(),
        ));
    }

    let transcript = fetch_messages(&state, id).await?;
    if !may_ask_next_question(transcript.last().map(|m| m.message_type.as_str())) {
        return Err(AppError::Conflict(
            "Answer the current question before requesting the next one".to_string(),
        ));
    }

    let (llm, posting, resume_content) = gather_llm_context(&state, auth, &session).await?;

    let job = prepare_question_job(
        id,
        session.current_question_number,
        &posting,
        &resume_content,
        &transcript,
    )?;

    let operation = create_operation(&state.db, OP_TYPE_QUESTION_GENERATION).await?;
    spawn_operation(
        state.db.clone(),
        operation.id,
        questions::run_question_job(state.db.clone(), llm, job),
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(OperationAccepted {
            operation_id: operation.id,
            status: operation.status,
        }),
    ))
}

/// POST /api/v1/sessions/:id/feedback
///
/// Requires a completed session with at least one answered question and no
/// existing feedback. Returns 202 + operation id.
pub async fn handle_generate_feedback(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<OperationAccepted>), AppError> {
    let session = fetch_session(&state, auth.user_id, id).await?;
    if session.status != STATUS_COMPLETED {
        return Err(AppError::Conflict(
            "Feedback is only available for a completed session".to_string(),
        ));
    }

    let existing: Option<InterviewFeedbackRow> =
        sqlx::query_as("SELECT * FROM interview_feedback WHERE session_id = $1")
            .bind(id)
            .fetch_optional(&state.db)
            .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(
            "Feedback already exists for this session".to_string(),
        ));
    }

    let transcript = fetch_messages(&state, id).await?;
    let has_answer = transcript.iter().any(|m| m.message_type == MESSAGE_ANSWER);
    if !has_answer {
        return Err(AppError::Conflict(
            "The session has no answered questions to score".to_string(),
        ));
    }

    let (llm, posting, resume_content) = gather_llm_context(&state, auth, &session).await?;

    let job = prepare_feedback_job(id, &posting, &resume_content, &transcript);

    let operation = create_operation(&state.db, OP_TYPE_FEEDBACK_ANALYSIS).await?;
    spawn_operation(
        state.db.clone(),
        operation.id,
        feedback::run_feedback_job(state.db.clone(), llm, job),
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(OperationAccepted {
            operation_id: operation.id,
            status: operation.status,
        }),
    ))
}

/// GET /api/v1/sessions/:id/feedback
pub async fn handle_get_feedback(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<InterviewFeedbackRow>, AppError> {
    fetch_session(&state, auth.user_id, id).await?;

    let feedback: Option<InterviewFeedbackRow> =
        sqlx::query_as("SELECT * FROM interview_feedback WHERE session_id = $1")
            .bind(id)
            .fetch_optional(&state.db)
            .await?;

    feedback
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No feedback for this session yet".to_string()))
}

/// Loads the dual context (decrypted API key, job posting, résumé) needed
/// for any LLM-backed operation on a session.
async fn gather_llm_context(
    state: &AppState,
    auth: AuthUser,
    session: &InterviewSessionRow,
) -> Result<(LlmClient, crate::models::job_posting::JobPostingRow, String), AppError> {
    let user = fetch_user(state, auth.user_id).await?;
    let encrypted = user.encrypted_api_key.ok_or_else(|| {
        AppError::Validation(
            "No API key on file. Add one in your account settings first.".to_string(),
        )
    })?;

    let cipher = ApiKeyCipher::new(&state.config.encryption_key)?;
    let api_key = cipher.decrypt(&encrypted)?;

    let posting = fetch_job_posting(state, auth.user_id, session.job_posting_id).await?;
    let resume = fetch_resume(state, auth.user_id).await?;

    Ok((
        LlmClient::new(state.http.clone(), api_key),
        posting,
        resume.content,
    ))
}
