//! Axum route handlers for the interview-session API: lifecycle, retakes,
//! chain fetch, and the message transcript.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::extract::AuthUser;
use crate::errors::AppError;
use crate::jobs::handlers::fetch_job_posting;
use crate::models::session::{
    InterviewSessionRow, SessionMessageRow, MESSAGE_ANSWER, STATUS_ACTIVE, STATUS_COMPLETED,
    STATUS_PAUSED,
};
use crate::sessions::lineage::{chain_root, retake_fields};
use crate::sessions::transcript::may_submit_answer;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub job_posting_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct StatusChangeRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub content: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Lifecycle handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<InterviewSessionRow>), AppError> {
    // Verifies ownership of the posting (404 otherwise).
    fetch_job_posting(&state, auth.user_id, req.job_posting_id).await?;

    let session: InterviewSessionRow = sqlx::query_as(
        r#"
        INSERT INTO interview_sessions (id, user_id, job_posting_id, status)
        VALUES ($1, $2, $3, 'active')
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth.user_id)
    .bind(req.job_posting_id)
    .fetch_one(&state.db)
    .await?;

    info!("Created session {} for user {}", session.id, auth.user_id);
    Ok((StatusCode::CREATED, Json(session)))
}

/// GET /api/v1/sessions
pub async fn handle_list_sessions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<InterviewSessionRow>>, AppError> {
    let sessions = sqlx::query_as::<_, InterviewSessionRow>(
        "SELECT * FROM interview_sessions WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(auth.user_id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(sessions))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<InterviewSessionRow>, AppError> {
    let session = fetch_session(&state, auth.user_id, id).await?;
    Ok(Json(session))
}

/// PATCH /api/v1/sessions/:id/status
///
/// Allowed transitions: active→paused, paused→active, active→completed,
/// paused→completed. completed is terminal; anything else is a 409.
pub async fn handle_change_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusChangeRequest>,
) -> Result<Json<InterviewSessionRow>, AppError> {
    let session = fetch_session(&state, auth.user_id, id).await?;
    validate_transition(&session.status, &req.status)?;

    let updated: InterviewSessionRow = sqlx::query_as(
        r#"
        UPDATE interview_sessions SET status = $1, updated_at = now()
        WHERE id = $2
        RETURNING *
        "#,
    )
    .bind(&req.status)
    .bind(id)
    .fetch_one(&state.db)
    .await?;

    info!("Session {} moved {} -> {}", id, session.status, updated.status);
    Ok(Json(updated))
}

/// POST /api/v1/sessions/:id/retake
///
/// Starts a fresh session against the same job posting. The parent must be
/// completed. The new session inherits the chain's original_session_id (or
/// points at the parent when the parent is the original).
pub async fn handle_retake_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<InterviewSessionRow>), AppError> {
    let parent = fetch_session(&state, auth.user_id, id).await?;
    if parent.status != STATUS_COMPLETED {
        return Err(AppError::Conflict(
            "Only a completed session can be retaken".to_string(),
        ));
    }

    let fields = retake_fields(&parent);
    let retake: InterviewSessionRow = sqlx::query_as(
        r#"
        INSERT INTO interview_sessions
            (id, user_id, job_posting_id, status, retake_number, original_session_id)
        VALUES ($1, $2, $3, 'active', $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth.user_id)
    .bind(parent.job_posting_id)
    .bind(fields.retake_number)
    .bind(fields.original_session_id)
    .fetch_one(&state.db)
    .await?;

    info!(
        "Created retake {} (#{}) of session {} in chain {}",
        retake.id, fields.retake_number, id, fields.original_session_id
    );
    Ok((StatusCode::CREATED, Json(retake)))
}

/// GET /api/v1/sessions/:id/chain
///
/// Returns the full retake chain containing this session, oldest first.
pub async fn handle_get_chain(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<InterviewSessionRow>>, AppError> {
    let session = fetch_session(&state, auth.user_id, id).await?;
    let root = chain_root(&session);

    let chain = sqlx::query_as::<_, InterviewSessionRow>(
        r#"
        SELECT * FROM interview_sessions
        WHERE user_id = $1 AND (id = $2 OR original_session_id = $2)
        ORDER BY retake_number ASC
        "#,
    )
    .bind(auth.user_id)
    .bind(root)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(chain))
}

// ────────────────────────────────────────────────────────────────────────────
// Transcript handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/sessions/:id/messages
pub async fn handle_list_messages(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<SessionMessageRow>>, AppError> {
    fetch_session(&state, auth.user_id, id).await?;
    let messages = fetch_messages(&state, id).await?;
    Ok(Json(messages))
}

/// POST /api/v1/sessions/:id/answers
///
/// Appends the candidate's answer. The session must be active and the
/// latest message must be an unanswered question, keeping the transcript
/// strictly question/answer alternating.
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<AnswerRequest>,
) -> Result<(StatusCode, Json<SessionMessageRow>), AppError> {
    if req.content.trim().is_empty() {
        return Err(AppError::Validation("content cannot be empty".to_string()));
    }

    let session = fetch_session(&state, auth.user_id, id).await?;
    if session.status != STATUS_ACTIVE {
        return Err(AppError::Conflict(
            "Answers can only be submitted to an active session".to_string(),
        ));
    }

    let last: Option<SessionMessageRow> = sqlx::query_as(
        "SELECT * FROM session_messages WHERE session_id = $1 ORDER BY created_at DESC LIMIT 1",
    )
    .bind(id)
    .fetch_optional(&state.db)
    .await?;

    if !may_submit_answer(last.as_ref().map(|m| m.message_type.as_str())) {
        return Err(AppError::Conflict(
            "There is no unanswered question in this session".to_string(),
        ));
    }

    let answer: SessionMessageRow = sqlx::query_as(
        r#"
        INSERT INTO session_messages (id, session_id, message_type, content)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(id)
    .bind(MESSAGE_ANSWER)
    .bind(&req.content)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(answer)))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

pub async fn fetch_session(
    state: &AppState,
    user_id: Uuid,
    id: Uuid,
) -> Result<InterviewSessionRow, AppError> {
    sqlx::query_as::<_, InterviewSessionRow>(
        "SELECT * FROM interview_sessions WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
}

pub async fn fetch_messages(
    state: &AppState,
    session_id: Uuid,
) -> Result<Vec<SessionMessageRow>, AppError> {
    Ok(sqlx::query_as::<_, SessionMessageRow>(
        "SELECT * FROM session_messages WHERE session_id = $1 ORDER BY created_at ASC",
    )
    .bind(session_id)
    .fetch_all(&state.db)
    .await?)
}

fn validate_transition(from: &str, to: &str) -> Result<(), AppError> {
    let allowed = matches!(
        (from, to),
        (STATUS_ACTIVE, STATUS_PAUSED)
            | (STATUS_PAUSED, STATUS_ACTIVE)
            | (STATUS_ACTIVE, STATUS_COMPLETED)
            | (STATUS_PAUSED, STATUS_COMPLETED)
    );
    if !allowed {
        if ![STATUS_ACTIVE, STATUS_PAUSED, STATUS_COMPLETED].contains(&to) {
            return Err(AppError::Validation(format!("Unknown status '{to}'")));
        }
        return Err(AppError::Conflict(format!(
            "Cannot move session from '{from}' to '{to}'"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_transitions() {
        assert!(validate_transition("active", "paused").is_ok());
        assert!(validate_transition("paused", "active").is_ok());
        assert!(validate_transition("active", "completed").is_ok());
        assert!(validate_transition("paused", "completed").is_ok());
    }

    #[test]
    fn test_completed_is_terminal() {
        assert!(validate_transition("completed", "active").is_err());
        assert!(validate_transition("completed", "paused").is_err());
        assert!(validate_transition("completed", "completed").is_err());
    }

    #[test]
    fn test_noop_and_unknown_transitions_rejected() {
        assert!(validate_transition("active", "active").is_err());
        assert!(validate_transition("paused", "paused").is_err());
        assert!(validate_transition("active", "archived").is_err());
    }
}
