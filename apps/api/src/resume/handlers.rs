//! Axum route handlers for the résumé API. One résumé per user.

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::extract::AuthUser;
use crate::errors::AppError;
use crate::models::resume::ResumeRow;
use crate::state::AppState;

/// Upper bound on résumé content, in bytes.
pub const MAX_RESUME_BYTES: usize = 50 * 1024;

#[derive(Debug, Deserialize)]
pub struct ResumeBody {
    pub content: String,
}

/// POST /api/v1/resumes
///
/// Creates the caller's résumé. A second create is a 409 — use PUT to replace.
pub async fn handle_create_resume(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<ResumeBody>,
) -> Result<(StatusCode, Json<ResumeRow>), AppError> {
    validate_content(&req.content)?;

    let existing: Option<ResumeRow> =
        sqlx::query_as("SELECT * FROM resumes WHERE user_id = $1")
            .bind(auth.user_id)
            .fetch_optional(&state.db)
            .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(
            "A resume already exists for this user".to_string(),
        ));
    }

    let resume: ResumeRow = sqlx::query_as(
        r#"
        INSERT INTO resumes (id, user_id, content)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth.user_id)
    .bind(&req.content)
    .fetch_one(&state.db)
    .await?;

    info!("Created resume {} for user {}", resume.id, auth.user_id);
    Ok((StatusCode::CREATED, Json(resume)))
}

/// GET /api/v1/resumes/me
pub async fn handle_get_resume(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ResumeRow>, AppError> {
    let resume = fetch_resume(&state, auth.user_id).await?;
    Ok(Json(resume))
}

/// PUT /api/v1/resumes/me
pub async fn handle_update_resume(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<ResumeBody>,
) -> Result<Json<ResumeRow>, AppError> {
    validate_content(&req.content)?;

    let resume: Option<ResumeRow> = sqlx::query_as(
        r#"
        UPDATE resumes SET content = $1, updated_at = now()
        WHERE user_id = $2
        RETURNING *
        "#,
    )
    .bind(&req.content)
    .bind(auth.user_id)
    .fetch_optional(&state.db)
    .await?;

    let resume = resume.ok_or_else(|| AppError::NotFound("No resume on file".to_string()))?;
    Ok(Json(resume))
}

/// DELETE /api/v1/resumes/me
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<StatusCode, AppError> {
    let deleted = sqlx::query("DELETE FROM resumes WHERE user_id = $1")
        .bind(auth.user_id)
        .execute(&state.db)
        .await?;

    if deleted.rows_affected() == 0 {
        return Err(AppError::NotFound("No resume on file".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn fetch_resume(state: &AppState, user_id: Uuid) -> Result<ResumeRow, AppError> {
    sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("No resume on file".to_string()))
}

fn validate_content(content: &str) -> Result<(), AppError> {
    if content.trim().is_empty() {
        return Err(AppError::Validation("content cannot be empty".to_string()));
    }
    if content.len() > MAX_RESUME_BYTES {
        return Err(AppError::Validation(format!(
            "content exceeds the {}KB limit",
            MAX_RESUME_BYTES / 1024
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_content_accepts_typical_resume() {
        assert!(validate_content("Senior engineer. 8 years of Rust.").is_ok());
    }

    #[test]
    fn test_validate_content_rejects_empty_and_whitespace() {
        assert!(validate_content("").is_err());
        assert!(validate_content("   \n\t ").is_err());
    }

    #[test]
    fn test_validate_content_enforces_size_limit() {
        let at_limit = "x".repeat(MAX_RESUME_BYTES);
        assert!(validate_content(&at_limit).is_ok());
        let over = "x".repeat(MAX_RESUME_BYTES + 1);
        assert!(validate_content(&over).is_err());
    }
}
