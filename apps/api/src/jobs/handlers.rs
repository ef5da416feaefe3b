//! Axum route handlers for the job-posting API.
//!
//! All queries are scoped by the authenticated user's id; a posting owned
//! by someone else looks identical to a missing one (404).

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::auth::extract::AuthUser;
use crate::errors::AppError;
use crate::models::job_posting::JobPostingRow;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct JobPostingBody {
    pub title: String,
    pub company: String,
    pub description: String,
    pub experience_level: String,
    #[serde(default)]
    pub tech_stack: Vec<String>,
}

/// POST /api/v1/job-postings
pub async fn handle_create_job_posting(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<JobPostingBody>,
) -> Result<(StatusCode, Json<JobPostingRow>), AppError> {
    validate_body(&req)?;

    let posting: JobPostingRow = sqlx::query_as(
        r#"
        INSERT INTO job_postings (id, user_id, title, company, description, experience_level, tech_stack)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth.user_id)
    .bind(req.title.trim())
    .bind(req.company.trim())
    .bind(&req.description)
    .bind(req.experience_level.trim())
    .bind(Value::from(req.tech_stack.clone()))
    .fetch_one(&state.db)
    .await?;

    info!("Created job posting {} for user {}", posting.id, auth.user_id);
    Ok((StatusCode::CREATED, Json(posting)))
}

/// GET /api/v1/job-postings
pub async fn handle_list_job_postings(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<JobPostingRow>>, AppError> {
    let postings = sqlx::query_as::<_, JobPostingRow>(
        "SELECT * FROM job_postings WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(auth.user_id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(postings))
}

/// GET /api/v1/job-postings/:id
pub async fn handle_get_job_posting(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<JobPostingRow>, AppError> {
    let posting = fetch_job_posting(&state, auth.user_id, id).await?;
    Ok(Json(posting))
}

/// PUT /api/v1/job-postings/:id
pub async fn handle_update_job_posting(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<JobPostingBody>,
) -> Result<Json<JobPostingRow>, AppError> {
    validate_body(&req)?;

    let posting: Option<JobPostingRow> = sqlx::query_as(
        r#"
        UPDATE job_postings
        SET title = $1, company = $2, description = $3, experience_level = $4,
            tech_stack = $5, updated_at = now()
        WHERE id = $6 AND user_id = $7
        RETURNING *
        "#,
    )
    .bind(req.title.trim())
    .bind(req.company.trim())
    .bind(&req.description)
    .bind(req.experience_level.trim())
    .bind(Value::from(req.tech_stack.clone()))
    .bind(id)
    .bind(auth.user_id)
    .fetch_optional(&state.db)
    .await?;

    posting
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Job posting {id} not found")))
}

/// DELETE /api/v1/job-postings/:id
pub async fn handle_delete_job_posting(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let deleted = sqlx::query("DELETE FROM job_postings WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(auth.user_id)
        .execute(&state.db)
        .await?;

    if deleted.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Job posting {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn fetch_job_posting(
    state: &AppState,
    user_id: Uuid,
    id: Uuid,
) -> Result<JobPostingRow, AppError> {
    sqlx::query_as::<_, JobPostingRow>(
        "SELECT * FROM job_postings WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Job posting {id} not found")))
}

fn validate_body(req: &JobPostingBody) -> Result<(), AppError> {
    if req.title.trim().is_empty() {
        return Err(AppError::Validation("title cannot be empty".to_string()));
    }
    if req.description.trim().is_empty() {
        return Err(AppError::Validation(
            "description cannot be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body() -> JobPostingBody {
        JobPostingBody {
            title: "Backend Engineer".to_string(),
            company: "Acme".to_string(),
            description: "Build and operate APIs.".to_string(),
            experience_level: "senior".to_string(),
            tech_stack: vec!["Rust".to_string(), "PostgreSQL".to_string()],
        }
    }

    #[test]
    fn test_validate_body_accepts_complete_posting() {
        assert!(validate_body(&body()).is_ok());
    }

    #[test]
    fn test_validate_body_requires_title_and_description() {
        let mut no_title = body();
        no_title.title = "  ".to_string();
        assert!(validate_body(&no_title).is_err());

        let mut no_desc = body();
        no_desc.description = String::new();
        assert!(validate_body(&no_desc).is_err());
    }

    #[test]
    fn test_tech_stack_defaults_to_empty_array() {
        let req: JobPostingBody = serde_json::from_value(serde_json::json!({
            "title": "Backend Engineer",
            "company": "Acme",
            "description": "Build APIs.",
            "experience_level": "mid"
        }))
        .unwrap();
        assert!(req.tech_stack.is_empty());
    }
}
