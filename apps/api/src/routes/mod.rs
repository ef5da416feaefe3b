pub mod health;

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::state::AppState;
use crate::{auth, interview, jobs, operations, resume, sessions};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Auth
        .route("/api/v1/auth/register", post(auth::handlers::handle_register))
        .route("/api/v1/auth/login", post(auth::handlers::handle_login))
        .route("/api/v1/users/me", get(auth::handlers::handle_get_me))
        .route(
            "/api/v1/users/me/api-key",
            put(auth::handlers::handle_put_api_key)
                .delete(auth::handlers::handle_delete_api_key),
        )
        // Resume (one per user)
        .route("/api/v1/resumes", post(resume::handlers::handle_create_resume))
        .route(
            "/api/v1/resumes/me",
            get(resume::handlers::handle_get_resume)
                .put(resume::handlers::handle_update_resume)
                .delete(resume::handlers::handle_delete_resume),
        )
        // Job postings
        .route(
            "/api/v1/job-postings",
            post(jobs::handlers::handle_create_job_posting)
                .get(jobs::handlers::handle_list_job_postings),
        )
        .route(
            "/api/v1/job-postings/:id",
            get(jobs::handlers::handle_get_job_posting)
                .put(jobs::handlers::handle_update_job_posting)
                .delete(jobs::handlers::handle_delete_job_posting),
        )
        // Interview sessions
        .route(
            "/api/v1/sessions",
            post(sessions::handlers::handle_create_session)
                .get(sessions::handlers::handle_list_sessions),
        )
        .route("/api/v1/sessions/:id", get(sessions::handlers::handle_get_session))
        .route(
            "/api/v1/sessions/:id/status",
            patch(sessions::handlers::handle_change_status),
        )
        .route(
            "/api/v1/sessions/:id/retake",
            post(sessions::handlers::handle_retake_session),
        )
        .route(
            "/api/v1/sessions/:id/chain",
            get(sessions::handlers::handle_get_chain),
        )
        .route(
            "/api/v1/sessions/:id/messages",
            get(sessions::handlers::handle_list_messages),
        )
        .route(
            "/api/v1/sessions/:id/answers",
            post(sessions::handlers::handle_submit_answer),
        )
        // LLM-backed operations
        .route(
            "/api/v1/sessions/:id/questions",
            post(interview::handlers::handle_generate_question),
        )
        .route(
            "/api/v1/sessions/:id/feedback",
            post(interview::handlers::handle_generate_feedback)
                .get(interview::handlers::handle_get_feedback),
        )
        .route(
            "/api/v1/operations/:id",
            get(operations::handlers::handle_get_operation),
        )
        .with_state(state)
}
