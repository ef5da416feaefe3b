//! Generic async-job tracking.
//!
//! The pattern: a handler inserts a `pending` row and returns 202 with the
//! operation id, then spawns a task that owns its own pool handle, marks the
//! row `processing`, runs the work, and writes `completed` + result or
//! `failed` + error_message. Clients poll GET /api/v1/operations/:id.
//! There is no queue and no retry here; a failed operation is simply
//! retried by the user issuing a new request.

pub mod handlers;

use std::future::Future;

use anyhow::Result;
use serde_json::Value;
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

use crate::models::operation::{OperationRow, OP_COMPLETED, OP_FAILED, OP_PENDING, OP_PROCESSING};

/// Inserts a pending operation row.
pub async fn create_operation(
    pool: &PgPool,
    operation_type: &str,
) -> Result<OperationRow, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO operations (id, operation_type, status)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(operation_type)
    .bind(OP_PENDING)
    .fetch_one(pool)
    .await
}

/// Runs `work` on a spawned task against the operation row.
///
/// The future resolves to the JSON result stored on success; its error
/// message is stored verbatim on failure, so callers should map internal
/// errors to user-facing text before returning them.
pub fn spawn_operation<F>(pool: PgPool, operation_id: Uuid, work: F)
where
    F: Future<Output = Result<Value>> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(e) = set_status(&pool, operation_id, OP_PROCESSING).await {
            error!("Operation {operation_id}: failed to mark processing: {e}");
            return;
        }

        match work.await {
            Ok(result) => {
                if let Err(e) = complete_operation(&pool, operation_id, &result).await {
                    error!("Operation {operation_id}: failed to store result: {e}");
                } else {
                    info!("Operation {operation_id} completed");
                }
            }
            Err(e) => {
                let message = e.to_string();
                info!("Operation {operation_id} failed: {message}");
                if let Err(e) = fail_operation(&pool, operation_id, &message).await {
                    error!("Operation {operation_id}: failed to store error: {e}");
                }
            }
        }
    });
}

async fn set_status(pool: &PgPool, id: Uuid, status: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE operations SET status = $1, updated_at = now() WHERE id = $2")
        .bind(status)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

async fn complete_operation(pool: &PgPool, id: Uuid, result: &Value) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE operations SET status = $1, result = $2, updated_at = now()
        WHERE id = $3
        "#,
    )
    .bind(OP_COMPLETED)
    .bind(result)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

async fn fail_operation(pool: &PgPool, id: Uuid, message: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE operations SET status = $1, error_message = $2, updated_at = now()
        WHERE id = $3
        "#,
    )
    .bind(OP_FAILED)
    .bind(message)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}
