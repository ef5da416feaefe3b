//! Poll endpoint for async operations.

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::auth::extract::AuthUser;
use crate::errors::AppError;
use crate::models::operation::OperationRow;
use crate::state::AppState;

/// GET /api/v1/operations/:id
///
/// Operation rows are not tied to a user, but the operation id is a v4 UUID
/// handed out only to the requester, so authentication alone gates access.
pub async fn handle_get_operation(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<OperationRow>, AppError> {
    let operation = sqlx::query_as::<_, OperationRow>("SELECT * FROM operations WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Operation {id} not found")))?;
    Ok(Json(operation))
}
