//! Axum route handlers for registration, login, and account settings.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::extract::AuthUser;
use crate::auth::jwt::{issue_token, TOKEN_TTL_HOURS};
use crate::auth::password::{hash_password, verify_password};
use crate::crypto::ApiKeyCipher;
use crate::errors::AppError;
use crate::models::user::UserRow;
use crate::state::AppState;

const MIN_PASSWORD_LEN: usize = 8;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

/// Public view of a user. Never exposes the password hash or the stored key.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub has_api_key: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<UserRow> for UserResponse {
    fn from(row: UserRow) -> Self {
        UserResponse {
            id: row.id,
            email: row.email,
            has_api_key: row.encrypted_api_key.is_some(),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

#[derive(Debug, Deserialize)]
pub struct ApiKeyRequest {
    pub api_key: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let email = req.email.trim().to_lowercase();
    validate_email(&email)?;
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let existing: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&state.db)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(
            "An account with this email already exists".to_string(),
        ));
    }

    let hashed = hash_password(&req.password)?;
    // The pre-check can race a concurrent register; the UNIQUE constraint on
    // users.email is the real guard, so its violation is still a 409.
    let user: UserRow = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, hashed_password)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&email)
    .bind(&hashed)
    .fetch_one(&state.db)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("An account with this email already exists".to_string())
        } else {
            AppError::Database(e)
        }
    })?;

    info!("Registered user {}", user.id);

    let access_token = issue_token(&state.config.jwt_secret, user.id)?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user: user.into(),
            access_token,
            token_type: "bearer",
            expires_in: TOKEN_TTL_HOURS * 3600,
        }),
    ))
}

/// POST /api/v1/auth/login
///
/// Wrong email and wrong password return the same 401 so the endpoint
/// cannot be used to probe which emails are registered.
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let email = req.email.trim().to_lowercase();

    let user: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&state.db)
        .await?;

    let user = match user {
        Some(u) if verify_password(&req.password, &u.hashed_password) => u,
        _ => return Err(AppError::Unauthorized),
    };

    let access_token = issue_token(&state.config.jwt_secret, user.id)?;
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
        expires_in: TOKEN_TTL_HOURS * 3600,
    }))
}

/// GET /api/v1/users/me
pub async fn handle_get_me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<UserResponse>, AppError> {
    let user = fetch_user(&state, auth.user_id).await?;
    Ok(Json(user.into()))
}

/// PUT /api/v1/users/me/api-key
///
/// Stores the user's LLM API key, Fernet-encrypted at rest.
pub async fn handle_put_api_key(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<ApiKeyRequest>,
) -> Result<StatusCode, AppError> {
    let api_key = req.api_key.trim();
    if api_key.is_empty() {
        return Err(AppError::Validation("api_key cannot be empty".to_string()));
    }

    let cipher = ApiKeyCipher::new(&state.config.encryption_key)?;
    let encrypted = cipher.encrypt(api_key);

    let updated = sqlx::query(
        "UPDATE users SET encrypted_api_key = $1, updated_at = now() WHERE id = $2",
    )
    .bind(&encrypted)
    .bind(auth.user_id)
    .execute(&state.db)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(AppError::Unauthorized);
    }

    info!("Stored encrypted API key for user {}", auth.user_id);
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/users/me/api-key
pub async fn handle_delete_api_key(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<StatusCode, AppError> {
    sqlx::query("UPDATE users SET encrypted_api_key = NULL, updated_at = now() WHERE id = $1")
        .bind(auth.user_id)
        .execute(&state.db)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

pub async fn fetch_user(state: &AppState, user_id: Uuid) -> Result<UserRow, AppError> {
    sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::Unauthorized)
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .map(|code| is_unique_violation_code(&code))
        .unwrap_or(false)
}

/// Postgres SQLSTATE 23505 (unique_violation).
fn is_unique_violation_code(code: &str) -> bool {
    code == "23505"
}

fn validate_email(email: &str) -> Result<(), AppError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(AppError::Validation(
            "email is not a valid address".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email_accepts_plain_addresses() {
        assert!(validate_email("dev@example.com").is_ok());
        assert!(validate_email("a.b+tag@sub.example.org").is_ok());
    }

    #[test]
    fn test_validate_email_rejects_malformed() {
        for bad in ["", "no-at-sign", "@example.com", "user@", "user@nodot", "user@.com"] {
            assert!(validate_email(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_unique_violation_code_detection() {
        assert!(is_unique_violation_code("23505"));
        // Other constraint failures (e.g. foreign key) stay database errors
        assert!(!is_unique_violation_code("23503"));
        assert!(!is_unique_violation_code(""));
    }

    #[test]
    fn test_non_database_errors_are_not_unique_violations() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }

    #[test]
    fn test_user_response_hides_secrets() {
        let row = UserRow {
            id: Uuid::new_v4(),
            email: "dev@example.com".to_string(),
            hashed_password: "$2b$12$hash".to_string(),
            encrypted_api_key: Some("gAAAAA...".to_string()),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        let resp: UserResponse = row.into();
        let json = serde_json::to_value(&resp).unwrap();
        assert!(json.get("hashed_password").is_none());
        assert!(json.get("encrypted_api_key").is_none());
        assert_eq!(json["has_api_key"], true);
    }
}
