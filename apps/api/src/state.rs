use reqwest::Client as HttpClient;
use sqlx::PgPool;

use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// There is no long-lived LLM client here: calls are made with each user's
/// own decrypted API key, so an `LlmClient` is built per request on top of
/// the shared `http` connection pool.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub http: HttpClient,
}
