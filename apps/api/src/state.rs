use sqlx::PgPool;

use crate::config::Config;
use crate::llm_client::GeminiClient;

/// Shared application state injected into all route handlers via Axum
/// extractors. The pool is the only shared resource — connections are drawn
/// per request and returned on every exit path.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub llm: GeminiClient,
    pub config: Config,
}
