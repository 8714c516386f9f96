//! Router assembly, shared by the binary and the HTTP tests.

use crate::handlers::auth::{login, logout, register, session_info};
use crate::handlers::challenge::create_challenge;
use crate::handlers::credentials::get_current_credential;
use crate::handlers::health::health_check;
use crate::middleware;
use crate::state::AppState;
use axum::http::HeaderValue;
use axum::{middleware as axum_middleware, routing::{get, post}, Router};
use time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};

/// Build the application router
///
/// Sessions expire after 24 hours of inactivity. CORS admits only the
/// configured origin, the same one client data must report.
pub fn router<S>(state: AppState, session_store: S, static_dir: &str) -> Router
where
    S: SessionStore + Clone,
{
    let session_layer = SessionManagerLayer::new(session_store)
        .with_expiry(Expiry::OnInactivity(Duration::hours(24)));

    let cors = match HeaderValue::from_str(&state.relying_party.allowed_origin) {
        Ok(origin) => CorsLayer::new().allow_origin(origin),
        Err(_) => {
            tracing::warn!(
                origin = %state.relying_party.allowed_origin,
                "Allowed origin is not a valid header value, CORS disabled"
            );
            CorsLayer::new()
        }
    }
    .allow_methods(Any)
    .allow_headers(Any);

    // Routes that require a logged-in session
    let protected_routes = Router::new()
        .route("/api/credentials/me", get(get_current_credential))
        .layer(axum_middleware::from_fn(middleware::auth::require_auth));

    Router::new()
        .route("/health", get(health_check))
        // Both ceremonies start with a challenge
        .route("/api/challenge", get(create_challenge).post(create_challenge))
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/session", get(session_info))
        .merge(protected_routes)
        .fallback_service(ServeDir::new(static_dir))
        .layer(session_layer)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
