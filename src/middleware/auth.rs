use crate::error::AppError;
use crate::handlers::auth::SESSION_CREDENTIAL_KEY;
use axum::{extract::Request, middleware::Next, response::Response};
use tower_sessions::Session;

/// Reject requests whose session has not completed an assertion.
pub async fn require_auth(
    session: Session,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let credential_id: Option<String> = session
        .get(SESSION_CREDENTIAL_KEY)
        .await
        .map_err(|e| AppError::Internal(format!("Session error: {}", e)))?;

    match credential_id {
        Some(id) => {
            tracing::debug!(credential_id = %id, "Session authenticated");
            Ok(next.run(request).await)
        }
        None => Err(AppError::Unauthorized("Not authenticated".to_string())),
    }
}
