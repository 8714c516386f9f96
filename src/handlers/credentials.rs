//! # Credential Handlers
//!
//! Endpoints that read the caller's own credential record.

use crate::db::credentials;
use crate::error::{AppError, AppResult};
use crate::handlers::auth::SESSION_CREDENTIAL_KEY;
use crate::state::AppState;
use axum::{extract::State, Json};
use serde_json::{json, Value};
use tower_sessions::Session;

/// Get the credential the current session authenticated with
///
/// ## Route
/// GET /api/credentials/me
///
/// ## Authentication
/// Requires authentication (protected by require_auth middleware)
///
/// ## Response
/// ```json
/// {
///   "id": "q83vEjRWeJA",
///   "userName": "alice",
///   "displayName": "Alice Smith",
///   "signCounter": 12,
///   "transports": ["internal"],
///   "lastUsedAt": "2024-01-15T10:30:00.000000Z"
/// }
/// ```
///
/// The public key coordinates are not returned.
pub async fn get_current_credential(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<Value>> {
    let credential_id: String = session
        .get(SESSION_CREDENTIAL_KEY)
        .await
        .map_err(|e| AppError::Internal(format!("Session error: {}", e)))?
        .ok_or_else(|| AppError::Unauthorized("Not authenticated".to_string()))?;

    // The credential can vanish if the store was reset behind the session
    let credential = credentials::find_by_credential_id(&state.store, &credential_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Credential no longer registered".to_string()))?;

    Ok(Json(json!({
        "id": credential.id,
        "userName": credential.user_name,
        "displayName": credential.display_name,
        "signCounter": credential.sign_counter,
        "transports": credential.transports,
        "lastUsedAt": credential.last_used_at
    })))
}
