use crate::error::{AppError, AppResult, Ceremony, Rejection};
use crate::state::AppState;
use crate::webauthn::types::*;
use crate::webauthn::{authentication, registration, rejected};
use axum::extract::rejection::JsonRejection;
use axum::{extract::State, Json};
use serde_json::{json, Value};
use tower_sessions::Session;

/// Session key holding the authenticated credential id
pub const SESSION_CREDENTIAL_KEY: &str = "credential_id";

// Ceremony endpoints

/// An unreadable body is a malformed ceremony, answered like any other rejection.
fn ceremony_body<T>(ceremony: Ceremony, body: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    body.map(|Json(req)| req)
        .map_err(|e| rejected(ceremony, Rejection::malformed(e.body_text())))
}

pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegistrationRequest>, JsonRejection>,
) -> AppResult<Json<Value>> {
    let req = ceremony_body(Ceremony::Registration, body)?;
    let credential = registration::finish_registration(&state, &req).await?;

    Ok(Json(json!({
        "success": true,
        "credential": credential
    })))
}

pub async fn login(
    session: Session,
    State(state): State<AppState>,
    body: Result<Json<AuthenticationRequest>, JsonRejection>,
) -> AppResult<Json<AuthenticationResult>> {
    let req = ceremony_body(Ceremony::Assertion, body)?;
    let result = authentication::finish_authentication(&state, &req).await?;

    // Rotate the session id on privilege change
    session
        .cycle_id()
        .await
        .map_err(|e| AppError::Internal(format!("Session error: {}", e)))?;
    session
        .insert(SESSION_CREDENTIAL_KEY, &result.credential.id)
        .await
        .map_err(|e| AppError::Internal(format!("Session error: {}", e)))?;

    Ok(Json(result))
}

// Session endpoints

pub async fn logout(session: Session) -> AppResult<Json<Value>> {
    session
        .delete()
        .await
        .map_err(|e| AppError::Internal(format!("Session error: {}", e)))?;

    Ok(Json(json!({
        "success": true,
        "message": "Logged out successfully"
    })))
}

pub async fn session_info(session: Session) -> AppResult<Json<Value>> {
    let credential_id: Option<String> = session
        .get(SESSION_CREDENTIAL_KEY)
        .await
        .map_err(|e| AppError::Internal(format!("Session error: {}", e)))?;

    match credential_id {
        Some(id) => Ok(Json(json!({
            "authenticated": true,
            "credential_id": id
        }))),
        None => Ok(Json(json!({
            "authenticated": false
        }))),
    }
}
