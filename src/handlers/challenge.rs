use crate::error::AppResult;
use crate::state::AppState;
use crate::webauthn::challenge;
use crate::webauthn::types::ChallengeResponse;
use axum::{extract::State, Json};

/// Issue a challenge for either ceremony
///
/// ## Route
/// POST /api/challenge (GET is accepted too)
pub async fn create_challenge(State(state): State<AppState>) -> AppResult<Json<ChallengeResponse>> {
    let response = challenge::issue_challenge(&state).await?;

    Ok(Json(response))
}
