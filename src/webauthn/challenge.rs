//! Issuing and redeeming ceremony challenges.

use crate::db::challenges;
use crate::db::models::Challenge;
use crate::error::{AppResult, Ceremony, Rejection};
use crate::state::AppState;
use crate::webauthn::rejected;
use crate::webauthn::types::ChallengeResponse;

/// Issue a fresh challenge for either ceremony.
pub async fn issue_challenge(state: &AppState) -> AppResult<ChallengeResponse> {
    let challenge = challenges::issue_challenge(&state.store, state.challenge_ttl).await?;

    Ok(ChallengeResponse {
        challenge: challenge.value_base64(),
        id: challenge.id,
    })
}

/// Consume the challenge for `id`.
///
/// The row is gone once this returns, whatever the caller decides next. An
/// expired challenge is consumed too and then rejected.
pub(crate) async fn redeem(state: &AppState, ceremony: Ceremony, id: &str) -> AppResult<Challenge> {
    let challenge = challenges::redeem_challenge(&state.store, id)
        .await?
        .ok_or_else(|| rejected(ceremony, Rejection::ChallengeNotFound))?;

    if challenge.is_expired() {
        return Err(rejected(ceremony, Rejection::ChallengeExpired));
    }

    Ok(challenge)
}
