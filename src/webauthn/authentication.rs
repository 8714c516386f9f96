use crate::db::credentials;
use crate::error::{AppError, AppResult, Ceremony, Rejection};
use crate::state::AppState;
use crate::webauthn::authenticator_data::AuthenticatorData;
use crate::webauthn::challenge;
use crate::webauthn::client_data::{CollectedClientData, GET_TYPE};
use crate::webauthn::cose::CoseKey;
use crate::webauthn::types::{required, AuthenticationRequest, AuthenticationResult};
use crate::webauthn::{encoding, rejected, signature};

fn reject(reason: Rejection) -> AppError {
    rejected(Ceremony::Assertion, reason)
}

/// Verify an assertion against a stored credential.
///
/// The challenge is redeemed and the credential looked up before any parsing
/// of the signed payload, so a forged request costs one challenge and no
/// cryptographic work. On success the stored counter advances to the
/// authenticator's value.
pub async fn finish_authentication(
    state: &AppState,
    req: &AuthenticationRequest,
) -> AppResult<AuthenticationResult> {
    let ceremony_id = required(&req.challenge_id, "challengeID").map_err(reject)?;
    let credential_id = required(&req.credential_id, "credentialID").map_err(reject)?;
    let client_data_json = required(&req.client_data_json, "clientDataJSON").map_err(reject)?;
    let authenticator_data =
        required(&req.authenticator_data, "authenticatorData").map_err(reject)?;
    let signature_b64 = required(&req.signature, "signature").map_err(reject)?;

    let challenge = challenge::redeem(state, Ceremony::Assertion, ceremony_id).await?;

    let credential_id = encoding::canonicalize(credential_id)
        .map_err(|_| reject(Rejection::malformed("credentialID is not valid base64")))?;
    let mut credential = credentials::find_by_credential_id(&state.store, &credential_id)
        .await?
        .ok_or_else(|| reject(Rejection::CredentialNotFound))?;

    let client_data = CollectedClientData::decode(client_data_json).map_err(reject)?;
    client_data.verify_type(GET_TYPE).map_err(reject)?;
    client_data
        .verify_challenge(&challenge.value)
        .map_err(reject)?;
    client_data
        .verify_origin(&state.relying_party.allowed_origin)
        .map_err(reject)?;

    let auth_data_bytes = encoding::decode(authenticator_data)
        .map_err(|_| reject(Rejection::malformed("authenticatorData is not valid base64")))?;
    let auth_data = AuthenticatorData::decode(&auth_data_bytes).map_err(reject)?;
    state
        .relying_party
        .verify_authenticator_data(&auth_data)
        .map_err(reject)?;

    // authenticatorData || SHA-256(clientDataJSON), over the bytes as received
    let mut signed_data = auth_data_bytes.clone();
    signed_data.extend_from_slice(&client_data.hash());

    let signature_der = encoding::decode(signature_b64)
        .map_err(|_| reject(Rejection::malformed("signature is not valid base64")))?;

    let public_key = CoseKey {
        x: credential.x,
        y: credential.y,
    };
    if public_key.to_public_key().is_none() {
        return Err(AppError::Internal(format!(
            "stored credential {} is not a P-256 point",
            credential.id
        )));
    }
    if !signature::verify(&public_key, &signed_data, &signature_der) {
        return Err(reject(Rejection::BadSignature));
    }

    check_counter(credential.sign_counter, auth_data.sign_count).map_err(reject)?;

    let used_at =
        credentials::update_counter(&state.store, &credential.id, auth_data.sign_count).await?;
    credential.sign_counter = auth_data.sign_count;
    credential.last_used_at = Some(used_at);

    tracing::info!(
        credential_id = %credential.id,
        sign_counter = credential.sign_counter,
        "Authenticated passkey"
    );
    Ok(AuthenticationResult {
        verified: true,
        credential,
    })
}

/// Signature counter check
///
/// Zero on both sides means the authenticator has no counter. Otherwise the
/// new value must be strictly greater than the stored one; a repeated or
/// lower value means two copies of the key are in use.
fn check_counter(stored: u32, received: u32) -> Result<(), Rejection> {
    if (stored != 0 || received != 0) && received <= stored {
        return Err(Rejection::PossibleCloning);
    }
    Ok(())
}
