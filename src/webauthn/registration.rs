//! # Passkey Registration Logic
//!
//! Replays the registration ceremony for an attestation sent by the browser,
//! extracts the new public key and stores it.
//!
//! ## Check order
//! 1. Required fields present
//! 2. Client data decodes
//! 3. Client data type is "webauthn.create" (before the challenge is touched)
//! 4. Challenge redeemed (consumed from here on, whatever happens next)
//! 5. Challenge value matches
//! 6. Origin (and top origin) match
//! 7. Attestation object decodes
//! 8. RP id hash matches
//! 9. User present and user verified flags set
//! 10. Credential id length within bounds
//! 11. COSE key is ES256 on P-256
//! 12. Credential stored (an id already on file is rejected)
//!
//! ## Security Note
//! Attestation statements are not validated. Formats other than "none" are
//! accepted and their statement is ignored.

use crate::db::credentials;
use crate::db::models::{timestamp, Credential, Curve, PublicKeyAlgorithm};
use crate::error::{AppError, AppResult, Ceremony, Rejection};
use crate::state::AppState;
use crate::webauthn::attestation::AttestationObject;
use crate::webauthn::authenticator_data::AuthenticatorData;
use crate::webauthn::challenge;
use crate::webauthn::client_data::{CollectedClientData, CREATE_TYPE};
use crate::webauthn::cose::CoseKey;
use crate::webauthn::types::{required, RegistrationRequest};
use crate::webauthn::{encoding, rejected};
use chrono::Utc;
use uuid::Uuid;

fn reject(reason: Rejection) -> AppError {
    rejected(Ceremony::Registration, reason)
}

/// Verify an attestation and register the credential it carries
///
/// ## Errors
/// - `Rejected(Registration, _)`: one of the checks above failed
/// - `Database`: the store failed; the whole ceremony can be retried with a new challenge
pub async fn finish_registration(
    state: &AppState,
    req: &RegistrationRequest,
) -> AppResult<Credential> {
    let ceremony_id = required(&req.id, "id").map_err(reject)?;
    let client_data_json = required(&req.client_data_json, "clientDataJSON").map_err(reject)?;
    let attestation_object =
        required(&req.attestation_object, "attestationObject").map_err(reject)?;
    let user_name = required(&req.user_name, "userName").map_err(reject)?;
    let display_name = required(&req.display_name, "displayName").map_err(reject)?;

    let client_data = CollectedClientData::decode(client_data_json).map_err(reject)?;
    client_data.verify_type(CREATE_TYPE).map_err(reject)?;

    let challenge = challenge::redeem(state, Ceremony::Registration, ceremony_id).await?;
    client_data
        .verify_challenge(&challenge.value)
        .map_err(reject)?;
    client_data
        .verify_origin(&state.relying_party.allowed_origin)
        .map_err(reject)?;

    let attestation_bytes = encoding::decode(attestation_object)
        .map_err(|_| reject(Rejection::malformed("attestationObject is not valid base64")))?;
    let attestation = AttestationObject::decode(&attestation_bytes).map_err(reject)?;
    if !attestation.is_self_attested() {
        tracing::debug!(fmt = %attestation.fmt, "Attestation statement accepted without validation");
    }

    // Header checks come before the credential block is parsed
    let header = AuthenticatorData::decode(&attestation.auth_data).map_err(reject)?;
    state
        .relying_party
        .verify_authenticator_data(&header)
        .map_err(reject)?;

    let auth_data = AuthenticatorData::decode_attested(&attestation.auth_data).map_err(reject)?;
    let attested = auth_data
        .attested_credential
        .ok_or_else(|| reject(Rejection::malformed("missing attested credential data")))?;
    if attested.credential_id.is_empty() {
        return Err(reject(Rejection::malformed("empty credential id")));
    }

    let public_key = CoseKey::from_value(&attested.public_key).map_err(reject)?;

    let credential = Credential {
        id: encoding::encode(&attested.credential_id),
        public_key_algorithm: PublicKeyAlgorithm::Es256,
        curve: Curve::P256,
        x: public_key.x,
        y: public_key.y,
        sign_counter: auth_data.sign_count,
        user_name: user_name.to_string(),
        display_name: display_name.to_string(),
        transports: req.transports.iter().cloned().collect(),
        aaguid: Uuid::from_bytes(attested.aaguid).to_string(),
        attestation_format: attestation.fmt,
        backup_eligible: auth_data.flags.backup_eligible(),
        backup_state: auth_data.flags.backup_state(),
        created_at: timestamp(Utc::now()),
        last_used_at: None,
    };

    match credentials::save_credential(&state.store, &credential).await {
        Err(AppError::Database(sqlx::Error::Database(e))) if e.is_unique_violation() => {
            return Err(reject(Rejection::CredentialAlreadyRegistered));
        }
        result => result?,
    }

    tracing::info!(
        credential_id = %credential.id,
        user_name = %credential.user_name,
        "Registered passkey"
    );
    Ok(credential)
}
