//! # WebAuthn API Types
//!
//! Request/response bodies for the ceremony endpoints. Field names follow what
//! the browser-side script sends, so they are camelCase on the wire.
//!
//! Request fields are `Option` on purpose: a missing field is a ceremony
//! rejection (`MalformedInput`), not a JSON extractor error.

use crate::db::models::Credential;
use crate::error::Rejection;
use serde::{Deserialize, Serialize};

/// Response to a challenge request
///
/// ## Example JSON
/// ```json
/// {
///   "id": "Jm1y3Vx1...",
///   "challenge": "q83vEjRWeJA...=="
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeResponse {
    /// Ceremony id the client must send back
    pub id: String,
    /// Challenge value as standard base64
    pub challenge: String,
}

/// Registration request, sent after `navigator.credentials.create()`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    /// Ceremony (challenge) id
    pub id: Option<String>,

    /// Base64 `response.clientDataJSON`
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: Option<String>,

    /// Base64 `response.attestationObject`
    pub attestation_object: Option<String>,

    pub user_name: Option<String>,

    pub display_name: Option<String>,

    /// `response.getTransports()`
    #[serde(default)]
    pub transports: Vec<String>,
}

/// Login request, sent after `navigator.credentials.get()`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthenticationRequest {
    /// Ceremony (challenge) id
    #[serde(rename = "challengeID")]
    pub challenge_id: Option<String>,

    /// Credential id in either base64 alphabet
    #[serde(rename = "credentialID")]
    pub credential_id: Option<String>,

    #[serde(rename = "clientDataJSON")]
    pub client_data_json: Option<String>,

    /// Base64 `response.authenticatorData`
    #[serde(rename = "authenticatorData")]
    pub authenticator_data: Option<String>,

    /// Base64 DER-encoded ECDSA signature
    pub signature: Option<String>,
}

/// Outcome of a verified assertion
#[derive(Debug, Clone, Serialize)]
pub struct AuthenticationResult {
    pub verified: bool,
    /// The matched credential with its advanced counter
    pub credential: Credential,
}

/// Unwrap a required, non-empty request field.
pub(crate) fn required<'a>(field: &'a Option<String>, name: &str) -> Result<&'a str, Rejection> {
    match field.as_deref() {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(Rejection::malformed(format!("missing {name}"))),
    }
}
