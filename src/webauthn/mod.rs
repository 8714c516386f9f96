//! # WebAuthn Module
//!
//! Server-side verification of passkey ceremonies.
//!
//! ## Submodules
//! - `encoding`: The one canonical base64 encode/decode pair
//! - `client_data`: `clientDataJSON` decoding and checks
//! - `authenticator_data`: The fixed binary authenticator data layout
//! - `attestation`: The CBOR attestation object
//! - `cose`: ES256 COSE keys
//! - `signature`: ECDSA P-256 signature verification
//! - `relying_party`: RP id hash and user flag checks
//! - `challenge`: Issuing and redeeming challenges
//! - `registration`: The attestation (registration) ceremony
//! - `authentication`: The assertion (login) ceremony
//! - `types`: Request/response types for the API
//!
//! ## WebAuthn Flow Overview
//!
//! ### Registration (Creating a Passkey)
//! 1. Client requests a challenge → `challenge::issue_challenge()`
//! 2. Browser creates a credential with the authenticator
//! 3. Client sends the attestation back → `registration::finish_registration()`
//! 4. Server replays the checks, extracts the public key and stores it
//!
//! ### Authentication (Logging In)
//! 1. Client requests a challenge → `challenge::issue_challenge()`
//! 2. Authenticator signs authenticator data plus the client data hash
//! 3. Client sends the assertion back → `authentication::finish_authentication()`
//! 4. Server verifies the signature with the stored key and advances the counter
//!
//! Every check is fail-closed, and a redeemed challenge stays consumed even
//! when a later check rejects the ceremony.

pub mod attestation;
pub mod authentication;
pub mod authenticator_data;
pub mod challenge;
pub mod client_data;
pub mod cose;
pub mod encoding;
pub mod registration;
pub mod relying_party;
pub mod signature;
pub mod types;

use crate::error::{AppError, Ceremony, Rejection};

/// Log a rejection and wrap it for the caller.
pub(crate) fn rejected(ceremony: Ceremony, reason: Rejection) -> AppError {
    tracing::warn!(%ceremony, reason = reason.kind(), "Ceremony rejected: {}", reason);
    AppError::Rejected(ceremony, reason)
}
