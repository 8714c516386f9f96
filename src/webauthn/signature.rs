//! ES256 signature verification.

use crate::webauthn::cose::CoseKey;
use p256::ecdsa::signature::Verifier;
use p256::ecdsa::{Signature, VerifyingKey};

/// Verify an ASN.1 DER encoded ECDSA P-256/SHA-256 signature over `message`.
///
/// Malformed DER, an off-curve key or a wrong signature all return `false`.
/// The message is hashed here; pass the signed bytes, not their digest.
pub fn verify(public_key: &CoseKey, message: &[u8], signature: &[u8]) -> bool {
    let Some(public_key) = public_key.to_public_key() else {
        return false;
    };
    let Ok(signature) = Signature::from_der(signature) else {
        return false;
    };

    VerifyingKey::from(public_key)
        .verify(message, &signature)
        .is_ok()
}
