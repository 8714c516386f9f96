//! Canonical base64 handling.
//!
//! Every identifier and challenge comparison goes through [`encode`] and
//! [`decode`]. Browsers hand us a mix of `btoa` output (standard alphabet,
//! padded) and `PublicKeyCredential.id` (web-safe alphabet, unpadded), so
//! decoding accepts both and encoding always produces the web-safe unpadded form.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use base64::prelude::*;
use serde::Serializer;

const LENIENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);

const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);

/// Encode bytes in the canonical form: web-safe alphabet, no padding.
pub fn encode(bytes: impl AsRef<[u8]>) -> String {
    BASE64_URL_SAFE_NO_PAD.encode(bytes)
}

/// Encode bytes as padded standard base64, the form `atob` understands.
pub fn encode_standard(bytes: impl AsRef<[u8]>) -> String {
    STANDARD.encode(bytes)
}

/// Decode base64 in either alphabet, with or without padding.
pub fn decode(text: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let text = text.trim();
    if text.contains(['-', '_']) {
        URL_SAFE_LENIENT.decode(text)
    } else {
        STANDARD_LENIENT.decode(text)
    }
}

/// Re-encode any accepted base64 spelling into the canonical form.
pub fn canonicalize(text: &str) -> Result<String, base64::DecodeError> {
    decode(text).map(encode)
}

/// `serialize_with` helper that writes bytes in the canonical form.
pub fn serialize<S, T>(bytes: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: AsRef<[u8]>,
{
    serializer.serialize_str(&encode(bytes))
}
