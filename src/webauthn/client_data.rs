//! # Client Data
//!
//! The browser serializes `CollectedClientData` to JSON and the authenticator
//! signs over its SHA-256 digest. We keep the raw bytes next to the parsed
//! fields because the signature covers the bytes, not our re-serialization.

use crate::error::Rejection;
use crate::webauthn::encoding;
use serde::Deserialize;
use sha2::{Digest, Sha256};

pub const CREATE_TYPE: &str = "webauthn.create";
pub const GET_TYPE: &str = "webauthn.get";

/// Parsed `clientDataJSON`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientData {
    /// "webauthn.create" or "webauthn.get"
    #[serde(rename = "type")]
    pub ceremony_type: String,

    /// Base64url challenge, as the browser received it
    pub challenge: String,

    pub origin: String,

    #[serde(default)]
    pub top_origin: Option<String>,

    #[serde(default)]
    pub cross_origin: Option<bool>,
}

/// Client data together with the exact bytes it was decoded from
#[derive(Debug, Clone)]
pub struct CollectedClientData {
    pub parsed: ClientData,
    pub raw: Vec<u8>,
}

impl CollectedClientData {
    /// Decode a base64 payload into UTF-8 JSON and parse it.
    pub fn decode(payload: &str) -> Result<Self, Rejection> {
        let raw = encoding::decode(payload)
            .map_err(|_| Rejection::malformed("clientDataJSON is not valid base64"))?;
        let text = std::str::from_utf8(&raw)
            .map_err(|_| Rejection::malformed("clientDataJSON is not valid UTF-8"))?;
        let parsed: ClientData = serde_json::from_str(text)
            .map_err(|e| Rejection::malformed(format!("clientDataJSON: {e}")))?;

        Ok(Self { parsed, raw })
    }

    pub fn verify_type(&self, expected: &str) -> Result<(), Rejection> {
        if self.parsed.ceremony_type == expected {
            Ok(())
        } else {
            Err(Rejection::WrongCeremonyType)
        }
    }

    /// Compare the echoed challenge against the redeemed value, both in
    /// canonical form.
    pub fn verify_challenge(&self, expected: &[u8]) -> Result<(), Rejection> {
        let echoed =
            encoding::canonicalize(&self.parsed.challenge).map_err(|_| Rejection::ChallengeMismatch)?;
        if echoed == encoding::encode(expected) {
            Ok(())
        } else {
            Err(Rejection::ChallengeMismatch)
        }
    }

    /// `origin` must match case-insensitively; `topOrigin`, when present,
    /// must match as well.
    pub fn verify_origin(&self, allowed_origin: &str) -> Result<(), Rejection> {
        if self.parsed.origin.to_lowercase() != allowed_origin {
            return Err(Rejection::OriginMismatch);
        }
        match &self.parsed.top_origin {
            Some(top) if top.to_lowercase() != allowed_origin => Err(Rejection::OriginMismatch),
            _ => Ok(()),
        }
    }

    /// SHA-256 over the raw JSON bytes
    pub fn hash(&self) -> [u8; 32] {
        Sha256::digest(&self.raw).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webauthn::encoding::encode_standard;

    fn payload(json: &str) -> String {
        encode_standard(json.as_bytes())
    }

    #[test]
    fn decodes_create_client_data() {
        let challenge = encoding::encode([7u8; 32]);
        let json = format!(
            r#"{{"type":"webauthn.create","challenge":"{challenge}","origin":"https://Example.com","crossOrigin":false}}"#
        );
        let client_data = CollectedClientData::decode(&payload(&json)).unwrap();

        assert_eq!(client_data.raw, json.as_bytes());
        assert!(client_data.verify_type(CREATE_TYPE).is_ok());
        assert_eq!(client_data.verify_type(GET_TYPE), Err(Rejection::WrongCeremonyType));
        assert!(client_data.verify_challenge(&[7u8; 32]).is_ok());
        assert_eq!(
            client_data.verify_challenge(&[8u8; 32]),
            Err(Rejection::ChallengeMismatch)
        );
        assert!(client_data.verify_origin("https://example.com").is_ok());
    }

    #[test]
    fn top_origin_must_match_when_present() {
        let json = r#"{"type":"webauthn.get","challenge":"AAAA","origin":"https://example.com","topOrigin":"https://evil.example"}"#;
        let client_data = CollectedClientData::decode(&payload(json)).unwrap();
        assert_eq!(
            client_data.verify_origin("https://example.com"),
            Err(Rejection::OriginMismatch)
        );
    }

    #[test]
    fn rejects_non_json_payloads() {
        assert!(matches!(
            CollectedClientData::decode("%%%"),
            Err(Rejection::MalformedInput(_))
        ));
        assert!(matches!(
            CollectedClientData::decode(&payload("not json")),
            Err(Rejection::MalformedInput(_))
        ));
        assert!(matches!(
            CollectedClientData::decode(&encode_standard([0xff, 0xfe])),
            Err(Rejection::MalformedInput(_))
        ));
    }

    #[test]
    fn hash_covers_raw_bytes() {
        let json = r#"{"type":"webauthn.get","challenge":"AAAA","origin":"https://example.com"}"#;
        let client_data = CollectedClientData::decode(&payload(json)).unwrap();
        let expected: [u8; 32] = Sha256::digest(json.as_bytes()).into();
        assert_eq!(client_data.hash(), expected);
    }
}
