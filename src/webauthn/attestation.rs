//! Attestation object: the CBOR map `{fmt, attStmt, authData}` returned by
//! `navigator.credentials.create()`.

use crate::error::Rejection;
use ciborium::value::Value;

pub const FMT_NONE: &str = "none";

#[derive(Debug, Clone, PartialEq)]
pub struct AttestationObject {
    pub fmt: String,
    /// Attestation statement, kept as decoded CBOR; never validated
    pub att_stmt: Value,
    /// Raw authenticator data bytes
    pub auth_data: Vec<u8>,
}

impl AttestationObject {
    /// Decode CBOR bytes. Truncated input, a declared length beyond the
    /// buffer, or bytes after the top-level map are all decode errors.
    pub fn decode(bytes: &[u8]) -> Result<Self, Rejection> {
        let mut rest = bytes;
        let value: Value = ciborium::from_reader(&mut rest)
            .map_err(|e| Rejection::malformed(format!("attestation object: {e}")))?;
        if !rest.is_empty() {
            return Err(Rejection::malformed(format!(
                "attestation object has {} trailing bytes",
                rest.len()
            )));
        }

        let map = value
            .as_map()
            .ok_or_else(|| Rejection::malformed("attestation object is not a map"))?;
        let field = |name: &str| {
            map.iter()
                .find(|(k, _)| k.as_text() == Some(name))
                .map(|(_, v)| v)
        };

        let fmt = field("fmt")
            .and_then(Value::as_text)
            .ok_or_else(|| Rejection::malformed("attestation object missing fmt"))?
            .to_string();
        let att_stmt = field("attStmt")
            .filter(|v| v.is_map())
            .cloned()
            .ok_or_else(|| Rejection::malformed("attestation object missing attStmt"))?;
        let auth_data = field("authData")
            .and_then(Value::as_bytes)
            .ok_or_else(|| Rejection::malformed("attestation object missing authData"))?
            .clone();

        Ok(Self {
            fmt,
            att_stmt,
            auth_data,
        })
    }

    pub fn is_self_attested(&self) -> bool {
        self.fmt == FMT_NONE
    }
}
