//! # Authenticator Data
//!
//! Fixed binary layout produced by the authenticator and bound into every
//! signature:
//!
//! ```text
//! offset  len  field
//! 0       32   SHA-256(rp id)
//! 32      1    flags
//! 33      4    signature counter (big-endian)
//! -- attested credential data, registration only --
//! 37      16   AAGUID
//! 53      2    credential id length L (big-endian, L <= 1023)
//! 55      L    credential id
//! 55+L    ..   COSE public key (CBOR), then optional extensions
//! ```
//!
//! All input is attacker-controlled. Every read is bounds-checked and a short
//! buffer is a decode error, never a panic or a silent truncation.

use crate::error::Rejection;
use ciborium::value::Value;

pub const RP_ID_HASH_LEN: usize = 32;
pub const AAGUID_LEN: usize = 16;
pub const MAX_CREDENTIAL_ID_LEN: usize = 1023;

const FLAGS_OFFSET: usize = 32;
const COUNTER_OFFSET: usize = 33;
const HEADER_LEN: usize = 37;
const CREDENTIAL_ID_LEN_OFFSET: usize = HEADER_LEN + AAGUID_LEN;
const CREDENTIAL_ID_OFFSET: usize = CREDENTIAL_ID_LEN_OFFSET + 2;

/// Flag byte of the authenticator data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatorFlags(pub u8);

impl AuthenticatorFlags {
    pub const USER_PRESENT: u8 = 0x01;
    pub const USER_VERIFIED: u8 = 0x04;
    pub const BACKUP_ELIGIBLE: u8 = 0x08;
    pub const BACKUP_STATE: u8 = 0x10;
    pub const ATTESTED_CREDENTIAL_DATA: u8 = 0x40;
    pub const EXTENSION_DATA: u8 = 0x80;

    fn has(self, bit: u8) -> bool {
        self.0 & bit != 0
    }

    pub fn user_present(self) -> bool {
        self.has(Self::USER_PRESENT)
    }

    pub fn user_verified(self) -> bool {
        self.has(Self::USER_VERIFIED)
    }

    pub fn backup_eligible(self) -> bool {
        self.has(Self::BACKUP_ELIGIBLE)
    }

    pub fn backup_state(self) -> bool {
        self.has(Self::BACKUP_STATE)
    }

    pub fn attested_credential_data(self) -> bool {
        self.has(Self::ATTESTED_CREDENTIAL_DATA)
    }

    pub fn extension_data(self) -> bool {
        self.has(Self::EXTENSION_DATA)
    }
}

/// Credential block appended during registration
#[derive(Debug, Clone, PartialEq)]
pub struct AttestedCredentialData {
    pub aaguid: [u8; AAGUID_LEN],
    pub credential_id: Vec<u8>,
    /// Decoded but unvalidated COSE key; see [`crate::webauthn::cose::CoseKey`].
    pub public_key: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatorData {
    pub rp_id_hash: [u8; RP_ID_HASH_LEN],
    pub flags: AuthenticatorFlags,
    pub sign_count: u32,
    pub attested_credential: Option<AttestedCredentialData>,
    /// Raw bytes after the fixed fields (extension CBOR), left unparsed.
    pub extensions: Vec<u8>,
}

impl AuthenticatorData {
    /// Parse the 37-byte header used by assertions.
    pub fn decode(bytes: &[u8]) -> Result<Self, Rejection> {
        let (rp_id_hash, flags, sign_count) = decode_header(bytes)?;

        Ok(Self {
            rp_id_hash,
            flags,
            sign_count,
            attested_credential: None,
            extensions: bytes[HEADER_LEN..].to_vec(),
        })
    }

    /// Parse the header plus the attested credential block used by registration.
    pub fn decode_attested(bytes: &[u8]) -> Result<Self, Rejection> {
        let (rp_id_hash, flags, sign_count) = decode_header(bytes)?;

        let aaguid: [u8; AAGUID_LEN] = bytes
            .get(HEADER_LEN..CREDENTIAL_ID_LEN_OFFSET)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| Rejection::malformed("authenticator data truncated before AAGUID"))?;

        let len_bytes = bytes
            .get(CREDENTIAL_ID_LEN_OFFSET..CREDENTIAL_ID_OFFSET)
            .ok_or_else(|| {
                Rejection::malformed("authenticator data truncated before credential id length")
            })?;
        let credential_id_len = u16::from_be_bytes([len_bytes[0], len_bytes[1]]) as usize;
        if credential_id_len > MAX_CREDENTIAL_ID_LEN {
            return Err(Rejection::CredentialIdTooLong);
        }

        let key_offset = CREDENTIAL_ID_OFFSET + credential_id_len;
        let credential_id = bytes
            .get(CREDENTIAL_ID_OFFSET..key_offset)
            .ok_or_else(|| Rejection::malformed("credential id exceeds authenticator data"))?
            .to_vec();

        // from_reader advances the slice, so whatever is left is extension data
        let mut rest = &bytes[key_offset..];
        let public_key: Value = ciborium::from_reader(&mut rest)
            .map_err(|e| Rejection::malformed(format!("COSE public key: {e}")))?;

        Ok(Self {
            rp_id_hash,
            flags,
            sign_count,
            attested_credential: Some(AttestedCredentialData {
                aaguid,
                credential_id,
                public_key,
            }),
            extensions: rest.to_vec(),
        })
    }

    /// Re-encode into the binary layout.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Rejection> {
        let mut data = Vec::with_capacity(HEADER_LEN);
        data.extend_from_slice(&self.rp_id_hash);
        data.push(self.flags.0);
        data.extend_from_slice(&self.sign_count.to_be_bytes());

        if let Some(attested) = &self.attested_credential {
            if attested.credential_id.len() > MAX_CREDENTIAL_ID_LEN {
                return Err(Rejection::CredentialIdTooLong);
            }
            data.extend_from_slice(&attested.aaguid);
            data.extend_from_slice(&(attested.credential_id.len() as u16).to_be_bytes());
            data.extend_from_slice(&attested.credential_id);
            ciborium::into_writer(&attested.public_key, &mut data)
                .map_err(|e| Rejection::malformed(format!("COSE public key: {e}")))?;
        }

        data.extend_from_slice(&self.extensions);
        Ok(data)
    }
}

fn decode_header(
    bytes: &[u8],
) -> Result<([u8; RP_ID_HASH_LEN], AuthenticatorFlags, u32), Rejection> {
    if bytes.len() < HEADER_LEN {
        return Err(Rejection::malformed(format!(
            "authenticator data is {} bytes, need at least {HEADER_LEN}",
            bytes.len()
        )));
    }

    let mut rp_id_hash = [0u8; RP_ID_HASH_LEN];
    rp_id_hash.copy_from_slice(&bytes[..RP_ID_HASH_LEN]);
    let flags = AuthenticatorFlags(bytes[FLAGS_OFFSET]);
    let sign_count = u32::from_be_bytes([
        bytes[COUNTER_OFFSET],
        bytes[COUNTER_OFFSET + 1],
        bytes[COUNTER_OFFSET + 2],
        bytes[COUNTER_OFFSET + 3],
    ]);

    Ok((rp_id_hash, flags, sign_count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webauthn::cose::encode_cose_key;

    fn attested_bytes(credential_id: &[u8]) -> Vec<u8> {
        let mut data = vec![0xABu8; 32];
        data.push(0x45); // UP | UV | AT
        data.extend_from_slice(&7u32.to_be_bytes());
        data.extend_from_slice(&[0x11u8; 16]);
        data.extend_from_slice(&(credential_id.len() as u16).to_be_bytes());
        data.extend_from_slice(credential_id);
        data.extend_from_slice(&encode_cose_key(&[0x22u8; 32], &[0x33u8; 32]).unwrap());
        data
    }

    #[test]
    fn test_header_layout() {
        let mut data = vec![0x55u8; 32];
        data.push(0x05);
        data.extend_from_slice(&0x0102_0304u32.to_be_bytes());

        let parsed = AuthenticatorData::decode(&data).unwrap();
        assert_eq!(parsed.rp_id_hash, [0x55u8; 32]);
        assert!(parsed.flags.user_present());
        assert!(parsed.flags.user_verified());
        assert!(!parsed.flags.backup_eligible());
        assert_eq!(parsed.sign_count, 0x0102_0304);
        assert!(parsed.attested_credential.is_none());
        assert!(parsed.extensions.is_empty());
    }

    #[test]
    fn test_short_header_rejected() {
        for len in [0, 1, 32, 36] {
            let err = AuthenticatorData::decode(&vec![0u8; len]).unwrap_err();
            assert!(matches!(err, Rejection::MalformedInput(_)), "len {len}");
        }
    }

    #[test]
    fn test_attested_credential_layout() {
        let data = attested_bytes(&[0x77u8; 32]);
        let parsed = AuthenticatorData::decode_attested(&data).unwrap();

        assert_eq!(parsed.sign_count, 7);
        assert!(parsed.flags.attested_credential_data());
        let attested = parsed.attested_credential.unwrap();
        assert_eq!(attested.aaguid, [0x11u8; 16]);
        assert_eq!(attested.credential_id, vec![0x77u8; 32]);
        assert!(matches!(attested.public_key, Value::Map(_)));
        assert!(parsed.extensions.is_empty());
    }

    #[test]
    fn test_credential_id_length_limit() {
        let mut data = attested_bytes(&[0x01u8; 4]);
        data[53..55].copy_from_slice(&1024u16.to_be_bytes());
        assert_eq!(
            AuthenticatorData::decode_attested(&data),
            Err(Rejection::CredentialIdTooLong)
        );

        // 1023 is allowed through the length check but exceeds this buffer
        data[53..55].copy_from_slice(&1023u16.to_be_bytes());
        assert!(matches!(
            AuthenticatorData::decode_attested(&data),
            Err(Rejection::MalformedInput(_))
        ));
    }

    #[test]
    fn test_truncated_attested_data_rejected() {
        let data = attested_bytes(&[0x77u8; 32]);
        for cut in [40, 53, 54, 60, 87, data.len() - 1] {
            assert!(
                matches!(
                    AuthenticatorData::decode_attested(&data[..cut]),
                    Err(Rejection::MalformedInput(_))
                ),
                "cut at {cut}"
            );
        }
    }

    #[test]
    fn test_extension_bytes_preserved() {
        let mut data = attested_bytes(&[0x77u8; 16]);
        data[32] |= AuthenticatorFlags::EXTENSION_DATA;
        data.extend_from_slice(&[0xA0]); // empty CBOR map
        let parsed = AuthenticatorData::decode_attested(&data).unwrap();
        assert_eq!(parsed.extensions, vec![0xA0]);
        assert_eq!(parsed.to_bytes().unwrap(), data);
    }

    #[test]
    fn test_round_trip() {
        let original = AuthenticatorData {
            rp_id_hash: [0x42u8; 32],
            flags: AuthenticatorFlags(0x5D),
            sign_count: 99,
            attested_credential: Some(AttestedCredentialData {
                aaguid: [0x0Fu8; 16],
                credential_id: vec![1, 2, 3, 4, 5],
                public_key: ciborium::from_reader(
                    encode_cose_key(&[0x01u8; 32], &[0x02u8; 32]).unwrap().as_slice(),
                )
                .unwrap(),
            }),
            extensions: Vec::new(),
        };

        let bytes = original.to_bytes().unwrap();
        assert_eq!(AuthenticatorData::decode_attested(&bytes).unwrap(), original);
    }
}
