//! # Database Models
//!
//! Data structures that map to the `challenges` and `credentials` tables.
//!
//! ## Why Strings for dates?
//! SQLite stores timestamps as text. We always write RFC3339 in UTC with a
//! fixed number of fractional digits, so plain string comparison in SQL orders
//! them correctly.

use crate::error::AppError;
use crate::webauthn::encoding;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rand::RngCore;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Bytes of randomness in a challenge id and in a challenge value
pub const CHALLENGE_LEN: usize = 32;

/// Format a timestamp the way every table stores it
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Single-use ceremony challenge
///
/// ## Challenge Lifecycle
/// 1. Issued → stored with a random id and a random value
/// 2. The browser has the authenticator sign over the value
/// 3. A verifier redeems it by id, which deletes it in the same statement
/// 4. The value is compared against what the client echoed back
///
/// A challenge is never updated and never redeemed twice.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Challenge {
    /// Random id in canonical base64
    pub id: String,

    pub partition: String,

    /// Random bytes the authenticator signs over
    pub value: Vec<u8>,

    /// When the challenge was created (RFC3339 timestamp)
    pub created_at: String,

    /// After this time the challenge is rejected even if still stored
    pub expires_at: String,
}

impl Challenge {
    /// Create a fresh challenge from the operating system's CSPRNG.
    pub fn new(partition: &str, ttl: Duration) -> Self {
        let mut id = [0u8; CHALLENGE_LEN];
        let mut value = [0u8; CHALLENGE_LEN];
        rand::rngs::OsRng.fill_bytes(&mut id);
        rand::rngs::OsRng.fill_bytes(&mut value);

        let now = Utc::now();
        Self {
            id: encoding::encode(id),
            partition: partition.to_string(),
            value: value.to_vec(),
            created_at: timestamp(now),
            expires_at: timestamp(now + ttl),
        }
    }

    pub fn is_expired(&self) -> bool {
        DateTime::parse_from_rfc3339(&self.expires_at)
            .map(|expires| Utc::now() > expires)
            // An unreadable expiry is treated as expired
            .unwrap_or(true)
    }

    /// Value as padded standard base64, the form `atob` decodes
    pub fn value_base64(&self) -> String {
        encoding::encode_standard(&self.value)
    }
}

/// Signature algorithm of a stored credential
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PublicKeyAlgorithm {
    #[serde(rename = "ES256")]
    Es256,
}

/// Curve of a stored credential
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Curve {
    #[serde(rename = "P-256")]
    P256,
}

impl fmt::Display for PublicKeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ES256")
    }
}

impl FromStr for PublicKeyAlgorithm {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ES256" => Ok(Self::Es256),
            other => Err(AppError::Internal(format!(
                "stored credential has unknown algorithm '{other}'"
            ))),
        }
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("P-256")
    }
}

impl FromStr for Curve {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "P-256" => Ok(Self::P256),
            other => Err(AppError::Internal(format!(
                "stored credential has unknown curve '{other}'"
            ))),
        }
    }
}

/// Passkey credential registered by a successful attestation
///
/// Only the public key is stored. `sign_counter` is the one field that
/// changes after creation, advanced by each successful assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    /// Credential id in canonical base64
    pub id: String,

    pub public_key_algorithm: PublicKeyAlgorithm,

    pub curve: Curve,

    /// Big-endian affine x coordinate
    #[serde(serialize_with = "encoding::serialize")]
    pub x: [u8; 32],

    /// Big-endian affine y coordinate
    #[serde(serialize_with = "encoding::serialize")]
    pub y: [u8; 32],

    pub sign_counter: u32,

    pub user_name: String,

    pub display_name: String,

    /// Transport hints reported by the browser ("usb", "nfc", "internal", ...)
    pub transports: BTreeSet<String>,

    /// Authenticator model identifier, hyphenated UUID form
    pub aaguid: String,

    /// Attestation statement format, e.g. "none" or "packed" (never validated)
    pub attestation_format: String,

    pub backup_eligible: bool,

    pub backup_state: bool,

    pub created_at: String,

    pub last_used_at: Option<String>,
}

/// Raw `credentials` row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CredentialRow {
    pub id: String,
    pub partition: String,
    pub public_key_algorithm: String,
    pub curve: String,
    pub x: Vec<u8>,
    pub y: Vec<u8>,
    pub sign_counter: i64,
    pub user_name: String,
    pub display_name: String,
    /// JSON array of strings
    pub transports: String,
    pub aaguid: String,
    pub attestation_format: String,
    pub backup_eligible: bool,
    pub backup_state: bool,
    pub created_at: String,
    pub last_used_at: Option<String>,
}

impl TryFrom<CredentialRow> for Credential {
    type Error = AppError;

    fn try_from(row: CredentialRow) -> Result<Self, Self::Error> {
        let coordinate = |bytes: &[u8], name: &str| -> Result<[u8; 32], AppError> {
            bytes.try_into().map_err(|_| {
                AppError::Internal(format!(
                    "stored credential {} has a {}-byte {name} coordinate",
                    row.id,
                    bytes.len()
                ))
            })
        };

        Ok(Credential {
            public_key_algorithm: row.public_key_algorithm.parse()?,
            curve: row.curve.parse()?,
            x: coordinate(&row.x, "x")?,
            y: coordinate(&row.y, "y")?,
            sign_counter: u32::try_from(row.sign_counter).map_err(|_| {
                AppError::Internal(format!("stored credential {} has counter out of range", row.id))
            })?,
            transports: serde_json::from_str(&row.transports)?,
            id: row.id,
            user_name: row.user_name,
            display_name: row.display_name,
            aaguid: row.aaguid,
            attestation_format: row.attestation_format,
            backup_eligible: row.backup_eligible,
            backup_state: row.backup_state,
            created_at: row.created_at,
            last_used_at: row.last_used_at,
        })
    }
}
