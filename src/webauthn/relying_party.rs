//! The relying party identity every ceremony is checked against.

use crate::config::Config;
use crate::error::Rejection;
use crate::webauthn::authenticator_data::{AuthenticatorData, RP_ID_HASH_LEN};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone)]
pub struct RelyingParty {
    pub rp_id: String,
    pub rp_id_hash: [u8; RP_ID_HASH_LEN],
    /// Lower-cased origin client data must report
    pub allowed_origin: String,
}

impl RelyingParty {
    pub fn new(rp_id: &str, allowed_origin: &str) -> Self {
        Self {
            rp_id: rp_id.to_string(),
            rp_id_hash: Sha256::digest(rp_id.as_bytes()).into(),
            allowed_origin: allowed_origin.to_lowercase(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.rp_id, &config.allowed_origin)
    }

    /// Steps shared by both ceremonies: rp id hash, then user presence, then
    /// user verification. Backup and extension flags are not enforced.
    pub fn verify_authenticator_data(&self, auth_data: &AuthenticatorData) -> Result<(), Rejection> {
        if auth_data.rp_id_hash != self.rp_id_hash {
            return Err(Rejection::RelyingPartyMismatch);
        }
        if !auth_data.flags.user_present() {
            return Err(Rejection::UserNotPresent);
        }
        if !auth_data.flags.user_verified() {
            return Err(Rejection::UserNotVerified);
        }
        Ok(())
    }
}
