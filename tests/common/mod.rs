#![allow(dead_code)]

use ciborium::value::Value;
use p256::ecdsa::{signature::Signer, Signature, SigningKey};
use passkey_ceremony_server::config::Config;
use passkey_ceremony_server::db::Store;
use passkey_ceremony_server::error::{AppError, Rejection};
use passkey_ceremony_server::state::AppState;
use passkey_ceremony_server::webauthn::authenticator_data::{
    AttestedCredentialData, AuthenticatorData, AuthenticatorFlags,
};
use passkey_ceremony_server::webauthn::cose::encode_cose_key;
use passkey_ceremony_server::webauthn::encoding;
use passkey_ceremony_server::webauthn::types::{
    AuthenticationRequest, ChallengeResponse, RegistrationRequest,
};
use sha2::{Digest, Sha256};

pub const RP_ID: &str = "example.com";
pub const ORIGIN: &str = "https://example.com";
pub const PARTITION: &str = "Prod";

/// UP | UV
pub const FLAGS_UP_UV: u8 = 0b0000_0101;

pub fn test_config(challenge_ttl_secs: i64) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: "sqlite::memory:".to_string(),
        rp_id: RP_ID.to_string(),
        allowed_origin: ORIGIN.to_string(),
        partition: PARTITION.to_string(),
        challenge_ttl_secs,
        static_dir: "static".to_string(),
    }
}

pub async fn test_state() -> AppState {
    test_state_with_ttl(300).await
}

pub async fn test_state_with_ttl(challenge_ttl_secs: i64) -> AppState {
    let store = Store::in_memory(PARTITION).await.expect("in-memory store");
    AppState::with_store(&test_config(challenge_ttl_secs), store)
}

pub fn rejection(err: AppError) -> Rejection {
    match err {
        AppError::Rejected(_, reason) => reason,
        other => panic!("expected a rejection, got {other:?}"),
    }
}

/// Base64 `clientDataJSON` as a browser would send it.
pub fn client_data(ceremony_type: &str, challenge: &ChallengeResponse, origin: &str) -> String {
    let echoed = encoding::canonicalize(&challenge.challenge).expect("challenge is base64");
    client_data_json(&format!(
        r#"{{"type":"{ceremony_type}","challenge":"{echoed}","origin":"{origin}","crossOrigin":false}}"#
    ))
}

pub fn client_data_json(json: &str) -> String {
    encoding::encode_standard(json.as_bytes())
}

pub fn attestation_object(fmt: &str, auth_data: Vec<u8>) -> String {
    let value = Value::Map(vec![
        (Value::Text("fmt".into()), Value::Text(fmt.into())),
        (Value::Text("attStmt".into()), Value::Map(vec![])),
        (Value::Text("authData".into()), Value::Bytes(auth_data)),
    ]);
    let mut buf = Vec::new();
    ciborium::into_writer(&value, &mut buf).expect("CBOR encoding");
    encoding::encode_standard(buf)
}

/// A software authenticator holding one ES256 key.
pub struct SoftAuthenticator {
    signing_key: SigningKey,
    pub credential_id: Vec<u8>,
    pub aaguid: [u8; 16],
    pub rp_id: String,
    pub flags: u8,
}

impl SoftAuthenticator {
    pub fn new(seed: u8) -> Self {
        Self {
            signing_key: SigningKey::from_slice(&[seed; 32]).expect("valid scalar"),
            credential_id: vec![seed ^ 0x5A; 32],
            aaguid: [0xAD; 16],
            rp_id: RP_ID.to_string(),
            flags: FLAGS_UP_UV,
        }
    }

    pub fn rp_id_hash(&self) -> [u8; 32] {
        Sha256::digest(self.rp_id.as_bytes()).into()
    }

    pub fn public_key(&self) -> ([u8; 32], [u8; 32]) {
        let point = self.signing_key.verifying_key().to_encoded_point(false);
        let x = (*point.x().expect("uncompressed point")).into();
        let y = (*point.y().expect("uncompressed point")).into();
        (x, y)
    }

    pub fn credential_id_b64(&self) -> String {
        encoding::encode(&self.credential_id)
    }

    pub fn cose_key(&self) -> Vec<u8> {
        let (x, y) = self.public_key();
        encode_cose_key(&x, &y).expect("COSE key encoding")
    }

    /// Registration authenticator data with the given COSE key bytes.
    pub fn attested_auth_data_with_key(&self, counter: u32, cose_key: &[u8]) -> Vec<u8> {
        AuthenticatorData {
            rp_id_hash: self.rp_id_hash(),
            flags: AuthenticatorFlags(self.flags | AuthenticatorFlags::ATTESTED_CREDENTIAL_DATA),
            sign_count: counter,
            attested_credential: Some(AttestedCredentialData {
                aaguid: self.aaguid,
                credential_id: self.credential_id.clone(),
                public_key: ciborium::from_reader(cose_key).expect("COSE key CBOR"),
            }),
            extensions: Vec::new(),
        }
        .to_bytes()
        .expect("encodable authenticator data")
    }

    pub fn attested_auth_data(&self, counter: u32) -> Vec<u8> {
        self.attested_auth_data_with_key(counter, &self.cose_key())
    }

    /// A complete registration request answering `challenge`.
    pub fn register_request(&self, challenge: &ChallengeResponse, counter: u32) -> RegistrationRequest {
        RegistrationRequest {
            id: Some(challenge.id.clone()),
            client_data_json: Some(client_data("webauthn.create", challenge, ORIGIN)),
            attestation_object: Some(attestation_object("none", self.attested_auth_data(counter))),
            user_name: Some("alice".to_string()),
            display_name: Some("Alice Smith".to_string()),
            transports: vec!["internal".to_string(), "hybrid".to_string()],
        }
    }

    pub fn assertion_auth_data(&self, counter: u32) -> Vec<u8> {
        let mut data = self.rp_id_hash().to_vec();
        data.push(self.flags);
        data.extend_from_slice(&counter.to_be_bytes());
        data
    }

    /// DER signature over authenticatorData || SHA-256(clientDataJSON).
    pub fn sign(&self, auth_data: &[u8], client_data_b64: &str) -> String {
        let client_data_raw = encoding::decode(client_data_b64).expect("client data base64");
        let mut signed = auth_data.to_vec();
        signed.extend_from_slice(&Sha256::digest(&client_data_raw));
        let signature: Signature = self.signing_key.sign(&signed);
        encoding::encode_standard(signature.to_der().as_bytes())
    }

    /// A complete, correctly signed login request answering `challenge`.
    pub fn assertion_request(&self, challenge: &ChallengeResponse, counter: u32) -> AuthenticationRequest {
        let client_data_b64 = client_data("webauthn.get", challenge, ORIGIN);
        let auth_data = self.assertion_auth_data(counter);
        let signature = self.sign(&auth_data, &client_data_b64);

        AuthenticationRequest {
            challenge_id: Some(challenge.id.clone()),
            credential_id: Some(self.credential_id_b64()),
            client_data_json: Some(client_data_b64),
            authenticator_data: Some(encoding::encode_standard(&auth_data)),
            signature: Some(signature),
        }
    }
}
