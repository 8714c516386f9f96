//! # Credential Database Operations
//!
//! Credentials hold the public keys used to verify assertions.
//! Only public keys are stored; private keys never leave the authenticator.

use crate::db::models::{timestamp, Credential, CredentialRow};
use crate::db::Store;
use crate::error::AppResult;
use chrono::Utc;

/// Save a newly registered credential
///
/// The insert is a single statement, so a failure leaves no partial record.
pub async fn save_credential(store: &Store, credential: &Credential) -> AppResult<()> {
    let transports = serde_json::to_string(&credential.transports)?;

    sqlx::query(
        "INSERT INTO credentials
         (partition, id, public_key_algorithm, curve, x, y, sign_counter, user_name, display_name,
          transports, aaguid, attestation_format, backup_eligible, backup_state, created_at, last_used_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(store.partition())
    .bind(&credential.id)
    .bind(credential.public_key_algorithm.to_string())
    .bind(credential.curve.to_string())
    .bind(credential.x.as_slice())
    .bind(credential.y.as_slice())
    .bind(credential.sign_counter as i64) // u32 fits in SQLite's i64
    .bind(&credential.user_name)
    .bind(&credential.display_name)
    .bind(transports)
    .bind(&credential.aaguid)
    .bind(&credential.attestation_format)
    .bind(credential.backup_eligible)
    .bind(credential.backup_state)
    .bind(&credential.created_at)
    .bind(&credential.last_used_at)
    .execute(store.pool())
    .await?;

    Ok(())
}

/// Find a credential by its canonical id
///
/// Returns `None` if no credential with that id was registered in this partition.
pub async fn find_by_credential_id(
    store: &Store,
    credential_id: &str,
) -> AppResult<Option<Credential>> {
    let row = sqlx::query_as::<_, CredentialRow>(
        "SELECT * FROM credentials WHERE partition = ? AND id = ?",
    )
    .bind(store.partition())
    .bind(credential_id)
    .fetch_optional(store.pool())
    .await?;

    row.map(Credential::try_from).transpose()
}

/// Store the signature counter from a successful assertion
///
/// Also stamps `last_used_at`. Concurrent assertions for the same credential
/// resolve last-writer-wins.
pub async fn update_counter(
    store: &Store,
    credential_id: &str,
    new_counter: u32,
) -> AppResult<String> {
    let now = timestamp(Utc::now());

    sqlx::query(
        "UPDATE credentials
         SET sign_counter = ?, last_used_at = ?
         WHERE partition = ? AND id = ?",
    )
    .bind(new_counter as i64)
    .bind(&now)
    .bind(store.partition())
    .bind(credential_id)
    .execute(store.pool())
    .await?;

    Ok(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{Curve, PublicKeyAlgorithm};

    fn credential(id: &str) -> Credential {
        Credential {
            id: id.to_string(),
            public_key_algorithm: PublicKeyAlgorithm::Es256,
            curve: Curve::P256,
            x: [0x11u8; 32],
            y: [0x22u8; 32],
            sign_counter: 3,
            user_name: "alice".to_string(),
            display_name: "Alice Smith".to_string(),
            transports: ["internal".to_string(), "usb".to_string()].into(),
            aaguid: "00000000-0000-0000-0000-000000000000".to_string(),
            attestation_format: "none".to_string(),
            backup_eligible: true,
            backup_state: false,
            created_at: timestamp(Utc::now()),
            last_used_at: None,
        }
    }

    #[tokio::test]
    async fn saved_credential_reads_back() {
        let store = Store::in_memory("Prod").await.unwrap();
        let saved = credential("cred-1");
        save_credential(&store, &saved).await.unwrap();

        let loaded = find_by_credential_id(&store, "cred-1").await.unwrap().unwrap();
        assert_eq!(loaded, saved);
        assert!(find_by_credential_id(&store, "cred-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn counter_update_persists() {
        let store = Store::in_memory("Prod").await.unwrap();
        save_credential(&store, &credential("cred-1")).await.unwrap();

        let used_at = update_counter(&store, "cred-1", 4).await.unwrap();

        let loaded = find_by_credential_id(&store, "cred-1").await.unwrap().unwrap();
        assert_eq!(loaded.sign_counter, 4);
        assert_eq!(loaded.last_used_at, Some(used_at));
    }

    #[tokio::test]
    async fn duplicate_ids_are_rejected_by_the_store() {
        let store = Store::in_memory("Prod").await.unwrap();
        save_credential(&store, &credential("cred-1")).await.unwrap();
        assert!(save_credential(&store, &credential("cred-1")).await.is_err());
    }
}
