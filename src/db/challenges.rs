use crate::db::models::{timestamp, Challenge};
use crate::db::Store;
use crate::error::AppResult;
use chrono::{Duration, Utc};

/// Generate, persist and return a new challenge.
pub async fn issue_challenge(store: &Store, ttl: Duration) -> AppResult<Challenge> {
    let challenge = Challenge::new(store.partition(), ttl);

    sqlx::query(
        "INSERT INTO challenges (partition, id, value, created_at, expires_at)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&challenge.partition)
    .bind(&challenge.id)
    .bind(&challenge.value)
    .bind(&challenge.created_at)
    .bind(&challenge.expires_at)
    .execute(store.pool())
    .await?;

    tracing::debug!(challenge_id = %challenge.id, "Issued challenge");
    Ok(challenge)
}

/// Fetch and delete a challenge in one statement.
///
/// Returns `None` when the id is unknown or was already redeemed. Because the
/// row is removed by the same `DELETE ... RETURNING` that reads it, two
/// concurrent redemptions of one id cannot both see it.
pub async fn redeem_challenge(store: &Store, id: &str) -> AppResult<Option<Challenge>> {
    let challenge = sqlx::query_as::<_, Challenge>(
        "DELETE FROM challenges
         WHERE partition = ? AND id = ?
         RETURNING partition, id, value, created_at, expires_at",
    )
    .bind(store.partition())
    .bind(id)
    .fetch_optional(store.pool())
    .await?;

    tracing::debug!(challenge_id = %id, found = challenge.is_some(), "Redeemed challenge");
    Ok(challenge)
}

// Cleanup expired challenges (should be run periodically)
pub async fn cleanup_expired_challenges(store: &Store) -> AppResult<u64> {
    let now = timestamp(Utc::now());

    let result = sqlx::query("DELETE FROM challenges WHERE partition = ? AND expires_at < ?")
        .bind(store.partition())
        .bind(&now)
        .execute(store.pool())
        .await?;

    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn redeem_is_single_use() {
        let store = Store::in_memory("Prod").await.unwrap();
        let issued = issue_challenge(&store, Duration::minutes(5)).await.unwrap();

        let redeemed = redeem_challenge(&store, &issued.id).await.unwrap().unwrap();
        assert_eq!(redeemed.value, issued.value);
        assert_eq!(redeemed.expires_at, issued.expires_at);

        assert!(redeem_challenge(&store, &issued.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let store = Store::in_memory("Prod").await.unwrap();
        assert!(redeem_challenge(&store, "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn partitions_are_isolated() {
        let prod = Store::in_memory("Prod").await.unwrap();
        let test = Store::new(prod.pool().clone(), "Test");

        let issued = issue_challenge(&prod, Duration::minutes(5)).await.unwrap();
        assert!(redeem_challenge(&test, &issued.id).await.unwrap().is_none());
        assert!(redeem_challenge(&prod, &issued.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn cleanup_removes_only_expired() {
        let store = Store::in_memory("Prod").await.unwrap();
        let stale = issue_challenge(&store, Duration::seconds(-10)).await.unwrap();
        let fresh = issue_challenge(&store, Duration::minutes(5)).await.unwrap();

        assert_eq!(cleanup_expired_challenges(&store).await.unwrap(), 1);
        assert!(redeem_challenge(&store, &stale.id).await.unwrap().is_none());
        assert!(redeem_challenge(&store, &fresh.id).await.unwrap().is_some());
    }
}
