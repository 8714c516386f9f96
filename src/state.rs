//! # Application State
//!
//! Shared state handed to every request handler. There are no process-wide
//! singletons: the store handle and relying party are built once at startup
//! and cloned into each request (cheap, both are reference counted).

use crate::config::Config;
use crate::db::Store;
use crate::error::AppResult;
use crate::webauthn::relying_party::RelyingParty;
use chrono::Duration;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    /// Challenge and credential store, scoped to one partition
    pub store: Store,

    /// RP id hash and allowed origin every ceremony is checked against
    pub relying_party: Arc<RelyingParty>,

    /// Lifetime of an issued challenge
    pub challenge_ttl: Duration,
}

impl AppState {
    /// Connect to the database, run migrations and set up the relying party.
    pub async fn new(config: &Config) -> AppResult<Self> {
        let store = Store::connect(&config.database_url, config.partition.clone()).await?;
        Ok(Self::with_store(config, store))
    }

    /// Build state around an existing store.
    pub fn with_store(config: &Config, store: Store) -> Self {
        AppState {
            store,
            relying_party: Arc::new(RelyingParty::from_config(config)),
            challenge_ttl: Duration::seconds(config.challenge_ttl_secs),
        }
    }
}
