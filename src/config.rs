//! # Configuration Management
//!
//! This module handles loading configuration from environment variables.
//! Configuration comes from the environment, optionally seeded from a `.env` file.
//!
//! ## Environment Variables
//! - `HOST`: Server bind address (default: 127.0.0.1)
//! - `PORT`: Server port (default: 8080)
//! - `DATABASE_URL`: SQLite database connection string
//! - `RP_ID`: Relying Party ID, hashed into every authenticator data record
//! - `ALLOWED_ORIGIN`: The only origin accepted in client data (lower-cased)
//! - `STORE_PARTITION`: Partition name for challenges and credentials
//! - `CHALLENGE_TTL_SECS`: How long an issued challenge stays redeemable
//! - `STATIC_DIR`: Directory served for non-API paths

use anyhow::Result;
use std::env;

/// Application configuration
///
/// ## WebAuthn Terminology
/// - **RP (Relying Party)**: The service that verifies credentials
/// - **RP ID**: Your domain name (e.g., "example.com" or "localhost")
/// - **Allowed Origin**: Full URL the browser reports (e.g., "https://example.com")
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host/IP address to bind to
    pub host: String,

    /// Server port number (1-65535)
    pub port: u16,

    /// SQLite database connection URL
    /// Format: "sqlite:filename.db?mode=rwc"
    pub database_url: String,

    /// Relying Party ID
    /// Its SHA-256 digest must match the first 32 bytes of every authenticator data record
    pub rp_id: String,

    /// The origin client data must report, stored lower-cased
    pub allowed_origin: String,

    /// Partition that challenges and credentials live in
    pub partition: String,

    /// Seconds before an issued challenge expires
    pub challenge_ttl_secs: i64,

    /// Directory with the browser-side pages
    pub static_dir: String,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Falls back to development defaults for anything unset. Returns an error
    /// only when a numeric value fails to parse.
    ///
    /// ## Example .env file
    /// ```text
    /// HOST=127.0.0.1
    /// PORT=8080
    /// DATABASE_URL=sqlite:passkey.db?mode=rwc
    /// RP_ID=localhost
    /// ALLOWED_ORIGIN=http://localhost:8080
    /// STORE_PARTITION=Prod
    /// CHALLENGE_TTL_SECS=300
    /// ```
    pub fn from_env() -> Result<Self> {
        // dotenvy doesn't error if the file is missing
        dotenvy::dotenv().ok();

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),

            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,

            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:passkey.db?mode=rwc".to_string()),

            rp_id: env::var("RP_ID").unwrap_or_else(|_| "localhost".to_string()),

            allowed_origin: env::var("ALLOWED_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:8080".to_string())
                .to_lowercase(),

            partition: env::var("STORE_PARTITION").unwrap_or_else(|_| "Prod".to_string()),

            challenge_ttl_secs: env::var("CHALLENGE_TTL_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()?,

            static_dir: env::var("STATIC_DIR").unwrap_or_else(|_| "static".to_string()),
        })
    }

    /// Get the socket address to bind the server to, e.g. "127.0.0.1:8080"
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
