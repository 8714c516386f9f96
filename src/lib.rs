//! # Passkey Ceremony Server
//!
//! Relying-party core for passkey (WebAuthn) registration and authentication.
//!
//! - **Challenges** are single-use random values, issued and redeemed through the store
//! - **Registration** verifies an attestation and stores the ES256 public key it carries
//! - **Authentication** verifies an assertion signature against the stored key and
//!   advances the signature counter
//!
//! The HTTP layer in `handlers` and `routes` is a thin shell around `webauthn`.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod webauthn;
