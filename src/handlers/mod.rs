//! # HTTP Request Handlers
//!
//! Each handler extracts the request, calls into `webauthn` or `db`, and
//! returns JSON. Errors convert to responses through `AppError`.
//!
//! ## Submodules
//! - `health`: Health check endpoint (for monitoring)
//! - `challenge`: Challenge issuance
//! - `auth`: Ceremony endpoints (register, login) and session endpoints
//! - `credentials`: The logged-in caller's credential

pub mod auth;
pub mod challenge;
pub mod credentials;
pub mod health;
