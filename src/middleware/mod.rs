//! # Middleware Module
//!
//! - `auth`: Lets a request through only if its session holds a credential
//!   id set by a successful login

pub mod auth;
