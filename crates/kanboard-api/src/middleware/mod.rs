//! API Middleware
//!
//! Identity resolution for the protected part of the API.

pub mod auth;

pub use auth::{extract_token, require_auth};
