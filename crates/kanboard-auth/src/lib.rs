//! Identity token validation for the Kanban board
//!
//! Tokens are issued by an external identity provider; this crate only
//! verifies them and extracts the caller identity.

pub mod jwt;

pub use jwt::{Identity, IdentityClaims, JwtError, JwtValidator};

// Re-export useful types
pub use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Validation};
