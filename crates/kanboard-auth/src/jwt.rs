//! JWT (JSON Web Token) handling

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Claims carried by identity tokens
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IdentityClaims {
    /// Subject (user UUID)
    pub sub: String,
    /// Login name at the identity provider
    pub username: String,
    /// Issued at (timestamp)
    pub iat: i64,
    /// Expiration time (timestamp)
    pub exp: i64,
    /// Issuer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Audience
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

impl IdentityClaims {
    pub fn new(user_id: Uuid, username: impl Into<String>, validity: Duration) -> Self {
        let now = Utc::now();
        let exp = now + validity;

        Self {
            sub: user_id.to_string(),
            username: username.into(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            iss: None,
            aud: None,
        }
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.iss = Some(issuer.into());
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.aud = Some(audience.into());
        self
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    /// Caller identity described by these claims.
    ///
    /// Fails with [`JwtError::InvalidToken`] when the subject is not a UUID or
    /// the username is blank.
    pub fn identity(&self) -> Result<Identity, JwtError> {
        let user_id = Uuid::parse_str(&self.sub).map_err(|_| JwtError::InvalidToken)?;
        let username = self.username.trim();
        if username.is_empty() {
            return Err(JwtError::InvalidToken);
        }

        Ok(Identity {
            user_id,
            username: username.to_string(),
        })
    }
}

/// Authenticated caller identity, as asserted by the identity provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub username: String,
}

/// JWT errors
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT encoding error: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,
}

/// JWT validator
pub struct JwtValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtValidator {
    /// Create a new JWT validator using HMAC-SHA256 (symmetric secret)
    ///
    /// Validates the signature and expiration. Issuer and audience are only
    /// checked once [`with_issuer`](Self::with_issuer) /
    /// [`with_audience`](Self::with_audience) are called.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation: Self::base_validation(Algorithm::HS256),
        }
    }

    /// Create a new JWT validator using RSA public key (asymmetric)
    ///
    /// The public key should be in PEM format (begins with "-----BEGIN PUBLIC KEY-----")
    pub fn from_rsa_pem(public_key_pem: &[u8]) -> Result<Self, JwtError> {
        Ok(Self {
            decoding_key: DecodingKey::from_rsa_pem(public_key_pem)
                .map_err(JwtError::EncodingError)?,
            validation: Self::base_validation(Algorithm::RS256),
        })
    }

    fn base_validation(algorithm: Algorithm) -> Validation {
        let mut validation = Validation::new(algorithm);
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.validate_nbf = false;
        validation.leeway = 0;
        validation
    }

    /// Require the `aud` claim to equal `audience`
    pub fn with_audience(mut self, audience: String) -> Self {
        self.validation.set_audience(&[audience]);
        self.validation.validate_aud = true;
        self.validation.required_spec_claims.insert("aud".to_string());
        self
    }

    /// Require the `iss` claim to equal `issuer`
    pub fn with_issuer(mut self, issuer: String) -> Self {
        self.validation.set_issuer(&[issuer]);
        self.validation.required_spec_claims.insert("iss".to_string());
        self
    }

    pub fn validate(&self, token: &str) -> Result<IdentityClaims, JwtError> {
        let token_data = decode::<IdentityClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                _ => JwtError::EncodingError(e),
            })?;

        if token_data.claims.is_expired() {
            return Err(JwtError::TokenExpired);
        }

        Ok(token_data.claims)
    }

    /// Validate a token and extract the caller identity in one step
    pub fn identify(&self, token: &str) -> Result<Identity, JwtError> {
        self.validate(token)?.identity()
    }

    /// Encode JWT using HMAC-SHA256 (symmetric secret)
    pub fn encode(secret: &[u8], claims: &IdentityClaims) -> Result<String, JwtError> {
        let header = Header::new(Algorithm::HS256);
        let encoding_key = EncodingKey::from_secret(secret);

        Ok(encode(&header, claims, &encoding_key)?)
    }

}
