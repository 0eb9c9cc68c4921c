//! Authentication ports: credential hashing, token issuance and verification.

use std::collections::BTreeMap;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

/// Claims a caller asks to have signed into a token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClaimSet {
    /// Subject - the user's email.
    pub sub: String,
    /// Additional application claims.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ClaimSet {
    pub fn new(sub: impl Into<String>) -> Self {
        Self {
            sub: sub.into(),
            extra: BTreeMap::new(),
        }
    }

    pub fn with_claim(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// Claims recovered from a verified token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiration, seconds since the epoch.
    pub exp: i64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl TokenClaims {
    /// The caller-supplied part of the claims, without the timestamps.
    pub fn claim_set(&self) -> ClaimSet {
        ClaimSet {
            sub: self.sub.clone(),
            extra: self.extra.clone(),
        }
    }
}

/// Token service trait for signed bearer tokens.
pub trait TokenService: Send + Sync {
    /// Sign `claims` into a token that expires `ttl` from now.
    fn issue(&self, claims: &ClaimSet, ttl: TimeDelta) -> Result<String, AuthError>;

    /// Validate signature and expiration, then decode.
    fn verify(&self, token: &str) -> Result<TokenClaims, AuthError>;

    /// Lifetime of tokens issued by [`TokenService::issue_access_token`].
    fn default_ttl(&self) -> TimeDelta;

    /// Issue a token with the default lifetime.
    fn issue_access_token(&self, claims: &ClaimSet) -> Result<String, AuthError> {
        self.issue(claims, self.default_ttl())
    }
}

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password into a self-describing salted hash.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Check a password against a stored hash. A malformed hash never matches.
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Authentication errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Authorization header missing")]
    MissingHeader,

    #[error("Invalid Authorization header format")]
    BadScheme,

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token expired")]
    Expired,

    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Invalid credentials")]
    InvalidCredential,

    #[error("Hashing error: {0}")]
    Hashing(String),
}
