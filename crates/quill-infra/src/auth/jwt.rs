//! JWT token service implementation.

use std::collections::BTreeMap;

use chrono::{TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use quill_core::ports::{AuthError, ClaimSet, TokenClaims, TokenService};

/// Secret used when none is configured. Only suitable for local development.
pub const DEFAULT_SECRET: &str = "change-me-in-production";

/// Registered claim names the service owns; callers cannot override them.
const RESERVED_CLAIMS: [&str; 4] = ["sub", "exp", "iat", "iss"];

/// JWT token service configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_minutes: i64,
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: DEFAULT_SECRET.to_string(),
            expiration_minutes: 30,
            issuer: "quill-api".to_string(),
        }
    }
}

/// Wire format of the token payload.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String, // user email
    exp: i64,    // expiration timestamp
    iat: i64,    // issued at
    iss: String, // issuer
    #[serde(flatten)]
    extra: BTreeMap<String, serde_json::Value>,
}

/// HS256 JWT token service.
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: JwtConfig,
}

impl JwtTokenService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[&config.issuer]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);

        Self {
            encoding_key,
            decoding_key,
            validation,
            config,
        }
    }

    /// True for a `header.payload.signature` token whose signature does not match
    /// the first two segments under this key, whichever segment was altered.
    fn signature_mismatch(&self, token: &str) -> bool {
        let Some((message, signature)) = token.rsplit_once('.') else {
            return false;
        };
        if signature.is_empty() || message.split('.').count() != 2 {
            return false;
        }

        matches!(
            jsonwebtoken::crypto::verify(
                signature,
                message.as_bytes(),
                &self.decoding_key,
                Algorithm::HS256
            ),
            Ok(false)
        )
    }
}

fn map_jwt_error(err: jsonwebtoken::errors::Error) -> AuthError {
    match err.kind() {
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        ErrorKind::ExpiredSignature => AuthError::Expired,
        ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
            AuthError::Malformed(err.to_string())
        }
        _ => AuthError::InvalidToken(err.to_string()),
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, claims: &ClaimSet, ttl: TimeDelta) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now + ttl;

        let mut extra = claims.extra.clone();
        extra.retain(|key, _| !RESERVED_CLAIMS.contains(&key.as_str()));

        let claims = Claims {
            sub: claims.sub.clone(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            extra,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        // The header is parsed before the signature is checked, so a corrupted
        // header would otherwise surface as a decoding error.
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(
            |err| match err.kind() {
                ErrorKind::Base64(_)
                | ErrorKind::Json(_)
                | ErrorKind::Utf8(_)
                | ErrorKind::InvalidAlgorithm
                    if self.signature_mismatch(token) =>
                {
                    AuthError::InvalidSignature
                }
                _ => map_jwt_error(err),
            },
        )?;

        let claims = token_data.claims;
        Ok(TokenClaims {
            sub: claims.sub,
            iat: claims.iat,
            exp: claims.exp,
            extra: claims.extra,
        })
    }

    fn default_ttl(&self) -> TimeDelta {
        TimeDelta::minutes(self.config.expiration_minutes)
    }
}
