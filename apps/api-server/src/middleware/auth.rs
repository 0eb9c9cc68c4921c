//! Bearer-token authentication gate.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use std::future::{Ready, ready};

use quill_core::ports::{AuthError, TokenClaims, TokenService};
use quill_shared::ErrorResponse;

use crate::state::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Pull the token out of an `Authorization` header value.
pub fn bearer_token(authorization: Option<&header::HeaderValue>) -> Result<&str, AuthError> {
    let value = authorization.ok_or(AuthError::MissingHeader)?;
    let value = value.to_str().map_err(|_| AuthError::BadScheme)?;

    value
        .strip_prefix(BEARER_PREFIX)
        .ok_or(AuthError::BadScheme)
}

/// Authenticate a request: read the bearer token and verify it.
pub fn authenticate(req: &HttpRequest, tokens: &dyn TokenService) -> Result<TokenClaims, AuthError> {
    let token = bearer_token(req.headers().get(header::AUTHORIZATION))?;
    tokens.verify(token)
}

/// Authenticated caller identity extractor.
///
/// Taking it as a handler argument makes the route protected:
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, {}!", identity.email())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    pub claims: TokenClaims,
}

impl Identity {
    /// Subject of the token - the caller's email.
    pub fn email(&self) -> &str {
        &self.claims.sub
    }
}

/// Error type for authentication failures.
#[derive(Debug)]
pub struct AuthenticationError(pub AuthError);

impl std::fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl actix_web::ResponseError for AuthenticationError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        match &self.0 {
            AuthError::Hashing(_) => actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
            _ => actix_web::http::StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        let error = match &self.0 {
            AuthError::Expired => ErrorResponse::new(401, "Token Expired")
                .with_detail("Your authentication token has expired. Please login again."),
            AuthError::MissingHeader => ErrorResponse::new(401, "Authentication Required")
                .with_detail("Please provide a valid Bearer token in the Authorization header."),
            AuthError::Hashing(_) => ErrorResponse::internal_error(),
            other => ErrorResponse::new(401, "Invalid Token").with_detail(other.to_string()),
        };

        actix_web::HttpResponse::build(self.status_code()).json(error)
    }
}

impl FromRequest for Identity {
    type Error = AuthenticationError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(state) = req.app_data::<web::Data<AppState>>() else {
            tracing::error!("AppState not found in app data");
            return ready(Err(AuthenticationError(AuthError::InvalidToken(
                "Server configuration error".to_string(),
            ))));
        };

        let result = authenticate(req, state.tokens.as_ref())
            .map(|claims| Identity { claims })
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected unauthenticated request");
                AuthenticationError(e)
            });

        ready(result)
    }
}
