//! Authentication handlers.

use actix_web::{HttpResponse, web};

use quill_core::ports::{AuthError, ClaimSet};
use quill_shared::dto::{AuthResponse, LoginRequest};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /users/login/
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .users
        .find_by_email(&req.email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if !state.passwords.verify(&req.password, &user.password_hash) {
        tracing::info!(user_id = %user.id, "Login rejected: wrong password");
        return Err(AuthError::InvalidCredential.into());
    }

    let token = state
        .tokens
        .issue_access_token(&ClaimSet::new(user.email.clone()))?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(HttpResponse::Ok().json(AuthResponse {
        message: "Login successful".to_string(),
        access_token: token,
        token_type: "bearer".to_string(),
        expires_in: state.tokens.default_ttl().num_seconds().max(0) as u64,
    }))
}

/// GET /protected-route
pub async fn protected_route(identity: Identity) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "You have access!",
        "user": identity.claims,
    }))
}
