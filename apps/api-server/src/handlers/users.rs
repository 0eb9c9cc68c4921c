//! User profile handlers.

use actix_web::{HttpResponse, web};

use quill_core::RepoError;
use quill_core::domain::{User, UserUpdate};
use quill_core::ports::BaseRepository;
use quill_shared::dto::{DetailResponse, RegisterUserRequest, UpdateUserRequest, UserResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn user_response(user: User) -> UserResponse {
    UserResponse {
        id: user.id,
        name: user.name,
        email: user.email,
    }
}

fn user_not_found() -> AppError {
    AppError::NotFound("User not found".to_string())
}

fn email_taken() -> AppError {
    AppError::Conflict("Email already registered".to_string())
}

/// GET /users
pub async fn list_users(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let users = state.users.list().await?;

    Ok(HttpResponse::Ok().json(users.into_iter().map(user_response).collect::<Vec<_>>()))
}

/// GET /users/{id}
pub async fn get_user(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let user = state
        .users
        .find_by_id(path.into_inner())
        .await?
        .ok_or_else(user_not_found)?;

    Ok(HttpResponse::Ok().json(user_response(user)))
}

/// POST /users
pub async fn create_user(
    state: web::Data<AppState>,
    body: web::Json<RegisterUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    User::validate_email(&req.email)?;

    if state.users.find_by_email(&req.email).await?.is_some() {
        return Err(email_taken());
    }

    let password_hash = state.passwords.hash(&req.password)?;
    let user = User::new(req.name, req.email, password_hash);

    // A concurrent registration can still win the race; the unique index decides.
    let saved = state.users.create(user).await.map_err(|e| match e {
        RepoError::Constraint(_) => email_taken(),
        other => other.into(),
    })?;

    tracing::info!(user_id = %saved.id, "User registered");

    Ok(HttpResponse::Created().json(user_response(saved)))
}

/// PUT /users/{id} - Protected route
pub async fn update_user(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<UpdateUserRequest>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let req = body.into_inner();

    if let Some(email) = req.email.as_deref().filter(|e| !e.is_empty()) {
        User::validate_email(email)?;
    }

    let changes = UserUpdate {
        name: req.name,
        email: req.email,
    };

    let user = state.users.update(&id, changes).await.map_err(|e| match e {
        RepoError::NotFound => user_not_found(),
        RepoError::Constraint(_) => email_taken(),
        other => other.into(),
    })?;

    tracing::info!(actor = %identity.email(), user_id = %user.id, "User updated");

    Ok(HttpResponse::Ok().json(user_response(user)))
}

/// DELETE /users/{id} - Protected route
///
/// Likes and comments go with the user; authored posts block the delete.
pub async fn delete_user(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    if state.users.find_by_id(id.clone()).await?.is_none() {
        return Err(user_not_found());
    }

    let authored = state.posts.find_by_author(&id).await?;
    if !authored.is_empty() {
        return Err(AppError::Conflict(format!(
            "User still authors {} post(s)",
            authored.len()
        )));
    }

    state.users.delete(id.clone()).await.map_err(|e| match e {
        RepoError::NotFound => user_not_found(),
        RepoError::ForeignKey(_) => AppError::Conflict("User still authors posts".to_string()),
        other => other.into(),
    })?;

    tracing::info!(actor = %identity.email(), user_id = %id, "User deleted");

    Ok(HttpResponse::Ok().json(DetailResponse {
        detail: "User deleted successfully".to_string(),
    }))
}
