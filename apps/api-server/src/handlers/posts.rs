//! Post, like and comment handlers.

use actix_web::{HttpResponse, web};

use quill_core::{DomainError, RepoError};
use quill_core::domain::{Comment, NewComment, NewLike, NewPost, Post, PostUpdate, User};
use quill_core::ports::BaseRepository;
use quill_shared::dto::{
    ActingUser, CommentAddedResponse, CommentRequest, CommentResponse, CreatePostRequest,
    MessageResponse, Pagination, PostResponse, UpdatePostRequest,
};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn post_response(post: Post) -> PostResponse {
    PostResponse {
        id: post.id,
        title: post.title,
        content: post.content,
        author_id: post.author_id,
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

fn comment_response(comment: Comment) -> CommentResponse {
    CommentResponse {
        id: comment.id,
        post_id: comment.post_id,
        user_id: comment.user_id,
        content: comment.content,
        created_at: comment.created_at,
    }
}

fn post_not_found() -> AppError {
    AppError::NotFound("Post not found".to_string())
}

async fn require_post(state: &AppState, post_id: i32) -> AppResult<Post> {
    let post = state.posts.find_by_id(post_id).await?;
    Ok(post.ok_or_else(|| DomainError::not_found("Post", post_id))?)
}

async fn require_user(state: &AppState, user_id: &str) -> AppResult<User> {
    let user = state.users.find_by_id(user_id.to_owned()).await?;
    Ok(user.ok_or_else(|| DomainError::not_found("User", user_id))?)
}

/// POST /posts/ - Protected route
pub async fn create_post(
    identity: Identity,
    state: web::Data<AppState>,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let post = NewPost::new(req.title, req.content, req.author_id);

    let saved = state.posts.create(post).await.map_err(|e| match e {
        RepoError::ForeignKey(_) => {
            AppError::BadRequest("Author with provided ID does not exist".to_string())
        }
        other => other.into(),
    })?;

    tracing::info!(actor = %identity.email(), post_id = saved.id, "Post created");

    Ok(HttpResponse::Created().json(post_response(saved)))
}

/// GET /posts/ - Protected route
pub async fn list_posts(
    _identity: Identity,
    state: web::Data<AppState>,
    page: web::Query<Pagination>,
) -> AppResult<HttpResponse> {
    let posts = state.posts.list(page.skip, page.limit).await?;

    Ok(HttpResponse::Ok().json(posts.into_iter().map(post_response).collect::<Vec<_>>()))
}

/// GET /posts/{post_id}
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let post = require_post(&state, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(post_response(post)))
}

/// PUT /posts/{post_id}
pub async fn update_post(
    state: web::Data<AppState>,
    path: web::Path<i32>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let changes = PostUpdate {
        title: req.title,
        content: req.content,
    };

    let post = state
        .posts
        .update(path.into_inner(), changes)
        .await
        .map_err(|e| match e {
            RepoError::NotFound => post_not_found(),
            other => other.into(),
        })?;

    tracing::info!(post_id = post.id, "Post updated");

    Ok(HttpResponse::Ok().json(post_response(post)))
}

/// DELETE /posts/{post_id}
pub async fn delete_post(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();

    state.posts.delete(post_id).await.map_err(|e| match e {
        RepoError::NotFound => post_not_found(),
        other => other.into(),
    })?;

    tracing::info!(post_id, "Post deleted");

    Ok(HttpResponse::NoContent().finish())
}

/// POST /posts/{post_id}/like?user_id=...
pub async fn like_post(
    state: web::Data<AppState>,
    path: web::Path<i32>,
    actor: web::Query<ActingUser>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let user_id = actor.into_inner().user_id;

    require_post(&state, post_id).await?;
    require_user(&state, &user_id).await?;

    let like = NewLike {
        post_id,
        user_id: user_id.clone(),
    };
    state.likes.create(like).await.map_err(|e| match e {
        RepoError::Constraint(_) => AppError::Conflict("Post already liked".to_string()),
        other => other.into(),
    })?;

    tracing::info!(post_id, user_id = %user_id, "Post liked");

    Ok(HttpResponse::Ok().json(MessageResponse::new("Post liked successfully")))
}

/// POST /posts/{post_id}/comments?user_id=...
pub async fn add_comment(
    state: web::Data<AppState>,
    path: web::Path<i32>,
    actor: web::Query<ActingUser>,
    body: web::Json<CommentRequest>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let user_id = actor.into_inner().user_id;

    require_post(&state, post_id).await?;
    require_user(&state, &user_id).await?;

    let comment = NewComment::new(post_id, user_id, body.into_inner().content)?;
    let saved = state.comments.create(comment).await?;

    tracing::info!(post_id, comment_id = saved.id, "Comment added");

    Ok(HttpResponse::Ok().json(CommentAddedResponse {
        message: "Comment added successfully".to_string(),
        comment: saved.content,
    }))
}

/// GET /posts/{post_id}/comments
pub async fn list_comments(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();

    require_post(&state, post_id).await?;
    let comments = state.comments.find_by_post(post_id).await?;

    Ok(HttpResponse::Ok().json(
        comments
            .into_iter()
            .map(comment_response)
            .collect::<Vec<_>>(),
    ))
}
