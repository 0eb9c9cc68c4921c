use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use chrono::TimeDelta;
use migration::{Migrator, MigratorTrait};
use serde_json::{Value, json};

use quill_core::ports::{ClaimSet, LikeRepository, TokenService};
use quill_infra::database::{self, DatabaseConfig};
use quill_infra::{Argon2PasswordService, JwtConfig, JwtTokenService};

use super::configure_routes;
use crate::state::AppState;

async fn test_state() -> AppState {
    let db = database::connect(&DatabaseConfig::in_memory()).await.unwrap();
    Migrator::up(&db, None).await.unwrap();

    let tokens = Arc::new(JwtTokenService::new(JwtConfig {
        secret: "test-secret".to_string(),
        ..JwtConfig::default()
    }));
    let passwords = Arc::new(Argon2PasswordService::with_params(1024, 1, 1).unwrap());

    AppState::new(db, tokens, passwords)
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .configure(configure_routes),
        )
        .await
    };
}

/// Send a request and return the status with the JSON body (`Null` when empty).
macro_rules! call {
    ($app:expr, $req:expr) => {{
        let resp = test::call_service(&$app, $req.to_request()).await;
        let status = resp.status();
        let body = test::read_body(resp).await;
        let json: Value = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }};
}

fn register(name: &str, email: &str, password: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/users")
        .set_json(json!({ "name": name, "email": email, "password": password }))
}

fn login(email: &str, password: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/users/login/")
        .set_json(json!({ "email": email, "password": password }))
}

fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

fn create_post(token: &str, author_id: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/posts/")
        .insert_header(bearer(token))
        .set_json(json!({ "title": "Hello", "content": "World", "author_id": author_id }))
}

#[actix_rt::test]
async fn test_register_login_post_and_like() {
    let app = init_app!(test_state().await);

    let (status, user_a) = call!(app, register("A", "a@x.com", "pw"));
    assert_eq!(status, StatusCode::CREATED);
    let a_id = user_a["id"].as_str().unwrap().to_string();
    assert_eq!(user_a["email"], "a@x.com");
    assert!(user_a.get("password_hash").is_none());

    let (status, auth) = call!(app, login("a@x.com", "pw"));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(auth["token_type"], "bearer");
    assert_eq!(auth["expires_in"], json!(1800));
    let token = auth["access_token"].as_str().unwrap().to_string();

    let (status, post) = call!(app, create_post(&token, &a_id));
    assert_eq!(status, StatusCode::CREATED);
    let post_id = post["id"].as_i64().unwrap();
    assert_eq!(post["author_id"], a_id.as_str());
    assert!(post["updated_at"].is_null());

    let (_, user_u) = call!(app, register("U", "u@x.com", "pw2"));
    let u_id = user_u["id"].as_str().unwrap().to_string();
    let like_as_u = || {
        test::TestRequest::post().uri(&format!("/posts/{post_id}/like?user_id={u_id}"))
    };

    let (status, body) = call!(app, like_as_u());
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Post liked successfully");

    let (status, body) = call!(app, like_as_u());
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Post already liked");
}

#[actix_rt::test]
async fn test_duplicate_email_rejected() {
    let app = init_app!(test_state().await);

    let (status, _) = call!(app, register("A", "a@x.com", "pw"));
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = call!(app, register("Other", "a@x.com", "pw"));
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Email already registered");
}

#[actix_rt::test]
async fn test_invalid_registration_payloads() {
    let app = init_app!(test_state().await);

    let (status, _) = call!(app, register("A", "not-an-email", "pw"));
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let missing_password = test::TestRequest::post()
        .uri("/users")
        .set_json(json!({ "name": "A", "email": "a@x.com" }));
    let (status, body) = call!(app, missing_password);
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["title"], "Validation Failed");
}

#[actix_rt::test]
async fn test_login_failures() {
    let app = init_app!(test_state().await);
    call!(app, register("A", "a@x.com", "pw"));

    let (status, _) = call!(app, login("a@x.com", "wrong"));
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = call!(app, login("nobody@x.com", "pw"));
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "User not found");
}

#[actix_rt::test]
async fn test_auth_gate_rejects_bad_credentials() {
    let state = test_state().await;
    let tokens = state.tokens.clone();
    let app = init_app!(state);

    let (status, body) = call!(app, test::TestRequest::get().uri("/posts/"));
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["title"], "Authentication Required");

    let basic = test::TestRequest::get()
        .uri("/posts/")
        .insert_header(("Authorization", "Basic abc"));
    let (status, _) = call!(app, basic);
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let garbage = test::TestRequest::get()
        .uri("/posts/")
        .insert_header(bearer("not.a.jwt"));
    let (status, _) = call!(app, garbage);
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let expired = tokens
        .issue(&ClaimSet::new("a@x.com"), TimeDelta::seconds(-60))
        .unwrap();
    let (status, body) = call!(
        app,
        test::TestRequest::get().uri("/posts/").insert_header(bearer(&expired))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["title"], "Token Expired");

    let valid = tokens.issue_access_token(&ClaimSet::new("a@x.com")).unwrap();
    let (status, body) = call!(
        app,
        test::TestRequest::get().uri("/posts/").insert_header(bearer(&valid))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[actix_rt::test]
async fn test_protected_route_echoes_claims() {
    let app = init_app!(test_state().await);
    call!(app, register("A", "a@x.com", "pw"));
    let (_, auth) = call!(app, login("a@x.com", "pw"));
    let token = auth["access_token"].as_str().unwrap();

    let (status, body) = call!(
        app,
        test::TestRequest::get()
            .uri("/protected-route")
            .insert_header(bearer(token))
    );

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "You have access!");
    assert_eq!(body["user"]["sub"], "a@x.com");
}

#[actix_rt::test]
async fn test_create_post_with_unknown_author() {
    let app = init_app!(test_state().await);
    call!(app, register("A", "a@x.com", "pw"));
    let (_, auth) = call!(app, login("a@x.com", "pw"));
    let token = auth["access_token"].as_str().unwrap();

    let (status, body) = call!(app, create_post(token, "ghost"));

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Author with provided ID does not exist");
}

#[actix_rt::test]
async fn test_post_lifecycle() {
    let app = init_app!(test_state().await);
    let (_, user) = call!(app, register("A", "a@x.com", "pw"));
    let (_, auth) = call!(app, login("a@x.com", "pw"));
    let token = auth["access_token"].as_str().unwrap();
    let (_, post) = call!(app, create_post(token, user["id"].as_str().unwrap()));
    let uri = format!("/posts/{}", post["id"]);

    let (status, fetched) = call!(app, test::TestRequest::get().uri(&uri));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, post);

    let patch = test::TestRequest::put()
        .uri(&uri)
        .set_json(json!({ "content": "Edited" }));
    let (status, updated) = call!(app, patch);
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Hello");
    assert_eq!(updated["content"], "Edited");
    assert!(!updated["updated_at"].is_null());

    let (status, body) = call!(app, test::TestRequest::delete().uri(&uri));
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, _) = call!(app, test::TestRequest::get().uri(&uri));
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = call!(app, test::TestRequest::delete().uri(&uri));
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_list_posts_paginates() {
    let app = init_app!(test_state().await);
    let (_, user) = call!(app, register("A", "a@x.com", "pw"));
    let author_id = user["id"].as_str().unwrap().to_string();
    let (_, auth) = call!(app, login("a@x.com", "pw"));
    let token = auth["access_token"].as_str().unwrap().to_string();

    for _ in 0..3 {
        call!(app, create_post(&token, &author_id));
    }

    let (status, page) = call!(
        app,
        test::TestRequest::get()
            .uri("/posts/?skip=1&limit=1")
            .insert_header(bearer(&token))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page.as_array().unwrap().len(), 1);

    let (_, all) = call!(
        app,
        test::TestRequest::get().uri("/posts/").insert_header(bearer(&token))
    );
    assert_eq!(all.as_array().unwrap().len(), 3);
    assert_eq!(page[0], all[1]);

    let (status, huge) = call!(
        app,
        test::TestRequest::get()
            .uri("/posts/?skip=0&limit=18446744073709551615")
            .insert_header(bearer(&token))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(huge.as_array().unwrap().len(), 3);

    let (status, _) = call!(
        app,
        test::TestRequest::get()
            .uri("/posts/?limit=-1")
            .insert_header(bearer(&token))
    );
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_rt::test]
async fn test_comments() {
    let app = init_app!(test_state().await);
    let (_, user) = call!(app, register("A", "a@x.com", "pw"));
    let user_id = user["id"].as_str().unwrap().to_string();
    let (_, auth) = call!(app, login("a@x.com", "pw"));
    let token = auth["access_token"].as_str().unwrap().to_string();
    let (_, post) = call!(app, create_post(&token, &user_id));
    let comments_uri = format!("/posts/{}/comments", post["id"]);

    let comment = |content: &str| {
        test::TestRequest::post()
            .uri(&format!("{comments_uri}?user_id={user_id}"))
            .set_json(json!({ "content": content }))
    };

    let (status, body) = call!(app, comment("Great read"));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Comment added successfully");
    assert_eq!(body["comment"], "Great read");

    let (status, _) = call!(app, comment(""));
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let missing_post = test::TestRequest::post()
        .uri(&format!("/posts/999/comments?user_id={user_id}"))
        .set_json(json!({ "content": "hello" }));
    let (status, _) = call!(app, missing_post);
    assert_eq!(status, StatusCode::NOT_FOUND);

    let no_user = test::TestRequest::post()
        .uri(&comments_uri)
        .set_json(json!({ "content": "hello" }));
    let (status, _) = call!(app, no_user);
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, listed) = call!(app, test::TestRequest::get().uri(&comments_uri));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["content"], "Great read");
}

#[actix_rt::test]
async fn test_like_missing_post_or_user() {
    let app = init_app!(test_state().await);
    let (_, user) = call!(app, register("A", "a@x.com", "pw"));
    let user_id = user["id"].as_str().unwrap().to_string();
    let (_, auth) = call!(app, login("a@x.com", "pw"));
    let token = auth["access_token"].as_str().unwrap().to_string();
    let (_, post) = call!(app, create_post(&token, &user_id));

    let (status, body) = call!(
        app,
        test::TestRequest::post().uri(&format!("/posts/999/like?user_id={user_id}"))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Post not found");

    let (status, body) = call!(
        app,
        test::TestRequest::post().uri(&format!("/posts/{}/like?user_id=ghost", post["id"]))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "User not found");
}

#[actix_rt::test]
async fn test_update_and_delete_user() {
    let state = test_state().await;
    let likes = state.likes.clone();
    let app = init_app!(state);
    let (_, author) = call!(app, register("Author", "author@x.com", "pw"));
    let author_id = author["id"].as_str().unwrap().to_string();
    let (_, reader) = call!(app, register("Reader", "reader@x.com", "pw"));
    let reader_id = reader["id"].as_str().unwrap().to_string();
    let (_, auth) = call!(app, login("author@x.com", "pw"));
    let token = auth["access_token"].as_str().unwrap().to_string();

    let (_, post) = call!(app, create_post(&token, &author_id));
    let post_id = post["id"].clone();
    let post_key = post_id.as_i64().unwrap() as i32;
    call!(
        app,
        test::TestRequest::post().uri(&format!("/posts/{post_id}/like?user_id={reader_id}"))
    );
    assert_eq!(likes.find_by_post(post_key).await.unwrap().len(), 1);
    call!(
        app,
        test::TestRequest::post()
            .uri(&format!("/posts/{post_id}/comments?user_id={reader_id}"))
            .set_json(json!({ "content": "hi" }))
    );

    // Updates require a token.
    let unauthenticated = test::TestRequest::put()
        .uri(&format!("/users/{reader_id}"))
        .set_json(json!({ "name": "R" }));
    let (status, _) = call!(app, unauthenticated);
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let rename = test::TestRequest::put()
        .uri(&format!("/users/{reader_id}"))
        .insert_header(bearer(&token))
        .set_json(json!({ "name": "R" }));
    let (status, updated) = call!(app, rename);
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "R");
    assert_eq!(updated["email"], "reader@x.com");

    let steal_email = test::TestRequest::put()
        .uri(&format!("/users/{reader_id}"))
        .insert_header(bearer(&token))
        .set_json(json!({ "email": "author@x.com" }));
    let (status, _) = call!(app, steal_email);
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let missing = test::TestRequest::put()
        .uri("/users/nope")
        .insert_header(bearer(&token))
        .set_json(json!({ "name": "X" }));
    let (status, _) = call!(app, missing);
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Authors keep their posts: deleting them is refused.
    let (status, _) = call!(
        app,
        test::TestRequest::delete()
            .uri(&format!("/users/{author_id}"))
            .insert_header(bearer(&token))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = call!(app, test::TestRequest::get().uri(&format!("/posts/{post_id}")));
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call!(
        app,
        test::TestRequest::delete()
            .uri(&format!("/users/{reader_id}"))
            .insert_header(bearer(&token))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["detail"], "User deleted successfully");

    let (status, _) = call!(app, test::TestRequest::get().uri(&format!("/users/{reader_id}")));
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, comments) = call!(
        app,
        test::TestRequest::get().uri(&format!("/posts/{post_id}/comments"))
    );
    assert_eq!(comments, json!([]));
    assert!(likes.find_by_post(post_key).await.unwrap().is_empty());
    assert!(likes.find_by_user(&reader_id).await.unwrap().is_empty());

    let (_, users) = call!(app, test::TestRequest::get().uri("/users"));
    assert_eq!(users.as_array().unwrap().len(), 1);
}

#[actix_rt::test]
async fn test_health() {
    let app = init_app!(test_state().await);

    let (status, body) = call!(app, test::TestRequest::get().uri("/health"));

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "up");
}
