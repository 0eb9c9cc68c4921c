//! HTTP handlers and route configuration.

mod auth;
mod health;
mod posts;
mod users;

#[cfg(test)]
mod tests;

use actix_web::web;

use crate::middleware::error::{json_error_handler, query_error_handler};

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        // Public routes
        .route("/health", web::get().to(health::health_check))
        .route("/protected-route", web::get().to(auth::protected_route))
        .service(
            web::scope("/users")
                .route("", web::get().to(users::list_users))
                .route("", web::post().to(users::create_user))
                .route("/login/", web::post().to(auth::login))
                .route("/{id}", web::get().to(users::get_user))
                .route("/{id}", web::put().to(users::update_user))
                .route("/{id}", web::delete().to(users::delete_user)),
        )
        .service(
            web::scope("/posts")
                .route("/", web::post().to(posts::create_post))
                .route("/", web::get().to(posts::list_posts))
                .route("/{post_id}", web::get().to(posts::get_post))
                .route("/{post_id}", web::put().to(posts::update_post))
                .route("/{post_id}", web::delete().to(posts::delete_post))
                .route("/{post_id}/like", web::post().to(posts::like_post))
                .route("/{post_id}/comments", web::post().to(posts::add_comment))
                .route("/{post_id}/comments", web::get().to(posts::list_comments)),
        );
}
