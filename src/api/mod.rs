//! HTTP API
//!
//! Route table, CORS wiring and construction of the shared application
//! state. Handlers live in the sibling modules; everything is served
//! under the `/api` prefix.

pub mod article_images;
pub mod articles;
pub mod auth;
pub mod languages;
pub mod middleware;
pub mod responses;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::config::Config;
use crate::db::repositories::{
    SqlxArticleRepository, SqlxDenyListRepository, SqlxFileItemRepository, SqlxLanguageRepository,
    SqlxResetTokenRepository, SqlxUserRepository,
};
use crate::db::DynDatabasePool;
use crate::services::{
    ArticleService, AuthService, FileStorageService, LanguageService, SmtpEmailSender, TokenCodec,
};

pub use middleware::{ApiError, AppState, AuthenticatedUser};

/// Wire repositories and services over the given pool
pub fn build_state(pool: DynDatabasePool, config: &Config) -> AppState {
    let token_codec = Arc::new(TokenCodec::new(&config.jwt));
    let auth_service = Arc::new(AuthService::new(
        SqlxUserRepository::boxed(pool.clone()),
        SqlxDenyListRepository::boxed(pool.clone()),
        SqlxResetTokenRepository::boxed(pool.clone()),
        Arc::new(SmtpEmailSender::new(config.smtp.clone())),
        token_codec.clone(),
    ));
    let article_service = Arc::new(ArticleService::new(SqlxArticleRepository::boxed(
        pool.clone(),
    )));
    let language_service = Arc::new(LanguageService::new(SqlxLanguageRepository::boxed(
        pool.clone(),
    )));
    let file_service = Arc::new(FileStorageService::new(SqlxFileItemRepository::boxed(
        pool.clone(),
    )));

    AppState {
        pool,
        auth_service,
        article_service,
        language_service,
        file_service,
        token_codec,
        public_url: config.server.public_url.clone(),
    }
}

/// Build the API route table.
///
/// Sign-out stays on the public router: the auth service reads the token
/// itself so that expired tokens can still be revoked.
pub fn build_api_router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/users", post(auth::sign_up))
        .route("/auth/sign_in", post(auth::sign_in))
        .route("/auth/sign_out", delete(auth::sign_out))
        .route("/auth/forgot_password", post(auth::forgot_password))
        .route("/auth/reset_password", post(auth::reset_password))
        .route("/articles", get(articles::list_articles))
        .route("/articles/{id}", get(articles::get_article))
        .route("/languages", get(languages::list_languages))
        .route("/languages/{id}", get(languages::get_language))
        .route(
            "/article-images/{file_name}",
            get(article_images::get_article_image),
        );

    let protected = Router::new()
        .route("/articles", post(articles::create_article))
        .route(
            "/articles/{id}",
            patch(articles::update_article).put(articles::update_article),
        )
        .route("/articles/{id}/comments", post(articles::add_comment))
        .route("/articles/{id}/reactions", put(articles::update_reactions))
        .route("/languages", post(languages::create_language))
        .route(
            "/languages/{id}",
            patch(languages::update_language).delete(languages::delete_language),
        )
        .route(
            "/article-images",
            post(article_images::upload_article_image),
        )
        .route_layer(from_fn_with_state(state, middleware::require_auth));

    public.merge(protected)
}

/// Build the complete application router with CORS and the `/api` prefix
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    let mut cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    // An unparseable origin falls back to same-origin only
    if let Ok(origin) = cors_origin.parse::<HeaderValue>() {
        cors = cors.allow_origin(origin).allow_credentials(true);
    } else {
        tracing::warn!(cors_origin = %cors_origin, "Invalid CORS origin, cross-origin requests disabled");
    }

    Router::new()
        .nest("/api", build_api_router(state.clone()))
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};
    use axum_test::TestServer;
    use serde_json::{json, Value};

    async fn test_server() -> TestServer {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        let state = build_state(pool, &Config::default());
        TestServer::new(build_router(state, "http://localhost:3000")).unwrap()
    }

    async fn sign_up_and_in(server: &TestServer, email: &str) -> String {
        let response = server
            .post("/api/users")
            .json(&json!({
                "email": email,
                "password": "correct horse",
                "password_confirmation": "correct horse"
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);

        let response = server
            .post("/api/auth/sign_in")
            .json(&json!({ "email": email, "password": "correct horse" }))
            .await;
        response.assert_status_ok();
        response.json::<Value>()["authentication_token"]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_sign_up_rejects_mismatched_confirmation() {
        let server = test_server().await;

        let response = server
            .post("/api/users")
            .json(&json!({
                "email": "fan@example.com",
                "password": "correct horse",
                "password_confirmation": "wrong horse"
            }))
            .await;

        response.assert_status(axum::http::StatusCode::BAD_REQUEST);
        let body = response.json::<Value>();
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_sign_up_rejects_duplicate_email() {
        let server = test_server().await;
        sign_up_and_in(&server, "fan@example.com").await;

        let response = server
            .post("/api/users")
            .json(&json!({
                "email": "FAN@example.com",
                "password": "correct horse",
                "password_confirmation": "correct horse"
            }))
            .await;

        response.assert_status(axum::http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_sign_in_wrong_password_is_unauthorized() {
        let server = test_server().await;
        sign_up_and_in(&server, "fan@example.com").await;

        let response = server
            .post("/api/auth/sign_in")
            .json(&json!({ "email": "fan@example.com", "password": "nope nope" }))
            .await;

        response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
        let body = response.json::<Value>();
        assert_eq!(body["error"]["message"], "Email or password is incorrect");
    }

    #[tokio::test]
    async fn test_protected_route_requires_token() {
        let server = test_server().await;

        let response = server
            .post("/api/articles")
            .json(&json!({
                "title": "T",
                "short_description": "S",
                "description": "D"
            }))
            .await;

        response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_article_crud_round_trip() {
        let server = test_server().await;
        let token = sign_up_and_in(&server, "writer@example.com").await;

        let response = server
            .post("/api/articles")
            .authorization_bearer(&token)
            .json(&json!({
                "title": "Cup final",
                "short_description": "Short",
                "description": "Long body"
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        let created = response.json::<Value>();
        let id = created["id"].as_str().unwrap().to_string();

        let response = server.get("/api/articles").await;
        response.assert_status_ok();
        let listed = response.json::<Vec<Value>>();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["title"], "Cup final");

        let response = server
            .patch(&format!("/api/articles/{}", id))
            .authorization_bearer(&token)
            .json(&json!({ "title": "Cup final, replayed" }))
            .await;
        response.assert_status_ok();
        let updated = response.json::<Value>();
        assert_eq!(updated["title"], "Cup final, replayed");
        // Blank fields in the patch keep their stored values
        assert_eq!(updated["description"], "Long body");

        let response = server.get("/api/articles/missing-id").await;
        response.assert_status(axum::http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_comments_appear_in_insertion_order() {
        let server = test_server().await;
        let token = sign_up_and_in(&server, "writer@example.com").await;

        let response = server
            .post("/api/articles")
            .authorization_bearer(&token)
            .json(&json!({
                "title": "Transfer news",
                "short_description": "S",
                "description": "D"
            }))
            .await;
        let id = response.json::<Value>()["id"].as_str().unwrap().to_string();

        for text in ["first", "second", "third"] {
            let response = server
                .post(&format!("/api/articles/{}/comments", id))
                .authorization_bearer(&token)
                .json(&json!({ "comment_text": text }))
                .await;
            response.assert_status(axum::http::StatusCode::CREATED);
        }

        let response = server.get(&format!("/api/articles/{}", id)).await;
        let article = response.json::<Value>();
        assert_eq!(article["comments_count"], 3);
        assert_eq!(
            article["comments_content"],
            json!(["first", "second", "third"])
        );
    }

    #[tokio::test]
    async fn test_reactions_are_overwritten() {
        let server = test_server().await;
        let token = sign_up_and_in(&server, "writer@example.com").await;

        let response = server
            .post("/api/articles")
            .authorization_bearer(&token)
            .json(&json!({
                "title": "Season recap",
                "short_description": "S",
                "description": "D"
            }))
            .await;
        let id = response.json::<Value>()["id"].as_str().unwrap().to_string();

        let response = server
            .put(&format!("/api/articles/{}/reactions", id))
            .authorization_bearer(&token)
            .json(&json!({ "article_likes": 10, "article_dislikes": 2 }))
            .await;
        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["article_likes"], 10);
        assert_eq!(body["article_dislikes"], 2);
    }

    #[tokio::test]
    async fn test_sign_out_revokes_token() {
        let server = test_server().await;
        let token = sign_up_and_in(&server, "writer@example.com").await;

        let response = server
            .delete("/api/auth/sign_out")
            .authorization_bearer(&token)
            .await;
        response.assert_status(axum::http::StatusCode::NO_CONTENT);

        // Replaying the sign-out is a no-op, not an error
        let response = server
            .delete("/api/auth/sign_out")
            .authorization_bearer(&token)
            .await;
        response.assert_status(axum::http::StatusCode::NO_CONTENT);

        // Signature and expiry are still valid, the jti is now denied
        let response = server
            .post("/api/articles")
            .authorization_bearer(&token)
            .json(&json!({
                "title": "T",
                "short_description": "S",
                "description": "D"
            }))
            .await;
        response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_sign_out_without_token_fails() {
        let server = test_server().await;

        let response = server.delete("/api/auth/sign_out").await;

        response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_english_language_is_seeded_and_protected() {
        let server = test_server().await;
        let token = sign_up_and_in(&server, "admin@example.com").await;

        let response = server.get("/api/languages").await;
        response.assert_status_ok();
        let languages = response.json::<Vec<Value>>();
        let english = languages
            .iter()
            .find(|l| l["code"] == "en")
            .expect("English seed expected");
        assert_eq!(english["is_english"], true);
        assert_eq!(english["can_be_deleted"], false);

        let id = english["id"].as_str().unwrap();
        let response = server
            .delete(&format!("/api/languages/{}", id))
            .authorization_bearer(&token)
            .await;
        response.assert_status(axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_language_create_and_delete() {
        let server = test_server().await;
        let token = sign_up_and_in(&server, "admin@example.com").await;

        let response = server
            .post("/api/languages")
            .authorization_bearer(&token)
            .json(&json!({ "name": "German", "code": "DE" }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        let created = response.json::<Value>();
        assert_eq!(created["code"], "de");
        assert_eq!(created["can_be_deleted"], true);

        // Same code, different case
        let response = server
            .post("/api/languages")
            .authorization_bearer(&token)
            .json(&json!({ "name": "Deutsch", "code": "de" }))
            .await;
        response.assert_status(axum::http::StatusCode::BAD_REQUEST);

        let id = created["id"].as_str().unwrap();
        let response = server
            .delete(&format!("/api/languages/{}", id))
            .authorization_bearer(&token)
            .await;
        response.assert_status(axum::http::StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_image_upload_and_download() {
        let server = test_server().await;
        let token = sign_up_and_in(&server, "writer@example.com").await;

        let boundary = "sportshub-test-boundary";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"Pitch.PNG\"\r\nContent-Type: image/png\r\n\r\nfake png bytes\r\n--{b}--\r\n",
            b = boundary
        );

        let response = server
            .post("/api/article-images")
            .authorization_bearer(&token)
            .content_type(&format!("multipart/form-data; boundary={}", boundary))
            .bytes(body.into_bytes().into())
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        let uploaded = response.json::<Value>();
        // Names are normalized to lowercase on storage
        assert_eq!(uploaded["file_name"], "pitch.png");
        assert_eq!(uploaded["image_url"], "/api/article-images/pitch.png");

        let response = server.get("/api/article-images/pitch.png").await;
        response.assert_status_ok();
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "image/png"
        );
        assert_eq!(response.as_bytes().as_ref(), b"fake png bytes");

        let response = server.get("/api/article-images/unknown.png").await;
        response.assert_status(axum::http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_forgot_password_is_silent_for_unknown_email() {
        let server = test_server().await;

        let response = server
            .post("/api/auth/forgot_password")
            .json(&json!({ "email": "ghost@example.com" }))
            .await;

        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(
            body["message"],
            "If your email is registered, a reset link has been sent"
        );
    }
}
