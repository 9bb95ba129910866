pub mod auth;
pub mod error;
pub mod extract;
pub mod posts;
pub mod users;

pub use error::{ApiError, ApiResult};

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::state::AppState;

/// Build the application router over a prepared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Auth routes
        .route("/api/auth/me", get(auth::me))
        // User routes (static segments before parameterized ones)
        .route("/api/users/suggested", get(users::get_suggested_users))
        .route("/api/users/search/:query", get(users::search_users))
        .route("/api/users/:id", get(users::get_user))
        .route("/api/users/:id/posts", get(users::get_user_posts))
        .route(
            "/api/users/:id/follow",
            post(users::follow_user).delete(users::unfollow_user),
        )
        .route("/api/users/:id/followers", get(users::get_followers))
        .route("/api/users/:id/following", get(users::get_following))
        .route("/api/users/:id/following/check", get(users::check_following))
        // Post routes
        .route("/api/feed", get(posts::get_feed))
        .route("/api/posts", post(posts::create_post))
        .route(
            "/api/posts/:id",
            get(posts::get_post).delete(posts::delete_post),
        )
        .route(
            "/api/posts/:id/like",
            post(posts::like_post).delete(posts::unlike_post),
        )
        .route(
            "/api/posts/:id/comments",
            get(posts::get_comments).post(posts::create_comment),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{seed::seed_demo_data, MemStorage};
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    // Seeded ids: ahmet=1, elif=2, baris=3, selin=4.
    // Posts: 1 by elif, 2 by baris, 3 by selin.
    // Follows: ahmet->elif, ahmet->baris, elif->selin.
    fn app() -> Router {
        let storage = MemStorage::new();
        seed_demo_data(&storage).expect("seed failed");
        router(AppState::new(Arc::new(storage), 1))
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request build failed")
    }

    fn json_req(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request build failed")
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read body");
        serde_json::from_slice(&bytes).expect("body was not JSON")
    }

    #[tokio::test]
    async fn health_check_works() {
        let response = app().oneshot(get_req("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn me_returns_default_user_in_camel_case() {
        let response = app().oneshot(get_req("/api/auth/me")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["username"], "ahmet_yilmaz");
        assert!(body["followersCount"].is_number());
        assert!(body["isVerified"].is_boolean());
        assert!(body.get("followers_count").is_none());
    }

    #[tokio::test]
    async fn user_id_header_switches_viewer() {
        let request = Request::builder()
            .uri("/api/auth/me")
            .header("X-User-Id", "2")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        let body = body_json(response).await;
        assert_eq!(body["username"], "elif_demir");
    }

    #[tokio::test]
    async fn malformed_user_id_header_is_rejected() {
        let request = Request::builder()
            .uri("/api/auth/me")
            .header("X-User-Id", "not-a-number")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_user_is_404() {
        let response = app().oneshot(get_req("/api/users/999")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["message"], "User not found");
    }

    #[tokio::test]
    async fn feed_contains_only_followed_authors() {
        let response = app().oneshot(get_req("/api/feed")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        let feed = body.as_array().unwrap();
        // ahmet follows elif and baris but not selin
        assert_eq!(feed.len(), 2);
        for item in feed {
            assert_ne!(item["author"]["username"], "selin_celik");
            assert!(item["isLiked"].is_boolean());
        }
    }

    #[tokio::test]
    async fn feed_pagination_slices_after_filtering() {
        let all = body_json(app().oneshot(get_req("/api/feed")).await.unwrap()).await;
        let page =
            body_json(app().oneshot(get_req("/api/feed?limit=1&offset=1")).await.unwrap()).await;
        assert_eq!(page.as_array().unwrap().len(), 1);
        assert_eq!(page[0]["id"], all[1]["id"]);
    }

    #[tokio::test]
    async fn create_post_returns_201_with_author() {
        let request = json_req(
            Method::POST,
            "/api/posts",
            json!({ "content": "Hello from the tests" }),
        );
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = body_json(response).await;
        assert_eq!(body["content"], "Hello from the tests");
        assert_eq!(body["author"]["username"], "ahmet_yilmaz");
        assert_eq!(body["isLiked"], false);
        assert_eq!(body["likesCount"], 0);
    }

    #[tokio::test]
    async fn create_post_rejects_blank_content() {
        let request = json_req(Method::POST, "/api/posts", json!({ "content": "   " }));
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["message"], "Invalid post data");
        assert_eq!(body["errors"][0]["field"], "content");
    }

    #[tokio::test]
    async fn create_post_rejects_oversized_content() {
        let request = json_req(
            Method::POST,
            "/api/posts",
            json!({ "content": "x".repeat(501) }),
        );
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn post_details_include_comments() {
        let app = app();
        let request = json_req(
            Method::POST,
            "/api/posts/1/comments",
            json!({ "content": "Nice work!" }),
        );
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app.oneshot(get_req("/api/posts/1")).await.unwrap();
        let body = body_json(response).await;
        assert_eq!(body["commentsCount"], 1);
        assert_eq!(body["comments"][0]["content"], "Nice work!");
        assert_eq!(body["comments"][0]["author"]["username"], "ahmet_yilmaz");
    }

    #[tokio::test]
    async fn like_then_double_like() {
        let app = app();
        let response = app
            .clone()
            .oneshot(json_req(Method::POST, "/api/posts/1/like", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Post liked successfully");
        assert_eq!(body["like"]["postId"], 1);

        let response = app
            .oneshot(json_req(Method::POST, "/api/posts/1/like", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Post already liked");
    }

    #[tokio::test]
    async fn unlike_without_like_is_404() {
        let request = Request::builder()
            .method(Method::DELETE)
            .uri("/api/posts/1/like")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Like not found");
    }

    #[tokio::test]
    async fn delete_post_of_another_author_is_404() {
        // post 1 belongs to elif, the default viewer is ahmet
        let request = Request::builder()
            .method(Method::DELETE)
            .uri("/api/posts/1")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Post not found or unauthorized");
    }

    #[tokio::test]
    async fn author_can_delete_own_post() {
        let request = Request::builder()
            .method(Method::DELETE)
            .uri("/api/posts/1")
            .header("X-User-Id", "2")
            .body(Body::empty())
            .unwrap();
        let app = app();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.oneshot(get_req("/api/posts/1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn self_follow_is_rejected() {
        let response = app()
            .oneshot(json_req(Method::POST, "/api/users/1/follow", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Cannot follow yourself");
    }

    #[tokio::test]
    async fn duplicate_follow_is_rejected() {
        // ahmet already follows elif from the seed
        let response = app()
            .oneshot(json_req(Method::POST, "/api/users/2/follow", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Already following user");
    }

    #[tokio::test]
    async fn follow_unfollow_roundtrip() {
        let app = app();
        let response = app
            .clone()
            .oneshot(json_req(Method::POST, "/api/users/4/follow", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["follow"]["followingId"], 4);

        let check =
            body_json(app.clone().oneshot(get_req("/api/users/4/following/check")).await.unwrap())
                .await;
        assert_eq!(check["isFollowing"], true);

        let request = Request::builder()
            .method(Method::DELETE)
            .uri("/api/users/4/follow")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let request = Request::builder()
            .method(Method::DELETE)
            .uri("/api/users/4/follow")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn suggested_excludes_viewer_and_followed() {
        let response = app().oneshot(get_req("/api/users/suggested")).await.unwrap();
        let body = body_json(response).await;
        let usernames: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|u| u["username"].as_str().unwrap())
            .collect();
        assert_eq!(usernames, vec!["selin_celik"]);
    }

    #[tokio::test]
    async fn search_matches_name_case_insensitively() {
        let response = app().oneshot(get_req("/api/users/search/DEMIR")).await.unwrap();
        let body = body_json(response).await;
        assert_eq!(body[0]["username"], "elif_demir");
    }
}
