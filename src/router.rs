use crate::handlers::{
    auth::{login, request_password_reset, reset_password},
    feed::{get_global_feed, get_user_feed},
    follows::{follow_user, get_followers, get_following, is_following, unfollow_user},
    health::health_check,
    posts::{create_post, get_post, get_user_posts},
    users::{create_user, delete_user, get_user, update_user},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // User registration and profiles
        .route("/api/v1/users", post(create_user))
        .route("/api/v1/users/:user_id", get(get_user))
        .route("/api/v1/users/:user_id", put(update_user))
        .route("/api/v1/users/:user_id", delete(delete_user))
        // Authentication and password-reset lifecycle
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/reset-request", post(request_password_reset))
        .route("/api/v1/auth/reset", post(reset_password))
        // Social graph
        .route(
            "/api/v1/users/:user_id/follow/:target_id",
            put(follow_user),
        )
        .route(
            "/api/v1/users/:user_id/follow/:target_id",
            delete(unfollow_user),
        )
        .route(
            "/api/v1/users/:user_id/follow/:target_id",
            get(is_following),
        )
        .route("/api/v1/users/:user_id/following", get(get_following))
        .route("/api/v1/users/:user_id/followers", get(get_followers))
        // Posts
        .route("/api/v1/posts", post(create_post))
        .route("/api/v1/posts/:post_id", get(get_post))
        .route("/api/v1/users/:user_id/posts", get(get_user_posts))
        // Feeds
        .route("/api/v1/users/:user_id/feed", get(get_user_feed))
        .route("/api/v1/feed", get(get_global_feed))
        // OpenAPI documentation
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Middleware stack
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30))),
        )
        .with_state(state)
}
