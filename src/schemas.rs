use axum::http::StatusCode;
use axum::response::Json;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use service::{FeedService, IdentityService, PostService, ServiceError, SocialGraph};
use tracing::error;
use utoipa::{IntoParams, OpenApi, ToSchema};

use crate::mailer::Mailer;

/// Application state shared across handlers. Every service component
/// is constructed once at startup with its own handle to the store.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// User records, credentials, reset tokens
    pub identity: IdentityService,
    /// Follow/unfollow edges and counts
    pub graph: SocialGraph,
    /// Personalized and global feeds
    pub feed: FeedService,
    /// The post store the feed reads from
    pub posts: PostService,
    /// Background mail dispatch
    pub mailer: Mailer,
}

/// API response wrapper
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T, message: &str) -> Self {
        Self {
            data,
            message: message.to_string(),
            success: true,
        }
    }
}

/// Error response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: &str) -> Self {
        Self {
            error: error.into(),
            code: code.to_string(),
            success: false,
        }
    }
}

/// Health check response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// Query parameters shared by every paginated listing endpoint
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct PaginationQuery {
    /// Page number, 1-indexed (default 1)
    pub page: Option<u64>,
    /// Items per page (default 20, max 100)
    pub per_page: Option<u64>,
    /// Error on out-of-range pages instead of returning an empty page
    pub strict: Option<bool>,
}

impl PaginationQuery {
    pub fn to_request(&self) -> common::PageRequest {
        let mut req = common::PageRequest::new(
            self.page.unwrap_or(1),
            self.per_page.unwrap_or(common::DEFAULT_PER_PAGE),
        );
        if self.strict.unwrap_or(false) {
            req = req.strict();
        }
        req
    }
}

/// Map a service-layer error onto the HTTP boundary. Store failures
/// stay generic in the response body; details go to the log only.
pub fn service_error_response(err: ServiceError) -> (StatusCode, Json<ErrorResponse>) {
    match err {
        ServiceError::DuplicateUsername(username) => (
            StatusCode::CONFLICT,
            Json(ErrorResponse::new(
                format!("Username '{username}' already exists"),
                "USERNAME_ALREADY_EXISTS",
            )),
        ),
        ServiceError::DuplicateEmail(email) => (
            StatusCode::CONFLICT,
            Json(ErrorResponse::new(
                format!("Email '{email}' already exists"),
                "EMAIL_ALREADY_EXISTS",
            )),
        ),
        ServiceError::NotFound(what, id) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(format!("{what} {id} not found"), "NOT_FOUND")),
        ),
        ServiceError::PageOutOfRange { page, total_pages } => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(
                format!("Page {page} is out of range (total pages: {total_pages})"),
                "PAGE_OUT_OF_RANGE",
            )),
        ),
        err @ (ServiceError::PasswordHash(_)
        | ServiceError::Token(_)
        | ServiceError::Database(_)) => {
            error!("internal service error: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Internal server error", "INTERNAL_ERROR")),
            )
        }
    }
}

/// The one body used for every authentication failure, so callers
/// cannot tell an unknown username from a bad password or an expired
/// token from a tampered one.
pub fn auth_failure_response() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse::new("Authentication failed", "AUTH_FAILED")),
    )
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::users::create_user,
        crate::handlers::users::get_user,
        crate::handlers::users::update_user,
        crate::handlers::users::delete_user,
        crate::handlers::auth::login,
        crate::handlers::auth::request_password_reset,
        crate::handlers::auth::reset_password,
        crate::handlers::follows::follow_user,
        crate::handlers::follows::unfollow_user,
        crate::handlers::follows::is_following,
        crate::handlers::follows::get_following,
        crate::handlers::follows::get_followers,
        crate::handlers::posts::create_post,
        crate::handlers::posts::get_post,
        crate::handlers::posts::get_user_posts,
        crate::handlers::feed::get_user_feed,
        crate::handlers::feed::get_global_feed,
    ),
    components(
        schemas(
            ApiResponse<crate::handlers::users::UserResponse>,
            ApiResponse<crate::handlers::posts::PostResponse>,
            ApiResponse<common::Page<crate::handlers::posts::PostResponse>>,
            ApiResponse<crate::handlers::follows::FollowStatusResponse>,
            ApiResponse<Vec<i32>>,
            ApiResponse<String>,
            ApiResponse<i32>,
            common::Page<crate::handlers::posts::PostResponse>,
            ErrorResponse,
            HealthResponse,
            PaginationQuery,
            crate::handlers::users::CreateUserRequest,
            crate::handlers::users::UpdateUserRequest,
            crate::handlers::users::UserResponse,
            crate::handlers::auth::LoginRequest,
            crate::handlers::auth::ResetRequest,
            crate::handlers::auth::ResetPassword,
            crate::handlers::follows::FollowStatusResponse,
            crate::handlers::posts::CreatePostRequest,
            crate::handlers::posts::PostResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "User registration and profiles"),
        (name = "auth", description = "Login and password-reset lifecycle"),
        (name = "follows", description = "Social graph edges and counts"),
        (name = "posts", description = "Journal entries"),
        (name = "feed", description = "Personalized and global timelines"),
    ),
    info(
        title = "chirp API",
        description = "Multi-user journal backend - follower graph, personalized feed, and credential lifecycle",
        version = "0.1.0",
    )
)]
pub struct ApiDoc;
