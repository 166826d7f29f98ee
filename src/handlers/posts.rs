use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use common::Page;
use model::entities::post;
use serde::{Deserialize, Serialize};
use service::{NewPost, ServiceError};
use tracing::{info, instrument, trace, warn};
use utoipa::ToSchema;

use crate::schemas::{
    service_error_response, ApiResponse, AppState, ErrorResponse, PaginationQuery,
};

/// Request body for creating a new post
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreatePostRequest {
    /// Author user ID
    pub user_id: i32,
    /// Optional title
    pub title: Option<String>,
    /// Rich-text body; sanitized before storage
    pub body: String,
    /// Detected source-language tag, if the caller knows it
    pub language: Option<String>,
}

/// Post response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PostResponse {
    pub id: i32,
    pub title: Option<String>,
    pub body: String,
    pub timestamp: DateTime<Utc>,
    pub user_id: i32,
    pub language: Option<String>,
}

impl From<post::Model> for PostResponse {
    fn from(model: post::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            body: model.body,
            timestamp: model.timestamp,
            user_id: model.user_id,
            language: model.language,
        }
    }
}

/// Create a new post with a server-assigned timestamp
#[utoipa::path(
    post,
    path = "/api/v1/posts",
    tag = "posts",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Post created successfully", body = ApiResponse<PostResponse>),
        (status = 404, description = "Author not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(user_id = request.user_id))]
pub async fn create_post(
    State(state): State<AppState>,
    Json(request): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PostResponse>>), (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering create_post function");

    let created = state
        .posts
        .create_post(
            request.user_id,
            NewPost {
                title: request.title,
                body: request.body,
                language: request.language,
            },
        )
        .await
        .map_err(service_error_response)?;

    info!("Post created with ID: {}", created.id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            PostResponse::from(created),
            "Post created successfully",
        )),
    ))
}

/// Get a specific post by ID
#[utoipa::path(
    get,
    path = "/api/v1/posts/{post_id}",
    tag = "posts",
    params(
        ("post_id" = i32, Path, description = "Post ID"),
    ),
    responses(
        (status = 200, description = "Post retrieved successfully", body = ApiResponse<PostResponse>),
        (status = 404, description = "Post not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_post(
    Path(post_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<PostResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let found = state
        .posts
        .find_by_id(post_id)
        .await
        .map_err(service_error_response)?;

    match found {
        Some(model) => Ok(Json(ApiResponse::new(
            PostResponse::from(model),
            "Post retrieved successfully",
        ))),
        None => {
            warn!("Post with ID {} not found", post_id);
            Err(service_error_response(ServiceError::NotFound(
                "post", post_id,
            )))
        }
    }
}

/// One author's posts, newest first
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/posts",
    tag = "posts",
    params(
        ("user_id" = i32, Path, description = "Author user ID"),
        PaginationQuery,
    ),
    responses(
        (status = 200, description = "Posts retrieved successfully", body = ApiResponse<Page<PostResponse>>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_user_posts(
    Path(user_id): Path<i32>,
    Query(pagination): Query<PaginationQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Page<PostResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    if state
        .identity
        .find_by_id(user_id)
        .await
        .map_err(service_error_response)?
        .is_none()
    {
        return Err(service_error_response(ServiceError::NotFound(
            "user", user_id,
        )));
    }

    let page = state
        .feed
        .posts_by(user_id, &pagination.to_request())
        .await
        .map_err(service_error_response)?;

    Ok(Json(ApiResponse::new(
        page.map(PostResponse::from),
        "Posts retrieved successfully",
    )))
}
