use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use common::Page;
use service::ServiceError;
use tracing::{debug, instrument, trace};

use crate::handlers::posts::PostResponse;
use crate::schemas::{
    service_error_response, ApiResponse, AppState, ErrorResponse, PaginationQuery,
};

/// The following feed: posts from the user and everyone they follow,
/// newest first. The user's own posts are always eligible; no
/// self-follow edge is needed.
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/feed",
    tag = "feed",
    params(
        ("user_id" = i32, Path, description = "User whose feed to compose"),
        PaginationQuery,
    ),
    responses(
        (status = 200, description = "Feed page retrieved", body = ApiResponse<Page<PostResponse>>),
        (status = 400, description = "Out-of-range page in strict mode", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_user_feed(
    Path(user_id): Path<i32>,
    Query(pagination): Query<PaginationQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Page<PostResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_user_feed function");

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
        .feed_for(user_id, &pagination.to_request())
        .await
        .map_err(service_error_response)?;

    debug!(
        "Feed page {} for user {} holds {} posts",
        page.page,
        user_id,
        page.items.len()
    );
    Ok(Json(ApiResponse::new(
        page.map(PostResponse::from),
        "Feed retrieved successfully",
    )))
}

/// The public home timeline: every post regardless of the graph, same
/// ordering and pagination contract as the personal feed.
#[utoipa::path(
    get,
    path = "/api/v1/feed",
    tag = "feed",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Global feed page retrieved", body = ApiResponse<Page<PostResponse>>),
        (status = 400, description = "Out-of-range page in strict mode", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_global_feed(
    Query(pagination): Query<PaginationQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Page<PostResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_global_feed function");

    let page = state
        .feed
        .feed_all(&pagination.to_request())
        .await
        .map_err(service_error_response)?;

    Ok(Json(ApiResponse::new(
        page.map(PostResponse::from),
        "Global feed retrieved successfully",
    )))
}
