use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use service::ServiceError;
use tracing::{info, instrument, trace, warn};
use utoipa::ToSchema;

use crate::schemas::{service_error_response, ApiResponse, AppState, ErrorResponse};

/// Follow-state between two users
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FollowStatusResponse {
    pub follower_id: i32,
    pub target_id: i32,
    pub following: bool,
}

/// The graph itself tolerates self-follows as no-ops, but the API
/// rejects them so caller bugs surface early.
fn reject_self_follow(
    follower_id: i32,
    target_id: i32,
) -> Result<(), (StatusCode, Json<ErrorResponse>)> {
    if follower_id == target_id {
        warn!("self-follow rejected at the API layer");
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(
                "A user cannot follow themselves",
                "SELF_FOLLOW",
            )),
        ));
    }
    Ok(())
}

async fn ensure_users_exist(
    state: &AppState,
    ids: &[i32],
) -> Result<(), (StatusCode, Json<ErrorResponse>)> {
    for &id in ids {
        if state
            .identity
            .find_by_id(id)
            .await
            .map_err(service_error_response)?
            .is_none()
        {
            return Err(service_error_response(ServiceError::NotFound("user", id)));
        }
    }
    Ok(())
}

/// Follow a user (idempotent)
#[utoipa::path(
    put,
    path = "/api/v1/users/{user_id}/follow/{target_id}",
    tag = "follows",
    params(
        ("user_id" = i32, Path, description = "Follower user ID"),
        ("target_id" = i32, Path, description = "User to follow"),
    ),
    responses(
        (status = 200, description = "Edge present after this call", body = ApiResponse<FollowStatusResponse>),
        (status = 400, description = "Self-follow rejected", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn follow_user(
    Path((user_id, target_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<FollowStatusResponse>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering follow_user function");
    reject_self_follow(user_id, target_id)?;
    ensure_users_exist(&state, &[user_id, target_id]).await?;

    state
        .graph
        .follow(user_id, target_id)
        .await
        .map_err(service_error_response)?;

    info!("User {} now follows {}", user_id, target_id);
    Ok(Json(ApiResponse::new(
        FollowStatusResponse {
            follower_id: user_id,
            target_id,
            following: true,
        },
        "Follow recorded",
    )))
}

/// Unfollow a user (idempotent)
#[utoipa::path(
    delete,
    path = "/api/v1/users/{user_id}/follow/{target_id}",
    tag = "follows",
    params(
        ("user_id" = i32, Path, description = "Follower user ID"),
        ("target_id" = i32, Path, description = "User to unfollow"),
    ),
    responses(
        (status = 200, description = "Edge absent after this call", body = ApiResponse<FollowStatusResponse>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn unfollow_user(
    Path((user_id, target_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<FollowStatusResponse>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering unfollow_user function");
    ensure_users_exist(&state, &[user_id, target_id]).await?;

    state
        .graph
        .unfollow(user_id, target_id)
        .await
        .map_err(service_error_response)?;

    info!("User {} no longer follows {}", user_id, target_id);
    Ok(Json(ApiResponse::new(
        FollowStatusResponse {
            follower_id: user_id,
            target_id,
            following: false,
        },
        "Unfollow recorded",
    )))
}

/// Check whether one user follows another
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/follow/{target_id}",
    tag = "follows",
    params(
        ("user_id" = i32, Path, description = "Follower user ID"),
        ("target_id" = i32, Path, description = "Potentially followed user"),
    ),
    responses(
        (status = 200, description = "Current edge state", body = ApiResponse<FollowStatusResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn is_following(
    Path((user_id, target_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<FollowStatusResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let following = state
        .graph
        .is_following(user_id, target_id)
        .await
        .map_err(service_error_response)?;

    Ok(Json(ApiResponse::new(
        FollowStatusResponse {
            follower_id: user_id,
            target_id,
            following,
        },
        "Follow state retrieved",
    )))
}

/// Ids of everyone the user follows
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/following",
    tag = "follows",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "Followed user ids", body = ApiResponse<Vec<i32>>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_following(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<i32>>>, (StatusCode, Json<ErrorResponse>)> {
    ensure_users_exist(&state, &[user_id]).await?;

    let ids = state
        .graph
        .following_ids(user_id)
        .await
        .map_err(service_error_response)?;

    Ok(Json(ApiResponse::new(ids, "Following retrieved")))
}

/// Ids of everyone following the user
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/followers",
    tag = "follows",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "Follower user ids", body = ApiResponse<Vec<i32>>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_followers(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<i32>>>, (StatusCode, Json<ErrorResponse>)> {
    ensure_users_exist(&state, &[user_id]).await?;

    let ids = state
        .graph
        .follower_ids(user_id)
        .await
        .map_err(service_error_response)?;

    Ok(Json(ApiResponse::new(ids, "Followers retrieved")))
}
