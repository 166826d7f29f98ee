use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use model::entities::user;
use serde::{Deserialize, Serialize};
use service::{identity, NewUser, ProfileUpdate};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::ToSchema;

use crate::schemas::{service_error_response, ApiResponse, AppState, ErrorResponse};

/// Request body for registering a new user
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateUserRequest {
    /// Username (must be unique)
    pub username: String,
    /// Email (must be unique)
    pub email: String,
    /// Plaintext password; stored only as a hash
    pub password: String,
}

/// Request body for updating profile fields
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateUserRequest {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub about_me: Option<String>,
}

/// User profile response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub about_me: Option<String>,
    pub last_seen: Option<DateTime<Utc>>,
    /// Gravatar URL derived from the email
    pub avatar_url: String,
    /// Exact count at response time
    pub followers_count: u64,
    /// Exact count at response time
    pub following_count: u64,
}

impl UserResponse {
    pub fn from_model(model: user::Model, followers_count: u64, following_count: u64) -> Self {
        let avatar_url = identity::avatar_url(&model.email, 128);
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            firstname: model.firstname,
            lastname: model.lastname,
            about_me: model.about_me,
            last_seen: model.last_seen,
            avatar_url,
            followers_count,
            following_count,
        }
    }
}

async fn profile_response(
    state: &AppState,
    model: user::Model,
) -> Result<UserResponse, (StatusCode, Json<ErrorResponse>)> {
    let followers = state
        .graph
        .followers_count(model.id)
        .await
        .map_err(service_error_response)?;
    let following = state
        .graph
        .following_count(model.id)
        .await
        .map_err(service_error_response)?;
    Ok(UserResponse::from_model(model, followers, following))
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created successfully", body = ApiResponse<UserResponse>),
        (status = 409, description = "Username or email already taken", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(username = %request.username))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering create_user function");
    debug!("Creating user with username: {}", request.username);

    let created = state
        .identity
        .create_user(NewUser {
            username: request.username,
            email: request.email,
            password: request.password,
        })
        .await
        .map_err(service_error_response)?;

    info!(
        "User created successfully with ID: {}, username: {}",
        created.id, created.username
    );
    let response = ApiResponse::new(
        UserResponse::from_model(created, 0, 0),
        "User created successfully",
    );
    Ok((StatusCode::CREATED, Json(response)))
}

/// Get a user profile with live follower counts
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User retrieved successfully", body = ApiResponse<UserResponse>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_user(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<UserResponse>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_user function for user_id: {}", user_id);

    let found = state
        .identity
        .find_by_id(user_id)
        .await
        .map_err(service_error_response)?;

    match found {
        Some(model) => {
            let response = profile_response(&state, model).await?;
            Ok(Json(ApiResponse::new(response, "User retrieved successfully")))
        }
        None => {
            warn!("User with ID {} not found", user_id);
            Err(service_error_response(service::ServiceError::NotFound(
                "user", user_id,
            )))
        }
    }
}

/// Update profile fields
#[utoipa::path(
    put,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated successfully", body = ApiResponse<UserResponse>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn update_user(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering update_user function for user_id: {}", user_id);

    let updated = state
        .identity
        .update_profile(
            user_id,
            ProfileUpdate {
                firstname: request.firstname,
                lastname: request.lastname,
                about_me: request.about_me,
            },
        )
        .await
        .map_err(service_error_response)?;

    info!("User with ID {} updated successfully", user_id);
    let response = profile_response(&state, updated).await?;
    Ok(Json(ApiResponse::new(response, "User updated successfully")))
}

/// Delete a user account. Posts and follow edges go with it.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_user(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering delete_user function for user_id: {}", user_id);

    state
        .identity
        .delete_user(user_id)
        .await
        .map_err(service_error_response)?;

    info!("User with ID {} deleted successfully", user_id);
    Ok(Json(ApiResponse::new(
        format!("User {} deleted", user_id),
        "User deleted successfully",
    )))
}
