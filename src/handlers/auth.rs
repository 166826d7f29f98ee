use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::ToSchema;

use crate::mailer::OutboundEmail;
use crate::schemas::{
    auth_failure_response, service_error_response, ApiResponse, AppState, ErrorResponse,
};

/// Request body for logging in
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Request body for starting the password-reset flow
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ResetRequest {
    pub email: String,
}

/// Request body for completing the password-reset flow
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ResetPassword {
    pub token: String,
    pub new_password: String,
}

/// Verify credentials and touch the user's last-seen timestamp.
///
/// A wrong password and an unknown username get the same 401 body.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = ApiResponse<i32>),
        (status = 401, description = "Authentication failed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(username = %request.username))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<i32>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering login function");

    let verified = state
        .identity
        .verify_credentials(&request.username, &request.password)
        .await
        .map_err(service_error_response)?;

    let Some(user) = verified else {
        debug!("login rejected");
        return Err(auth_failure_response());
    };

    state
        .identity
        .touch_last_seen(user.id)
        .await
        .map_err(service_error_response)?;

    info!("User {} logged in", user.id);
    Ok(Json(ApiResponse::new(user.id, "Login successful")))
}

/// Start the password-reset flow for an email address.
///
/// The response is the same whether or not the address is registered,
/// so the endpoint cannot be used to enumerate accounts. When the user
/// exists, a signed time-limited token goes out by mail in the
/// background; the request never waits on delivery.
#[utoipa::path(
    post,
    path = "/api/v1/auth/reset-request",
    tag = "auth",
    request_body = ResetRequest,
    responses(
        (status = 200, description = "Reset mail dispatched if the account exists", body = ApiResponse<String>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(request): Json<ResetRequest>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering request_password_reset function");

    let found = state
        .identity
        .find_by_email(&request.email)
        .await
        .map_err(service_error_response)?;

    if let Some(user) = found {
        let token = state
            .identity
            .issue_reset_token(&user)
            .map_err(service_error_response)?;
        state
            .mailer
            .dispatch(OutboundEmail::password_reset(&user.email, &user.username, &token));
        info!("Password reset token issued for user {}", user.id);
    } else {
        debug!("reset requested for unknown email");
    }

    Ok(Json(ApiResponse::new(
        "ok".to_string(),
        "If the account exists, a reset email has been sent",
    )))
}

/// Complete the password-reset flow with a token.
///
/// Invalid, tampered, and expired tokens all get the same 401 body.
#[utoipa::path(
    post,
    path = "/api/v1/auth/reset",
    tag = "auth",
    request_body = ResetPassword,
    responses(
        (status = 200, description = "Password updated", body = ApiResponse<String>),
        (status = 401, description = "Authentication failed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(request): Json<ResetPassword>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering reset_password function");

    let verified = state
        .identity
        .verify_reset_token(&request.token)
        .await
        .map_err(service_error_response)?;

    let Some(user) = verified else {
        debug!("reset token rejected");
        return Err(auth_failure_response());
    };

    state
        .identity
        .set_password(user.id, &request.new_password)
        .await
        .map_err(service_error_response)?;

    info!("Password reset completed for user {}", user.id);
    Ok(Json(ApiResponse::new(
        "ok".to_string(),
        "Password updated successfully",
    )))
}
