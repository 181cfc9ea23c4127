use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::{
            ApiResponse, AuthResponse, ChangePasswordRequest, ForgotPasswordRequest,
            ForgotPasswordResponse, LoginRequest, MessageResponse, PublicUser, RegisterRequest,
            ResetPasswordRequest, UpdateProfileRequest,
        },
        error::AuthError,
        services::SessionGrant,
        session::AuthUser,
    },
    state::AppState,
};

/// Shown for both known and unknown emails; revealing which one it was would
/// let a caller enumerate accounts.
const FORGOT_PASSWORD_MESSAGE: &str =
    "If this email exists, you will receive instructions to reset your password.";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password", post(reset_password))
        .route("/auth/change-password", post(change_password))
}

pub fn me_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me))
        .route("/me/profile", put(update_profile))
}

fn auth_body(grant: SessionGrant) -> Json<ApiResponse<AuthResponse>> {
    Json(ApiResponse::ok(AuthResponse {
        token: grant.token,
        user: PublicUser::from(&grant.user),
        redirect_to: grant.redirect_to,
    }))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), AuthError> {
    let grant = state
        .auth
        .register(&payload.name, &payload.email, &payload.password)
        .await?;
    info!(user_id = %grant.user.id, email = %grant.user.email, "user registered");
    Ok((StatusCode::CREATED, auth_body(grant)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, AuthError> {
    let grant = state.auth.login(&payload.email, &payload.password).await?;
    info!(user_id = %grant.user.id, email = %grant.user.email, "user logged in");
    Ok(auth_body(grant))
}

#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<ApiResponse<ForgotPasswordResponse>>, AuthError> {
    let outcome = state.auth.forgot_password(&payload.email).await?;
    Ok(Json(ApiResponse::ok(ForgotPasswordResponse {
        message: FORGOT_PASSWORD_MESSAGE.to_string(),
        reset_token: outcome.reset_token,
    })))
}

#[instrument(skip(state, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, AuthError> {
    state
        .auth
        .reset_password(&payload.token, &payload.password)
        .await?;
    info!("password reset completed");
    Ok(Json(ApiResponse::ok(MessageResponse {
        message: "Password reset successfully. Log in with your new password.".into(),
    })))
}

#[instrument(skip(state, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, AuthError> {
    state
        .auth
        .change_password(
            user_id,
            &payload.current_password,
            &payload.new_password,
            &payload.confirm_password,
        )
        .await?;
    info!(user_id = %user_id, "password changed");
    Ok(Json(ApiResponse::ok(MessageResponse {
        message: "Password changed successfully.".into(),
    })))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ApiResponse<PublicUser>>, AuthError> {
    let user = state
        .auth
        .repo()
        .find_user_by_id(user_id)
        .await
        .map_err(AuthError::Internal)?
        .ok_or(AuthError::NotFound)?;
    Ok(Json(ApiResponse::ok(PublicUser::from(&user))))
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<PublicUser>>, AuthError> {
    let user = state.auth.update_profile(user_id, &payload).await?;
    info!(user_id = %user_id, "profile updated");
    Ok(Json(ApiResponse::ok(PublicUser::from(&user))))
}
