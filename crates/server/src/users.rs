//! Sign-up, login, and the current user.

use api_types::user::{LoginRequest, LoginResponse, UserNew, UserView};
use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::RegisterUserParams;
use token::Payload;

use crate::{ServerError, server::ServerState, views};

pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<UserNew>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let user = state
        .engine
        .register_user(RegisterUserParams {
            first_name: payload.first_name,
            last_name: payload.last_name,
            email: payload.email,
            phone: payload.phone,
            password: payload.password,
            image_path: payload.image_path,
            time_zone: payload.time_zone,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(views::user(user))))
}

/// Check the credentials and issue an access token.
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ServerError> {
    let user = state
        .engine
        .login(&payload.email, &payload.password)
        .await?;
    let (access_token, claims) = state
        .tokens
        .create_token(user.id, state.access_token_duration)?;
    tracing::info!(user_id = user.id, "user logged in");

    Ok(Json(LoginResponse {
        access_token,
        access_token_expires_at: claims.expired_at,
        user: views::user(user),
    }))
}

pub async fn me(
    Extension(payload): Extension<Payload>,
    State(state): State<ServerState>,
) -> Result<Json<UserView>, ServerError> {
    let user = state.engine.user(payload.user_id).await?;
    Ok(Json(views::user(user)))
}
