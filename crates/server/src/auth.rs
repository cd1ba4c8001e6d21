//! Login endpoint.

use axum::{Json, extract::State};

use api_types::auth::{LoginRequest, LoginResponse};

use crate::{ServerError, server::ServerState, users};

pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ServerError> {
    let (token, user) = state
        .engine
        .login(&payload.username, &payload.password)
        .await?;

    Ok(Json(LoginResponse {
        token,
        user: users::map_user(user),
    }))
}
