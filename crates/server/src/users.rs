//! User directory endpoints (merchant-only apart from own-total reads).

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use api_types::user::{TotalResponse, UserNew, UserUpdate, UserView, UsersResponse};
use engine::{Caller, CreateUserCmd, UpdateUserCmd, User};

use crate::{ServerError, server::ServerState};

pub(crate) fn map_user(user: User) -> UserView {
    UserView {
        id: user.id,
        username: user.username,
        role: map_role(user.role),
        total_expenses: user.total_expenses,
    }
}

fn map_role(role: engine::Role) -> api_types::Role {
    match role {
        engine::Role::Merchant => api_types::Role::Merchant,
        engine::Role::User => api_types::Role::User,
    }
}

fn unmap_role(role: api_types::Role) -> engine::Role {
    match role {
        api_types::Role::Merchant => engine::Role::Merchant,
        api_types::Role::User => engine::Role::User,
    }
}

pub async fn list(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
) -> Result<Json<UsersResponse>, ServerError> {
    let users = state
        .engine
        .list_users(caller)
        .await?
        .into_iter()
        .map(map_user)
        .collect();

    Ok(Json(UsersResponse { users }))
}

pub async fn create(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Json(payload): Json<UserNew>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let cmd = CreateUserCmd::new(payload.username, payload.password, unmap_role(payload.role));
    let user = state.engine.create_user(caller, cmd).await?;

    Ok((StatusCode::CREATED, Json(map_user(user))))
}

pub async fn update(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UserUpdate>,
) -> Result<Json<UserView>, ServerError> {
    let mut cmd = UpdateUserCmd::new(user_id);
    if let Some(username) = payload.username {
        cmd = cmd.username(username);
    }
    if let Some(password) = payload.password {
        cmd = cmd.password(password);
    }

    let user = state.engine.update_user(caller, cmd).await?;
    Ok(Json(map_user(user)))
}

pub async fn remove(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(user_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_user(caller, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn total(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<TotalResponse>, ServerError> {
    let total_expenses = state.engine.user_total(caller, user_id).await?;
    Ok(Json(TotalResponse { total_expenses }))
}
