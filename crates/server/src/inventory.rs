//! Inventory catalog endpoints.
//!
//! Reads are open to any authenticated caller; mutations are merchant-only.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

use api_types::inventory::{
    InventoryItemNew, InventoryItemUpdate, InventoryItemView, InventoryResponse,
};
use engine::{Caller, InventoryItem, InventoryNewCmd, InventoryUpdateCmd};

use crate::{ServerError, server::ServerState};

fn map_item(item: InventoryItem) -> InventoryItemView {
    InventoryItemView {
        id: item.id,
        name: item.name,
        description: item.description,
        price: item.price,
        created_at: item.created_at,
        updated_at: item.updated_at,
    }
}

pub async fn list(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
) -> Result<Json<InventoryResponse>, ServerError> {
    let items = state
        .engine
        .list_inventory(caller)
        .await?
        .into_iter()
        .map(map_item)
        .collect();

    Ok(Json(InventoryResponse { items }))
}

pub async fn get_item(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(item_id): Path<Uuid>,
) -> Result<Json<InventoryItemView>, ServerError> {
    let item = state.engine.inventory_item(caller, item_id).await?;
    Ok(Json(map_item(item)))
}

pub async fn create(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Json(payload): Json<InventoryItemNew>,
) -> Result<(StatusCode, Json<InventoryItemView>), ServerError> {
    let cmd = InventoryNewCmd::new(
        payload.name,
        payload.description,
        payload.price,
        Utc::now(),
    );
    let item = state.engine.create_inventory_item(caller, cmd).await?;

    Ok((StatusCode::CREATED, Json(map_item(item))))
}

pub async fn update(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(item_id): Path<Uuid>,
    Json(payload): Json<InventoryItemUpdate>,
) -> Result<Json<InventoryItemView>, ServerError> {
    let mut cmd = InventoryUpdateCmd::new(item_id, Utc::now());
    if let Some(name) = payload.name {
        cmd = cmd.name(name);
    }
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }
    if let Some(price) = payload.price {
        cmd = cmd.price(price);
    }

    let item = state.engine.update_inventory_item(caller, cmd).await?;
    Ok(Json(map_item(item)))
}

pub async fn remove(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(item_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_inventory_item(caller, item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
