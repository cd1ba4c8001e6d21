//! Inventory catalog operations.

use sea_orm::{ActiveValue, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, InventoryItem, InventoryNewCmd, InventoryUpdateCmd, ResultEngine,
    access::{Action, Caller, authorize},
    inventory,
};

use super::{Engine, normalize_required_name, with_tx};

impl Engine {
    /// Add an item to the catalog.
    pub async fn create_inventory_item(
        &self,
        caller: Caller,
        cmd: InventoryNewCmd,
    ) -> ResultEngine<InventoryItem> {
        authorize(caller, Action::CreateInventoryItem)?;
        let name = normalize_required_name(&cmd.name, "name")?;
        let item = InventoryItem::new(name, cmd.description, cmd.price, cmd.created_at)?;
        inventory::ActiveModel::from(&item)
            .insert(&self.database)
            .await?;
        Ok(item)
    }

    /// Patch a catalog item. Only supplied fields change; a price of 0 is a
    /// valid explicit update. Expenses already created from the item keep
    /// their snapshotted name and price.
    pub async fn update_inventory_item(
        &self,
        caller: Caller,
        cmd: InventoryUpdateCmd,
    ) -> ResultEngine<InventoryItem> {
        authorize(caller, Action::UpdateInventoryItem)?;
        with_tx!(self, |db_tx| {
            let model = inventory::Entity::find_by_id(cmd.item_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| {
                    EngineError::KeyNotFound("inventory item not exists".to_string())
                })?;
            if cmd.name.is_none() && cmd.description.is_none() && cmd.price.is_none() {
                return InventoryItem::try_from(model);
            }

            let mut active: inventory::ActiveModel = model.into();
            if let Some(name) = cmd.name {
                active.name = ActiveValue::Set(normalize_required_name(&name, "name")?);
            }
            if let Some(description) = cmd.description {
                active.description = ActiveValue::Set(description);
            }
            if let Some(price) = cmd.price {
                if price < 0 {
                    return Err(EngineError::InvalidAmount(
                        "price must not be negative".to_string(),
                    ));
                }
                active.price = ActiveValue::Set(price);
            }
            active.updated_at = ActiveValue::Set(cmd.updated_at);

            let model = active.update(&db_tx).await?;
            InventoryItem::try_from(model)
        })
    }

    /// Remove an item from the catalog.
    pub async fn delete_inventory_item(&self, caller: Caller, item_id: Uuid) -> ResultEngine<()> {
        authorize(caller, Action::DeleteInventoryItem)?;
        let model = inventory::Entity::find_by_id(item_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("inventory item not exists".to_string()))?;
        model.delete(&self.database).await?;
        Ok(())
    }

    /// List the catalog, newest first. Readable by any authenticated caller.
    pub async fn list_inventory(&self, caller: Caller) -> ResultEngine<Vec<InventoryItem>> {
        authorize(caller, Action::ListInventory)?;
        let models = inventory::Entity::find()
            .order_by_desc(inventory::Column::CreatedAt)
            .all(&self.database)
            .await?;
        models.into_iter().map(InventoryItem::try_from).collect()
    }

    /// Fetch a single catalog item. Readable by any authenticated caller.
    pub async fn inventory_item(&self, caller: Caller, item_id: Uuid) -> ResultEngine<InventoryItem> {
        authorize(caller, Action::GetInventoryItem)?;
        let model = inventory::Entity::find_by_id(item_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("inventory item not exists".to_string()))?;
        InventoryItem::try_from(model)
    }
}
