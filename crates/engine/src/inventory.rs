//! Inventory catalog items.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    pub(crate) fn new(
        name: String,
        description: String,
        price: i64,
        created_at: DateTime<Utc>,
    ) -> crate::ResultEngine<Self> {
        if price < 0 {
            return Err(EngineError::InvalidAmount(
                "price must not be negative".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            description,
            price,
            created_at,
            updated_at: created_at,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "inventory_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::expenses::Entity")]
    Expenses,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&InventoryItem> for ActiveModel {
    fn from(item: &InventoryItem) -> Self {
        Self {
            id: ActiveValue::Set(item.id.to_string()),
            name: ActiveValue::Set(item.name.clone()),
            description: ActiveValue::Set(item.description.clone()),
            price: ActiveValue::Set(item.price),
            created_at: ActiveValue::Set(item.created_at),
            updated_at: ActiveValue::Set(item.updated_at),
        }
    }
}

impl TryFrom<Model> for InventoryItem {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("inventory item not exists".to_string()))?,
            name: model.name,
            description: model.description,
            price: model.price,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
