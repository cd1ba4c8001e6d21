//! User accounts.
//!
//! `total_expenses` is a denormalized sum of the user's settled expense
//! amounts, maintained by the expense ledger with atomic in-place adds.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Role};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
    pub total_expenses: i64,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub username: String,
    pub password: String,
    pub role: String,
    pub total_expenses: i64,
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

impl TryFrom<Model> for User {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("user not exists".to_string()))?,
            username: model.username,
            role: Role::try_from(model.role.as_str())?,
            total_expenses: model.total_expenses,
        })
    }
}

/// Build an insertable row for a fresh account.
pub(crate) fn new_account(id: Uuid, username: String, digest: String, role: Role) -> ActiveModel {
    ActiveModel {
        id: ActiveValue::Set(id.to_string()),
        username: ActiveValue::Set(username),
        password: ActiveValue::Set(digest),
        role: ActiveValue::Set(role.as_str().to_string()),
        total_expenses: ActiveValue::Set(0),
    }
}
