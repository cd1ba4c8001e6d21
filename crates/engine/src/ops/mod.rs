use sea_orm::{ConnectionTrait, DatabaseConnection, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, auth::TokenKeys, users as user_entity};

mod auth;
mod expenses;
mod inventory;
mod users;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    token_keys: TokenKeys,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub(crate) async fn find_user_by_id(
        &self,
        db: &impl ConnectionTrait,
        user_id: Uuid,
    ) -> ResultEngine<Option<user_entity::Model>> {
        user_entity::Entity::find_by_id(user_id.to_string())
            .one(db)
            .await
            .map_err(Into::into)
    }

    pub(crate) async fn require_user_by_id(
        &self,
        db: &impl ConnectionTrait,
        user_id: Uuid,
    ) -> ResultEngine<user_entity::Model> {
        self.find_user_by_id(db, user_id)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }

    pub(crate) async fn username_taken(
        &self,
        db: &impl ConnectionTrait,
        username: &str,
    ) -> ResultEngine<bool> {
        user_entity::Entity::find()
            .filter(user_entity::Column::Username.eq(username))
            .one(db)
            .await
            .map(|model| model.is_some())
            .map_err(Into::into)
    }
}

fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidAmount(format!(
            "{label} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    token_secret: String,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Pass the secret used to sign and verify bearer tokens.
    pub fn token_secret(mut self, secret: impl Into<String>) -> EngineBuilder {
        self.token_secret = secret.into();
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        if self.token_secret.is_empty() {
            return Err(EngineError::Internal(
                "token secret must not be empty".to_string(),
            ));
        }
        Ok(Engine {
            database: self.database,
            token_keys: TokenKeys::from_secret(&self.token_secret),
        })
    }
}
