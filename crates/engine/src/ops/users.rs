//! User directory operations.
//!
//! Account CRUD plus the denormalized running-total reads. The total itself
//! is only ever written by the expense ledger.

use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    CreateUserCmd, EngineError, ResultEngine, UpdateUserCmd, User,
    access::{Action, Caller, Role, authorize},
    auth, users,
};

use super::{Engine, normalize_required_name, with_tx};

impl Engine {
    /// Provision a merchant account outside any caller context.
    ///
    /// Used by startup bootstrap and the admin CLI; regular provisioning
    /// goes through [`Engine::create_user`].
    pub async fn bootstrap_merchant(&self, username: &str, password: &str) -> ResultEngine<User> {
        let username = normalize_required_name(username, "username")?;
        let digest = hash_new_password(password)?;
        with_tx!(self, |db_tx| {
            if self.username_taken(&db_tx, &username).await? {
                return Err(EngineError::ExistingKey(username));
            }
            let model = users::new_account(Uuid::new_v4(), username.clone(), digest, Role::Merchant)
                .insert(&db_tx)
                .await?;
            User::try_from(model)
        })
    }

    /// Create a user account with a unique username.
    pub async fn create_user(&self, caller: Caller, cmd: CreateUserCmd) -> ResultEngine<User> {
        authorize(caller, Action::CreateUser)?;
        let username = normalize_required_name(&cmd.username, "username")?;
        let digest = hash_new_password(&cmd.password)?;
        with_tx!(self, |db_tx| {
            if self.username_taken(&db_tx, &username).await? {
                return Err(EngineError::ExistingKey(username));
            }
            let model = users::new_account(Uuid::new_v4(), username.clone(), digest, cmd.role)
                .insert(&db_tx)
                .await?;
            User::try_from(model)
        })
    }

    /// Patch a user account. Password updates re-run the hash; plaintext is
    /// never stored.
    pub async fn update_user(&self, caller: Caller, cmd: UpdateUserCmd) -> ResultEngine<User> {
        authorize(caller, Action::UpdateUser)?;
        with_tx!(self, |db_tx| {
            let model = self.require_user_by_id(&db_tx, cmd.user_id).await?;
            if cmd.username.is_none() && cmd.password.is_none() {
                return User::try_from(model);
            }

            let mut active: users::ActiveModel = model.clone().into();
            if let Some(username) = cmd.username {
                let username = normalize_required_name(&username, "username")?;
                if username != model.username && self.username_taken(&db_tx, &username).await? {
                    return Err(EngineError::ExistingKey(username));
                }
                active.username = ActiveValue::Set(username);
            }
            if let Some(password) = cmd.password {
                active.password = ActiveValue::Set(hash_new_password(&password)?);
            }

            let model = active.update(&db_tx).await?;
            User::try_from(model)
        })
    }

    /// Delete a user account and every expense attributed to it.
    pub async fn delete_user(&self, caller: Caller, user_id: Uuid) -> ResultEngine<()> {
        authorize(caller, Action::DeleteUser)?;
        with_tx!(self, |db_tx| {
            let model = self.require_user_by_id(&db_tx, user_id).await?;
            self.delete_expenses_for_user(&db_tx, user_id).await?;
            model.delete(&db_tx).await?;
            Ok(())
        })
    }

    /// List the user-role accounts (merchant accounts are not listed).
    pub async fn list_users(&self, caller: Caller) -> ResultEngine<Vec<User>> {
        authorize(caller, Action::ListUsers)?;
        let models = users::Entity::find()
            .filter(users::Column::Role.eq(Role::User.as_str()))
            .order_by_asc(users::Column::Username)
            .all(&self.database)
            .await?;
        models.into_iter().map(User::try_from).collect()
    }

    /// A user's running expense total.
    pub async fn user_total(&self, caller: Caller, user_id: Uuid) -> ResultEngine<i64> {
        authorize(caller, Action::UserExpenseTotal)?;
        let model = self.require_user_by_id(&self.database, user_id).await?;
        Ok(model.total_expenses)
    }

    /// The caller's own running expense total.
    pub async fn my_total(&self, caller: Caller) -> ResultEngine<i64> {
        authorize(caller, Action::MyTotalExpenses)?;
        let identity = caller.ok_or(EngineError::Unauthenticated)?;
        let model = self.require_user_by_id(&self.database, identity.user_id).await?;
        Ok(model.total_expenses)
    }
}

fn hash_new_password(password: &str) -> ResultEngine<String> {
    if password.is_empty() {
        return Err(EngineError::InvalidAmount(
            "password must not be empty".to_string(),
        ));
    }
    auth::hash_password(password)
}
