//! Login and token resolution.

use sea_orm::{QueryFilter, prelude::*};

use crate::{
    EngineError, ResultEngine, User,
    access::{Caller, Identity},
    auth, users,
};

use super::Engine;

impl Engine {
    /// Authenticate a username/password pair and issue a bearer token.
    ///
    /// Fails with [`EngineError::UserNotFound`] for an unknown username and
    /// [`EngineError::InvalidCredential`] for a password mismatch.
    pub async fn login(&self, username: &str, password: &str) -> ResultEngine<(String, User)> {
        let model = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.database)
            .await?
            .ok_or(EngineError::UserNotFound)?;

        if !auth::verify_password(password, &model.password) {
            return Err(EngineError::InvalidCredential);
        }

        let user = User::try_from(model)?;
        let token = self.token_keys.issue(Identity {
            user_id: user.id,
            role: user.role,
        })?;
        Ok((token, user))
    }

    /// Resolve an optional bearer token to a caller.
    ///
    /// Verification failures (missing, malformed, expired, bad signature)
    /// downgrade to anonymous; restricted operations then fail with
    /// [`EngineError::Unauthenticated`] at the policy check instead.
    pub fn resolve(&self, token: Option<&str>) -> Caller {
        token.and_then(|token| self.token_keys.resolve(token))
    }
}
