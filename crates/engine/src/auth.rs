//! Credential primitives: password digests and bearer tokens.
//!
//! Passwords are stored as argon2 digests, never plaintext. Tokens are JWTs
//! carrying `{ user_id, role }` with a fixed 24h expiry. Token resolution is
//! deliberately silent: a missing, malformed or expired token resolves to
//! anonymous instead of raising, because some operations (login itself) are
//! legitimately anonymous.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, access::Identity, access::Role};

/// Tokens expire this many hours after issuance.
pub const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    role: String,
    exp: usize,
}

/// Signing/verification keys derived from the configured secret.
pub(crate) struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl std::fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenKeys").finish_non_exhaustive()
    }
}

impl TokenKeys {
    pub(crate) fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Issue a token for a resolved identity.
    pub(crate) fn issue(&self, identity: Identity) -> ResultEngine<String> {
        let exp = (Utc::now() + Duration::hours(TOKEN_TTL_HOURS)).timestamp() as usize;
        let claims = Claims {
            sub: identity.user_id.to_string(),
            role: identity.role.as_str().to_string(),
            exp,
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|err| EngineError::Internal(format!("failed to sign token: {err}")))
    }

    /// Resolve a bearer token to an identity.
    ///
    /// Any verification failure yields `None`, never an error.
    pub(crate) fn resolve(&self, token: &str) -> Option<Identity> {
        let claims = decode::<Claims>(token, &self.decoding, &Validation::default())
            .ok()?
            .claims;
        let user_id = Uuid::parse_str(&claims.sub).ok()?;
        let role = Role::try_from(claims.role.as_str()).ok()?;
        Some(Identity { user_id, role })
    }
}

/// Hash a plaintext password into a storable digest.
pub(crate) fn hash_password(plain: &str) -> ResultEngine<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|digest| digest.to_string())
        .map_err(|err| EngineError::Internal(format!("failed to hash password: {err}")))
}

/// Check a plaintext password against a stored digest.
///
/// A digest that fails to parse counts as a mismatch.
pub(crate) fn verify_password(plain: &str, digest: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(digest) else {
        return false;
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}
