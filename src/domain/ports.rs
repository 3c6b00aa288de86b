use async_trait::async_trait;

use crate::domain::entities::{AccessToken, AdminSession, PendingLogin, RemoteIdentity};
use crate::domain::errors::SsoError;

// Port for the external identity provider. Two sequential calls per
// callback: token exchange, then identity lookup. The token grant is
// credential-scoped, so implementations may not embed the code in the
// first request; the code is redeemed by `resolve_identity`.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn exchange_code(&self, code: &str) -> Result<AccessToken, SsoError>;
    async fn resolve_identity(
        &self,
        access_token: &str,
        code: &str,
    ) -> Result<RemoteIdentity, SsoError>;
}

// Port for the time-bounded pending-login cache keyed by state token.
// `get` must not mutate live entries; expiry is checked lazily on lookup.
// `update` refreshes the entry's lifetime with the store's default TTL.
#[async_trait]
pub trait PendingLoginStore: Send + Sync {
    async fn put(
        &self,
        state: String,
        login: PendingLogin,
        ttl_seconds: u64,
    ) -> Result<(), String>;
    async fn get(&self, state: &str) -> Result<Option<PendingLogin>, String>;
    async fn update(&self, state: &str, login: PendingLogin) -> Result<(), String>;
}

// Port for the local user table: insert-if-absent, returning the row id.
#[async_trait]
pub trait AppUserStore: Send + Sync {
    async fn ensure_user(&self, username: &str) -> Result<i64, String>;
}

// Port for admin session persistence used by the callback use case.
#[async_trait]
pub trait AdminSessionStore: Send + Sync {
    async fn insert(&self, token: String, session: AdminSession) -> Result<(), String>;
    async fn get(&self, token: &str) -> Result<Option<AdminSession>, String>;
}

// Port for retrieving the current time.
pub trait Clock: Send + Sync {
    fn now_epoch_seconds(&self) -> u64;
}
