use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::Mutex;

use crate::domain::entities::{AdminSession, PendingLogin};
use crate::domain::ports::{
    AdminSessionStore, AppUserStore, Clock, IdentityProvider, PendingLoginStore,
};

// Application state wiring the injected collaborators into handlers.
#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<dyn IdentityProvider>,
    pub pending: Arc<dyn PendingLoginStore>,
    pub users: Arc<dyn AppUserStore>,
    pub sessions: Arc<dyn AdminSessionStore>,
    pub clock: Arc<dyn Clock>,
    // Cookie path restriction for admin sessions.
    pub admin_console_path: String,
}

struct PendingEntry {
    login: PendingLogin,
    expires_at: u64,
}

// In-memory pending-login cache with lazy expiration on lookup. Not
// durable across restarts; abandoned logins age out on their own.
#[derive(Clone)]
pub struct InMemoryPendingLoginStore {
    entries: Arc<Mutex<HashMap<String, PendingEntry>>>,
    clock: Arc<dyn Clock>,
    default_ttl_seconds: u64,
}

impl InMemoryPendingLoginStore {
    pub fn new(clock: Arc<dyn Clock>, default_ttl_seconds: u64) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            clock,
            default_ttl_seconds,
        }
    }
}

#[async_trait]
impl PendingLoginStore for InMemoryPendingLoginStore {
    async fn put(
        &self,
        state: String,
        login: PendingLogin,
        ttl_seconds: u64,
    ) -> Result<(), String> {
        let expires_at = self.clock.now_epoch_seconds() + ttl_seconds;
        let mut entries = self.entries.lock().await;
        entries.insert(state, PendingEntry { login, expires_at });
        Ok(())
    }

    async fn get(&self, state: &str) -> Result<Option<PendingLogin>, String> {
        let mut entries = self.entries.lock().await;
        match entries.get(state) {
            Some(entry) if entry.expires_at > self.clock.now_epoch_seconds() => {
                Ok(Some(entry.login.clone()))
            }
            Some(_) => {
                // Remove expired entries to keep the store tidy.
                entries.remove(state);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn update(&self, state: &str, login: PendingLogin) -> Result<(), String> {
        // Refresh the lifetime with the default TTL. Inserts even when the
        // key vanished, so an expiry race still lets the polling page finish.
        let expires_at = self.clock.now_epoch_seconds() + self.default_ttl_seconds;
        let mut entries = self.entries.lock().await;
        entries.insert(state.to_string(), PendingEntry { login, expires_at });
        Ok(())
    }
}

// In-memory admin session store. Expiry is carried on the record and the
// cookie Max-Age; readers decide what stale means.
#[derive(Clone, Default)]
pub struct InMemoryAdminSessionStore {
    sessions: Arc<Mutex<HashMap<String, AdminSession>>>,
}

impl InMemoryAdminSessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AdminSessionStore for InMemoryAdminSessionStore {
    async fn insert(&self, token: String, session: AdminSession) -> Result<(), String> {
        let mut sessions = self.sessions.lock().await;
        sessions.insert(token, session);
        Ok(())
    }

    async fn get(&self, token: &str) -> Result<Option<AdminSession>, String> {
        let sessions = self.sessions.lock().await;
        Ok(sessions.get(token).cloned())
    }
}

// PostgreSQL-backed local user table.
#[derive(Clone)]
pub struct PostgresAppUserStore {
    pub db: PgPool,
}

#[async_trait]
impl AppUserStore for PostgresAppUserStore {
    // Insert the user if absent and return the row id either way. New SSO
    // users carry no elevated privileges (table defaults).
    async fn ensure_user(&self, username: &str) -> Result<i64, String> {
        let row: (i64,) = sqlx::query_as(
            r#"
            INSERT INTO app_users (username)
            VALUES ($1)
            ON CONFLICT (username) DO UPDATE SET username = EXCLUDED.username
            RETURNING id
            "#,
        )
        .bind(username)
        .fetch_one(&self.db)
        .await
        .map_err(|err| err.to_string())?;

        Ok(row.0)
    }
}

// System clock adapter used outside tests.
#[derive(Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_seconds(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}
