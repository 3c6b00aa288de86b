use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::entities::{AccessToken, AdminSession, PendingLogin, RemoteIdentity};
use crate::domain::errors::SsoError;
use crate::domain::ports::{
    AdminSessionStore, AppUserStore, Clock, IdentityProvider, PendingLoginStore,
};

// Shared fixed time source for deterministic use-case tests.
pub(crate) struct FixedClock(pub(crate) u64);

impl Clock for FixedClock {
    fn now_epoch_seconds(&self) -> u64 {
        self.0
    }
}

// Scripted identity provider: configured token/identity payloads, optional
// transport failures, and a record of resolve calls.
#[derive(Clone)]
pub(crate) struct MockIdentityProvider {
    token: AccessToken,
    identity: RemoteIdentity,
    fail_exchange: bool,
    fail_resolve: bool,
    resolve_calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockIdentityProvider {
    // Provider that happily resolves the given user id.
    pub(crate) fn resolving(user_id: &str) -> Self {
        Self {
            token: AccessToken {
                err_code: 0,
                err_msg: String::new(),
                access_token: "test-access-token".to_string(),
                expires_in: 7200,
            },
            identity: RemoteIdentity {
                err_code: 0,
                err_msg: String::new(),
                user_id: user_id.to_string(),
            },
            fail_exchange: false,
            fail_resolve: false,
            resolve_calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn failing_exchange(mut self) -> Self {
        self.fail_exchange = true;
        self
    }

    pub(crate) fn failing_resolve(mut self) -> Self {
        self.fail_resolve = true;
        self
    }

    pub(crate) fn rejecting_exchange(mut self, code: i64, message: &str) -> Self {
        self.token.err_code = code;
        self.token.err_msg = message.to_string();
        self
    }

    pub(crate) fn rejecting_identity(mut self, code: i64, message: &str) -> Self {
        self.identity.err_code = code;
        self.identity.err_msg = message.to_string();
        self
    }

    pub(crate) fn resolve_calls(&self) -> Arc<Mutex<Vec<(String, String)>>> {
        self.resolve_calls.clone()
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn exchange_code(&self, _code: &str) -> Result<AccessToken, SsoError> {
        if self.fail_exchange {
            return Err(SsoError::Transport("exchange failed".to_string()));
        }
        Ok(self.token.clone())
    }

    async fn resolve_identity(
        &self,
        access_token: &str,
        code: &str,
    ) -> Result<RemoteIdentity, SsoError> {
        if self.fail_resolve {
            return Err(SsoError::Transport("resolve failed".to_string()));
        }
        let mut calls = self.resolve_calls.lock().expect("calls mutex poisoned");
        calls.push((access_token.to_string(), code.to_string()));
        Ok(self.identity.clone())
    }
}

#[derive(Clone, Copy, Default)]
pub(crate) struct FailureFlags {
    pub get: bool,
    pub put: bool,
    pub update: bool,
}

// Pending-login store mock without TTL behavior; TTL itself is covered by
// the in-memory adapter's own tests.
#[derive(Clone)]
pub(crate) struct RecordingPendingStore {
    logins: Arc<Mutex<HashMap<String, PendingLogin>>>,
    failures: FailureFlags,
}

impl RecordingPendingStore {
    pub(crate) fn new() -> Self {
        Self {
            logins: Arc::new(Mutex::new(HashMap::new())),
            failures: FailureFlags::default(),
        }
    }

    pub(crate) fn with_failures(mut self, failures: FailureFlags) -> Self {
        self.failures = failures;
        self
    }

    pub(crate) fn insert_test_login(&self, state: impl Into<String>, login: PendingLogin) {
        let mut guard = self.logins.lock().expect("logins mutex poisoned");
        guard.insert(state.into(), login);
    }

    pub(crate) fn get_test_login(&self, state: &str) -> Option<PendingLogin> {
        let guard = self.logins.lock().expect("logins mutex poisoned");
        guard.get(state).cloned()
    }

    pub(crate) fn is_empty(&self) -> bool {
        let guard = self.logins.lock().expect("logins mutex poisoned");
        guard.is_empty()
    }
}

#[async_trait]
impl PendingLoginStore for RecordingPendingStore {
    async fn put(
        &self,
        state: String,
        login: PendingLogin,
        _ttl_seconds: u64,
    ) -> Result<(), String> {
        if self.failures.put {
            return Err("put failed".to_string());
        }
        let mut guard = self.logins.lock().expect("logins mutex poisoned");
        guard.insert(state, login);
        Ok(())
    }

    async fn get(&self, state: &str) -> Result<Option<PendingLogin>, String> {
        if self.failures.get {
            return Err("get failed".to_string());
        }
        let guard = self.logins.lock().expect("logins mutex poisoned");
        Ok(guard.get(state).cloned())
    }

    async fn update(&self, state: &str, login: PendingLogin) -> Result<(), String> {
        if self.failures.update {
            return Err("update failed".to_string());
        }
        let mut guard = self.logins.lock().expect("logins mutex poisoned");
        guard.insert(state.to_string(), login);
        Ok(())
    }
}

// User table mock assigning sequential ids.
#[derive(Clone)]
pub(crate) struct RecordingUserStore {
    next_id: Arc<AtomicI64>,
    usernames: Arc<Mutex<HashMap<String, i64>>>,
    fail: bool,
}

impl RecordingUserStore {
    pub(crate) fn new() -> Self {
        Self {
            next_id: Arc::new(AtomicI64::new(1)),
            usernames: Arc::new(Mutex::new(HashMap::new())),
            fail: false,
        }
    }

    pub(crate) fn with_failure(mut self) -> Self {
        self.fail = true;
        self
    }
}

#[async_trait]
impl AppUserStore for RecordingUserStore {
    async fn ensure_user(&self, username: &str) -> Result<i64, String> {
        if self.fail {
            return Err("ensure_user failed".to_string());
        }
        let mut guard = self.usernames.lock().expect("usernames mutex poisoned");
        let id = *guard
            .entry(username.to_string())
            .or_insert_with(|| self.next_id.fetch_add(1, Ordering::SeqCst));
        Ok(id)
    }
}

// Session store mock exposing stored sessions for assertions.
#[derive(Clone)]
pub(crate) struct RecordingSessionStore {
    sessions: Arc<Mutex<HashMap<String, AdminSession>>>,
}

impl RecordingSessionStore {
    pub(crate) fn new() -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub(crate) fn get_test_session(&self, token: &str) -> Option<AdminSession> {
        let guard = self.sessions.lock().expect("sessions mutex poisoned");
        guard.get(token).cloned()
    }

    pub(crate) fn is_empty(&self) -> bool {
        let guard = self.sessions.lock().expect("sessions mutex poisoned");
        guard.is_empty()
    }
}

#[async_trait]
impl AdminSessionStore for RecordingSessionStore {
    async fn insert(&self, token: String, session: AdminSession) -> Result<(), String> {
        let mut guard = self.sessions.lock().expect("sessions mutex poisoned");
        guard.insert(token, session);
        Ok(())
    }

    async fn get(&self, token: &str) -> Result<Option<AdminSession>, String> {
        let guard = self.sessions.lock().expect("sessions mutex poisoned");
        Ok(guard.get(token).cloned())
    }
}
