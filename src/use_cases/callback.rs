use std::sync::Arc;

use uuid::Uuid;

use crate::domain::entities::{AccessToken, AdminSession, AuthUser};
use crate::domain::errors::SsoError;
use crate::domain::ports::{
    AdminSessionStore, AppUserStore, Clock, IdentityProvider, PendingLoginStore,
};

// Reserved state value marking an administrative console login. The state
// minting component must never issue this as a correlation token.
pub const ADMIN_STATE: &str = "admin";

// Outcome of a single callback invocation.
#[derive(Debug)]
pub enum CallbackOutcome {
    // Admin branch: a session was materialized and must be surfaced as a
    // cookie with the given max age.
    AdminSession {
        user: AuthUser,
        session_token: String,
        max_age_seconds: u64,
    },
    // Delegated branch: the pending login resolved; send the browser back
    // to the URL the initiating page is polling.
    DelegatedRedirect { callback_url: String },
    // Delegated branch: the state token is unknown or expired.
    LoginExpired,
}

// SSO callback orchestrator with injected collaborators.
pub struct SsoCallbackUseCase {
    pub identity: Arc<dyn IdentityProvider>,
    pub pending: Arc<dyn PendingLoginStore>,
    pub users: Arc<dyn AppUserStore>,
    pub sessions: Arc<dyn AdminSessionStore>,
    pub clock: Arc<dyn Clock>,
}

impl SsoCallbackUseCase {
    pub async fn execute(&self, code: &str, state: &str) -> Result<CallbackOutcome, SsoError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(SsoError::MissingCode);
        }

        let token = self.identity.exchange_code(code).await?;
        if token.err_code != 0 {
            return Err(SsoError::ProviderRejected {
                code: token.err_code,
                message: token.err_msg,
            });
        }

        let remote = self
            .identity
            .resolve_identity(&token.access_token, code)
            .await?;
        if remote.err_code != 0 {
            return Err(SsoError::ProviderRejected {
                code: remote.err_code,
                message: remote.err_msg,
            });
        }
        if remote.user_id.is_empty() {
            return Err(SsoError::EmptyIdentity);
        }

        if state == ADMIN_STATE {
            return self.materialize_admin_session(remote.user_id, &token).await;
        }

        // Delegated/gateway branch: complete the pending login if it is
        // still alive, otherwise fall back to the application root.
        match self
            .pending
            .get(state)
            .await
            .map_err(|_| SsoError::StorageFailure)?
        {
            Some(mut login) => {
                login.resolved_username = remote.user_id;
                let callback_url = login.callback_url.clone();
                self.pending
                    .update(state, login)
                    .await
                    .map_err(|_| SsoError::StorageFailure)?;
                Ok(CallbackOutcome::DelegatedRedirect { callback_url })
            }
            None => Ok(CallbackOutcome::LoginExpired),
        }
    }

    async fn materialize_admin_session(
        &self,
        username: String,
        token: &AccessToken,
    ) -> Result<CallbackOutcome, SsoError> {
        // Insert the user record if absent; SSO users start unprivileged.
        let user_id = self
            .users
            .ensure_user(&username)
            .await
            .map_err(|_| SsoError::StorageFailure)?;

        let user = AuthUser {
            user_id,
            username,
            logged: true,
            is_super_admin: false,
            is_cert_admin: false,
            is_app_admin: false,
            need_modify_pwd: false,
        };

        let session_token = Uuid::new_v4().to_string();
        let expires_at = self.clock.now_epoch_seconds() + token.expires_in;
        self.sessions
            .insert(
                session_token.clone(),
                AdminSession {
                    user: user.clone(),
                    expires_at,
                },
            )
            .await
            .map_err(|_| SsoError::StorageFailure)?;

        Ok(CallbackOutcome::AdminSession {
            user,
            session_token,
            max_age_seconds: token.expires_in,
        })
    }
}
