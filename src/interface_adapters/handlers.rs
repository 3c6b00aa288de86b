use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use cookie::{Cookie, SameSite};

use crate::domain::errors::SsoError;
use crate::interface_adapters::protocol::{AdminLoginResponse, CallbackParams, ErrorResponse};
use crate::interface_adapters::state::AppState;
use crate::use_cases::callback::{CallbackOutcome, SsoCallbackUseCase};

// Cookie name for the admin console session.
pub const SESSION_COOKIE_NAME: &str = "sessionid";

// Handler for the identity provider's browser callback.
#[tracing::instrument(
    name = "sso_callback",
    skip_all,
    fields(state = %params.state)
)]
pub async fn sso_callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> Response {
    let use_case = SsoCallbackUseCase {
        identity: state.identity.clone(),
        pending: state.pending.clone(),
        users: state.users.clone(),
        sessions: state.sessions.clone(),
        clock: state.clock.clone(),
    };

    match use_case.execute(&params.code, &params.state).await {
        Ok(CallbackOutcome::AdminSession {
            user,
            session_token,
            max_age_seconds,
        }) => {
            tracing::info!(username = %user.username, "admin session established.");
            admin_session_response(
                &state.admin_console_path,
                session_token,
                user.username,
                max_age_seconds,
            )
        }
        Ok(CallbackOutcome::DelegatedRedirect { callback_url }) => {
            tracing::info!("pending login resolved, redirecting to callback url.");
            Redirect::temporary(&callback_url).into_response()
        }
        Ok(CallbackOutcome::LoginExpired) => {
            tracing::warn!("pending login missing or expired, falling back to root.");
            Redirect::temporary("/").into_response()
        }
        Err(err) => map_sso_error(err),
    }
}

// Establish the admin session cookie and echo the resolved identity.
fn admin_session_response(
    admin_path: &str,
    session_token: String,
    username: String,
    max_age_seconds: u64,
) -> Response {
    let cookie = Cookie::build((SESSION_COOKIE_NAME, session_token))
        .path(admin_path.to_string())
        .max_age(cookie::time::Duration::seconds(max_age_seconds as i64))
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookie.to_string())],
        Json(AdminLoginResponse {
            username,
            expires_in: max_age_seconds,
        }),
    )
        .into_response()
}

// Helper to build a JSON error response.
fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            message: message.to_string(),
        }),
    )
        .into_response()
}

// Maps domain errors to HTTP responses. Failures never degrade to an empty
// identity; the browser gets a distinguishable status instead.
fn map_sso_error(err: SsoError) -> Response {
    match err {
        SsoError::MissingCode => error_response(StatusCode::BAD_REQUEST, "code is required"),
        SsoError::Transport(detail) => {
            tracing::error!(error = %detail, "identity provider call failed.");
            error_response(StatusCode::BAD_GATEWAY, "identity provider unreachable")
        }
        SsoError::ProviderRejected { code, message } => {
            tracing::warn!(code, message = %message, "identity provider rejected the login.");
            error_response(
                StatusCode::UNAUTHORIZED,
                "identity provider rejected the login",
            )
        }
        SsoError::EmptyIdentity => {
            tracing::warn!("identity provider resolved no user id.");
            error_response(
                StatusCode::UNAUTHORIZED,
                "identity provider resolved no user",
            )
        }
        SsoError::StorageFailure => error_response(StatusCode::BAD_GATEWAY, "storage error"),
    }
}
