use std::net::SocketAddr;
use std::sync::Arc;

use url::Url;

use crate::frameworks::db;
use crate::interface_adapters::clients::CorpIdentityClient;
use crate::interface_adapters::routes;
use crate::interface_adapters::state::{
    AppState, InMemoryAdminSessionStore, InMemoryPendingLoginStore, PostgresAppUserStore,
    SystemClock,
};

const DEFAULT_IDP_BASE_URL: &str = "https://qyapi.weixin.qq.com";
const DEFAULT_ADMIN_CONSOLE_PATH: &str = "/admin/";
const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3003";
// Pending logins are short-lived; an abandoned attempt ages out in minutes.
const DEFAULT_PENDING_LOGIN_TTL_SECONDS: u64 = 300;

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

fn require_env(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::error!("{name} must be set");
            None
        }
    }
}

pub async fn run() {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();
    init_tracing();

    let Some(corp_id) = require_env("CORP_ID") else {
        return;
    };
    let Some(corp_secret) = require_env("CORP_SECRET") else {
        return;
    };
    let Some(database_url) = require_env("DATABASE_URL") else {
        return;
    };

    let base_url_raw =
        std::env::var("IDP_BASE_URL").unwrap_or_else(|_| DEFAULT_IDP_BASE_URL.into());
    let base_url = match Url::parse(&base_url_raw) {
        Ok(url) => url,
        Err(e) => {
            tracing::error!(error = %e, "invalid IDP_BASE_URL");
            return;
        }
    };

    let admin_console_path =
        std::env::var("ADMIN_CONSOLE_PATH").unwrap_or_else(|_| DEFAULT_ADMIN_CONSOLE_PATH.into());
    let pending_ttl_seconds = std::env::var("PENDING_LOGIN_TTL_SECONDS")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(DEFAULT_PENDING_LOGIN_TTL_SECONDS);

    let db = match db::connect_pool(&database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error = %e, "failed to connect to database");
            return;
        }
    };

    if let Err(e) = db::run_migrations(&db).await {
        tracing::error!(error = %e, "failed to run migrations");
        return;
    }

    let identity = match CorpIdentityClient::new(base_url, corp_id, corp_secret) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            tracing::error!(error = %e, "failed to build identity client");
            return;
        }
    };
    tracing::debug!(idp_base_url = %base_url_raw, "identity client configured.");

    let clock: Arc<SystemClock> = Arc::new(SystemClock);
    let state = Arc::new(AppState {
        identity,
        pending: Arc::new(InMemoryPendingLoginStore::new(
            clock.clone(),
            pending_ttl_seconds,
        )),
        users: Arc::new(PostgresAppUserStore { db }),
        sessions: Arc::new(InMemoryAdminSessionStore::new()),
        clock,
        admin_console_path,
    });

    // Start the web server with the HTTP routes wired up.
    let app = routes::app(state);

    let addr_raw = std::env::var("SSO_LISTEN_ADDR").unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.into());
    let addr: SocketAddr = match addr_raw.parse() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!(addr = %addr_raw, error = %e, "invalid SSO_LISTEN_ADDR");
            return;
        }
    };

    // Bind TCP listener with error handling.
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(%addr, error = %e, "failed to bind");
            return;
        }
    };
    tracing::info!(%addr, "listening");

    // Serve app and report errors rather than panicking.
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server error");
    }
}
