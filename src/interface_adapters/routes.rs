use std::sync::Arc;

use axum::{routing::get, Router};

use crate::interface_adapters::handlers::sso_callback;
use crate::interface_adapters::state::AppState;

pub fn app(state: Arc<AppState>) -> Router {
    // Wire the HTTP routes to their handlers.
    Router::new()
        .route("/sso/callback", get(sso_callback))
        .with_state(state)
}
