use serde::{Deserialize, Serialize};

// Query parameters of the provider callback. Both values are untrusted;
// missing parameters deserialize as empty strings, mirroring what the
// provider sends on malformed round trips.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub state: String,
}

// Response body for a completed administrative login.
#[derive(Debug, Serialize)]
pub struct AdminLoginResponse {
    pub username: String,
    pub expires_in: u64,
}

// Simple error envelope for JSON responses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}
