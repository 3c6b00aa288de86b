use serde::{Deserialize, Serialize};

// Token-exchange response from the identity provider. The provider omits
// fields on error responses, so everything is defaulted.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct AccessToken {
    #[serde(default, rename = "errcode")]
    pub err_code: i64,
    #[serde(default, rename = "errmsg")]
    pub err_msg: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub expires_in: u64,
}

// Identity-lookup response from the identity provider.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RemoteIdentity {
    #[serde(default, rename = "errcode")]
    pub err_code: i64,
    #[serde(default, rename = "errmsg")]
    pub err_msg: String,
    #[serde(default, rename = "UserId")]
    pub user_id: String,
}

// A browser login that started at the gateway and is waiting for the
// provider round trip to resolve an identity. Keyed by the opaque state
// token in the pending-login store; `resolved_username` stays empty until
// the callback completes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingLogin {
    pub callback_url: String,
    pub resolved_username: String,
}

// Authenticated console user. SSO users are created with every privilege
// flag false; elevation happens through console administration, not here.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: i64,
    pub username: String,
    pub logged: bool,
    pub is_super_admin: bool,
    pub is_cert_admin: bool,
    pub is_app_admin: bool,
    pub need_modify_pwd: bool,
}

// Admin session record stored in memory, keyed by the minted session token.
#[derive(Clone, Debug)]
pub struct AdminSession {
    pub user: AuthUser,
    pub expires_at: u64,
}
