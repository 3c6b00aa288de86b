// Domain-level errors for the SSO callback flow.
#[derive(Debug)]
pub enum SsoError {
    // The callback arrived without an authorization code.
    MissingCode,
    // Network or decode failure talking to the identity provider.
    Transport(String),
    // The provider answered with a non-zero errcode.
    ProviderRejected { code: i64, message: String },
    // The provider reported success but resolved no user id.
    EmptyIdentity,
    // A port adapter failed (user table, session store, pending-login store).
    StorageFailure,
}
