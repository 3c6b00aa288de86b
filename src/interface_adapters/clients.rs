use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::domain::entities::{AccessToken, RemoteIdentity};
use crate::domain::errors::SsoError;
use crate::domain::ports::IdentityProvider;

// Bounded outbound timeout so a slow provider cannot starve callback
// handlers. No retries; the browser re-initiates the login on failure.
const OUTBOUND_TIMEOUT: Duration = Duration::from_secs(5);

// Thin wrapper around reqwest for the two identity-provider calls.
#[derive(Clone)]
pub struct CorpIdentityClient {
    http: Client,
    base_url: Url,
    corp_id: String,
    corp_secret: String,
}

#[derive(Debug)]
pub enum IdentityClientError {
    Transport(reqwest::Error),
    Upstream { status: StatusCode },
    Decode(reqwest::Error),
}

impl fmt::Display for IdentityClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityClientError::Transport(err) => {
                write!(f, "identity provider transport error: {err}")
            }
            IdentityClientError::Upstream { status } => {
                write!(f, "identity provider returned http {status}")
            }
            IdentityClientError::Decode(err) => {
                write!(f, "identity provider response decode error: {err}")
            }
        }
    }
}

impl std::error::Error for IdentityClientError {}

impl CorpIdentityClient {
    pub fn new(
        base_url: Url,
        corp_id: impl Into<String>,
        corp_secret: impl Into<String>,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(OUTBOUND_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url,
            corp_id: corp_id.into(),
            corp_secret: corp_secret.into(),
        })
    }

    // Compose a provider endpoint from the base URL plus query parameters.
    fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, url::ParseError> {
        let mut url = self.base_url.join(path)?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, IdentityClientError> {
        let res = self
            .http
            .get(url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(IdentityClientError::Transport)?;
        let status = res.status();

        if !status.is_success() {
            return Err(IdentityClientError::Upstream { status });
        }

        res.json::<T>().await.map_err(IdentityClientError::Decode)
    }
}

#[async_trait]
impl IdentityProvider for CorpIdentityClient {
    // The corp token grant is credential-scoped; the authorization code is
    // redeemed by `resolve_identity`, not here.
    async fn exchange_code(&self, _code: &str) -> Result<AccessToken, SsoError> {
        let url = self
            .endpoint(
                "cgi-bin/gettoken",
                &[
                    ("corpid", self.corp_id.as_str()),
                    ("corpsecret", self.corp_secret.as_str()),
                ],
            )
            .map_err(|err| SsoError::Transport(err.to_string()))?;

        self.get_json::<AccessToken>(url)
            .await
            .map_err(|err| SsoError::Transport(err.to_string()))
    }

    async fn resolve_identity(
        &self,
        access_token: &str,
        code: &str,
    ) -> Result<RemoteIdentity, SsoError> {
        let url = self
            .endpoint(
                "cgi-bin/user/getuserinfo",
                &[("access_token", access_token), ("code", code)],
            )
            .map_err(|err| SsoError::Transport(err.to_string()))?;

        self.get_json::<RemoteIdentity>(url)
            .await
            .map_err(|err| SsoError::Transport(err.to_string()))
    }
}
