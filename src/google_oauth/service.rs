use super::endpoints::{AccessToken, GoogleOauthEndpoints};
use crate::config::FIRESTORE_SCOPES;
use crate::error::{AuthenticationError, ConfigurationError};
use crate::google_oauth::credentials::ServiceAccountKey;
use std::time::Duration;
use url::Url;

const USER_AGENT: &str = concat!("firestore-bootstrap/", env!("CARGO_PKG_VERSION"));

/// Service layer composing the Google OAuth operations used at startup.
#[derive(Clone)]
pub struct GoogleOauthService {
    http_client: reqwest::Client,
}

impl GoogleOauthService {
    /// Create a new service with a preconfigured HTTP client.
    pub fn new(proxy: Option<&Url>) -> Result<Self, ConfigurationError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(5));
        // Only the configured proxy is used; system proxy variables are ignored.
        builder = match proxy {
            Some(proxy_url) => builder.proxy(
                reqwest::Proxy::all(proxy_url.as_str()).map_err(ConfigurationError::HttpClient)?,
            ),
            None => builder.no_proxy(),
        };
        let http_client = builder.build().map_err(ConfigurationError::HttpClient)?;
        Ok(Self { http_client })
    }

    pub fn http_client(&self) -> &reqwest::Client {
        &self.http_client
    }

    /// Prove the credential against the vendor by obtaining a database-scoped token.
    pub async fn authenticate(
        &self,
        key: &ServiceAccountKey,
    ) -> Result<AccessToken, AuthenticationError> {
        GoogleOauthEndpoints::exchange_service_account(key, FIRESTORE_SCOPES, &self.http_client)
            .await
    }
}
