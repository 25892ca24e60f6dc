use crate::config::DEFAULT_TOKEN_URI;
use crate::error::ConfigurationError;
use jsonwebtoken::EncodingKey;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use url::Url;

const SERVICE_ACCOUNT_TYPE: &str = "service_account";

/// Parsed Google service-account key.
///
/// The private key is held only as a signing key; `Debug` never prints it.
#[derive(Clone)]
pub struct ServiceAccountKey {
    pub project_id: String,
    pub client_email: String,
    pub private_key_id: Option<String>,
    pub client_id: Option<String>,
    pub token_uri: Url,
    signing_key: EncodingKey,
}

/// Wire shape of the vendor JSON. Unknown fields (`auth_uri`,
/// `client_x509_cert_url`, ...) are ignored.
#[derive(Deserialize)]
struct RawServiceAccount {
    #[serde(rename = "type")]
    kind: Option<String>,
    project_id: Option<String>,
    private_key_id: Option<String>,
    private_key: Option<String>,
    client_email: Option<String>,
    client_id: Option<String>,
    token_uri: Option<String>,
}

impl ServiceAccountKey {
    /// Build a key from the JSON payload of a service-account file.
    pub fn from_payload(payload: &Value) -> Result<Self, ConfigurationError> {
        let raw = RawServiceAccount::deserialize(payload)?;

        if let Some(kind) = raw.kind.as_deref()
            && kind != SERVICE_ACCOUNT_TYPE
        {
            return Err(ConfigurationError::UnsupportedType(kind.to_string()));
        }

        let project_id = required(raw.project_id, "project_id")?;
        let client_email = required(raw.client_email, "client_email")?;
        let private_key = required(raw.private_key, "private_key")?;
        let signing_key = EncodingKey::from_rsa_pem(private_key.as_bytes())
            .map_err(ConfigurationError::InvalidPrivateKey)?;

        let token_uri = match raw.token_uri.filter(|s| !s.trim().is_empty()) {
            Some(uri) => Url::parse(&uri)?,
            None => DEFAULT_TOKEN_URI.clone(),
        };

        Ok(Self {
            project_id,
            client_email,
            private_key_id: raw.private_key_id.filter(|s| !s.is_empty()),
            client_id: raw.client_id,
            token_uri,
            signing_key,
        })
    }

    pub(crate) fn signing_key(&self) -> &EncodingKey {
        &self.signing_key
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ConfigurationError> {
    value
        .filter(|s| !s.trim().is_empty())
        .ok_or(ConfigurationError::MissingField(field))
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("client_id", &self.client_id)
            .field("token_uri", &self.token_uri.as_str())
            .field("private_key", &"<redacted>")
            .finish()
    }
}
