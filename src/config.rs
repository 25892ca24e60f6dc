use crate::db::DatabaseOptions;
use crate::error::ConfigurationError;
use crate::service::credential_loader::FileCredentialProvider;
use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::LazyLock;
use url::Url;

pub static DEFAULT_TOKEN_URI: LazyLock<Url> = LazyLock::new(|| {
    Url::parse("https://oauth2.googleapis.com/token").expect("invalid default token URI")
});

pub static FIRESTORE_ENDPOINT: LazyLock<Url> = LazyLock::new(|| {
    Url::parse("https://firestore.googleapis.com/v1/").expect("invalid Firestore endpoint")
});

/// OAuth scopes requested for the database access token.
pub const FIRESTORE_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/datastore",
    "https://www.googleapis.com/auth/cloud-platform",
];

pub const DEFAULT_DATABASE_ID: &str = "(default)";

/// Environment keys read by [`Config::load`], matched case-insensitively.
const ENV_KEYS: &[&str] = &[
    "credential_source",
    "database_url",
    "database_id",
    "firestore_endpoint",
    "loglevel",
    "proxy",
];

/// Google's conventional credential-path variable, used when
/// `CREDENTIAL_SOURCE` is not set.
const GOOGLE_CREDENTIALS_ENV: &str = "google_application_credentials";

fn is_set(key: &figment::value::UncasedStr) -> bool {
    std::env::var_os(key.as_str()).is_some_and(|v| !v.is_empty())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path of the service-account JSON file.
    pub credential_source: Option<PathBuf>,
    /// Target database endpoint. Derived from the project id when unset.
    pub database_url: Option<Url>,
    pub database_id: String,
    pub firestore_endpoint: Url,
    pub loglevel: String,
    pub proxy: Option<Url>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            credential_source: None,
            database_url: None,
            database_id: DEFAULT_DATABASE_ID.to_string(),
            firestore_endpoint: FIRESTORE_ENDPOINT.clone(),
            loglevel: "info".to_string(),
            proxy: None,
        }
    }
}

impl Config {
    /// Defaults, then `GOOGLE_APPLICATION_CREDENTIALS`, then the crate's own
    /// variables (highest priority). Empty variables count as unset.
    pub fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(
                Env::raw()
                    .only(&[GOOGLE_CREDENTIALS_ENV])
                    .filter(is_set)
                    .map(|_| "credential_source".into()),
            )
            .merge(Env::raw().only(ENV_KEYS).filter(is_set))
    }

    pub fn load() -> Result<Self, ConfigurationError> {
        Ok(Self::figment().extract()?)
    }

    pub fn credential_provider(&self) -> Result<FileCredentialProvider, ConfigurationError> {
        self.credential_source
            .as_ref()
            .filter(|p| !p.as_os_str().is_empty())
            .map(FileCredentialProvider::new)
            .ok_or(ConfigurationError::MissingSource)
    }

    pub fn database_options(&self) -> DatabaseOptions {
        DatabaseOptions {
            database_url: self.database_url.clone(),
            database_id: self.database_id.clone(),
            firestore_endpoint: self.firestore_endpoint.clone(),
            proxy: self.proxy.clone(),
        }
    }
}
