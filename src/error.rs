use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error as ThisError;

/// Startup failure. Either kind aborts process startup.
#[derive(Debug, ThisError)]
pub enum BootstrapError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("authentication error: {0}")]
    Authentication(#[from] AuthenticationError),
}

impl BootstrapError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, BootstrapError::Configuration(_))
    }

    pub fn is_authentication(&self) -> bool {
        matches!(self, BootstrapError::Authentication(_))
    }
}

/// The credential source or a configuration value is absent or malformed.
#[derive(Debug, ThisError)]
pub enum ConfigurationError {
    #[error("no credential source configured (set CREDENTIAL_SOURCE or GOOGLE_APPLICATION_CREDENTIALS)")]
    MissingSource,

    #[error("credential file {path} is unreadable: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("credential descriptor is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("credential descriptor is missing required field `{0}`")]
    MissingField(&'static str),

    #[error("unsupported credential type `{0}`, expected `service_account`")]
    UnsupportedType(String),

    #[error("private key is not a valid RSA PEM: {0}")]
    InvalidPrivateKey(#[source] jsonwebtoken::errors::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("endpoint {0} cannot carry a path")]
    InvalidEndpoint(String),

    #[error("failed to extract configuration: {0}")]
    Extract(#[from] Box<figment::Error>),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

impl From<figment::Error> for ConfigurationError {
    fn from(e: figment::Error) -> Self {
        ConfigurationError::Extract(Box::new(e))
    }
}

/// The remote service did not accept the supplied credential.
#[derive(Debug, ThisError)]
pub enum AuthenticationError {
    #[error("token endpoint rejected the credential with {status}: {error}")]
    Rejected {
        status: StatusCode,
        error: String,
        description: Option<String>,
    },

    #[error("token request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid token response: {0}")]
    InvalidResponse(String),

    #[error("failed to sign assertion: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

impl AuthenticationError {
    /// OAuth error code reported by the token endpoint, if the request reached it.
    pub fn oauth_error(&self) -> Option<&str> {
        match self {
            AuthenticationError::Rejected { error, .. } => Some(error.as_str()),
            _ => None,
        }
    }
}
