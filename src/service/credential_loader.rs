use crate::error::ConfigurationError;
use crate::google_oauth::credentials::ServiceAccountKey;
use serde_json::Value;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::info;

/// Source of the service-account credential used at startup.
pub trait CredentialProvider: Send + Sync {
    fn load_credential(&self) -> Result<ServiceAccountKey, ConfigurationError>;
}

/// Reads the credential from a JSON file on the local filesystem.
#[derive(Debug, Clone)]
pub struct FileCredentialProvider {
    path: PathBuf,
}

impl FileCredentialProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialProvider for FileCredentialProvider {
    fn load_credential(&self) -> Result<ServiceAccountKey, ConfigurationError> {
        let contents =
            fs::read_to_string(&self.path).map_err(|source| ConfigurationError::Unreadable {
                path: self.path.clone(),
                source,
            })?;
        let value: Value = serde_json::from_str(&contents)?;
        let key = ServiceAccountKey::from_payload(&value)?;
        info!(
            path = %self.path.display(),
            project_id = %key.project_id,
            "service-account credential loaded"
        );
        Ok(key)
    }
}

/// In-memory credential payload, for embedding or tests.
#[derive(Debug, Clone)]
pub struct StaticCredentialProvider {
    payload: Value,
}

impl StaticCredentialProvider {
    pub fn from_value(payload: Value) -> Self {
        Self { payload }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        Ok(Self::from_value(serde_json::from_str(json)?))
    }
}

impl CredentialProvider for StaticCredentialProvider {
    fn load_credential(&self) -> Result<ServiceAccountKey, ConfigurationError> {
        ServiceAccountKey::from_payload(&self.payload)
    }
}
