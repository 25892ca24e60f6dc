use crate::config::{DEFAULT_DATABASE_ID, FIRESTORE_ENDPOINT};
use crate::error::ConfigurationError;
use crate::google_oauth::credentials::ServiceAccountKey;
use crate::google_oauth::endpoints::AccessToken;
use reqwest::Method;
use std::fmt;
use std::sync::Arc;
use url::Url;

/// Target endpoint settings for the database handle.
#[derive(Debug, Clone)]
pub struct DatabaseOptions {
    /// Service endpoint. `https://<project_id>.firebaseio.com` when unset.
    pub database_url: Option<Url>,
    pub database_id: String,
    pub firestore_endpoint: Url,
    pub proxy: Option<Url>,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            database_url: None,
            database_id: DEFAULT_DATABASE_ID.to_string(),
            firestore_endpoint: FIRESTORE_ENDPOINT.clone(),
            proxy: None,
        }
    }
}

/// Authenticated handle to the remote document database.
///
/// Clones share one allocation and nothing inside is mutated after
/// construction, so the handle can be read from any number of tasks.
#[derive(Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

struct DatabaseInner {
    project_id: String,
    database_id: String,
    database_url: Url,
    documents_url: Url,
    token: AccessToken,
    http_client: reqwest::Client,
}

impl Database {
    pub(crate) fn new(
        key: &ServiceAccountKey,
        options: &DatabaseOptions,
        token: AccessToken,
        http_client: reqwest::Client,
    ) -> Result<Self, ConfigurationError> {
        let database_url = match options.database_url.clone() {
            Some(url) => url,
            None => default_database_url(&key.project_id)?,
        };
        let documents_url = documents_root(
            &options.firestore_endpoint,
            &key.project_id,
            &options.database_id,
        )?;

        Ok(Self {
            inner: Arc::new(DatabaseInner {
                project_id: key.project_id.clone(),
                database_id: options.database_id.clone(),
                database_url,
                documents_url,
                token,
                http_client,
            }),
        })
    }

    pub fn project_id(&self) -> &str {
        &self.inner.project_id
    }

    pub fn database_id(&self) -> &str {
        &self.inner.database_id
    }

    pub fn database_url(&self) -> &Url {
        &self.inner.database_url
    }

    /// REST root for documents, ending with a slash.
    pub fn documents_url(&self) -> &Url {
        &self.inner.documents_url
    }

    /// URL of one document. Each argument is a single percent-encoded path segment.
    pub fn document_url(&self, collection: &str, document_id: &str) -> Url {
        let mut url = self.inner.documents_url.clone();
        // documents_url is checked to be a base URL in `Database::new`.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(collection).push(document_id);
        }
        url
    }

    pub fn access_token(&self) -> &AccessToken {
        &self.inner.token
    }

    pub fn is_token_expired(&self) -> bool {
        self.inner.token.is_expired()
    }

    pub fn http_client(&self) -> &reqwest::Client {
        &self.inner.http_client
    }

    /// Start a request carrying the handle's bearer token.
    pub fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        self.inner
            .http_client
            .request(method, url)
            .bearer_auth(self.inner.token.secret())
    }

    /// True when both handles refer to the same initialized instance.
    pub fn same_instance(&self, other: &Database) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("project_id", &self.inner.project_id)
            .field("database_id", &self.inner.database_id)
            .field("database_url", &self.inner.database_url.as_str())
            .field("token", &self.inner.token)
            .finish()
    }
}

/// `<endpoint>/projects/<project>/databases/<database>/documents/`, keeping
/// every path segment of the endpoint whether or not it ends with a slash.
fn documents_root(
    endpoint: &Url,
    project_id: &str,
    database_id: &str,
) -> Result<Url, ConfigurationError> {
    let mut url = endpoint.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|_| ConfigurationError::InvalidEndpoint(endpoint.to_string()))?
        .pop_if_empty()
        .extend([
            "projects",
            project_id,
            "databases",
            database_id,
            "documents",
            "",
        ]);
    Ok(url)
}

fn default_database_url(project_id: &str) -> Result<Url, url::ParseError> {
    Url::parse(&format!("https://{project_id}.firebaseio.com"))
}
