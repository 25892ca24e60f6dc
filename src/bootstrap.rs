use crate::config::Config;
use crate::db::{Database, DatabaseOptions};
use crate::error::BootstrapError;
use crate::google_oauth::GoogleOauthService;
use crate::service::credential_loader::CredentialProvider;
use tokio::sync::OnceCell;
use tracing::info;

static DATABASE: OnceCell<Database> = OnceCell::const_new();

/// Load the credential, authenticate it and build a database handle.
///
/// Does not touch process-wide state; callers pass the returned handle on.
pub async fn initialize(
    provider: &dyn CredentialProvider,
    options: &DatabaseOptions,
) -> Result<Database, BootstrapError> {
    let key = provider.load_credential()?;
    let oauth = GoogleOauthService::new(options.proxy.as_ref())?;
    let token = oauth.authenticate(&key).await?;
    let db = Database::new(&key, options, token, oauth.http_client().clone())?;
    info!(
        project_id = %db.project_id(),
        database_id = %db.database_id(),
        database_url = %db.database_url(),
        "database handle initialized"
    );
    Ok(db)
}

/// Initialize once and publish the handle for the whole process.
///
/// Later calls return the published instance without initializing again.
/// A failed attempt publishes nothing.
pub async fn init_global(
    provider: &dyn CredentialProvider,
    options: &DatabaseOptions,
) -> Result<&'static Database, BootstrapError> {
    DATABASE
        .get_or_try_init(|| initialize(provider, options))
        .await
}

/// [`init_global`] driven by loaded configuration.
pub async fn init_from_config(cfg: &Config) -> Result<&'static Database, BootstrapError> {
    DATABASE
        .get_or_try_init(|| async {
            let provider = cfg.credential_provider()?;
            initialize(&provider, &cfg.database_options()).await
        })
        .await
}

/// The published handle, if initialization has succeeded.
pub fn database() -> Option<&'static Database> {
    DATABASE.get()
}
