use mimalloc::MiMalloc;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, reload, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // RUST_LOG wins; otherwise start at info and switch to `loglevel` once loaded.
    let from_env = EnvFilter::try_from_default_env().ok();
    let has_env_filter = from_env.is_some();
    let (filter, filter_handle) =
        reload::Layer::new(from_env.unwrap_or_else(|| EnvFilter::new("info")));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    let cfg = match firestore_bootstrap::config::Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(error = %e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    if !has_env_filter
        && let Err(e) = filter_handle.reload(EnvFilter::new(cfg.loglevel.clone()))
    {
        warn!(error = %e, loglevel = %cfg.loglevel, "failed to apply configured log level");
    }

    info!(
        credential_source = %cfg
            .credential_source
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<none>".to_string()),
        database_url = %cfg.database_url.as_ref().map(|u| u.as_str()).unwrap_or("<derived>"),
        proxy = %cfg.proxy.as_ref().map(|u| u.as_str()).unwrap_or("<none>"),
        loglevel = %cfg.loglevel,
    );

    match firestore_bootstrap::init_from_config(&cfg).await {
        Ok(db) => {
            info!(
                project_id = %db.project_id(),
                documents_url = %db.documents_url(),
                expires_at = %db.access_token().expires_at,
                "database ready"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "database initialization failed");
            ExitCode::FAILURE
        }
    }
}
