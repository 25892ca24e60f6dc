pub mod bootstrap;
pub mod config;
pub mod db;
pub mod error;
pub mod google_oauth;
pub mod service;

pub use bootstrap::{database, init_from_config, init_global, initialize};
pub use db::{Database, DatabaseOptions};
pub use error::{AuthenticationError, BootstrapError, ConfigurationError};
pub use google_oauth::credentials::ServiceAccountKey;
