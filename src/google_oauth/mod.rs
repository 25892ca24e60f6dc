//! Google service-account authentication.
//!
//! - `credentials.rs`: the service-account key file schema
//! - `endpoints.rs`: stateless token exchange against `token_uri`
//! - `service.rs`: HTTP client setup and the startup authentication call

pub mod credentials;
pub mod endpoints;
pub mod service;

pub use credentials::ServiceAccountKey;
pub use endpoints::AccessToken;
pub use service::GoogleOauthService;
