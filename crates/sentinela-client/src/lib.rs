//! HTTP clients for the external risk backends.
//!
//! Each client is stateless apart from its base URL and a shared
//! `reqwest::Client`. Requests are validated before submission and
//! failures are returned as [`ClientError`] without retrying.

pub mod analytics;
pub mod ecl;
pub mod error;
pub mod http;
pub mod prinad;
pub mod propensao;

pub use analytics::AnalyticsClient;
pub use ecl::EclClient;
pub use error::{ClientError, Result};
pub use http::{HttpBackend, build_http_client};
pub use prinad::PrinadClient;
pub use propensao::PropensaoClient;

use sentinela_core::settings::ApiSettings;

/// All four backend clients sharing one connection pool.
#[derive(Debug, Clone)]
pub struct Backends {
    pub prinad: PrinadClient,
    pub ecl: EclClient,
    pub propensao: PropensaoClient,
    pub analytics: AnalyticsClient,
}

impl Backends {
    pub fn from_settings(api: &ApiSettings) -> Result<Self> {
        let client = build_http_client(api.timeout_secs)?;
        Ok(Self {
            prinad: PrinadClient::new(&api.prinad_url, client.clone()),
            ecl: EclClient::new(&api.ecl_url, client.clone()),
            propensao: PropensaoClient::new(&api.propensao_url, client.clone()),
            analytics: AnalyticsClient::new(&api.analytics_url, client),
        })
    }
}
