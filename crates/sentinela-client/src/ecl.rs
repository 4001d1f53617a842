use sentinela_core::types::ecl::*;

use crate::error::Result;
use crate::http::HttpBackend;

/// IFRS 9 expected credit loss service.
#[derive(Debug, Clone)]
pub struct EclClient {
    http: HttpBackend,
}

impl EclClient {
    pub fn new(base_url: &str, client: reqwest::Client) -> Self {
        Self {
            http: HttpBackend::new("ecl", base_url, client),
        }
    }

    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    /// ECL for one operation; the backend derives PD, LGD and stage.
    pub async fn calcular(&self, req: &EclRequest) -> Result<EclResult> {
        self.http.post_json("/calcular", req).await
    }

    /// ECL from explicit PD, LGD and EAD.
    pub async fn calcular_direto(&self, req: &EclDirectRequest) -> Result<EclResult> {
        self.http.post_json("/calcular_direto", req).await
    }

    pub async fn calcular_portfolio(&self, req: &PortfolioRequest) -> Result<PortfolioResult> {
        self.http.post_json("/calcular_portfolio", req).await
    }

    pub async fn grupos_homogeneos(&self) -> Result<Vec<HomogeneousGroup>> {
        self.http.get_json("/grupos_homogeneos").await
    }
}
