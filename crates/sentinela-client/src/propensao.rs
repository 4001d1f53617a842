use sentinela_core::types::propensao::*;

use crate::error::Result;
use crate::http::HttpBackend;

/// Limit propensity and recommendation service.
#[derive(Debug, Clone)]
pub struct PropensaoClient {
    http: HttpBackend,
}

impl PropensaoClient {
    pub fn new(base_url: &str, client: reqwest::Client) -> Self {
        Self {
            http: HttpBackend::new("propensao", base_url, client),
        }
    }

    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    pub async fn score(&self, req: &ScoreRequest) -> Result<PropensityScore> {
        self.http.post_json("/score", req).await
    }

    pub async fn recomendar(&self, req: &RecommendRequest) -> Result<Recommendation> {
        self.http.post_json("/recomendar", req).await
    }

    pub async fn simular(&self, req: &SimulationRequest) -> Result<SimulationResult> {
        self.http.post_json("/simular", req).await
    }

    pub async fn produtos(&self) -> Result<Vec<Product>> {
        self.http.get_json("/produtos").await
    }
}
