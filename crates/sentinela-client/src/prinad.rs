use sentinela_core::types::prinad::*;

use crate::error::Result;
use crate::http::HttpBackend;

/// PRINAD credit classification service.
#[derive(Debug, Clone)]
pub struct PrinadClient {
    http: HttpBackend,
}

impl PrinadClient {
    pub fn new(base_url: &str, client: reqwest::Client) -> Self {
        Self {
            http: HttpBackend::new("prinad", base_url, client),
        }
    }

    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    pub async fn health(&self) -> Result<HealthStatus> {
        self.http.get_json("/health").await
    }

    /// CPFs are sent as bare digits whatever punctuation the caller used.
    pub async fn simple_classify(&self, req: &ClassifyRequest) -> Result<Classification> {
        self.http.post_json("/simple_classify", &req.normalized()?).await
    }

    pub async fn explained_classify(&self, req: &ClassifyRequest) -> Result<ExplainedClassification> {
        self.http
            .post_json("/explained_classify", &req.normalized()?)
            .await
    }

    pub async fn multiple_classify(&self, req: &BatchClassifyRequest) -> Result<BatchClassifyResponse> {
        self.http
            .post_json("/multiple_classify", &req.normalized()?)
            .await
    }
}
