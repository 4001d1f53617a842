use sentinela_core::types::analytics::*;

use crate::error::Result;
use crate::http::HttpBackend;

/// Model monitoring endpoints under `/analytics`.
#[derive(Debug, Clone)]
pub struct AnalyticsClient {
    http: HttpBackend,
}

impl AnalyticsClient {
    pub fn new(base_url: &str, client: reqwest::Client) -> Self {
        Self {
            http: HttpBackend::new("analytics", base_url, client),
        }
    }

    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    pub async fn model_performance(&self) -> Result<ModelPerformance> {
        self.http.get_json("/analytics/model-performance").await
    }

    pub async fn drift_report(&self) -> Result<DriftReport> {
        self.http.get_json("/analytics/drift-report").await
    }

    pub async fn accuracy_trend(&self) -> Result<AccuracyTrend> {
        self.http.get_json("/analytics/accuracy-trend").await
    }

    pub async fn backtest(&self) -> Result<BacktestReport> {
        self.http.get_json("/analytics/backtest").await
    }

    pub async fn full_report(&self) -> Result<FullReport> {
        self.http.get_json("/analytics/full-report").await
    }
}
