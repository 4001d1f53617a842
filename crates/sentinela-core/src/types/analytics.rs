use serde::{Deserialize, Serialize};

use crate::risk::PsiBand;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPerformance {
    pub auc_roc: f64,
    pub gini: f64,
    pub ks: f64,
    pub accuracy: f64,
    #[serde(default)]
    pub precision: Option<f64>,
    #[serde(default)]
    pub recall: Option<f64>,
    #[serde(default)]
    pub amostras: Option<u64>,
    #[serde(default)]
    pub data_referencia: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureDrift {
    pub feature: String,
    pub psi: f64,
}

impl FeatureDrift {
    pub fn band(&self) -> PsiBand {
        PsiBand::from_psi(self.psi)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftReport {
    pub psi_global: f64,
    #[serde(default)]
    pub features: Vec<FeatureDrift>,
    #[serde(default)]
    pub data_referencia: Option<String>,
}

impl DriftReport {
    pub fn band(&self) -> PsiBand {
        PsiBand::from_psi(self.psi_global)
    }

    /// Features outside the stable band, worst first.
    pub fn drifting_features(&self) -> Vec<&FeatureDrift> {
        let mut out: Vec<&FeatureDrift> = self
            .features
            .iter()
            .filter(|f| f.band() != PsiBand::Stable)
            .collect();
        out.sort_by(|a, b| b.psi.total_cmp(&a.psi));
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracyPoint {
    pub periodo: String,
    pub acuracia: f64,
    #[serde(default)]
    pub amostras: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracyTrend {
    pub pontos: Vec<AccuracyPoint>,
}

impl AccuracyTrend {
    /// Change between the first and last period; `None` with fewer than two points.
    pub fn delta(&self) -> Option<f64> {
        match (self.pontos.first(), self.pontos.last()) {
            (Some(first), Some(last)) if self.pontos.len() > 1 => {
                Some(last.acuracia - first.acuracia)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestBucket {
    pub rating: String,
    pub pd_prevista: f64,
    pub taxa_default_observada: f64,
    pub quantidade: u64,
}

impl BacktestBucket {
    /// Observed minus predicted default rate.
    pub fn deviation(&self) -> f64 {
        self.taxa_default_observada - self.pd_prevista
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    pub periodo: String,
    pub buckets: Vec<BacktestBucket>,
    #[serde(default)]
    pub resultado: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullReport {
    pub performance: ModelPerformance,
    pub drift: DriftReport,
    pub tendencia: AccuracyTrend,
    pub backtest: BacktestReport,
}
