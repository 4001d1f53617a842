use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Validate, check_batch};
use crate::error::{CoreError, Result};

/// Largest batch accepted by `/multiple_classify`.
pub const MAX_BATCH: usize = 1000;

/// Strip CPF punctuation and check it is exactly 11 digits.
pub fn normalize_cpf(raw: &str) -> Result<String> {
    let digits: String = raw
        .chars()
        .filter(|c| !matches!(c, '.' | '-' | ' '))
        .collect();
    if digits.len() != 11 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(CoreError::Validation(format!(
            "CPF must have 11 digits, got '{raw}'"
        )));
    }
    Ok(digits)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifyRequest {
    pub cpf: String,
    /// Extra model features forwarded as-is.
    #[serde(flatten)]
    pub features: Map<String, Value>,
}

impl ClassifyRequest {
    pub fn new(cpf: impl Into<String>) -> Self {
        Self {
            cpf: cpf.into(),
            features: Map::new(),
        }
    }

    /// Copy with the CPF reduced to its 11 digits, as the backend expects.
    pub fn normalized(&self) -> Result<Self> {
        Ok(Self {
            cpf: normalize_cpf(&self.cpf)?,
            features: self.features.clone(),
        })
    }
}

impl Validate for ClassifyRequest {
    fn validate(&self) -> Result<()> {
        normalize_cpf(&self.cpf).map(|_| ())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub cpf: String,
    /// PRINAD score, 0-100.
    pub prinad: f64,
    pub rating: String,
    #[serde(default)]
    pub rating_descricao: Option<String>,
    pub pd_12m: f64,
    pub pd_lifetime: f64,
    /// Suggested IFRS 9 stage.
    pub estagio_pe: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureContribution {
    pub feature: String,
    #[serde(default)]
    pub valor: Value,
    pub contribuicao: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplainedClassification {
    #[serde(flatten)]
    pub classificacao: Classification,
    #[serde(default)]
    pub explicacao: Vec<FeatureContribution>,
}

impl ExplainedClassification {
    /// Contributions ordered by absolute impact, largest first.
    pub fn top_drivers(&self, n: usize) -> Vec<&FeatureContribution> {
        let mut drivers: Vec<&FeatureContribution> = self.explicacao.iter().collect();
        drivers.sort_by(|a, b| b.contribuicao.abs().total_cmp(&a.contribuicao.abs()));
        drivers.truncate(n);
        drivers
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchClassifyRequest {
    pub clientes: Vec<ClassifyRequest>,
}

impl BatchClassifyRequest {
    /// Copy with every CPF normalized; errors name the offending entry.
    pub fn normalized(&self) -> Result<Self> {
        let clientes = self
            .clientes
            .iter()
            .enumerate()
            .map(|(i, c)| {
                c.normalized()
                    .map_err(|e| CoreError::Validation(format!("clientes[{i}]: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { clientes })
    }
}

impl Validate for BatchClassifyRequest {
    fn validate(&self) -> Result<()> {
        check_batch("clientes", &self.clientes, MAX_BATCH)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchError {
    pub cpf: String,
    pub erro: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchClassifyResponse {
    pub resultados: Vec<Classification>,
    #[serde(default)]
    pub erros: Vec<BatchError>,
    #[serde(default)]
    pub tempo_processamento_ms: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub versao: Option<String>,
    #[serde(flatten)]
    pub detalhes: Map<String, Value>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(
            self.status.to_ascii_lowercase().as_str(),
            "ok" | "healthy" | "up"
        )
    }
}
