use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Validate, check_non_empty, check_non_negative};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRequest {
    pub cliente_id: String,
    pub produto: String,
}

impl Validate for ScoreRequest {
    fn validate(&self) -> Result<()> {
        check_non_empty("cliente_id", &self.cliente_id)?;
        check_non_empty("produto", &self.produto)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropensityScore {
    pub cliente_id: String,
    pub produto: String,
    pub score: f64,
    pub faixa: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendRequest {
    pub cliente_id: String,
    pub produto: String,
    pub limite_atual: f64,
}

impl Validate for RecommendRequest {
    fn validate(&self) -> Result<()> {
        check_non_empty("cliente_id", &self.cliente_id)?;
        check_non_empty("produto", &self.produto)?;
        check_non_negative("limite_atual", self.limite_atual)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LimitAction {
    Aumentar,
    Manter,
    Reduzir,
}

impl fmt::Display for LimitAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimitAction::Aumentar => write!(f, "increase"),
            LimitAction::Manter => write!(f, "keep"),
            LimitAction::Reduzir => write!(f, "reduce"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub cliente_id: String,
    pub produto: String,
    pub limite_atual: f64,
    pub limite_recomendado: f64,
    pub acao: LimitAction,
    pub score: f64,
    #[serde(default)]
    pub justificativa: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub cliente_id: String,
    pub produto: String,
    pub limite_atual: f64,
    pub novo_limite: f64,
}

impl Validate for SimulationRequest {
    fn validate(&self) -> Result<()> {
        check_non_empty("cliente_id", &self.cliente_id)?;
        check_non_empty("produto", &self.produto)?;
        check_non_negative("limite_atual", self.limite_atual)?;
        check_non_negative("novo_limite", self.novo_limite)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub limite_atual: f64,
    pub novo_limite: f64,
    pub ecl_atual: f64,
    pub ecl_simulado: f64,
    pub delta_ecl: f64,
    #[serde(default)]
    pub receita_estimada: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub codigo: String,
    pub nome: String,
    #[serde(default)]
    pub descricao: Option<String>,
}
