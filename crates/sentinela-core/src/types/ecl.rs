use serde::{Deserialize, Serialize};

use super::{Validate, check_batch, check_non_empty, check_non_negative, check_probability};
use crate::error::{CoreError, Result};
pub use crate::risk::Stage;
use crate::risk::expected_credit_loss;

/// Largest portfolio accepted by `/calcular_portfolio`.
pub const MAX_PORTFOLIO: usize = 50_000;

/// ECL for one operation, staged and parameterised by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EclRequest {
    pub cliente_id: String,
    pub produto: String,
    pub saldo_utilizado: f64,
    pub limite_total: f64,
    /// PRINAD score (0-100) when already known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prinad: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estagio: Option<Stage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grupo_homogeneo: Option<String>,
}

impl Validate for EclRequest {
    fn validate(&self) -> Result<()> {
        check_non_empty("cliente_id", &self.cliente_id)?;
        check_non_empty("produto", &self.produto)?;
        check_non_negative("saldo_utilizado", self.saldo_utilizado)?;
        check_non_negative("limite_total", self.limite_total)?;
        match self.prinad {
            Some(prinad) if !prinad.is_finite() || !(0.0..=100.0).contains(&prinad) => Err(
                CoreError::Validation(format!("prinad must be between 0 and 100, got {prinad}")),
            ),
            _ => Ok(()),
        }
    }
}

/// ECL from explicit PD, LGD and EAD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EclDirectRequest {
    pub pd: f64,
    pub lgd: f64,
    pub ead: f64,
    pub estagio: Stage,
}

impl EclDirectRequest {
    /// Local estimate with the same formula the backend applies.
    pub fn estimate(&self) -> f64 {
        expected_credit_loss(self.pd, self.lgd, self.ead)
    }
}

impl Validate for EclDirectRequest {
    fn validate(&self) -> Result<()> {
        check_probability("pd", self.pd)?;
        check_probability("lgd", self.lgd)?;
        check_non_negative("ead", self.ead)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EclResult {
    #[serde(default)]
    pub cliente_id: Option<String>,
    pub pd: f64,
    pub lgd: f64,
    pub ead: f64,
    pub ecl: f64,
    pub estagio: Stage,
    #[serde(default)]
    pub horizonte_meses: Option<u32>,
}

impl EclResult {
    /// Whether the reported ECL matches PD × LGD × EAD within `tolerance`.
    pub fn is_consistent(&self, tolerance: f64) -> bool {
        (expected_credit_loss(self.pd, self.lgd, self.ead) - self.ecl).abs() <= tolerance
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioRequest {
    pub operacoes: Vec<EclRequest>,
}

impl Validate for PortfolioRequest {
    fn validate(&self) -> Result<()> {
        check_batch("operacoes", &self.operacoes, MAX_PORTFOLIO)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageSummary {
    pub estagio: Stage,
    pub quantidade: u64,
    pub ead: f64,
    pub ecl: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioResult {
    pub ecl_total: f64,
    pub ead_total: f64,
    #[serde(default)]
    pub por_estagio: Vec<StageSummary>,
    #[serde(default)]
    pub resultados: Vec<EclResult>,
}

impl PortfolioResult {
    /// Per-stage totals; derived from `resultados` when the backend omits them.
    pub fn stage_summaries(&self) -> Vec<StageSummary> {
        if !self.por_estagio.is_empty() {
            let mut out = self.por_estagio.clone();
            out.sort_by_key(|s| s.estagio);
            return out;
        }
        Stage::ALL
            .iter()
            .filter_map(|stage| {
                let rows: Vec<&EclResult> = self
                    .resultados
                    .iter()
                    .filter(|r| r.estagio == *stage)
                    .collect();
                if rows.is_empty() {
                    return None;
                }
                Some(StageSummary {
                    estagio: *stage,
                    quantidade: rows.len() as u64,
                    ead: rows.iter().map(|r| r.ead).sum(),
                    ecl: rows.iter().map(|r| r.ecl).sum(),
                })
            })
            .collect()
    }

    /// ECL coverage ratio (ECL / EAD); zero for an empty portfolio.
    pub fn coverage(&self) -> f64 {
        if self.ead_total > 0.0 {
            self.ecl_total / self.ead_total
        } else {
            0.0
        }
    }
}

/// Homogeneous risk group used for LGD assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomogeneousGroup {
    pub id: String,
    pub nome: String,
    pub lgd: f64,
    #[serde(default)]
    pub descricao: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(id: &str) -> EclRequest {
        EclRequest {
            cliente_id: id.into(),
            produto: "cartao".into(),
            saldo_utilizado: 1_000.0,
            limite_total: 5_000.0,
            prinad: Some(30.0),
            estagio: None,
            grupo_homogeneo: None,
        }
    }

    fn result(stage: Stage, ead: f64, ecl: f64) -> EclResult {
        EclResult {
            cliente_id: None,
            pd: 0.1,
            lgd: 0.5,
            ead,
            ecl,
            estagio: stage,
            horizonte_meses: None,
        }
    }

    #[test]
    fn direct_request_bounds() {
        let ok = EclDirectRequest {
            pd: 0.02,
            lgd: 0.45,
            ead: 1000.0,
            estagio: Stage::One,
        };
        assert!(ok.validate().is_ok());
        assert!((ok.estimate() - 9.0).abs() < 1e-9);

        let bad = EclDirectRequest { pd: 1.2, ..ok.clone() };
        assert!(bad.validate().is_err());
        let bad = EclDirectRequest { ead: -1.0, ..ok.clone() };
        assert!(bad.validate().is_err());
        let bad = EclDirectRequest { lgd: f64::NAN, ..ok };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn operation_validation() {
        assert!(op("c1").validate().is_ok());
        let mut bad = op("");
        assert!(bad.validate().is_err());
        bad = op("c1");
        bad.prinad = Some(120.0);
        assert!(bad.validate().is_err());
    }

    #[test]
    fn optional_fields_are_omitted() {
        let mut req = op("c1");
        req.prinad = None;
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("prinad").is_none());
        assert!(json.get("estagio").is_none());
    }

    #[test]
    fn stage_summaries_from_results() {
        let portfolio = PortfolioResult {
            ecl_total: 60.0,
            ead_total: 600.0,
            por_estagio: vec![],
            resultados: vec![
                result(Stage::Two, 200.0, 40.0),
                result(Stage::One, 100.0, 5.0),
                result(Stage::One, 300.0, 15.0),
            ],
        };
        let summaries = portfolio.stage_summaries();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].estagio, Stage::One);
        assert_eq!(summaries[0].quantidade, 2);
        assert!((summaries[0].ead - 400.0).abs() < 1e-9);
        assert!((portfolio.coverage() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn consistency_check() {
        assert!(result(Stage::One, 100.0, 5.0).is_consistent(1e-6));
        assert!(!result(Stage::One, 100.0, 6.0).is_consistent(1e-6));
    }
}
