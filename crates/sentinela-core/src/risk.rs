//! Glossary formulas shared by validation, reports and CLI summaries.
//!
//! These helpers never replace the backend computation; they exist so that
//! client-side checks and rendered summaries agree with the regulatory
//! definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// PSI below this is stable.
pub const PSI_STABLE_MAX: f64 = 0.10;
/// PSI below this (and above [`PSI_STABLE_MAX`]) is a moderate shift.
pub const PSI_MODERATE_MAX: f64 = 0.25;

/// ECL = PD × LGD × EAD.
pub fn expected_credit_loss(pd: f64, lgd: f64, ead: f64) -> f64 {
    pd * lgd * ead
}

/// IFRS 9 stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Stage {
    /// Performing; 12-month ECL.
    One,
    /// Significant increase in credit risk; lifetime ECL.
    Two,
    /// Credit-impaired; lifetime ECL.
    Three,
}

/// ECL measurement horizon implied by a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Horizon {
    TwelveMonths,
    Lifetime,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::One, Stage::Two, Stage::Three];

    pub fn number(self) -> u8 {
        match self {
            Stage::One => 1,
            Stage::Two => 2,
            Stage::Three => 3,
        }
    }

    pub fn horizon(self) -> Horizon {
        match self {
            Stage::One => Horizon::TwelveMonths,
            Stage::Two | Stage::Three => Horizon::Lifetime,
        }
    }
}

impl TryFrom<u8> for Stage {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Stage::One),
            2 => Ok(Stage::Two),
            3 => Ok(Stage::Three),
            other => Err(format!("invalid IFRS 9 stage: {other}")),
        }
    }
}

impl From<Stage> for u8 {
    fn from(stage: Stage) -> Self {
        stage.number()
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Stage {}", self.number())
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Horizon::TwelveMonths => write!(f, "12 months"),
            Horizon::Lifetime => write!(f, "lifetime"),
        }
    }
}

/// Population Stability Index band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PsiBand {
    Stable,
    Moderate,
    Significant,
}

impl PsiBand {
    pub fn from_psi(psi: f64) -> Self {
        if psi < PSI_STABLE_MAX {
            PsiBand::Stable
        } else if psi < PSI_MODERATE_MAX {
            PsiBand::Moderate
        } else {
            PsiBand::Significant
        }
    }
}

impl fmt::Display for PsiBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PsiBand::Stable => write!(f, "stable"),
            PsiBand::Moderate => write!(f, "moderate"),
            PsiBand::Significant => write!(f, "significant"),
        }
    }
}
