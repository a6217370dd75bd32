//! Runs one of the three analyses against a loaded `Sample`.
use crate::prelude::*;
use log::info;
use serde::Serialize;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Analysis {
    /// Independence of two columns.
    ChiSquare { rows: Field, cols: Field },
    /// Allelic association of a locus with the case group.
    OddsRatio(Locus),
    /// Equilibrium of a locus, once per group.
    HardyWeinberg(Locus),
}

impl Analysis {
    pub fn name(&self) -> &'static str {
        match self {
            Analysis::ChiSquare { .. } => "Chi-Square Test",
            Analysis::OddsRatio(_) => "Odds ratio",
            Analysis::HardyWeinberg(_) => "Hardy Weinberg",
        }
    }
}

/// Parses a menu label. Loci default to VDR FokI and the chi-square test
/// to group by VDR FokI; adjust the selections afterwards as needed.
impl FromStr for Analysis {
    type Err = AssociationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "chisquaretest" | "chisquare" | "chi2" => Ok(Analysis::ChiSquare {
                rows: Field::Group,
                cols: Field::Locus(Locus::VdrFokI),
            }),
            "oddsratio" | "or" => Ok(Analysis::OddsRatio(Locus::VdrFokI)),
            "hardyweinberg" | "hwe" | "hw" => Ok(Analysis::HardyWeinberg(Locus::VdrFokI)),
            _ => Err(AssociationError::InvalidParameter(
                "analysis".to_string(),
                "one of Chi-Square Test, Odds ratio, Hardy Weinberg".to_string(),
                s.to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Report {
    ChiSquare(ChiSquareResult),
    OddsRatio(OddsRatioResult),
    HardyWeinberg(Vec<HardyWeinbergResult>),
}

/// Validates `config` and runs `analysis` on `sample`.
pub fn run(
    sample: &Sample,
    analysis: &Analysis,
    config: &AnalysisConfig,
) -> Result<Report, AssociationError> {
    config.validate()?;
    info!("Running {} on {} observations.", analysis.name(), sample.len());
    Ok(match analysis {
        Analysis::ChiSquare { rows, cols } => {
            Report::ChiSquare(sample.chi_square(rows, cols, config)?)
        }
        Analysis::OddsRatio(locus) => Report::OddsRatio(sample.odds_ratio(*locus, config)?),
        Analysis::HardyWeinberg(locus) => {
            Report::HardyWeinberg(sample.hardy_weinberg_by_group(*locus, config)?)
        }
    })
}
