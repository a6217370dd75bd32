//! Configuration
//!
//! Thresholds and policies shared by the tests. Every value has a
//! documented default, and a configuration can be read from JSON where
//! missing keys fall back to those defaults.
use crate::errors::AssociationError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// What the odds-ratio test does when the allele table has an empty cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZeroCellPolicy {
    /// Fail with `AssociationError::DegenerateCell`.
    Fail,
    /// Add `continuity_correction` to every cell and carry on.
    ContinuityCorrection,
}

impl Default for ZeroCellPolicy {
    fn default() -> Self {
        ZeroCellPolicy::Fail
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Column holding the case/control label.
    pub group_field: String,
    /// Group treated as the case group. `None` picks the first group in sorted order.
    pub case_group: Option<String>,
    /// A chi-square p-value below this is significant.
    pub significance_level: f64,
    /// Largest per-genotype deviation, in percent, still counted as equilibrium.
    pub equilibrium_threshold: f64,
    /// Normal quantile used for the odds-ratio confidence interval.
    pub z_critical: f64,
    pub zero_cell_policy: ZeroCellPolicy,
    /// Amount added to every allele table cell under `ContinuityCorrection`.
    pub continuity_correction: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            group_field: "Grupa".to_owned(),
            case_group: None,
            significance_level: 0.05,
            equilibrium_threshold: 5.0,
            z_critical: 1.96,
            zero_cell_policy: ZeroCellPolicy::Fail,
            continuity_correction: 0.5,
        }
    }
}

impl AnalysisConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, AssociationError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, AssociationError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    pub fn group_field(&mut self, group_field: &str) -> &mut Self {
        self.group_field = group_field.to_owned();
        self
    }

    pub fn case_group(&mut self, case_group: &str) -> &mut Self {
        self.case_group = Some(case_group.to_owned());
        self
    }

    pub fn significance_level(&mut self, significance_level: f64) -> &mut Self {
        self.significance_level = significance_level;
        self
    }

    pub fn equilibrium_threshold(&mut self, equilibrium_threshold: f64) -> &mut Self {
        self.equilibrium_threshold = equilibrium_threshold;
        self
    }

    pub fn z_critical(&mut self, z_critical: f64) -> &mut Self {
        self.z_critical = z_critical;
        self
    }

    pub fn zero_cell_policy(&mut self, zero_cell_policy: ZeroCellPolicy) -> &mut Self {
        self.zero_cell_policy = zero_cell_policy;
        self
    }

    pub fn continuity_correction(&mut self, continuity_correction: f64) -> &mut Self {
        self.continuity_correction = continuity_correction;
        self
    }

    /// Checks that every threshold is in its valid range.
    pub fn validate(&self) -> Result<(), AssociationError> {
        let invalid = |name: &str, expected: &str, value: f64| {
            Err(AssociationError::InvalidParameter(
                name.to_string(),
                expected.to_string(),
                value.to_string(),
            ))
        };
        if !(self.significance_level > 0.0 && self.significance_level < 1.0) {
            return invalid("significance_level", "a value in (0, 1)", self.significance_level);
        }
        if !(self.equilibrium_threshold > 0.0) {
            return invalid(
                "equilibrium_threshold",
                "a positive percentage",
                self.equilibrium_threshold,
            );
        }
        if !(self.z_critical > 0.0) {
            return invalid("z_critical", "a positive quantile", self.z_critical);
        }
        if !(self.continuity_correction > 0.0) {
            return invalid(
                "continuity_correction",
                "a positive amount",
                self.continuity_correction,
            );
        }
        if self.group_field.trim().is_empty() {
            return Err(AssociationError::InvalidParameter(
                "group_field".to_string(),
                "a column name".to_string(),
                "an empty string".to_string(),
            ));
        }
        Ok(())
    }
}
