//! Chi-square test of independence
//!
//! Pearson's test over an R x C contingency table, with the p-value taken
//! from the upper tail of the chi-square distribution.
use crate::prelude::*;
use log::{info, warn};
use ndarray::Array2;
use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF};

/// Expected counts below this make the asymptotic p-value unreliable.
const MIN_RELIABLE_EXPECTED: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChiSquareResult {
    /// The observed counts the test ran on.
    pub table: ContingencyTable,
    pub expected: Array2<f64>,
    pub statistic: f64,
    pub degrees_of_freedom: usize,
    pub p_value: f64,
    pub significance_level: f64,
    /// `p_value < significance_level`
    pub significant: bool,
}

impl ChiSquareResult {
    pub fn from_table(
        table: ContingencyTable,
        config: &AnalysisConfig,
    ) -> Result<Self, AssociationError> {
        config.validate()?;
        let expected = expected_counts(&table)?;
        let (rows, cols) = table.shape();
        let degrees_of_freedom = (rows - 1) * (cols - 1);

        let statistic = ndarray::Zip::from(table.counts())
            .and(&expected)
            .fold(0.0, |acc, &o, &e| acc + (o as f64 - e).powi(2) / e);
        let p_value = upper_tail(statistic, degrees_of_freedom)?;

        if expected.iter().any(|&e| e < MIN_RELIABLE_EXPECTED) {
            warn!(
                "Some expected counts are below {}, the chi-square approximation may be poor.",
                MIN_RELIABLE_EXPECTED
            );
        }

        Ok(Self {
            table,
            expected,
            statistic,
            degrees_of_freedom,
            p_value,
            significance_level: config.significance_level,
            significant: p_value < config.significance_level,
        })
    }
}

/// Expected counts under independence, `row_total * col_total / total`.
///
/// Fails if the table is smaller than 2x2 or if any expected count is zero,
/// which happens exactly when a row or column total is zero.
pub fn expected_counts(table: &ContingencyTable) -> Result<Array2<f64>, AssociationError> {
    let (rows, cols) = table.shape();
    if rows < 2 || cols < 2 {
        return Err(AssociationError::InvalidShape(
            rows,
            cols,
            "at least two rows and two columns are needed".to_string(),
        ));
    }

    let row_totals = table.row_totals();
    let col_totals = table.col_totals();
    if let Some(i) = row_totals.iter().position(|&t| t == 0) {
        return Err(AssociationError::DegenerateTable(
            table.row_labels()[i].clone(),
            table.col_labels()[0].clone(),
        ));
    }
    if let Some(j) = col_totals.iter().position(|&t| t == 0) {
        return Err(AssociationError::DegenerateTable(
            table.row_labels()[0].clone(),
            table.col_labels()[j].clone(),
        ));
    }

    let total = table.total() as f64;
    Ok(Array2::from_shape_fn((rows, cols), |(i, j)| {
        row_totals[i] as f64 * col_totals[j] as f64 / total
    }))
}

/// `P(X >= statistic)` for X chi-square distributed with `degrees_of_freedom`.
pub fn upper_tail(statistic: f64, degrees_of_freedom: usize) -> Result<f64, AssociationError> {
    let dist = ChiSquared::new(degrees_of_freedom as f64)
        .map_err(|e| AssociationError::Distribution(e.to_string()))?;
    Ok(dist.sf(statistic).clamp(0.0, 1.0))
}

pub trait ChiSquare {
    fn chi_square(
        &self,
        rows: &Field,
        cols: &Field,
        config: &AnalysisConfig,
    ) -> Result<ChiSquareResult, AssociationError>;
}

impl ChiSquare for Sample {
    fn chi_square(
        &self,
        rows: &Field,
        cols: &Field,
        config: &AnalysisConfig,
    ) -> Result<ChiSquareResult, AssociationError> {
        let table = ContingencyTable::crosstab(self, rows, cols, config)?;
        let result = ChiSquareResult::from_table(table, config)?;
        info!(
            "Chi-square of `{}` by `{}`: statistic {:.4}, dof {}, p {:.4}.",
            rows.name(config),
            cols.name(config),
            result.statistic,
            result.degrees_of_freedom,
            result.p_value
        );
        Ok(result)
    }
}
