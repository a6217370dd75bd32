//! Allelic odds ratio
//!
//! Turns the genotype-by-group table of a locus into allele counts and
//! measures the association of the major allele with the case group.
use crate::prelude::*;
use log::{info, warn};
use serde::Serialize;

/// 2x2 allele-by-group table.
///
/// Rows are (major, minor) allele, columns are (case, control), so the
/// cells read a, b, c, d in row-major order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AlleleTable {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl AlleleTable {
    pub fn new(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self { a, b, c, d }
    }

    /// Allele counts from a 3x2 genotype-by-group table.
    ///
    /// Homozygotes carry two copies of their allele and heterozygotes one
    /// of each.
    pub fn from_genotype_table(table: &ContingencyTable) -> Result<Self, AssociationError> {
        let (rows, cols) = table.shape();
        if rows != 3 || cols != 2 {
            return Err(AssociationError::InvalidShape(
                rows,
                cols,
                "a genotype table needs three genotype rows and two group columns".to_string(),
            ));
        }
        let counts = table.counts();
        let alleles = |group: usize| {
            Genotype::ALL.iter().fold((0, 0), |(major, minor), &g| {
                let (m, n) = g.allele_copies();
                let count = counts[[g.index(), group]];
                (major + m * count, minor + n * count)
            })
        };
        let (case_major, case_minor) = alleles(0);
        let (control_major, control_minor) = alleles(1);
        Ok(Self::new(
            case_major as f64,
            control_major as f64,
            case_minor as f64,
            control_minor as f64,
        ))
    }

    pub fn cells(&self) -> [f64; 4] {
        [self.a, self.b, self.c, self.d]
    }

    pub fn corrected(&self, correction: f64) -> Self {
        Self::new(
            self.a + correction,
            self.b + correction,
            self.c + correction,
            self.d + correction,
        )
    }

    /// Cross-product ratio ad / bc. `None` when any cell is zero.
    pub fn odds_ratio(&self) -> Option<f64> {
        if self.cells().iter().any(|&x| x <= 0.0) {
            return None;
        }
        Some((self.a * self.d) / (self.b * self.c))
    }

    /// Standard error of ln(OR). `None` when any cell is zero.
    pub fn log_standard_error(&self) -> Option<f64> {
        if self.cells().iter().any(|&x| x <= 0.0) {
            return None;
        }
        Some(self.cells().iter().map(|x| 1.0 / x).sum::<f64>().sqrt())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OddsRatioResult {
    pub locus: Locus,
    pub case_group: String,
    pub control_group: String,
    pub genotype_table: ContingencyTable,
    /// Allele counts as observed, before any correction.
    pub allele_table: AlleleTable,
    pub odds_ratio: f64,
    /// (low, high)
    pub confidence_interval: (f64, f64),
    pub z_critical: f64,
    pub continuity_corrected: bool,
}

impl OddsRatioResult {
    pub fn from_genotype_table(
        locus: Locus,
        genotype_table: ContingencyTable,
        config: &AnalysisConfig,
    ) -> Result<Self, AssociationError> {
        config.validate()?;
        let allele_table = AlleleTable::from_genotype_table(&genotype_table)?;
        let (used, continuity_corrected) =
            apply_zero_cell_policy(locus, &allele_table, &genotype_table, config)?;
        let (odds_ratio, confidence_interval) = odds_ratio_interval(&used, config.z_critical)
            .ok_or_else(|| degenerate_cell(locus, &used, &genotype_table))?;

        let labels = genotype_table.col_labels();
        Ok(Self {
            locus,
            case_group: labels[0].clone(),
            control_group: labels[1].clone(),
            allele_table,
            genotype_table,
            odds_ratio,
            confidence_interval,
            z_critical: config.z_critical,
            continuity_corrected,
        })
    }
}

/// Odds ratio and the interval exp(ln OR ± z·SE).
pub fn odds_ratio_interval(table: &AlleleTable, z_critical: f64) -> Option<(f64, (f64, f64))> {
    let odds_ratio = table.odds_ratio()?;
    let se = table.log_standard_error()?;
    let log_or = odds_ratio.ln();
    Some((
        odds_ratio,
        ((log_or - z_critical * se).exp(), (log_or + z_critical * se).exp()),
    ))
}

fn apply_zero_cell_policy(
    locus: Locus,
    table: &AlleleTable,
    genotype_table: &ContingencyTable,
    config: &AnalysisConfig,
) -> Result<(AlleleTable, bool), AssociationError> {
    if table.cells().iter().all(|&x| x > 0.0) {
        return Ok((*table, false));
    }
    match config.zero_cell_policy {
        ZeroCellPolicy::Fail => Err(degenerate_cell(locus, table, genotype_table)),
        ZeroCellPolicy::ContinuityCorrection => {
            warn!(
                "Allele table for {} has an empty cell, adding {} to every cell.",
                locus, config.continuity_correction
            );
            Ok((table.corrected(config.continuity_correction), true))
        }
    }
}

fn degenerate_cell(
    locus: Locus,
    table: &AlleleTable,
    genotype_table: &ContingencyTable,
) -> AssociationError {
    let (major, minor) = locus.alleles();
    let groups = genotype_table.col_labels();
    let position = table.cells().iter().position(|&x| x <= 0.0).unwrap_or(0);
    let allele = if position < 2 { major } else { minor };
    AssociationError::DegenerateCell(allele.to_string(), groups[position % 2].clone())
}

pub trait OddsRatio {
    fn odds_ratio(
        &self,
        locus: Locus,
        config: &AnalysisConfig,
    ) -> Result<OddsRatioResult, AssociationError>;
}

impl OddsRatio for Sample {
    fn odds_ratio(
        &self,
        locus: Locus,
        config: &AnalysisConfig,
    ) -> Result<OddsRatioResult, AssociationError> {
        let table = ContingencyTable::genotype_by_group(self, locus, config)?;
        let result = OddsRatioResult::from_genotype_table(locus, table, config)?;
        info!(
            "Odds ratio at {} ({} vs {}): {:.4} [{:.4}, {:.4}].",
            locus,
            result.case_group,
            result.control_group,
            result.odds_ratio,
            result.confidence_interval.0,
            result.confidence_interval.1
        );
        Ok(result)
    }
}
