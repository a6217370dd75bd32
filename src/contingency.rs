//! Contingency tables
//!
//! Cross-tabulation of two categorical columns of a `Sample`.
use crate::prelude::*;
use log::debug;
use ndarray::{Array1, Array2, Axis};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Ordering key and label of a category. Genotypes sort by genotype
/// order, everything else by label.
type Category = (usize, String);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContingencyTable {
    row_labels: Vec<String>,
    col_labels: Vec<String>,
    counts: Array2<Count>,
}

impl ContingencyTable {
    /// Wraps a count matrix. Labels must match its dimensions.
    pub fn new(
        row_labels: Vec<String>,
        col_labels: Vec<String>,
        counts: Array2<Count>,
    ) -> Result<Self, AssociationError> {
        let (rows, cols) = counts.dim();
        if rows != row_labels.len() || cols != col_labels.len() {
            return Err(AssociationError::InvalidShape(
                rows,
                cols,
                format!(
                    "{} row labels and {} column labels given",
                    row_labels.len(),
                    col_labels.len()
                ),
            ));
        }
        Ok(Self {
            row_labels,
            col_labels,
            counts,
        })
    }

    /// Builds a table from row-major counts, labelling rows and columns
    /// by position.
    pub fn from_rows(rows: &[Vec<Count>]) -> Result<Self, AssociationError> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, |r| r.len());
        if rows.iter().any(|r| r.len() != n_cols) {
            return Err(AssociationError::InvalidShape(
                n_rows,
                n_cols,
                "rows have different lengths".to_string(),
            ));
        }
        let counts = Array2::from_shape_vec(
            (n_rows, n_cols),
            rows.iter().flatten().copied().collect(),
        )
        .map_err(|e| AssociationError::InvalidShape(n_rows, n_cols, e.to_string()))?;
        Self::new(
            (0..n_rows).map(|i| i.to_string()).collect(),
            (0..n_cols).map(|j| j.to_string()).collect(),
            counts,
        )
    }

    /// Cross-tabulates two fields of `sample`.
    ///
    /// Only categories present in the data appear, and combinations that
    /// never occur count as zero. Observations with an empty value in
    /// either field are left out.
    pub fn crosstab(
        sample: &Sample,
        rows: &Field,
        cols: &Field,
        config: &AnalysisConfig,
    ) -> Result<Self, AssociationError> {
        let rows = rows.resolve(config);
        let cols = cols.resolve(config);
        let row_index = sample.field_index(rows.name(config))?;
        let col_index = sample.field_index(cols.name(config))?;

        let mut pairs: Vec<(Category, Category)> = Vec::with_capacity(sample.len());
        let mut skipped = 0;
        for observation in sample.observations() {
            match (observation.value(row_index), observation.value(col_index)) {
                (Some(r), Some(c)) => pairs.push((category(&rows, r)?, category(&cols, c)?)),
                _ => skipped += 1,
            }
        }
        if skipped > 0 {
            debug!(
                "Left {} observations with empty `{}` or `{}` out of the table.",
                skipped,
                rows.name(config),
                cols.name(config)
            );
        }

        let row_positions = positions(pairs.iter().map(|(r, _)| r));
        let col_positions = positions(pairs.iter().map(|(_, c)| c));
        let mut counts: Array2<Count> = Array2::zeros((row_positions.len(), col_positions.len()));
        for (r, c) in &pairs {
            counts[[row_positions[r], col_positions[c]]] += 1;
        }

        Self::new(labels(row_positions), labels(col_positions), counts)
    }

    /// The 3x2 genotype-by-group table of a locus.
    ///
    /// Rows are the three genotypes in genotype order and columns are
    /// (case, control); empty rows are kept.
    pub fn genotype_by_group(
        sample: &Sample,
        locus: Locus,
        config: &AnalysisConfig,
    ) -> Result<Self, AssociationError> {
        let (case, control) = sample.case_control(config)?;
        let mut counts: Array2<Count> = Array2::zeros((Genotype::ALL.len(), 2));
        for (j, group) in [&case, &control].iter().enumerate() {
            for genotype in sample.genotypes(locus, group, config)? {
                counts[[genotype.index(), j]] += 1;
            }
        }
        Self::new(locus.alphabet().to_vec(), vec![case, control], counts)
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        self.counts.dim()
    }

    pub fn counts(&self) -> &Array2<Count> {
        &self.counts
    }

    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    pub fn col_labels(&self) -> &[String] {
        &self.col_labels
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Count> {
        self.counts.get([row, col]).copied()
    }

    pub fn row_totals(&self) -> Array1<Count> {
        self.counts.sum_axis(Axis(1))
    }

    pub fn col_totals(&self) -> Array1<Count> {
        self.counts.sum_axis(Axis(0))
    }

    pub fn total(&self) -> Count {
        self.counts.sum()
    }
}

fn category(field: &Field, value: &str) -> Result<Category, AssociationError> {
    match field {
        Field::Locus(locus) => {
            let genotype = locus.parse_genotype(value)?;
            Ok((genotype.index(), locus.symbol(genotype)))
        }
        _ => Ok((0, value.to_owned())),
    }
}

fn positions<'a, I>(categories: I) -> BTreeMap<Category, usize>
where
    I: Iterator<Item = &'a Category>,
{
    categories
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .enumerate()
        .map(|(i, c)| (c, i))
        .collect()
}

fn labels(positions: BTreeMap<Category, usize>) -> Vec<String> {
    positions.into_iter().map(|((_, label), _)| label).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use std::error::Error;

    fn sample() -> Result<Sample, AssociationError> {
        Sample::from_records(
            vec!["Grupa", "VDR FokI", "BSM", "Sex"],
            vec![
                vec!["case", "TT", "AA", "F"],
                vec!["case", "CT", "AG", "M"],
                vec!["case", "TC", "GG", "F"],
                vec!["control", "CC", "AA", ""],
                vec!["control", "CC", "GA", "M"],
                vec!["control", "TT", "AA", "M"],
            ],
        )
    }

    #[test]
    fn test_crosstab_counts_and_order() -> Result<(), Box<dyn Error>> {
        let config = AnalysisConfig::default();
        let table = ContingencyTable::crosstab(
            &sample()?,
            &Field::Group,
            &Field::Locus(Locus::VdrFokI),
            &config,
        )?;
        assert_eq!(table.row_labels(), ["case", "control"]);
        assert_eq!(table.col_labels(), ["CC", "CT", "TT"]);
        assert_eq!(table.counts(), &array![[0u64, 2, 1], [2, 0, 1]]);
        assert_eq!(table.total(), 6);
        assert_eq!(table.row_totals(), array![3u64, 3]);
        assert_eq!(table.col_totals(), array![2u64, 2, 2]);
        Ok(())
    }

    #[test]
    fn test_locus_selected_by_name_is_normalized() -> Result<(), Box<dyn Error>> {
        let config = AnalysisConfig::default();
        let sample = sample()?;
        let by_name = ContingencyTable::crosstab(&sample, &"Grupa".into(), &"BSM".into(), &config)?;
        let by_locus =
            ContingencyTable::crosstab(&sample, &Field::Group, &Locus::Bsm.into(), &config)?;
        assert_eq!(by_name, by_locus);
        assert_eq!(by_name.col_labels(), ["AA", "AG", "GG"]);
        Ok(())
    }

    #[test]
    fn test_empty_cells_are_left_out() -> Result<(), Box<dyn Error>> {
        let config = AnalysisConfig::default();
        let table = ContingencyTable::crosstab(&sample()?, &Field::Group, &"Sex".into(), &config)?;
        assert_eq!(table.col_labels(), ["F", "M"]);
        assert_eq!(table.total(), 5);
        Ok(())
    }

    #[test]
    fn test_missing_field_is_schema_error() -> Result<(), Box<dyn Error>> {
        let config = AnalysisConfig::default();
        let result = ContingencyTable::crosstab(&sample()?, &Field::Group, &"Age".into(), &config);
        assert!(matches!(result, Err(AssociationError::Schema(ref f)) if f == "Age"));
        Ok(())
    }

    #[test]
    fn test_unknown_genotype_is_rejected() -> Result<(), Box<dyn Error>> {
        let sample = Sample::from_records(
            vec!["Grupa", "BSM"],
            vec![vec!["case", "AA"], vec!["control", "CT"]],
        )?;
        let result = ContingencyTable::crosstab(
            &sample,
            &Field::Group,
            &Locus::Bsm.into(),
            &AnalysisConfig::default(),
        );
        assert!(matches!(result, Err(AssociationError::UnknownGenotype(_, _))));
        Ok(())
    }

    #[test]
    fn test_genotype_by_group_keeps_empty_rows() -> Result<(), Box<dyn Error>> {
        let sample = Sample::from_records(
            vec!["Grupa", "BSM"],
            vec![vec!["case", "AA"], vec!["control", "GA"], vec!["case", "AA"]],
        )?;
        let config = AnalysisConfig::default();
        let table = ContingencyTable::genotype_by_group(&sample, Locus::Bsm, &config)?;
        assert_eq!(table.shape(), (3, 2));
        assert_eq!(table.row_labels(), ["AA", "AG", "GG"]);
        assert_eq!(table.col_labels(), ["case", "control"]);
        assert_eq!(table.counts(), &array![[2u64, 0], [0, 1], [0, 0]]);
        Ok(())
    }

    #[test]
    fn test_genotype_by_group_matches_crosstab() -> Result<(), Box<dyn Error>> {
        let config = AnalysisConfig::default();
        let sample = sample()?;
        let fixed = ContingencyTable::genotype_by_group(&sample, Locus::VdrFokI, &config)?;
        let crossed =
            ContingencyTable::crosstab(&sample, &"VDR FokI".into(), &Field::Group, &config)?;
        assert_eq!(fixed.counts(), crossed.counts());
        Ok(())
    }

    #[test]
    fn test_from_rows_rejects_ragged_input() {
        assert!(ContingencyTable::from_rows(&[vec![1, 2], vec![3]]).is_err());
        assert!(ContingencyTable::new(vec!["a".into()], vec![], Array2::zeros((2, 2))).is_err());
    }
}
