//! Errors
//!
//! Every fallible operation in the crate returns an `AssociationError`.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssociationError {
    /// A selected or required field is not present in the dataset.
    #[error("Field `{0}` is missing from the dataset.")]
    Schema(String),

    /// Table dimensions do not allow the test to run.
    #[error("Invalid table shape {0}x{1}: {2}.")]
    InvalidShape(usize, usize, String),

    /// Row label, column label. The expected count of that cell is zero.
    #[error("Expected count for cell ({0}, {1}) is zero, the chi-square statistic is undefined.")]
    DegenerateTable(String, String),

    /// Allele, group. That cell of the allele table is zero.
    #[error("Allele table cell ({0}, {1}) is zero, the odds ratio is undefined.")]
    DegenerateCell(String, String),

    /// Locus, group.
    #[error("No genotype calls for locus {0} in group `{1}`.")]
    EmptySample(String, String),

    /// Locus, offending value.
    #[error("Value `{1}` is not a valid genotype for locus {0}.")]
    UnknownGenotype(String, String),

    /// Name of the parameter, expected, provided.
    #[error("Invalid parameter value passed for {0}, expected {1} but {2} provided.")]
    InvalidParameter(String, String, String),

    /// The chi-square distribution rejected its parameters.
    #[error("Unable to build distribution: {0}")]
    Distribution(String),

    #[error("Unable to read CSV data: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unable to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unable to parse configuration: {0}")]
    Config(#[from] serde_json::Error),
}
