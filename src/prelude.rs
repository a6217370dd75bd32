pub use crate::analysis::{run, Analysis, Report};
pub use crate::chi_square::{ChiSquare, ChiSquareResult};
pub use crate::config::{AnalysisConfig, ZeroCellPolicy};
pub use crate::contingency::ContingencyTable;
pub use crate::errors::AssociationError;
pub use crate::genetics::{Genotype, Locus};
pub use crate::hardy_weinberg::{
    AlleleFrequencies, GenotypeCounts, GenotypePoint, HardyWeinberg, HardyWeinbergResult,
    Verdict,
};
pub use crate::observable::{Csv, CsvBuilder};
pub use crate::odds_ratio::{AlleleTable, OddsRatio, OddsRatioResult};
pub use crate::{Count, Field, Observation, Sample};
