#![crate_name = "genassoc"]
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub mod prelude;

pub mod analysis;
pub mod chi_square;
pub mod config;
pub mod contingency;
pub mod errors;
pub mod genetics;
pub mod hardy_weinberg;
pub mod observable;
pub mod odds_ratio;

use crate::config::AnalysisConfig;
use crate::errors::AssociationError;
use crate::genetics::{Genotype, Locus};

pub type Count = u64;

/// Selects a column of a `Sample`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Field {
    /// The case/control column named by `AnalysisConfig::group_field`.
    Group,
    /// A genotype column. Values are normalized through `Locus::parse_genotype`.
    Locus(Locus),
    /// Any other column, by name.
    Column(String),
}

impl Field {
    /// Name of the column this field reads.
    pub fn name<'a>(&'a self, config: &'a AnalysisConfig) -> &'a str {
        match self {
            Field::Group => &config.group_field,
            Field::Locus(locus) => locus.column(),
            Field::Column(name) => name,
        }
    }

    /// Maps a column selected by name onto the group or locus it names,
    /// so a genotype column is normalized no matter how it was selected.
    pub fn resolve(&self, config: &AnalysisConfig) -> Field {
        match self {
            Field::Column(name) if *name == config.group_field => Field::Group,
            Field::Column(name) => match Locus::from_column(name) {
                Some(locus) => Field::Locus(locus),
                None => self.clone(),
            },
            _ => self.clone(),
        }
    }
}

impl From<Locus> for Field {
    fn from(locus: Locus) -> Self {
        Field::Locus(locus)
    }
}

impl From<&str> for Field {
    fn from(name: &str) -> Self {
        Field::Column(name.to_owned())
    }
}

/// One surveyed subject: a value per dataset field, in header order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    values: Vec<String>,
}

impl Observation {
    pub fn new(values: Vec<String>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// The value at `index`, or `None` when the cell is empty.
    pub fn value(&self, index: usize) -> Option<&str> {
        self.values
            .get(index)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

/// A loaded survey table.
///
/// Holds the header and one `Observation` per subject. A `Sample` is
/// never mutated by the tests; every test takes it by reference.
#[derive(Debug, Clone, Default)]
pub struct Sample {
    fields: Vec<String>,
    observations: Vec<Observation>,
}

impl Sample {
    /// Constructs a new empty `Sample` with the given header.
    ///
    /// The `Sample` can be filled up iteratively by calling
    /// `observe()`.
    pub fn new(fields: Vec<String>) -> Self {
        Self {
            fields,
            observations: vec![],
        }
    }

    /// Builds a `Sample` from in-memory rows.
    pub fn from_records<F, R, V>(fields: F, records: R) -> Result<Self, AssociationError>
    where
        F: IntoIterator,
        F::Item: Into<String>,
        R: IntoIterator<Item = V>,
        V: IntoIterator,
        V::Item: Into<String>,
    {
        let mut sample = Self::new(fields.into_iter().map(Into::into).collect());
        sample.observe(
            records
                .into_iter()
                .map(|r| Ok(Observation::new(r.into_iter().map(Into::into).collect()))),
        )?;
        Ok(sample)
    }

    /// Observes a single `Observation`.
    ///
    /// The observation must have exactly one value per field.
    pub fn _observe(&mut self, observation: Observation) -> Result<(), AssociationError> {
        if observation.values.len() != self.fields.len() {
            return Err(AssociationError::InvalidParameter(
                format!("observation {}", self.observations.len()),
                format!("{} values", self.fields.len()),
                observation.values.len().to_string(),
            ));
        }
        self.observations.push(observation);
        Ok(())
    }

    /// Observe all the data in the argument.
    pub fn observe<I>(&mut self, observable: I) -> Result<(), AssociationError>
    where
        I: Iterator<Item = Result<Observation, AssociationError>>,
    {
        for observation in observable {
            self._observe(observation?)?;
        }
        Ok(())
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Position of a column in the header.
    pub fn field_index(&self, name: &str) -> Result<usize, AssociationError> {
        self.fields
            .iter()
            .position(|f| f.trim() == name)
            .ok_or_else(|| AssociationError::Schema(name.to_owned()))
    }

    /// Fails with `AssociationError::Schema` naming the first absent field.
    pub fn require<'a, I>(&self, names: I) -> Result<(), AssociationError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        for name in names {
            self.field_index(name)?;
        }
        Ok(())
    }

    /// Non-empty values of a column, one per observation that has one.
    pub fn column<'a>(
        &'a self,
        name: &str,
    ) -> Result<impl Iterator<Item = &'a str> + 'a, AssociationError> {
        let index = self.field_index(name)?;
        Ok(self.observations.iter().filter_map(move |o| o.value(index)))
    }

    /// Distinct group labels in sorted order.
    pub fn groups(&self, config: &AnalysisConfig) -> Result<Vec<String>, AssociationError> {
        let groups: BTreeSet<&str> = self.column(&config.group_field)?.collect();
        Ok(groups.into_iter().map(str::to_owned).collect())
    }

    /// The two groups as (case, control).
    ///
    /// Fails with `AssociationError::InvalidShape` unless the group column
    /// holds exactly two labels.
    pub fn case_control(
        &self,
        config: &AnalysisConfig,
    ) -> Result<(String, String), AssociationError> {
        let groups = self.groups(config)?;
        if groups.len() != 2 {
            return Err(AssociationError::InvalidShape(
                groups.len(),
                1,
                format!("column `{}` must hold exactly two groups", config.group_field),
            ));
        }
        match &config.case_group {
            Some(case) => {
                let control = groups.iter().find(|g| *g != case).cloned();
                match control {
                    Some(control) if groups.contains(case) => Ok((case.clone(), control)),
                    _ => Err(AssociationError::InvalidParameter(
                        "case_group".to_string(),
                        format!("one of {:?}", groups),
                        case.clone(),
                    )),
                }
            }
            None => Ok((groups[0].clone(), groups[1].clone())),
        }
    }

    /// Genotype calls at `locus` for the subjects of `group`.
    ///
    /// Subjects with an empty call are skipped. Any other value outside the
    /// locus alphabet fails with `AssociationError::UnknownGenotype`.
    pub fn genotypes(
        &self,
        locus: Locus,
        group: &str,
        config: &AnalysisConfig,
    ) -> Result<Vec<Genotype>, AssociationError> {
        let group_index = self.field_index(&config.group_field)?;
        let locus_index = self.field_index(locus.column())?;
        let mut missing = 0;
        let mut genotypes = vec![];
        for observation in self
            .observations
            .iter()
            .filter(|o| o.value(group_index) == Some(group))
        {
            match observation.value(locus_index) {
                Some(value) => genotypes.push(locus.parse_genotype(value)?),
                None => missing += 1,
            }
        }
        if missing > 0 {
            debug!(
                "Skipped {} subjects of group `{}` with no call at {}.",
                missing, group, locus
            );
        }
        Ok(genotypes)
    }
}
