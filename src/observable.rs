use crate::prelude::*;
use csv;
use log::info;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Produces Observations from delimited data
///
/// `Csv` implements Iterator so it can be passed
/// directly to `Sample::observe()`
pub struct Csv {
    records: std::iter::Enumerate<csv::StringRecordsIntoIter<Box<dyn Read>>>,
    fields: Vec<String>,
}

impl Csv {
    fn new(records: csv::StringRecordsIntoIter<Box<dyn Read>>, fields: Vec<String>) -> Self {
        Self {
            records: records.enumerate(),
            fields,
        }
    }

    /// The header row.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

impl Iterator for Csv {
    type Item = Result<Observation, AssociationError>;

    fn next(&mut self) -> Option<Result<Observation, AssociationError>> {
        match self.records.next()? {
            (_, Ok(row)) => Some(Ok(Observation::new(
                row.iter().map(|field| field.to_string()).collect(),
            ))),
            (idx, Err(e)) => {
                log::error!("Unable to read record {}: {}", idx, e);
                Some(Err(e.into()))
            }
        }
    }
}

pub struct CsvBuilder {
    delimiter: u8,
    group_field: String,
    required: Vec<String>,
}

impl CsvBuilder {
    /// Construct a new Csv builder
    ///
    /// By default the group column and both locus columns are required.
    pub fn new() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }

    /// A builder requiring `config.group_field` and both locus columns.
    pub fn from_config(config: &AnalysisConfig) -> Self {
        let mut required = vec![config.group_field.clone()];
        required.extend(Locus::ALL.iter().map(|l| l.column().to_owned()));
        Self {
            delimiter: b',',
            group_field: config.group_field.clone(),
            required,
        }
    }

    pub fn delimiter(&mut self, delimiter: u8) -> &mut Self {
        self.delimiter = delimiter;
        self
    }

    /// Renames the required group column.
    pub fn group_field(&mut self, group_field: &str) -> &mut Self {
        let current = &self.group_field;
        match self.required.iter_mut().find(|r| **r == *current) {
            Some(column) => *column = group_field.to_owned(),
            None => self.required.insert(0, group_field.to_owned()),
        }
        self.group_field = group_field.to_owned();
        self
    }

    /// Replaces the set of columns the header must contain, group column
    /// included.
    pub fn required(&mut self, required: Vec<String>) -> &mut Self {
        self.required = required;
        self
    }

    pub fn from_reader(&self, reader: Box<dyn Read>) -> Result<Csv, AssociationError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(self.delimiter)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let fields: Vec<String> = rdr.headers()?.iter().map(|s| s.to_string()).collect();
        if let Some(missing) = self
            .required
            .iter()
            .find(|r| !fields.iter().any(|f| f == *r))
        {
            return Err(AssociationError::Schema(missing.clone()));
        }

        Ok(Csv::new(rdr.into_records(), fields))
    }

    /// Reads a whole table into a `Sample`.
    pub fn sample_from_reader(&self, reader: Box<dyn Read>) -> Result<Sample, AssociationError> {
        let csv = self.from_reader(reader)?;
        let mut sample = Sample::new(csv.fields().to_vec());
        sample.observe(csv)?;
        info!(
            "Loaded {} observations over fields {:?}.",
            sample.len(),
            sample.fields()
        );
        Ok(sample)
    }

    pub fn sample_from_path<P: AsRef<Path>>(&self, path: P) -> Result<Sample, AssociationError> {
        self.sample_from_reader(Box::new(File::open(path)?))
    }
}

impl Default for CsvBuilder {
    fn default() -> Self {
        Self::new()
    }
}
