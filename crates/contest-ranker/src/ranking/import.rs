use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::criteria::Criterion;
use super::domain::{CandidateObject, ObjectId};

#[derive(Debug)]
pub enum ObjectImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    MissingColumn(String),
    InvalidValue {
        line: u64,
        column: String,
        value: String,
    },
}

impl std::fmt::Display for ObjectImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectImportError::Io(err) => write!(f, "failed to read candidate export: {}", err),
            ObjectImportError::Csv(err) => write!(f, "invalid candidate CSV data: {}", err),
            ObjectImportError::MissingColumn(column) => {
                write!(f, "candidate CSV is missing the '{}' column", column)
            }
            ObjectImportError::InvalidValue {
                line,
                column,
                value,
            } => write!(
                f,
                "line {}: '{}' is not a number for column '{}'",
                line, value, column
            ),
        }
    }
}

impl std::error::Error for ObjectImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ObjectImportError::Io(err) => Some(err),
            ObjectImportError::Csv(err) => Some(err),
            ObjectImportError::MissingColumn(_) | ObjectImportError::InvalidValue { .. } => None,
        }
    }
}

impl From<std::io::Error> for ObjectImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ObjectImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Loads candidate objects from a CSV export with `id`, `name`, and one
/// column per stored criterion. Unrecognised columns are ignored.
pub struct ObjectImporter;

impl ObjectImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<CandidateObject>, ObjectImportError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<CandidateObject>, ObjectImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let position = |name: &str| {
            headers
                .iter()
                .position(|header| header.eq_ignore_ascii_case(name))
                .ok_or_else(|| ObjectImportError::MissingColumn(name.to_string()))
        };

        let id_column = position("id")?;
        let name_column = position("name")?;
        let mut metric_columns = BTreeMap::new();
        for (index, header) in headers.iter().enumerate() {
            match Criterion::from_key(header) {
                Some(criterion) if criterion.is_stored() => {
                    metric_columns.entry(criterion).or_insert(index);
                }
                _ => {}
            }
        }
        if let Some(missing) =
            Criterion::stored().find(|criterion| !metric_columns.contains_key(criterion))
        {
            return Err(ObjectImportError::MissingColumn(missing.key().to_string()));
        }

        let mut objects = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            let line = record.position().map(|pos| pos.line()).unwrap_or_default();
            let field = |index: usize| record.get(index).unwrap_or_default();

            let mut metrics = BTreeMap::new();
            for (criterion, index) in &metric_columns {
                let raw = field(*index);
                let value = raw
                    .parse::<f64>()
                    .map_err(|_| ObjectImportError::InvalidValue {
                        line,
                        column: criterion.key().to_string(),
                        value: raw.to_string(),
                    })?;
                metrics.insert(*criterion, value);
            }

            objects.push(CandidateObject {
                id: ObjectId(field(id_column).to_string()),
                name: field(name_column).to_string(),
                metrics,
            });
        }

        Ok(objects)
    }
}
