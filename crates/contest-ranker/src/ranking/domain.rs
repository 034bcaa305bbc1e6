use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::criteria::Criterion;
use super::error::{RankingError, ValidationIssue};

/// Identifier wrapper for competition entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub String);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A scorable entry together with its raw metric values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateObject {
    pub id: ObjectId,
    pub name: String,
    pub metrics: BTreeMap<Criterion, f64>,
}

impl CandidateObject {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ObjectId(id.into()),
            name: name.into(),
            metrics: BTreeMap::new(),
        }
    }

    pub fn with_metric(mut self, criterion: Criterion, value: f64) -> Self {
        self.metrics.insert(criterion, value);
        self
    }

    /// Sets every stored criterion to the same value.
    pub fn with_uniform_metrics(mut self, value: f64) -> Self {
        for criterion in Criterion::stored() {
            self.metrics.insert(criterion, value);
        }
        self
    }

    pub fn metric(&self, criterion: Criterion) -> Option<f64> {
        self.metrics.get(&criterion).copied()
    }

    /// Checks that the object carries exactly the stored criteria with finite values.
    pub fn validate(&self) -> Result<(), RankingError> {
        if let Some(criterion) = self.metrics.keys().find(|criterion| !criterion.is_stored()) {
            return Err(RankingError::Validation(
                ValidationIssue::DerivedMetricSupplied {
                    object: self.id.clone(),
                    criterion: *criterion,
                },
            ));
        }

        for criterion in Criterion::stored() {
            match self.metric(criterion) {
                None => {
                    return Err(RankingError::Validation(ValidationIssue::MissingMetric {
                        object: self.id.clone(),
                        criterion,
                    }))
                }
                Some(value) if !value.is_finite() => {
                    return Err(RankingError::Validation(
                        ValidationIssue::NonFiniteMetric {
                            object: self.id.clone(),
                            criterion,
                            value,
                        },
                    ))
                }
                Some(_) => {}
            }
        }

        Ok(())
    }
}

/// Validates a candidate set before any aggregation begins.
pub fn validate_objects(objects: &[CandidateObject]) -> Result<(), RankingError> {
    if objects.is_empty() {
        return Err(RankingError::Validation(ValidationIssue::NoObjects));
    }

    let mut seen = HashSet::with_capacity(objects.len());
    for object in objects {
        if !seen.insert(&object.id) {
            return Err(RankingError::Validation(ValidationIssue::DuplicateObject(
                object.id.clone(),
            )));
        }
        object.validate()?;
    }

    Ok(())
}
