use std::fmt;

use super::criteria::{CriteriaGroup, Criterion};
use super::domain::ObjectId;

/// Failure of a ranking run. No partial ranking is produced alongside any variant.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RankingError {
    #[error("degenerate input at {location}: {reason}")]
    DegenerateInput {
        location: DegenerateLocation,
        reason: DegenerateReason,
    },
    #[error("invalid ranking input: {0}")]
    Validation(ValidationIssue),
    #[error("object {0} was scored but is not part of the candidate set")]
    UnknownObject(ObjectId),
}

impl RankingError {
    pub(crate) fn degenerate_criterion(
        group: CriteriaGroup,
        criterion: Criterion,
        reason: DegenerateReason,
    ) -> Self {
        Self::DegenerateInput {
            location: DegenerateLocation::Criterion { group, criterion },
            reason,
        }
    }

    pub(crate) fn degenerate_group(group: CriteriaGroup, reason: DegenerateReason) -> Self {
        Self::DegenerateInput {
            location: DegenerateLocation::Group(group),
            reason,
        }
    }

    /// Input problems the caller can correct, as opposed to internal faults.
    pub fn is_caller_error(&self) -> bool {
        !matches!(self, RankingError::UnknownObject(_))
    }
}

/// Criterion or group at which a division became undefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegenerateLocation {
    Criterion {
        group: CriteriaGroup,
        criterion: Criterion,
    },
    Group(CriteriaGroup),
}

impl fmt::Display for DegenerateLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegenerateLocation::Criterion { group, criterion } => {
                write!(f, "criterion '{criterion}' in group '{group}'")
            }
            DegenerateLocation::Group(group) => write!(f, "group '{group}'"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DegenerateReason {
    #[error("maximum value across objects is zero")]
    ZeroMaximum,
    #[error("object {object} has a zero value for a cost criterion")]
    ZeroCostValue { object: ObjectId },
    #[error("ideal group sum is zero")]
    ZeroIdealSum,
    #[error("anti-ideal group sum is zero")]
    ZeroAntiIdealSum,
    #[error("reference object {object} has zero combined utility")]
    ZeroReferenceUtility { object: ObjectId },
    #[error("reference utility ratio is zero")]
    ZeroReferenceRatio,
    #[error("utility degree denominator is zero")]
    ZeroUtilityDenominator,
    #[error("computation produced a non-finite value")]
    NonFinite,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationIssue {
    #[error("at least one candidate object is required")]
    NoObjects,
    #[error("object id {0} appears more than once")]
    DuplicateObject(ObjectId),
    #[error("object {object} is missing a value for '{criterion}'")]
    MissingMetric { object: ObjectId, criterion: Criterion },
    #[error("object {object} supplies '{criterion}', which is computed by the hierarchy")]
    DerivedMetricSupplied { object: ObjectId, criterion: Criterion },
    #[error("object {object} has a non-finite value {value} for '{criterion}'")]
    NonFiniteMetric {
        object: ObjectId,
        criterion: Criterion,
        value: f64,
    },
    #[error("criteria configuration has no entry for '{0}'")]
    MissingCriterion(Criterion),
    #[error("weight {weight} for '{criterion}' must be a positive finite number")]
    InvalidWeight { criterion: Criterion, weight: f64 },
    #[error("result limit must be at least 1")]
    ZeroLimit,
}
