//! Compromise-ranking aggregation of one hierarchy level.
//!
//! Each group is scored independently: values are normalized against the
//! per-criterion extrema, weighted, and compared with the ideal and anti-ideal
//! group sums. The utility degree of every object is scaled by a baseline taken
//! from the first object of the run.

use serde::Serialize;
use tracing::debug;

use super::criteria::{
    CriteriaConfiguration, CriteriaGroup, Criterion, CriterionSource, CriterionSpec, Direction,
    Level,
};
use super::domain::CandidateObject;
use super::error::{DegenerateReason, RankingError, ValidationIssue};

/// Source of per-object criterion values consumed by the aggregator.
///
/// `index` is the object's position in the run's candidate slice.
pub trait CriterionValues {
    fn value(&self, index: usize, criterion: Criterion) -> Option<f64>;
}

/// Raw metrics recorded on the candidate objects.
pub struct StoredCriterionValues<'a> {
    objects: &'a [CandidateObject],
}

impl<'a> StoredCriterionValues<'a> {
    pub fn new(objects: &'a [CandidateObject]) -> Self {
        Self { objects }
    }
}

impl CriterionValues for StoredCriterionValues<'_> {
    fn value(&self, index: usize, criterion: Criterion) -> Option<f64> {
        if !criterion.is_stored() {
            return None;
        }
        self.objects.get(index)?.metric(criterion)
    }
}

/// Group scores of a lower level, exposed as shadow criteria.
pub struct DerivedCriterionValues<'a> {
    lower: &'a LevelResult,
}

impl<'a> DerivedCriterionValues<'a> {
    pub fn new(lower: &'a LevelResult) -> Self {
        Self { lower }
    }
}

impl CriterionValues for DerivedCriterionValues<'_> {
    fn value(&self, index: usize, criterion: Criterion) -> Option<f64> {
        match criterion.source() {
            CriterionSource::Derived(group) => self.lower.score(index, group),
            CriterionSource::Stored => None,
        }
    }
}

/// Stored metrics and lower-level scores combined, routed by criterion source.
pub struct LevelInputs<'a> {
    stored: StoredCriterionValues<'a>,
    derived: DerivedCriterionValues<'a>,
}

impl<'a> LevelInputs<'a> {
    pub fn new(objects: &'a [CandidateObject], lower: &'a LevelResult) -> Self {
        Self {
            stored: StoredCriterionValues::new(objects),
            derived: DerivedCriterionValues::new(lower),
        }
    }
}

impl CriterionValues for LevelInputs<'_> {
    fn value(&self, index: usize, criterion: Criterion) -> Option<f64> {
        match criterion.source() {
            CriterionSource::Stored => self.stored.value(index, criterion),
            CriterionSource::Derived(_) => self.derived.value(index, criterion),
        }
    }
}

/// Aggregation output of a single group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupResult {
    pub group: CriteriaGroup,
    /// Utility degree per object, in run order.
    pub scores: Vec<f64>,
    /// Weighted normalized sum per object, in run order.
    pub weighted_sums: Vec<f64>,
    pub ideal_sum: f64,
    pub anti_ideal_sum: f64,
    pub f_plus: f64,
    pub f_minus: f64,
}

/// Aggregation output of every group of one level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelResult {
    pub level: Level,
    pub groups: Vec<GroupResult>,
}

impl LevelResult {
    pub fn group(&self, group: CriteriaGroup) -> Option<&GroupResult> {
        self.groups.iter().find(|result| result.group == group)
    }

    pub fn score(&self, index: usize, group: CriteriaGroup) -> Option<f64> {
        self.group(group)?.scores.get(index).copied()
    }
}

struct WeightedColumn {
    values: Vec<f64>,
    ideal: f64,
    anti_ideal: f64,
}

/// Scores the groups of a level against one criteria configuration.
pub struct LevelAggregator<'a> {
    config: &'a CriteriaConfiguration,
}

impl<'a> LevelAggregator<'a> {
    pub fn new(config: &'a CriteriaConfiguration) -> Self {
        Self { config }
    }

    pub fn aggregate_level<V>(
        &self,
        level: Level,
        objects: &[CandidateObject],
        values: &V,
    ) -> Result<LevelResult, RankingError>
    where
        V: CriterionValues + ?Sized,
    {
        let groups = level
            .groups()
            .iter()
            .map(|group| self.aggregate_group(*group, objects, values))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(%level, objects = objects.len(), groups = groups.len(), "level aggregated");

        Ok(LevelResult { level, groups })
    }

    pub fn aggregate_group<V>(
        &self,
        group: CriteriaGroup,
        objects: &[CandidateObject],
        values: &V,
    ) -> Result<GroupResult, RankingError>
    where
        V: CriterionValues + ?Sized,
    {
        let reference = objects
            .first()
            .ok_or(RankingError::Validation(ValidationIssue::NoObjects))?;

        let columns = group
            .criteria()
            .iter()
            .map(|criterion| {
                let spec = self.config.spec(*criterion)?;
                let raw = collect_column(*criterion, objects, values)?;
                weigh_column(group, *criterion, spec, objects, &raw)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let weighted_sums: Vec<f64> = (0..objects.len())
            .map(|index| columns.iter().map(|column| column.values[index]).sum())
            .collect();
        let ideal_sum: f64 = columns.iter().map(|column| column.ideal).sum();
        let anti_ideal_sum: f64 = columns.iter().map(|column| column.anti_ideal).sum();

        ensure_finite(group, ideal_sum)?;
        ensure_finite(group, anti_ideal_sum)?;
        if anti_ideal_sum == 0.0 {
            return Err(RankingError::degenerate_group(
                group,
                DegenerateReason::ZeroAntiIdealSum,
            ));
        }
        if ideal_sum == 0.0 {
            return Err(RankingError::degenerate_group(
                group,
                DegenerateReason::ZeroIdealSum,
            ));
        }

        let k_minus: Vec<f64> = weighted_sums.iter().map(|sum| sum / anti_ideal_sum).collect();
        let k_plus: Vec<f64> = weighted_sums.iter().map(|sum| sum / ideal_sum).collect();

        let reference_utility = k_minus[0] + k_plus[0];
        if reference_utility == 0.0 {
            return Err(RankingError::degenerate_group(
                group,
                DegenerateReason::ZeroReferenceUtility {
                    object: reference.id.clone(),
                },
            ));
        }
        let f_plus = k_plus[0] / reference_utility;
        let f_minus = k_minus[0] / reference_utility;
        if f_plus == 0.0 || f_minus == 0.0 {
            return Err(RankingError::degenerate_group(
                group,
                DegenerateReason::ZeroReferenceRatio,
            ));
        }

        let denominator = 1.0 + (1.0 - f_plus) / f_plus + (1.0 - f_minus) / f_minus;
        ensure_finite(group, denominator)?;
        if denominator == 0.0 {
            return Err(RankingError::degenerate_group(
                group,
                DegenerateReason::ZeroUtilityDenominator,
            ));
        }

        let scores = k_minus
            .iter()
            .zip(&k_plus)
            .map(|(minus, plus)| {
                let score = (minus + plus) / denominator;
                ensure_finite(group, score).map(|_| score)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(GroupResult {
            group,
            scores,
            weighted_sums,
            ideal_sum,
            anti_ideal_sum,
            f_plus,
            f_minus,
        })
    }
}

fn collect_column<V>(
    criterion: Criterion,
    objects: &[CandidateObject],
    values: &V,
) -> Result<Vec<f64>, RankingError>
where
    V: CriterionValues + ?Sized,
{
    objects
        .iter()
        .enumerate()
        .map(|(index, object)| {
            values.value(index, criterion).ok_or_else(|| {
                RankingError::Validation(ValidationIssue::MissingMetric {
                    object: object.id.clone(),
                    criterion,
                })
            })
        })
        .collect()
}

fn extrema(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), value| {
            (min.min(*value), max.max(*value))
        })
}

fn weigh_column(
    group: CriteriaGroup,
    criterion: Criterion,
    spec: CriterionSpec,
    objects: &[CandidateObject],
    raw: &[f64],
) -> Result<WeightedColumn, RankingError> {
    let (min, max) = extrema(raw);

    let normalized = match spec.direction {
        Direction::Benefit => {
            if max == 0.0 {
                return Err(RankingError::degenerate_criterion(
                    group,
                    criterion,
                    DegenerateReason::ZeroMaximum,
                ));
            }
            raw.iter().map(|value| value / max).collect::<Vec<_>>()
        }
        Direction::Cost => raw
            .iter()
            .zip(objects)
            .map(|(value, object)| {
                if *value == 0.0 {
                    Err(RankingError::degenerate_criterion(
                        group,
                        criterion,
                        DegenerateReason::ZeroCostValue {
                            object: object.id.clone(),
                        },
                    ))
                } else {
                    Ok(min / value)
                }
            })
            .collect::<Result<Vec<_>, _>>()?,
    };

    let values: Vec<f64> = normalized.iter().map(|value| spec.weight * value).collect();
    if values.iter().any(|value| !value.is_finite()) {
        return Err(RankingError::degenerate_criterion(
            group,
            criterion,
            DegenerateReason::NonFinite,
        ));
    }
    let (anti_ideal, ideal) = extrema(&values);

    Ok(WeightedColumn {
        values,
        ideal,
        anti_ideal,
    })
}

fn ensure_finite(group: CriteriaGroup, value: f64) -> Result<(), RankingError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(RankingError::degenerate_group(
            group,
            DegenerateReason::NonFinite,
        ))
    }
}
