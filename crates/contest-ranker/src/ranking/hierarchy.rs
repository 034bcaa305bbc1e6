use serde::{Deserialize, Serialize};
use tracing::debug;

use super::aggregator::{
    DerivedCriterionValues, LevelAggregator, LevelInputs, LevelResult, StoredCriterionValues,
};
use super::criteria::{CriteriaConfiguration, CriteriaGroup, Level};
use super::domain::CandidateObject;
use super::error::RankingError;

/// Score of one group for one object, used for audit breakdowns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupScore {
    pub level: Level,
    pub group: CriteriaGroup,
    pub score: f64,
}

/// Level results of a complete run, in evaluation order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HierarchyOutcome {
    pub deepest: LevelResult,
    pub middle: LevelResult,
    pub top: LevelResult,
}

impl HierarchyOutcome {
    /// Final preference of the object at `index`.
    pub fn preference(&self, index: usize) -> Option<f64> {
        self.top.score(index, CriteriaGroup::Overall)
    }

    pub fn preferences(&self) -> &[f64] {
        self.top
            .group(CriteriaGroup::Overall)
            .map(|result| result.scores.as_slice())
            .unwrap_or_default()
    }

    /// Every group score of the object at `index`, deepest level first.
    pub fn breakdown(&self, index: usize) -> Vec<GroupScore> {
        [&self.deepest, &self.middle, &self.top]
            .into_iter()
            .flat_map(|level| {
                level.groups.iter().filter_map(move |result| {
                    result.scores.get(index).map(|score| GroupScore {
                        level: level.level,
                        group: result.group,
                        score: *score,
                    })
                })
            })
            .collect()
    }
}

/// Runs the three aggregation levels and feeds each into the one above.
pub struct HierarchyRunner<'a> {
    aggregator: LevelAggregator<'a>,
}

impl<'a> HierarchyRunner<'a> {
    pub fn new(config: &'a CriteriaConfiguration) -> Self {
        Self {
            aggregator: LevelAggregator::new(config),
        }
    }

    /// Objects keep the caller's order at every level; the first one is the
    /// reference object of each group.
    pub fn run(&self, objects: &[CandidateObject]) -> Result<HierarchyOutcome, RankingError> {
        let deepest = self.aggregator.aggregate_level(
            Level::Deepest,
            objects,
            &StoredCriterionValues::new(objects),
        )?;

        let middle = self.aggregator.aggregate_level(
            Level::Middle,
            objects,
            &LevelInputs::new(objects, &deepest),
        )?;

        let top = self.aggregator.aggregate_level(
            Level::Top,
            objects,
            &DerivedCriterionValues::new(&middle),
        )?;

        debug!(objects = objects.len(), "hierarchy evaluated");

        Ok(HierarchyOutcome {
            deepest,
            middle,
            top,
        })
    }
}
