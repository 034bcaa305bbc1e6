//! Hierarchical compromise ranking of competition entries.
//!
//! A run validates the candidate set and criteria configuration, scores the
//! deepest level from stored metrics, feeds its group scores into the middle
//! level as shadow criteria, does the same for the top level, and finally
//! orders and truncates the top-level preferences.

pub mod aggregator;
pub mod assembler;
pub mod criteria;
pub mod domain;
pub mod error;
pub mod hierarchy;
pub mod import;
pub mod router;
pub mod service;
pub mod templates;

#[cfg(test)]
mod tests;

pub use aggregator::{
    CriterionValues, DerivedCriterionValues, GroupResult, LevelAggregator, LevelInputs,
    LevelResult, StoredCriterionValues,
};
pub use assembler::{RankedEntry, ResultAssembler};
pub use criteria::{
    CriteriaConfiguration, CriteriaGroup, Criterion, CriterionSource, CriterionSpec, Direction,
    Level,
};
pub use domain::{validate_objects, CandidateObject, ObjectId};
pub use error::{DegenerateLocation, DegenerateReason, RankingError, ValidationIssue};
pub use hierarchy::{GroupScore, HierarchyOutcome, HierarchyRunner};
pub use import::{ObjectImportError, ObjectImporter};
pub use router::ranking_router;
pub use service::{
    RankedEntryView, RankingRequest, RankingResponse, RankingService, RankingServiceError,
    TemplateRankingRequest,
};
pub use templates::{
    CriteriaTemplate, TemplateId, TemplateRepository, TemplateRepositoryError, TemplateSummary,
};

use tracing::info;

/// Stateless engine applying one criteria configuration to candidate sets.
#[derive(Debug, Clone)]
pub struct RankingEngine {
    config: CriteriaConfiguration,
}

impl RankingEngine {
    pub fn new(config: CriteriaConfiguration) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CriteriaConfiguration {
        &self.config
    }

    pub fn rank<'a>(&self, objects: &'a [CandidateObject]) -> Result<Ranking<'a>, RankingError> {
        self.config.validate()?;
        validate_objects(objects)?;

        let outcome = HierarchyRunner::new(&self.config).run(objects)?;

        let scores = objects
            .iter()
            .zip(outcome.preferences())
            .map(|(object, score)| (object.id.clone(), *score));
        let entries = ResultAssembler::from_config(&self.config).assemble(objects, scores)?;

        info!(
            candidates = objects.len(),
            returned = entries.len(),
            ascending = self.config.ascending,
            "ranking computed"
        );

        Ok(Ranking { entries, outcome })
    }
}

/// Ordered, truncated result of a run plus the level results behind it.
#[derive(Debug, Clone)]
pub struct Ranking<'a> {
    pub entries: Vec<RankedEntry<'a>>,
    pub outcome: HierarchyOutcome,
}

impl Ranking<'_> {
    pub fn breakdown(&self, entry: &RankedEntry<'_>) -> Vec<GroupScore> {
        self.outcome.breakdown(entry.position)
    }
}
