use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::criteria::{CriteriaConfiguration, Criterion, CriterionSpec};
use super::domain::{CandidateObject, ObjectId};
use super::error::RankingError;
use super::hierarchy::GroupScore;
use super::templates::{
    CriteriaTemplate, TemplateId, TemplateRepository, TemplateRepositoryError, TemplateSummary,
};
use super::RankingEngine;

fn default_limit() -> usize {
    CriteriaConfiguration::DEFAULT_LIMIT
}

/// Ranking request carrying its own criteria configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingRequest {
    pub objects: Vec<CandidateObject>,
    pub criteria: BTreeMap<Criterion, CriterionSpec>,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub ascending: bool,
    #[serde(default)]
    pub include_breakdown: bool,
}

impl RankingRequest {
    pub fn new(objects: Vec<CandidateObject>, configuration: CriteriaConfiguration) -> Self {
        Self {
            objects,
            criteria: configuration.criteria,
            limit: configuration.limit,
            ascending: configuration.ascending,
            include_breakdown: false,
        }
    }

    pub fn configuration(&self) -> CriteriaConfiguration {
        CriteriaConfiguration {
            criteria: self.criteria.clone(),
            limit: self.limit,
            ascending: self.ascending,
        }
    }
}

/// Ranking request resolved against a stored template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateRankingRequest {
    pub objects: Vec<CandidateObject>,
    /// Overrides the template's result limit.
    #[serde(default)]
    pub limit: Option<usize>,
    /// Overrides the template's sort order.
    #[serde(default)]
    pub ascending: Option<bool>,
    #[serde(default)]
    pub include_breakdown: bool,
}

/// Public view of one ranked candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntryView {
    pub id: ObjectId,
    pub name: String,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<Vec<GroupScore>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<TemplateId>,
    pub entries: Vec<RankedEntryView>,
}

/// Service composing the ranking engine with the template store.
pub struct RankingService<R> {
    templates: Arc<R>,
}

impl<R> RankingService<R>
where
    R: TemplateRepository + 'static,
{
    pub fn new(templates: Arc<R>) -> Self {
        Self { templates }
    }

    /// Rank objects with the configuration supplied in the request.
    pub fn calculate(
        &self,
        request: RankingRequest,
    ) -> Result<RankingResponse, RankingServiceError> {
        let configuration = request.configuration();
        let entries = rank_views(
            configuration,
            &request.objects,
            request.include_breakdown,
        )?;

        Ok(RankingResponse {
            template: None,
            entries,
        })
    }

    /// Rank objects with the configuration of a stored template.
    pub fn calculate_with_template(
        &self,
        template_id: &TemplateId,
        request: TemplateRankingRequest,
    ) -> Result<RankingResponse, RankingServiceError> {
        let template = self.template(template_id)?;

        let mut configuration = template.configuration;
        if let Some(limit) = request.limit {
            configuration.limit = limit;
        }
        if let Some(ascending) = request.ascending {
            configuration.ascending = ascending;
        }

        let entries = rank_views(
            configuration,
            &request.objects,
            request.include_breakdown,
        )?;

        Ok(RankingResponse {
            template: Some(template.id),
            entries,
        })
    }

    pub fn list_templates(&self) -> Result<Vec<TemplateSummary>, RankingServiceError> {
        Ok(self.templates.list()?)
    }

    pub fn template(&self, id: &TemplateId) -> Result<CriteriaTemplate, RankingServiceError> {
        self.templates
            .fetch(id)?
            .ok_or_else(|| RankingServiceError::TemplateNotFound(id.clone()))
    }
}

fn rank_views(
    configuration: CriteriaConfiguration,
    objects: &[CandidateObject],
    include_breakdown: bool,
) -> Result<Vec<RankedEntryView>, RankingServiceError> {
    let engine = RankingEngine::new(configuration);
    let ranking = engine.rank(objects).map_err(|err| {
        warn!(error = %err, candidates = objects.len(), "ranking rejected");
        err
    })?;

    Ok(ranking
        .entries
        .iter()
        .map(|entry| RankedEntryView {
            id: entry.object.id.clone(),
            name: entry.object.name.clone(),
            score: entry.score,
            breakdown: include_breakdown.then(|| ranking.breakdown(entry)),
        })
        .collect())
}

/// Error raised by the ranking service.
#[derive(Debug, thiserror::Error)]
pub enum RankingServiceError {
    #[error(transparent)]
    Ranking(#[from] RankingError),
    #[error(transparent)]
    Repository(#[from] TemplateRepositoryError),
    #[error("criteria template '{0}' not found")]
    TemplateNotFound(TemplateId),
}
