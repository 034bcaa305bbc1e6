use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::ranking::criteria::{CriteriaConfiguration, CriteriaGroup, Criterion, CriterionSpec};
use crate::ranking::domain::CandidateObject;
use crate::ranking::templates::{
    CriteriaTemplate, TemplateId, TemplateRepository, TemplateRepositoryError, TemplateSummary,
};
use crate::ranking::{ranking_router, RankingService};

pub(super) const EPSILON: f64 = 1e-9;

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < EPSILON,
        "expected {expected}, got {actual}"
    );
}

/// Every criterion benefit with weight 1.
pub(super) fn all_benefit_config() -> CriteriaConfiguration {
    let criteria = Criterion::ALL
        .into_iter()
        .map(|criterion| (criterion, CriterionSpec::benefit(1.0)))
        .collect();
    CriteriaConfiguration {
        criteria,
        limit: 10,
        ascending: false,
    }
}

pub(super) fn object(id: &str, value: f64) -> CandidateObject {
    CandidateObject::new(id, format!("Entry {id}")).with_uniform_metrics(value)
}

/// Constant metrics everywhere except the innovation group.
pub(super) fn innovation_object(id: &str, innovation: f64) -> CandidateObject {
    CriteriaGroup::Innovation
        .criteria()
        .iter()
        .fold(object(id, 1.0), |object, criterion| {
            object.with_metric(*criterion, innovation)
        })
}

pub(super) fn innovation_objects() -> Vec<CandidateObject> {
    vec![
        innovation_object("a", 10.0),
        innovation_object("b", 1.0),
        innovation_object("c", 5.0),
    ]
}

/// Mixed metrics across every group so no two entries tie.
pub(super) fn varied_objects() -> Vec<CandidateObject> {
    (1..=5usize)
        .map(|seed| {
            Criterion::stored()
                .enumerate()
                .fold(object(&format!("e-{seed}"), 1.0), |object, (offset, criterion)| {
                    let value = ((seed * 7 + offset * 3) % 11 + 1) as f64;
                    object.with_metric(criterion, value)
                })
        })
        .collect()
}

pub(super) fn created_on() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 14).expect("valid date")
}

pub(super) fn cost_template() -> CriteriaTemplate {
    let configuration = all_benefit_config()
        .with_spec(Criterion::Novelty, CriterionSpec::cost(10.0))
        .with_limit(2)
        .with_ascending(true);
    CriteriaTemplate {
        id: TemplateId("novelty-cost".to_string()),
        name: "Novelty as cost".to_string(),
        created_on: created_on(),
        configuration,
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryTemplates {
    templates: Arc<Mutex<HashMap<TemplateId, CriteriaTemplate>>>,
}

impl MemoryTemplates {
    pub(super) fn seeded() -> Self {
        let repository = Self::default();
        repository
            .insert(CriteriaTemplate::equal_weights(10, created_on()))
            .expect("seed equal weights");
        repository
            .insert(cost_template())
            .expect("seed cost template");
        repository
    }
}

impl TemplateRepository for MemoryTemplates {
    fn insert(
        &self,
        template: CriteriaTemplate,
    ) -> Result<CriteriaTemplate, TemplateRepositoryError> {
        let mut guard = self.templates.lock().expect("template mutex poisoned");
        if guard.contains_key(&template.id) {
            return Err(TemplateRepositoryError::Conflict);
        }
        guard.insert(template.id.clone(), template.clone());
        Ok(template)
    }

    fn fetch(&self, id: &TemplateId) -> Result<Option<CriteriaTemplate>, TemplateRepositoryError> {
        let guard = self.templates.lock().expect("template mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<TemplateSummary>, TemplateRepositoryError> {
        let guard = self.templates.lock().expect("template mutex poisoned");
        let mut summaries: Vec<TemplateSummary> =
            guard.values().map(CriteriaTemplate::summary).collect();
        summaries.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(summaries)
    }
}

pub(super) struct UnavailableTemplates;

impl TemplateRepository for UnavailableTemplates {
    fn insert(
        &self,
        _template: CriteriaTemplate,
    ) -> Result<CriteriaTemplate, TemplateRepositoryError> {
        Err(TemplateRepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &TemplateId) -> Result<Option<CriteriaTemplate>, TemplateRepositoryError> {
        Err(TemplateRepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<TemplateSummary>, TemplateRepositoryError> {
        Err(TemplateRepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn ranking_service() -> RankingService<MemoryTemplates> {
    RankingService::new(Arc::new(MemoryTemplates::seeded()))
}

pub(super) fn router_with_service<R>(service: RankingService<R>) -> axum::Router
where
    R: TemplateRepository + 'static,
{
    ranking_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
