use chrono::NaiveDate;
use contest_ranker::config::RankingConfig;
use contest_ranker::error::AppError;
use contest_ranker::ranking::{
    CriteriaTemplate, TemplateId, TemplateRepository, TemplateRepositoryError, TemplateSummary,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryTemplateRepository {
    templates: Arc<Mutex<HashMap<TemplateId, CriteriaTemplate>>>,
}

impl InMemoryTemplateRepository {
    fn guard(
        &self,
    ) -> Result<MutexGuard<'_, HashMap<TemplateId, CriteriaTemplate>>, TemplateRepositoryError>
    {
        self.templates
            .lock()
            .map_err(|_| TemplateRepositoryError::Unavailable("template mutex poisoned".into()))
    }
}

impl TemplateRepository for InMemoryTemplateRepository {
    fn insert(
        &self,
        template: CriteriaTemplate,
    ) -> Result<CriteriaTemplate, TemplateRepositoryError> {
        let mut guard = self.guard()?;
        if guard.contains_key(&template.id) {
            return Err(TemplateRepositoryError::Conflict);
        }
        guard.insert(template.id.clone(), template.clone());
        Ok(template)
    }

    fn fetch(&self, id: &TemplateId) -> Result<Option<CriteriaTemplate>, TemplateRepositoryError> {
        Ok(self.guard()?.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<TemplateSummary>, TemplateRepositoryError> {
        let mut summaries: Vec<TemplateSummary> = self
            .guard()?
            .values()
            .map(CriteriaTemplate::summary)
            .collect();
        summaries.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(summaries)
    }
}

/// Reads a JSON array of templates, rejecting any with an invalid configuration.
pub(crate) fn load_templates(path: &Path) -> Result<Vec<CriteriaTemplate>, AppError> {
    let raw = std::fs::read_to_string(path)?;
    let templates: Vec<CriteriaTemplate> = serde_json::from_str(&raw)?;
    for template in &templates {
        template.configuration.validate()?;
    }
    Ok(templates)
}

/// Template store holding the built-in template plus any configured file templates.
pub(crate) fn seeded_repository(
    config: &RankingConfig,
    today: NaiveDate,
) -> Result<InMemoryTemplateRepository, AppError> {
    let repository = InMemoryTemplateRepository::default();
    repository.insert(CriteriaTemplate::equal_weights(config.default_limit, today))?;

    if let Some(path) = &config.templates_path {
        let templates = load_templates(path)?;
        let count = templates.len();
        for template in templates {
            repository.insert(template)?;
        }
        info!(path = %path.display(), count, "criteria templates loaded");
    }

    Ok(repository)
}
