use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::criteria::CriteriaConfiguration;

/// Identifier wrapper for stored criteria templates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(pub String);

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Named criteria configuration persisted for reuse across rankings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriteriaTemplate {
    pub id: TemplateId,
    pub name: String,
    pub created_on: NaiveDate,
    pub configuration: CriteriaConfiguration,
}

impl CriteriaTemplate {
    pub const EQUAL_WEIGHTS_ID: &'static str = "equal-weights";

    /// Built-in template with unit weights for every criterion.
    pub fn equal_weights(limit: usize, created_on: NaiveDate) -> Self {
        Self {
            id: TemplateId(Self::EQUAL_WEIGHTS_ID.to_string()),
            name: "Equal weights".to_string(),
            created_on,
            configuration: CriteriaConfiguration::equal_weights().with_limit(limit),
        }
    }

    pub fn summary(&self) -> TemplateSummary {
        TemplateSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            created_on: self.created_on,
            limit: self.configuration.limit,
            ascending: self.configuration.ascending,
        }
    }
}

/// Listing view of a stored template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSummary {
    pub id: TemplateId,
    pub name: String,
    pub created_on: NaiveDate,
    pub limit: usize,
    pub ascending: bool,
}

/// Storage abstraction for criteria templates.
pub trait TemplateRepository: Send + Sync {
    fn insert(&self, template: CriteriaTemplate) -> Result<CriteriaTemplate, TemplateRepositoryError>;
    fn fetch(&self, id: &TemplateId) -> Result<Option<CriteriaTemplate>, TemplateRepositoryError>;
    fn list(&self) -> Result<Vec<TemplateSummary>, TemplateRepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TemplateRepositoryError {
    #[error("template already exists")]
    Conflict,
    #[error("template store unavailable: {0}")]
    Unavailable(String),
}
