use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{RankingError, ValidationIssue};

/// Whether a higher or a lower raw value is preferable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Benefit,
    Cost,
}

/// Weight and direction applied to one criterion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriterionSpec {
    pub weight: f64,
    pub direction: Direction,
}

impl CriterionSpec {
    pub fn benefit(weight: f64) -> Self {
        Self {
            weight,
            direction: Direction::Benefit,
        }
    }

    pub fn cost(weight: f64) -> Self {
        Self {
            weight,
            direction: Direction::Cost,
        }
    }
}

/// Position in the scoring hierarchy. Levels are evaluated deepest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Deepest,
    Middle,
    Top,
}

impl Level {
    /// Evaluation order of a full run.
    pub const ORDER: [Level; 3] = [Level::Deepest, Level::Middle, Level::Top];

    pub fn groups(self) -> &'static [CriteriaGroup] {
        match self {
            Level::Deepest => &[CriteriaGroup::Team, CriteriaGroup::Funding],
            Level::Middle => &[
                CriteriaGroup::Innovation,
                CriteriaGroup::Capacity,
                CriteriaGroup::Presentation,
            ],
            Level::Top => &[CriteriaGroup::Overall],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Level::Deepest => "deepest",
            Level::Middle => "middle",
            Level::Top => "top",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Named set of criteria aggregated into a single score within a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriteriaGroup {
    Team,
    Funding,
    Innovation,
    Capacity,
    Presentation,
    Overall,
}

impl CriteriaGroup {
    pub fn level(self) -> Level {
        match self {
            CriteriaGroup::Team | CriteriaGroup::Funding => Level::Deepest,
            CriteriaGroup::Innovation | CriteriaGroup::Capacity | CriteriaGroup::Presentation => {
                Level::Middle
            }
            CriteriaGroup::Overall => Level::Top,
        }
    }

    /// Criteria of the group in summation order.
    pub fn criteria(self) -> &'static [Criterion] {
        use Criterion::*;
        match self {
            CriteriaGroup::Team => &[TeamExperience, TeamSize, TeamCompleteness],
            CriteriaGroup::Funding => &[RequestedBudget, OwnContribution],
            CriteriaGroup::Innovation => &[
                Novelty,
                TechnicalFeasibility,
                MarketPotential,
                Scalability,
                SocialImpact,
                EnvironmentalImpact,
                IpProtection,
            ],
            CriteriaGroup::Capacity => &[TeamScore, FundingScore],
            CriteriaGroup::Presentation => &[
                PitchQuality,
                Documentation,
                PrototypeReadiness,
                TimelineRealism,
                RiskExposure,
            ],
            CriteriaGroup::Overall => &[InnovationScore, CapacityScore, PresentationScore],
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            CriteriaGroup::Team => "team",
            CriteriaGroup::Funding => "funding",
            CriteriaGroup::Innovation => "innovation",
            CriteriaGroup::Capacity => "capacity",
            CriteriaGroup::Presentation => "presentation",
            CriteriaGroup::Overall => "overall",
        }
    }
}

impl fmt::Display for CriteriaGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Where the per-object value of a criterion comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CriterionSource {
    /// Raw metric recorded on the candidate object.
    Stored,
    /// Score of a group from the level below.
    Derived(CriteriaGroup),
}

/// Every criterion known to the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    TeamExperience,
    TeamSize,
    TeamCompleteness,
    RequestedBudget,
    OwnContribution,
    Novelty,
    TechnicalFeasibility,
    MarketPotential,
    Scalability,
    SocialImpact,
    EnvironmentalImpact,
    IpProtection,
    TeamScore,
    FundingScore,
    PitchQuality,
    Documentation,
    PrototypeReadiness,
    TimelineRealism,
    RiskExposure,
    InnovationScore,
    CapacityScore,
    PresentationScore,
}

impl Criterion {
    pub const ALL: [Criterion; 22] = [
        Criterion::TeamExperience,
        Criterion::TeamSize,
        Criterion::TeamCompleteness,
        Criterion::RequestedBudget,
        Criterion::OwnContribution,
        Criterion::Novelty,
        Criterion::TechnicalFeasibility,
        Criterion::MarketPotential,
        Criterion::Scalability,
        Criterion::SocialImpact,
        Criterion::EnvironmentalImpact,
        Criterion::IpProtection,
        Criterion::TeamScore,
        Criterion::FundingScore,
        Criterion::PitchQuality,
        Criterion::Documentation,
        Criterion::PrototypeReadiness,
        Criterion::TimelineRealism,
        Criterion::RiskExposure,
        Criterion::InnovationScore,
        Criterion::CapacityScore,
        Criterion::PresentationScore,
    ];

    /// Criteria whose values every candidate object must carry.
    pub fn stored() -> impl Iterator<Item = Criterion> {
        Self::ALL
            .into_iter()
            .filter(|criterion| criterion.source() == CriterionSource::Stored)
    }

    pub fn source(self) -> CriterionSource {
        match self {
            Criterion::TeamScore => CriterionSource::Derived(CriteriaGroup::Team),
            Criterion::FundingScore => CriterionSource::Derived(CriteriaGroup::Funding),
            Criterion::InnovationScore => CriterionSource::Derived(CriteriaGroup::Innovation),
            Criterion::CapacityScore => CriterionSource::Derived(CriteriaGroup::Capacity),
            Criterion::PresentationScore => CriterionSource::Derived(CriteriaGroup::Presentation),
            _ => CriterionSource::Stored,
        }
    }

    pub fn is_stored(self) -> bool {
        self.source() == CriterionSource::Stored
    }

    /// Group this criterion is aggregated in.
    pub fn group(self) -> CriteriaGroup {
        use Criterion::*;
        match self {
            TeamExperience | TeamSize | TeamCompleteness => CriteriaGroup::Team,
            RequestedBudget | OwnContribution => CriteriaGroup::Funding,
            Novelty | TechnicalFeasibility | MarketPotential | Scalability | SocialImpact
            | EnvironmentalImpact | IpProtection => CriteriaGroup::Innovation,
            TeamScore | FundingScore => CriteriaGroup::Capacity,
            PitchQuality | Documentation | PrototypeReadiness | TimelineRealism | RiskExposure => {
                CriteriaGroup::Presentation
            }
            InnovationScore | CapacityScore | PresentationScore => CriteriaGroup::Overall,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Criterion::TeamExperience => "team_experience",
            Criterion::TeamSize => "team_size",
            Criterion::TeamCompleteness => "team_completeness",
            Criterion::RequestedBudget => "requested_budget",
            Criterion::OwnContribution => "own_contribution",
            Criterion::Novelty => "novelty",
            Criterion::TechnicalFeasibility => "technical_feasibility",
            Criterion::MarketPotential => "market_potential",
            Criterion::Scalability => "scalability",
            Criterion::SocialImpact => "social_impact",
            Criterion::EnvironmentalImpact => "environmental_impact",
            Criterion::IpProtection => "ip_protection",
            Criterion::TeamScore => "team_score",
            Criterion::FundingScore => "funding_score",
            Criterion::PitchQuality => "pitch_quality",
            Criterion::Documentation => "documentation",
            Criterion::PrototypeReadiness => "prototype_readiness",
            Criterion::TimelineRealism => "timeline_realism",
            Criterion::RiskExposure => "risk_exposure",
            Criterion::InnovationScore => "innovation_score",
            Criterion::CapacityScore => "capacity_score",
            Criterion::PresentationScore => "presentation_score",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        Self::ALL
            .into_iter()
            .find(|criterion| criterion.key().eq_ignore_ascii_case(key))
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

fn default_limit() -> usize {
    CriteriaConfiguration::DEFAULT_LIMIT
}

/// Weights, directions, and result shaping for a full ranking run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriteriaConfiguration {
    pub criteria: BTreeMap<Criterion, CriterionSpec>,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub ascending: bool,
}

impl CriteriaConfiguration {
    pub const DEFAULT_LIMIT: usize = 10;

    /// Every criterion weighted 1. Requested budget and risk exposure are costs.
    pub fn equal_weights() -> Self {
        let criteria = Criterion::ALL
            .into_iter()
            .map(|criterion| {
                let spec = match criterion {
                    Criterion::RequestedBudget | Criterion::RiskExposure => CriterionSpec::cost(1.0),
                    _ => CriterionSpec::benefit(1.0),
                };
                (criterion, spec)
            })
            .collect();

        Self {
            criteria,
            limit: Self::DEFAULT_LIMIT,
            ascending: false,
        }
    }

    pub fn with_spec(mut self, criterion: Criterion, spec: CriterionSpec) -> Self {
        self.criteria.insert(criterion, spec);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_ascending(mut self, ascending: bool) -> Self {
        self.ascending = ascending;
        self
    }

    pub fn spec(&self, criterion: Criterion) -> Result<CriterionSpec, RankingError> {
        self.criteria
            .get(&criterion)
            .copied()
            .ok_or(RankingError::Validation(ValidationIssue::MissingCriterion(
                criterion,
            )))
    }

    /// Checks that every criterion is configured with a usable weight.
    pub fn validate(&self) -> Result<(), RankingError> {
        if self.limit == 0 {
            return Err(RankingError::Validation(ValidationIssue::ZeroLimit));
        }

        for criterion in Criterion::ALL {
            let spec = self.spec(criterion)?;
            if !spec.weight.is_finite() || spec.weight <= 0.0 {
                return Err(RankingError::Validation(ValidationIssue::InvalidWeight {
                    criterion,
                    weight: spec.weight,
                }));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_matches_hierarchy_shape() {
        let shape: Vec<usize> = Level::ORDER
            .iter()
            .flat_map(|level| level.groups())
            .map(|group| group.criteria().len())
            .collect();
        assert_eq!(shape, vec![3, 2, 7, 2, 5, 3]);
        assert_eq!(Criterion::stored().count(), 17);

        for criterion in Criterion::ALL {
            assert!(criterion.group().criteria().contains(&criterion));
        }
    }

    #[test]
    fn shadow_criteria_point_one_level_down() {
        for criterion in Criterion::ALL {
            if let CriterionSource::Derived(source) = criterion.source() {
                assert!(source.level() < criterion.group().level());
            }
        }
    }

    #[test]
    fn keys_round_trip_through_serde() {
        let json = serde_json::to_string(&Criterion::IpProtection).expect("serializes");
        assert_eq!(json, "\"ip_protection\"");
        assert_eq!(Criterion::from_key("IP_PROTECTION"), Some(Criterion::IpProtection));
        assert_eq!(Criterion::from_key("unknown"), None);
    }

    #[test]
    fn validate_rejects_missing_and_non_positive_weights() {
        let mut config = CriteriaConfiguration::equal_weights();
        config.criteria.remove(&Criterion::Novelty);
        assert_eq!(
            config.validate(),
            Err(RankingError::Validation(ValidationIssue::MissingCriterion(
                Criterion::Novelty
            )))
        );

        let config = CriteriaConfiguration::equal_weights()
            .with_spec(Criterion::Scalability, CriterionSpec::benefit(0.0));
        assert!(matches!(
            config.validate(),
            Err(RankingError::Validation(ValidationIssue::InvalidWeight {
                criterion: Criterion::Scalability,
                ..
            }))
        ));

        let config = CriteriaConfiguration::equal_weights().with_limit(0);
        assert_eq!(
            config.validate(),
            Err(RankingError::Validation(ValidationIssue::ZeroLimit))
        );
    }

    #[test]
    fn configuration_defaults_limit_and_order() {
        let json = r#"{ "criteria": { "novelty": { "weight": 2.5, "direction": "cost" } } }"#;
        let config: CriteriaConfiguration = serde_json::from_str(json).expect("parses");
        assert_eq!(config.limit, 10);
        assert!(!config.ascending);
        assert_eq!(
            config.criteria.get(&Criterion::Novelty),
            Some(&CriterionSpec::cost(2.5))
        );
    }
}
