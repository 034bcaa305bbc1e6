use crate::infra::{seeded_repository, InMemoryTemplateRepository};
use chrono::Local;
use clap::Args;
use contest_ranker::config::AppConfig;
use contest_ranker::error::AppError;
use contest_ranker::ranking::{
    CandidateObject, CriteriaConfiguration, CriteriaTemplate, Criterion, ObjectImporter,
    RankingRequest, RankingResponse, RankingService, TemplateId,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct RankArgs {
    /// CSV or JSON file with one entry per row (id, name, one column per stored criterion)
    #[arg(long)]
    pub(crate) objects: PathBuf,
    /// JSON criteria configuration, used instead of a stored template
    #[arg(long, conflicts_with = "template")]
    pub(crate) criteria: Option<PathBuf>,
    /// Stored template to rank with (defaults to the built-in equal weights)
    #[arg(long)]
    pub(crate) template: Option<String>,
    /// Override the number of entries returned
    #[arg(long)]
    pub(crate) limit: Option<usize>,
    /// Sort from the weakest entry upward
    #[arg(long, conflicts_with = "descending")]
    pub(crate) ascending: bool,
    /// Sort from the strongest entry downward, even if the template sorts ascending
    #[arg(long)]
    pub(crate) descending: bool,
    /// Print per-group scores under each entry
    #[arg(long)]
    pub(crate) breakdown: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Sort from the weakest entry upward
    #[arg(long)]
    pub(crate) ascending: bool,
    /// Skip the per-group breakdown
    #[arg(long)]
    pub(crate) summary_only: bool,
}

pub(crate) fn run_rank(args: RankArgs) -> Result<(), AppError> {
    let RankArgs {
        objects,
        criteria,
        template,
        limit,
        ascending,
        descending,
        breakdown,
    } = args;

    let config = AppConfig::load()?;
    let service = RankingService::new(Arc::new(seeded_repository(
        &config.ranking,
        Local::now().date_naive(),
    )?));

    let objects = load_objects(&objects)?;
    let configuration = match criteria {
        Some(path) => load_criteria(&path)?,
        None => {
            let id = template.unwrap_or_else(|| CriteriaTemplate::EQUAL_WEIGHTS_ID.to_string());
            service.template(&TemplateId(id))?.configuration
        }
    };
    let order = match (ascending, descending) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    };
    let configuration = apply_overrides(configuration, limit, order);

    let mut request = RankingRequest::new(objects, configuration);
    request.include_breakdown = breakdown;
    let response = service.calculate(request)?;
    render_ranking(&response);

    Ok(())
}

pub(crate) fn run_template_listing() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = RankingService::new(Arc::new(seeded_repository(
        &config.ranking,
        Local::now().date_naive(),
    )?));

    println!("Criteria templates");
    for summary in service.list_templates()? {
        println!(
            "- {} ({}) | created {} | limit {} | {}",
            summary.id,
            summary.name,
            summary.created_on,
            summary.limit,
            if summary.ascending {
                "ascending"
            } else {
                "descending"
            }
        );
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let repository = InMemoryTemplateRepository::default();
    let service = RankingService::new(Arc::new(repository));

    let configuration =
        CriteriaConfiguration::equal_weights().with_ascending(args.ascending);
    let mut request = RankingRequest::new(demo_entries(), configuration);
    request.include_breakdown = !args.summary_only;

    println!("Contest ranking demo (equal weights)");
    let response = service.calculate(request)?;
    render_ranking(&response);

    Ok(())
}

/// Loads entries from JSON when the extension says so, CSV otherwise.
pub(crate) fn load_objects(path: &Path) -> Result<Vec<CandidateObject>, AppError> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    } else {
        Ok(ObjectImporter::from_path(path)?)
    }
}

/// Command-line shaping wins over the stored or file configuration.
fn apply_overrides(
    mut configuration: CriteriaConfiguration,
    limit: Option<usize>,
    ascending: Option<bool>,
) -> CriteriaConfiguration {
    if let Some(limit) = limit {
        configuration.limit = limit;
    }
    if let Some(ascending) = ascending {
        configuration.ascending = ascending;
    }
    configuration
}

fn load_criteria(path: &Path) -> Result<CriteriaConfiguration, AppError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn render_ranking(response: &RankingResponse) {
    if let Some(template) = &response.template {
        println!("Template: {template}");
    }

    for (position, entry) in response.entries.iter().enumerate() {
        println!(
            "{:>3}. {} ({}) score {:.4}",
            position + 1,
            entry.name,
            entry.id,
            entry.score
        );
        if let Some(breakdown) = &entry.breakdown {
            for group_score in breakdown {
                println!(
                    "       {} / {}: {:.4}",
                    group_score.level, group_score.group, group_score.score
                );
            }
        }
    }
}

fn demo_entries() -> Vec<CandidateObject> {
    let profiles: [(&str, &str, [f64; 17]); 4] = [
        (
            "aurora",
            "Aurora Grid",
            [
                8.0, 6.0, 9.0, 120.0, 40.0, 9.0, 7.0, 8.0, 9.0, 6.0, 8.0, 7.0, 8.0, 7.0, 6.0,
                8.0, 3.0,
            ],
        ),
        (
            "brook",
            "Brook Analytics",
            [
                5.0, 4.0, 6.0, 60.0, 25.0, 6.0, 9.0, 7.0, 6.0, 5.0, 4.0, 5.0, 9.0, 8.0, 8.0,
                9.0, 2.0,
            ],
        ),
        (
            "cinder",
            "Cinder Labs",
            [
                3.0, 3.0, 4.0, 200.0, 10.0, 8.0, 4.0, 6.0, 7.0, 8.0, 9.0, 3.0, 5.0, 4.0, 3.0,
                5.0, 7.0,
            ],
        ),
        (
            "delta",
            "Delta Works",
            [
                7.0, 5.0, 7.0, 90.0, 35.0, 5.0, 8.0, 9.0, 8.0, 4.0, 5.0, 8.0, 7.0, 9.0, 7.0,
                6.0, 4.0,
            ],
        ),
    ];

    profiles
        .into_iter()
        .map(|(id, name, values)| {
            Criterion::stored()
                .zip(values)
                .fold(CandidateObject::new(id, name), |object, (criterion, value)| {
                    object.with_metric(criterion, value)
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use contest_ranker::ranking::RankingEngine;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("contest-ranker-demo-{}-{name}", std::process::id()))
    }

    #[test]
    fn demo_entries_rank_cleanly() {
        let entries = demo_entries();
        assert!(entries.iter().all(|entry| entry.metrics.len() == 17));

        let ranking = RankingEngine::new(CriteriaConfiguration::equal_weights())
            .rank(&entries)
            .expect("demo ranks");
        assert_eq!(ranking.entries.len(), entries.len());
    }

    #[test]
    fn overrides_can_turn_an_ascending_template_descending() {
        let template = CriteriaConfiguration::equal_weights()
            .with_limit(2)
            .with_ascending(true);

        let flipped = apply_overrides(template.clone(), None, Some(false));
        assert!(!flipped.ascending);
        assert_eq!(flipped.limit, 2);

        let untouched = apply_overrides(template, Some(7), None);
        assert!(untouched.ascending);
        assert_eq!(untouched.limit, 7);
    }

    #[test]
    fn run_demo_prints_without_error() {
        run_demo(DemoArgs::default()).expect("demo runs");
    }

    #[test]
    fn objects_load_from_json_files() {
        let path = temp_path("objects.json");
        let body = serde_json::to_string(&demo_entries()).expect("serialize entries");
        std::fs::write(&path, body).expect("write objects");

        let loaded = load_objects(&path);
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded.expect("objects load"), demo_entries());
    }

    #[test]
    fn objects_load_from_csv_files() {
        let header: Vec<&str> = ["id", "name"]
            .into_iter()
            .chain(Criterion::stored().map(Criterion::key))
            .collect();
        let row: Vec<String> = ["solo".to_string(), "Solo entry".to_string()]
            .into_iter()
            .chain(Criterion::stored().map(|_| "4".to_string()))
            .collect();
        let path = temp_path("objects.csv");
        std::fs::write(&path, format!("{}\n{}\n", header.join(","), row.join(",")))
            .expect("write csv");

        let loaded = load_objects(&path);
        let _ = std::fs::remove_file(&path);

        let objects = loaded.expect("objects load");
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].metric(Criterion::Novelty), Some(4.0));
    }

    #[test]
    fn criteria_files_fall_back_to_default_shaping() {
        let configuration = CriteriaConfiguration::equal_weights();
        let path = temp_path("criteria.json");
        let body = serde_json::json!({ "criteria": configuration.criteria });
        std::fs::write(&path, body.to_string()).expect("write criteria");

        let loaded = load_criteria(&path);
        let _ = std::fs::remove_file(&path);

        let loaded = loaded.expect("criteria load");
        assert_eq!(loaded.limit, CriteriaConfiguration::DEFAULT_LIMIT);
        assert!(!loaded.ascending);
        assert_eq!(loaded.criteria, configuration.criteria);
    }
}
