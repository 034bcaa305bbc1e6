use super::common::*;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::ranking::criteria::Criterion;
use crate::ranking::service::{RankingRequest, RankingService, TemplateRankingRequest};

fn post_json(uri: &str, body: &impl serde::Serialize) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::post(uri)
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(
            serde_json::to_vec(body).expect("serialize request"),
        ))
        .expect("request builds")
}

#[tokio::test]
async fn calculate_route_returns_ranked_entries() {
    let router = router_with_service(ranking_service());
    let request = RankingRequest::new(innovation_objects(), all_benefit_config());

    let response = router
        .oneshot(post_json("/api/v1/rankings", &request))
        .await
        .expect("route responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    let ids: Vec<&str> = body["entries"]
        .as_array()
        .expect("entries array")
        .iter()
        .map(|entry| entry["id"].as_str().expect("id string"))
        .collect();
    assert_eq!(ids, vec!["a", "c", "b"]);
    assert!(body.get("template").is_none());
    assert!(body["entries"][0].get("breakdown").is_none());
}

#[tokio::test]
async fn calculate_route_accepts_raw_json_payloads() {
    let router = router_with_service(ranking_service());
    let metrics: serde_json::Map<String, Value> = Criterion::stored()
        .map(|criterion| (criterion.key().to_string(), json!(2.0)))
        .collect();
    let criteria: serde_json::Map<String, Value> = Criterion::ALL
        .into_iter()
        .map(|criterion| {
            (
                criterion.key().to_string(),
                json!({ "weight": 1.5, "direction": "benefit" }),
            )
        })
        .collect();
    let payload = json!({
        "objects": [
            { "id": "only", "name": "Lone entry", "metrics": metrics },
        ],
        "criteria": criteria,
        "include_breakdown": true,
    });

    let response = router
        .oneshot(post_json("/api/v1/rankings", &payload))
        .await
        .expect("route responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    let entry = &body["entries"][0];
    assert_eq!(entry["name"], "Lone entry");
    assert_close(entry["score"].as_f64().expect("numeric score"), 2.0 / 3.0);
    assert_eq!(entry["breakdown"].as_array().map(Vec::len), Some(6));
}

#[tokio::test]
async fn calculate_handler_maps_degenerate_input_to_unprocessable() {
    let service = Arc::new(ranking_service());
    let request = RankingRequest::new(vec![object("a", 0.0)], all_benefit_config());

    let response = crate::ranking::router::calculate_handler::<MemoryTemplates>(
        State(service),
        Ok(axum::Json(request)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("degenerate input"));
}

#[tokio::test]
async fn unknown_metric_keys_are_rejected_as_json_errors() {
    let router = router_with_service(ranking_service());
    let payload = json!({
        "objects": [
            { "id": "a", "name": "Entry a", "metrics": { "charisma": 4.0 } },
        ],
        "criteria": {},
    });

    let response = router
        .oneshot(post_json("/api/v1/rankings", &payload))
        .await
        .expect("route responds");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert!(body["error"].as_str().is_some_and(|message| !message.is_empty()));
}

#[tokio::test]
async fn malformed_template_bodies_are_rejected_as_json_errors() {
    let router = router_with_service(ranking_service());
    let request = axum::http::Request::post("/api/v1/rankings/templates/equal-weights")
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from("{ \"objects\": ["))
        .expect("request builds");

    let response = router.oneshot(request).await.expect("route responds");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json_body(response).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn calculate_handler_maps_validation_to_unprocessable() {
    let service = Arc::new(ranking_service());
    let mut config = all_benefit_config();
    config.criteria.remove(&Criterion::CapacityScore);

    let response = crate::ranking::router::calculate_handler::<MemoryTemplates>(
        State(service),
        Ok(axum::Json(RankingRequest::new(innovation_objects(), config))),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn template_handler_returns_not_found_for_unknown_ids() {
    let service = Arc::new(ranking_service());
    let request = TemplateRankingRequest {
        objects: innovation_objects(),
        limit: None,
        ascending: None,
        include_breakdown: false,
    };

    let response = crate::ranking::router::template_calculate_handler::<MemoryTemplates>(
        State(service),
        Path("does-not-exist".to_string()),
        Ok(axum::Json(request)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn template_route_ranks_with_stored_configuration() {
    let router = router_with_service(ranking_service());
    let payload = json!({ "objects": innovation_objects(), "limit": 1 });

    let response = router
        .oneshot(post_json("/api/v1/rankings/templates/equal-weights", &payload))
        .await
        .expect("route responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["template"], "equal-weights");
    assert_eq!(body["entries"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["entries"][0]["id"], "a");
}

#[tokio::test]
async fn list_templates_route_returns_summaries() {
    let router = router_with_service(ranking_service());

    let response = router
        .oneshot(
            axum::http::Request::get("/api/v1/rankings/templates")
                .body(axum::body::Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    let templates = body["templates"].as_array().expect("templates array");
    assert_eq!(templates.len(), 2);
    assert_eq!(templates[0]["id"], "equal-weights");
    assert_eq!(templates[0]["created_on"], "2025-03-14");
}

#[tokio::test]
async fn list_templates_handler_reports_unavailable_store() {
    let service = Arc::new(RankingService::new(Arc::new(UnavailableTemplates)));

    let response =
        crate::ranking::router::list_templates_handler::<UnavailableTemplates>(State(service))
            .await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
