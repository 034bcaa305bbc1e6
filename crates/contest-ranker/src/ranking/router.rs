use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::service::{RankingRequest, RankingService, RankingServiceError, TemplateRankingRequest};
use super::templates::{TemplateId, TemplateRepository, TemplateRepositoryError};

/// Router builder exposing the ranking and template endpoints.
pub fn ranking_router<R>(service: Arc<RankingService<R>>) -> Router
where
    R: TemplateRepository + 'static,
{
    Router::new()
        .route("/api/v1/rankings", post(calculate_handler::<R>))
        .route("/api/v1/rankings/templates", get(list_templates_handler::<R>))
        .route(
            "/api/v1/rankings/templates/:template_id",
            post(template_calculate_handler::<R>),
        )
        .with_state(service)
}

pub(crate) async fn calculate_handler<R>(
    State(service): State<Arc<RankingService<R>>>,
    payload: Result<axum::Json<RankingRequest>, JsonRejection>,
) -> Response
where
    R: TemplateRepository + 'static,
{
    let axum::Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };
    match service.calculate(request) {
        Ok(ranking) => (StatusCode::OK, axum::Json(ranking)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn template_calculate_handler<R>(
    State(service): State<Arc<RankingService<R>>>,
    Path(template_id): Path<String>,
    payload: Result<axum::Json<TemplateRankingRequest>, JsonRejection>,
) -> Response
where
    R: TemplateRepository + 'static,
{
    let axum::Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };
    let id = TemplateId(template_id);
    match service.calculate_with_template(&id, request) {
        Ok(ranking) => (StatusCode::OK, axum::Json(ranking)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_templates_handler<R>(
    State(service): State<Arc<RankingService<R>>>,
) -> Response
where
    R: TemplateRepository + 'static,
{
    match service.list_templates() {
        Ok(templates) => (StatusCode::OK, axum::Json(json!({ "templates": templates }))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) fn error_status(error: &RankingServiceError) -> StatusCode {
    match error {
        RankingServiceError::Ranking(err) if err.is_caller_error() => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        RankingServiceError::Ranking(_) => StatusCode::INTERNAL_SERVER_ERROR,
        RankingServiceError::TemplateNotFound(_) => StatusCode::NOT_FOUND,
        RankingServiceError::Repository(TemplateRepositoryError::Unavailable(_)) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        RankingServiceError::Repository(TemplateRepositoryError::Conflict) => StatusCode::CONFLICT,
    }
}

fn error_response(error: RankingServiceError) -> Response {
    let payload = json!({
        "error": error.to_string(),
    });
    (error_status(&error), axum::Json(payload)).into_response()
}

/// Body rejections keep axum's status but use the JSON error shape.
fn rejection_response(rejection: JsonRejection) -> Response {
    let payload = json!({
        "error": rejection.body_text(),
    });
    (rejection.status(), axum::Json(payload)).into_response()
}
