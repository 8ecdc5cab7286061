use crate::infra::{AppState, CutoffState};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use dse_cutoffs::attempts::{
    assess, percentage_of, summarize, AttemptAssessment, AttemptSummary, PaperAttempt,
};
use dse_cutoffs::cutoffs::{
    classify, current_exam_year, generic_fallback_table, has_subject_cutoff_data,
    resolve_boundaries, BoundaryRow, BoundarySource, Estimate,
};
use dse_cutoffs::error::AppError;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Serialize)]
pub(crate) struct SubjectOverview {
    pub(crate) code: String,
    pub(crate) years: Vec<i32>,
    pub(crate) legacy: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct CutoffOverviewResponse {
    pub(crate) using_generic_fallback: bool,
    pub(crate) subjects: Vec<SubjectOverview>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GenericTableResponse {
    pub(crate) boundaries: &'static [BoundaryRow],
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExistenceQuery {
    #[serde(default)]
    pub(crate) exam_year: Option<i32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExistenceResponse {
    pub(crate) subject: String,
    pub(crate) exam_year: i32,
    pub(crate) has_data: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EstimateRequest {
    pub(crate) subject: String,
    #[serde(default)]
    pub(crate) exam_year: Option<i32>,
    #[serde(default)]
    pub(crate) percentage: Option<f64>,
    #[serde(default)]
    pub(crate) score: Option<f64>,
    #[serde(default)]
    pub(crate) total: Option<f64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct EstimateResponse {
    pub(crate) subject: String,
    pub(crate) exam_year: i32,
    pub(crate) percentage: f64,
    pub(crate) estimate: Estimate,
    pub(crate) boundary_source: BoundarySource,
    pub(crate) boundaries: Vec<BoundaryRow>,
    pub(crate) has_subject_data: bool,
    pub(crate) using_generic_fallback: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AttemptSummaryRequest {
    pub(crate) attempts: Vec<PaperAttempt>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AttemptSummaryResponse {
    pub(crate) assessments: Vec<AttemptAssessment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) summary: Option<AttemptSummary>,
}

pub(crate) fn cutoff_router(state: CutoffState) -> Router {
    Router::new()
        .route("/api/v1/cutoffs", get(overview_endpoint))
        .route("/api/v1/cutoffs/generic", get(generic_table_endpoint))
        .route("/api/v1/cutoffs/:subject/exists", get(existence_endpoint))
        .route("/api/v1/cutoffs/estimate", post(estimate_endpoint))
        .route("/api/v1/attempts/summary", post(attempt_summary_endpoint))
        .with_state(state)
}

pub(crate) fn with_service_routes(state: CutoffState) -> Router {
    cutoff_router(state)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn overview_endpoint(State(state): State<CutoffState>) -> Json<CutoffOverviewResponse> {
    let subjects = state
        .cutoffs
        .store
        .subjects()
        .map(|(code, table)| SubjectOverview {
            code: code.to_string(),
            years: table.years().collect(),
            legacy: table.is_legacy(),
        })
        .collect();

    Json(CutoffOverviewResponse {
        using_generic_fallback: state.cutoffs.using_generic_fallback,
        subjects,
    })
}

pub(crate) async fn generic_table_endpoint() -> Json<GenericTableResponse> {
    Json(GenericTableResponse {
        boundaries: generic_fallback_table(),
    })
}

pub(crate) async fn existence_endpoint(
    State(state): State<CutoffState>,
    Path(subject): Path<String>,
    Query(query): Query<ExistenceQuery>,
) -> Json<ExistenceResponse> {
    let exam_year = query.exam_year.unwrap_or_else(current_exam_year);
    let has_data = has_subject_cutoff_data(&state.cutoffs.store, &subject, Some(exam_year));

    Json(ExistenceResponse {
        subject: subject.trim().to_uppercase(),
        exam_year,
        has_data,
    })
}

pub(crate) async fn estimate_endpoint(
    State(state): State<CutoffState>,
    Json(payload): Json<EstimateRequest>,
) -> Result<Json<EstimateResponse>, AppError> {
    let EstimateRequest {
        subject,
        exam_year,
        percentage,
        score,
        total,
    } = payload;

    let subject = subject.trim().to_uppercase();
    if subject.is_empty() {
        return Err(AppError::InvalidRequest("subject is required".to_string()));
    }

    let percentage = match (percentage, score, total) {
        (Some(pct), _, _) => pct,
        (None, Some(score), Some(total)) => percentage_of(score, total)?,
        _ => {
            return Err(AppError::InvalidRequest(
                "provide either percentage or both score and total".to_string(),
            ))
        }
    };

    let exam_year = exam_year.unwrap_or_else(current_exam_year);
    let store = &state.cutoffs.store;
    let resolved = resolve_boundaries(store, &subject, exam_year);

    Ok(Json(EstimateResponse {
        estimate: classify(resolved.rows, percentage),
        boundary_source: resolved.source,
        boundaries: resolved.rows.to_vec(),
        has_subject_data: has_subject_cutoff_data(store, &subject, Some(exam_year)),
        using_generic_fallback: state.cutoffs.using_generic_fallback,
        subject,
        exam_year,
        percentage,
    }))
}

pub(crate) async fn attempt_summary_endpoint(
    State(state): State<CutoffState>,
    Json(payload): Json<AttemptSummaryRequest>,
) -> Result<Json<AttemptSummaryResponse>, AppError> {
    let assessments = payload
        .attempts
        .iter()
        .map(|attempt| assess(attempt, &state.cutoffs.store))
        .collect::<Result<Vec<_>, _>>()?;
    let summary = summarize(&assessments);

    Ok(Json(AttemptSummaryResponse {
        assessments,
        summary,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use dse_cutoffs::cutoffs::{CutoffStore, GradeLevel, LoadedCutoffs};
    use tower::ServiceExt;

    fn sample_state() -> CutoffState {
        let mut store = CutoffStore::new();
        store.insert_rows(
            "PHY",
            2021,
            vec![
                BoundaryRow::new(GradeLevel::FiveStarStar, 83.0),
                BoundaryRow::new(GradeLevel::FiveStar, 73.0),
                BoundaryRow::new(GradeLevel::Five, 63.0),
            ],
        );
        store.insert_rows(
            "PHY",
            2023,
            vec![
                BoundaryRow::new(GradeLevel::FiveStarStar, 85.0),
                BoundaryRow::new(GradeLevel::FiveStar, 75.0),
                BoundaryRow::new(GradeLevel::Five, 65.0),
            ],
        );
        CutoffState::new(LoadedCutoffs {
            store,
            using_generic_fallback: false,
        })
    }

    fn estimate_request(body: serde_json::Value) -> EstimateRequest {
        serde_json::from_value(body).expect("valid request")
    }

    #[tokio::test]
    async fn estimate_endpoint_uses_exact_year() {
        let request = estimate_request(json!({ "subject": " phy ", "exam_year": 2023, "percentage": 76 }));
        let Json(body) = estimate_endpoint(State(sample_state()), Json(request))
            .await
            .expect("estimate builds");

        assert_eq!(body.subject, "PHY");
        assert_eq!(body.estimate, Estimate::Level(GradeLevel::FiveStar));
        assert_eq!(body.boundary_source, BoundarySource::ExactYear { year: 2023 });
        assert!(body.has_subject_data);
    }

    #[tokio::test]
    async fn estimate_endpoint_accepts_raw_scores() {
        let request = estimate_request(
            json!({ "subject": "PHY", "exam_year": 2022, "score": 150, "total": 200 }),
        );
        let Json(body) = estimate_endpoint(State(sample_state()), Json(request))
            .await
            .expect("estimate builds");

        assert_eq!(body.percentage, 75.0);
        assert_eq!(
            body.boundary_source,
            BoundarySource::NearestYear {
                requested: 2022,
                used: 2023
            }
        );
        assert!(!body.has_subject_data);
    }

    #[tokio::test]
    async fn estimate_endpoint_rejects_missing_score() {
        let request = estimate_request(json!({ "subject": "PHY", "score": 150 }));
        let err = estimate_endpoint(State(sample_state()), Json(request))
            .await
            .expect_err("request incomplete");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn estimate_endpoint_rejects_score_above_total() {
        let request = estimate_request(json!({ "subject": "PHY", "score": 250, "total": 200 }));
        let err = estimate_endpoint(State(sample_state()), Json(request))
            .await
            .expect_err("score exceeds total");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn generic_mode_reports_fallback_through_router() {
        let app = cutoff_router(CutoffState::new(LoadedCutoffs::generic_fallback()));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/cutoffs/ENG/exists?exam_year=2023")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(body["has_data"], json!(false));
        assert_eq!(body["exam_year"], json!(2023));
    }

    #[tokio::test]
    async fn generic_table_lists_seven_levels() {
        let app = cutoff_router(CutoffState::default());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/cutoffs/generic")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
        let boundaries = body["boundaries"].as_array().expect("array");
        assert_eq!(boundaries.len(), 7);
        assert_eq!(boundaries[0]["level"], json!("5**"));
        assert_eq!(boundaries[6]["minimum_percentage"], json!(30.0));
    }

    #[tokio::test]
    async fn attempt_summary_picks_best_estimate() {
        let request: AttemptSummaryRequest = serde_json::from_value(json!({
            "attempts": [
                { "subject": "PHY", "exam_year": 2023, "score": 140, "total": 200 },
                { "subject": "PHY", "exam_year": 2023, "score": 172, "total": 200 }
            ]
        }))
        .expect("valid request");

        let Json(body) = attempt_summary_endpoint(State(sample_state()), Json(request))
            .await
            .expect("summary builds");

        assert_eq!(body.assessments.len(), 2);
        let summary = body.summary.expect("summary present");
        assert_eq!(summary.total_attempts, 2);
        assert_eq!(summary.top_estimate, Estimate::Level(GradeLevel::FiveStarStar));
    }

    #[tokio::test]
    async fn overview_lists_years_per_subject() {
        let Json(body) = overview_endpoint(State(sample_state())).await;
        assert!(!body.using_generic_fallback);
        assert_eq!(body.subjects.len(), 1);
        assert_eq!(body.subjects[0].years, vec![2021, 2023]);
        assert!(!body.subjects[0].legacy);
    }
}
