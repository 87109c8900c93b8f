//! Wellbeing HTTP surface
//!
//! Axum server exposing the survey form, the dashboard and a small JSON API.
//!
//! Each endpoint has a thin axum handler that delegates to a pure inner
//! function, so the request logic is testable without axum dispatch.
//!
//! Endpoints:
//! - GET  /                       — survey form (with optional flash message)
//! - POST /submit                 — form submission, redirects back to /
//! - GET  /dashboard              — metrics, recent-history chart and table
//! - GET  /api/metrics            — metrics snapshot
//! - GET  /api/responses          — all responses, newest first
//! - POST /api/responses          — JSON submission
//! - GET  /api/responses/recent   — recent window, newest first (`?limit=`)
//! - GET  /health                 — health check with DB status
//! - GET  /version                — server version info

use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use wellbeing_core::api::{ErrorKind, WellbeingRequest, WellbeingResponse, API_VERSION};
use wellbeing_core::models::survey::parse_rating;
use wellbeing_core::{
    compute_metrics, RatingField, RecordOrder, SurveyStore, ValidationError, WellbeingConfig,
    WellbeingError,
};

use crate::pages::{self, DashboardView, Flash, FlashLevel};
use crate::router;

/// Shared state for all HTTP handlers
#[derive(Clone)]
pub struct HttpState {
    pub store: SurveyStore,
    pub config: WellbeingConfig,
}

/// Build the Axum router with all endpoints
pub fn build_router(state: Arc<HttpState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/submit", post(submit_form_handler))
        .route("/dashboard", get(dashboard_handler))
        .route("/api/metrics", get(metrics_handler))
        .route(
            "/api/responses",
            get(all_responses_handler).post(submit_json_handler),
        )
        .route("/api/responses/recent", get(recent_responses_handler))
        .route("/health", get(health_handler))
        .route("/version", get(version_handler))
        .with_state(state)
}

/// Start the HTTP server on the configured address.
/// Gracefully shuts down when the broadcast shutdown signal fires.
pub async fn start_http_server(
    store: SurveyStore,
    config: WellbeingConfig,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let addr = format!("{}:{}", config.http.host, config.http.port);
    let state = Arc::new(HttpState { store, config });

    let app = build_router(state);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Wellbeing HTTP server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            tracing::info!("HTTP server shutting down...");
        })
        .await?;

    Ok(())
}

// ============================================================================
// Request DTOs
// ============================================================================

/// Raw survey form. Ratings stay strings until validated so that bad input
/// produces a flash message rather than an extractor rejection.
#[derive(Debug, Deserialize, Default)]
pub struct SurveyForm {
    pub stress: Option<String>,
    pub workload: Option<String>,
    pub satisfaction: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub stress: i64,
    pub workload: i64,
    pub satisfaction: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct RecentParams {
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
pub struct FlashParams {
    pub status: Option<String>,
    pub message: Option<String>,
}

impl FlashParams {
    /// Unknown levels are dropped so the form page always renders.
    pub fn into_flash(self) -> Option<Flash> {
        let level = match self.status.as_deref() {
            Some("success") => FlashLevel::Success,
            Some("danger") => FlashLevel::Danger,
            _ => return None,
        };
        match self.message {
            Some(message) if !message.is_empty() => Some(Flash { level, message }),
            _ => None,
        }
    }
}

// ============================================================================
// Inner (directly testable) business logic functions
// ============================================================================

/// Inner health check — queries DB and returns (status_code, json_body).
pub async fn health_inner(store: &SurveyStore) -> (StatusCode, serde_json::Value) {
    let response = router::handle_request(WellbeingRequest::Health, store).await;
    match response_to_http(response) {
        Ok(mut data) => {
            if let Some(obj) = data.as_object_mut() {
                obj.insert(
                    "version".to_string(),
                    serde_json::json!(env!("CARGO_PKG_VERSION")),
                );
            }
            (StatusCode::OK, data)
        }
        Err((_, message)) => (
            StatusCode::SERVICE_UNAVAILABLE,
            serde_json::json!({
                "status": "unhealthy",
                "error": message,
            }),
        ),
    }
}

/// Inner version — returns version info (pure, no IO).
pub fn version_inner() -> serde_json::Value {
    serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "api": API_VERSION,
    })
}

pub async fn metrics_inner(store: &SurveyStore) -> (StatusCode, serde_json::Value) {
    dispatch(store, WellbeingRequest::GetMetrics, StatusCode::OK, None).await
}

pub async fn all_responses_inner(store: &SurveyStore) -> (StatusCode, serde_json::Value) {
    dispatch(store, WellbeingRequest::GetAllResponses, StatusCode::OK, None).await
}

pub async fn recent_responses_inner(
    store: &SurveyStore,
    config: &WellbeingConfig,
    params: RecentParams,
) -> (StatusCode, serde_json::Value) {
    dispatch(
        store,
        WellbeingRequest::GetRecentResponses {
            limit: params.limit,
        },
        StatusCode::OK,
        Some(config.dashboard.recent_limit),
    )
    .await
}

/// Inner JSON submit — 201 with the new id, 422 on validation failure.
pub async fn submit_json_inner(
    store: &SurveyStore,
    req: SubmitRequest,
) -> (StatusCode, serde_json::Value) {
    let request = WellbeingRequest::SubmitSurvey {
        stress: req.stress,
        workload: req.workload,
        satisfaction: req.satisfaction,
        notes: req.notes.map(|n| n.trim().to_string()),
    };
    dispatch(store, request, StatusCode::CREATED, None).await
}

/// Inner form submit — validates raw form fields and returns the flash to show.
pub async fn submit_form_inner(store: &SurveyStore, form: SurveyForm) -> Flash {
    let request = match survey_request_from_form(form) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!("Rejected survey form: {}", e);
            return Flash::error(e);
        }
    };

    let response = router::handle_request(request, store).await;
    match response_to_http(response) {
        Ok(_) => Flash::success(),
        Err((_, message)) => Flash::error(message),
    }
}

pub fn survey_request_from_form(form: SurveyForm) -> Result<WellbeingRequest, ValidationError> {
    Ok(WellbeingRequest::SubmitSurvey {
        stress: parse_rating(RatingField::Stress, form.stress.as_deref())?,
        workload: parse_rating(RatingField::Workload, form.workload.as_deref())?,
        satisfaction: parse_rating(RatingField::Satisfaction, form.satisfaction.as_deref())?,
        notes: Some(form.notes.unwrap_or_default().trim().to_string()),
    })
}

/// Inner dashboard — metrics over everything plus the recent window, oldest first.
pub async fn dashboard_inner(
    store: &SurveyStore,
    recent_limit: u32,
) -> Result<DashboardView, WellbeingError> {
    let recent = store
        .list_recent(recent_limit, RecordOrder::Chronological)
        .await?;
    let metrics = compute_metrics(store).await?;
    Ok(DashboardView::new(metrics, &recent))
}

// ============================================================================
// Axum handler wrappers (thin — delegate to inner functions)
// ============================================================================

pub async fn index_handler(Query(params): Query<FlashParams>) -> impl IntoResponse {
    Html(pages::render_index(params.into_flash().as_ref()))
}

pub async fn submit_form_handler(
    State(state): State<Arc<HttpState>>,
    Form(form): Form<SurveyForm>,
) -> impl IntoResponse {
    let flash = submit_form_inner(&state.store, form).await;
    Redirect::to(&format!("/?{}", flash.to_query()))
}

pub async fn dashboard_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    match dashboard_inner(&state.store, state.config.dashboard.recent_limit).await {
        Ok(view) => (StatusCode::OK, Html(pages::render_dashboard(&view))),
        Err(e) => {
            tracing::error!("Dashboard failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(format!(
                    "<h1>Dashboard unavailable</h1><p>{}</p>",
                    pages::escape_html(&e.to_string())
                )),
            )
        }
    }
}

pub async fn metrics_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let (status, body) = metrics_inner(&state.store).await;
    (status, Json(body))
}

pub async fn all_responses_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let (status, body) = all_responses_inner(&state.store).await;
    (status, Json(body))
}

pub async fn recent_responses_handler(
    State(state): State<Arc<HttpState>>,
    Query(params): Query<RecentParams>,
) -> impl IntoResponse {
    let (status, body) = recent_responses_inner(&state.store, &state.config, params).await;
    (status, Json(body))
}

pub async fn submit_json_handler(
    State(state): State<Arc<HttpState>>,
    Json(req): Json<SubmitRequest>,
) -> impl IntoResponse {
    let (status, body) = submit_json_inner(&state.store, req).await;
    (status, Json(body))
}

pub async fn health_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let (status, body) = health_inner(&state.store).await;
    (status, Json(body))
}

pub async fn version_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(version_inner()))
}

// ============================================================================
// Helpers
// ============================================================================

async fn dispatch(
    store: &SurveyStore,
    request: WellbeingRequest,
    success: StatusCode,
    default_limit: Option<u32>,
) -> (StatusCode, serde_json::Value) {
    let response = match default_limit {
        Some(limit) => router::handle_request_with_limit(request, store, limit).await,
        None => router::handle_request(request, store).await,
    };

    match response_to_http(response) {
        Ok(data) => (success, data),
        Err((status, message)) => (
            status,
            serde_json::json!({
                "error": message,
                "status": "error",
            }),
        ),
    }
}

/// Convert a `WellbeingResponse` into an HTTP body value, or an error status and message.
pub fn response_to_http(
    response: WellbeingResponse,
) -> std::result::Result<serde_json::Value, (StatusCode, String)> {
    if response.is_ok() {
        return Ok(response.data.unwrap_or(serde_json::json!({})));
    }
    let status = match response.error_kind {
        Some(ErrorKind::Validation) => StatusCode::UNPROCESSABLE_ENTITY,
        Some(ErrorKind::Store) | None => StatusCode::INTERNAL_SERVER_ERROR,
    };
    Err((
        status,
        response.error.unwrap_or_else(|| "unknown error".to_string()),
    ))
}

// ============================================================================
// Unit Tests — call inner functions directly
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use wellbeing_core::config::DatabaseConfig;

    async fn make_store() -> SurveyStore {
        let pool = wellbeing_core::db::create_pool(&DatabaseConfig::in_memory())
            .await
            .unwrap();
        wellbeing_core::db::init_schema(&pool).await.unwrap();
        SurveyStore::new(pool)
    }

    fn form(stress: &str, workload: &str, satisfaction: &str, notes: &str) -> SurveyForm {
        SurveyForm {
            stress: Some(stress.to_string()),
            workload: Some(workload.to_string()),
            satisfaction: Some(satisfaction.to_string()),
            notes: Some(notes.to_string()),
        }
    }

    #[test]
    fn test_version_inner_pure() {
        let v = version_inner();
        assert!(v["version"].is_string(), "version must be string");
        assert_eq!(v["api"], "wellbeing/1");
    }

    #[test]
    fn test_response_to_http_ok() {
        let resp = WellbeingResponse::ok(serde_json::json!({"count": 0}));
        let data = response_to_http(resp).unwrap();
        assert_eq!(data["count"], 0);
    }

    #[test]
    fn test_response_to_http_maps_error_kinds() {
        let resp = WellbeingResponse::err(ErrorKind::Validation, "bad rating");
        assert_eq!(
            response_to_http(resp).unwrap_err(),
            (StatusCode::UNPROCESSABLE_ENTITY, "bad rating".to_string())
        );

        let resp = WellbeingResponse::err(ErrorKind::Store, "disk full");
        assert_eq!(
            response_to_http(resp).unwrap_err().0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_response_to_http_error_no_message() {
        let mut resp = WellbeingResponse::err(ErrorKind::Store, "x");
        resp.error = None;
        let (_, message) = response_to_http(resp).unwrap_err();
        assert_eq!(message, "unknown error");
    }

    #[test]
    fn test_flash_params_require_both_fields() {
        let params = FlashParams {
            status: Some("success".to_string()),
            message: Some("ok".to_string()),
        };
        let flash = params.into_flash().unwrap();
        assert_eq!(flash.level, FlashLevel::Success);
        assert_eq!(flash.message, "ok");
        assert!(FlashParams::default().into_flash().is_none());
        let params = FlashParams {
            status: Some("danger".to_string()),
            message: Some(String::new()),
        };
        assert!(params.into_flash().is_none());
    }

    #[test]
    fn test_flash_params_unknown_level_is_ignored() {
        let params = FlashParams {
            status: Some("info".to_string()),
            message: Some("hi".to_string()),
        };
        assert!(params.into_flash().is_none());
    }

    #[test]
    fn test_form_parsing_trims_notes_and_rejects_non_integers() {
        let req = survey_request_from_form(form("3", "4", "5", "  tired  ")).unwrap();
        match req {
            WellbeingRequest::SubmitSurvey { notes, stress, .. } => {
                assert_eq!(stress, 3);
                assert_eq!(notes.as_deref(), Some("tired"));
            }
            other => panic!("unexpected request {:?}", other),
        }

        let err = survey_request_from_form(form("three", "4", "5", "")).unwrap_err();
        assert!(matches!(err, ValidationError::NotAnInteger { field: RatingField::Stress, .. }));

        let err = survey_request_from_form(SurveyForm::default()).unwrap_err();
        assert_eq!(err, ValidationError::Missing { field: RatingField::Stress });
    }

    #[tokio::test]
    async fn test_submit_form_inner_success_and_failure() {
        let store = make_store().await;

        let flash = submit_form_inner(&store, form("2", "3", "9", "")).await;
        assert_eq!(flash, Flash::success());

        let flash = submit_form_inner(&store, form("2", "11", "9", "")).await;
        assert_eq!(flash.level, FlashLevel::Danger);
        assert_eq!(flash.message, "Error: workload must be in 1-10, got 11");

        let flash = submit_form_inner(&store, form("2", "3", "nine", "")).await;
        assert_eq!(flash.level, FlashLevel::Danger);

        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_submit_json_inner_statuses() {
        let store = make_store().await;

        let (status, body) = submit_json_inner(
            &store,
            SubmitRequest {
                stress: 4,
                workload: 5,
                satisfaction: 7,
                notes: Some("ok".to_string()),
            },
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["ok"], true);
        assert!(body["id"].is_number());

        let (status, body) = submit_json_inner(
            &store,
            SubmitRequest {
                stress: 0,
                workload: 5,
                satisfaction: 7,
                notes: None,
            },
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["status"], "error");
        assert_eq!(body["error"], "stress must be in 1-10, got 0");
    }

    #[tokio::test]
    async fn test_metrics_inner_example() {
        let store = make_store().await;
        for (s, w, sat) in [(2, 3, 9), (4, 5, 7), (6, 1, 8)] {
            store.insert(s, w, sat, None).await.unwrap();
        }

        let (status, body) = metrics_inner(&store).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["avg_stress"], 4.0);
        assert_eq!(body["avg_workload"], 3.0);
        assert_eq!(body["avg_satisfaction"], 8.0);
        assert_eq!(body["wellbeing_score"], 70.0);
    }

    #[tokio::test]
    async fn test_recent_responses_inner_respects_limit() {
        let store = make_store().await;
        for _ in 0..40 {
            store.insert(5, 5, 5, None).await.unwrap();
        }
        let config = WellbeingConfig::default();

        let (_, body) = recent_responses_inner(&store, &config, RecentParams::default()).await;
        assert_eq!(body.as_array().unwrap().len(), 30);
        assert_eq!(body[0]["id"], 40);

        let (_, body) = recent_responses_inner(&store, &config, RecentParams { limit: Some(5) }).await;
        assert_eq!(body.as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_dashboard_inner_is_chronological() {
        let store = make_store().await;
        for i in 1..=35 {
            store.insert((i % 10) + 1, 5, 5, None).await.unwrap();
        }

        let view = dashboard_inner(&store, 30).await.unwrap();
        assert_eq!(view.recent.len(), 30);
        assert_eq!(view.recent.first().unwrap().id, 6);
        assert_eq!(view.recent.last().unwrap().id, 35);
        assert_eq!(view.chart.stress.len(), 30);
        assert_eq!(view.metrics.response_count, 35);
    }

    #[tokio::test]
    async fn test_health_inner_ok() {
        let store = make_store().await;
        let (status, body) = health_inner(&store).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(body["responses"], 0);
    }

    #[tokio::test]
    async fn test_health_inner_unhealthy_when_pool_closed() {
        let store = make_store().await;
        store.pool().close().await;

        let (status, body) = health_inner(&store).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "unhealthy");
    }
}
