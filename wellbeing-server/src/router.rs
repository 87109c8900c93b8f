use wellbeing_core::api::{ErrorKind, WellbeingRequest, WellbeingResponse};
use wellbeing_core::{compute_metrics, RecordOrder, RecordView, SurveyStore, WellbeingError};

/// Size of the recent window when the caller does not give one.
pub const DEFAULT_RECENT_LIMIT: u32 = 30;

pub async fn handle_request(request: WellbeingRequest, store: &SurveyStore) -> WellbeingResponse {
    handle_request_with_limit(request, store, DEFAULT_RECENT_LIMIT).await
}

/// Handle request, using `default_limit` for recent queries without an explicit limit
pub async fn handle_request_with_limit(
    request: WellbeingRequest,
    store: &SurveyStore,
    default_limit: u32,
) -> WellbeingResponse {
    match request {
        WellbeingRequest::Health => {
            let sqlite_ver = match wellbeing_core::db::health_check(store.pool()).await {
                Ok(v) => v,
                Err(e) => {
                    return WellbeingResponse::err(
                        ErrorKind::Store,
                        format!("DB Health Check failed: {}", e),
                    )
                }
            };
            match store.count().await {
                Ok(count) => WellbeingResponse::ok(serde_json::json!({
                    "sqlite": sqlite_ver,
                    "responses": count,
                    "status": "healthy"
                })),
                Err(e) => error_response(e),
            }
        }
        WellbeingRequest::SubmitSurvey {
            stress,
            workload,
            satisfaction,
            notes,
        } => match store
            .insert(stress, workload, satisfaction, notes.as_deref())
            .await
        {
            Ok(id) => {
                tracing::info!(id, "Recorded survey response");
                WellbeingResponse::ok(serde_json::json!({ "ok": true, "id": id }))
            }
            Err(e) => error_response(e),
        },
        WellbeingRequest::GetMetrics => match compute_metrics(store).await {
            Ok(metrics) => WellbeingResponse::ok(serde_json::json!(metrics)),
            Err(e) => error_response(e),
        },
        WellbeingRequest::GetRecentResponses { limit } => {
            let limit = limit.unwrap_or(default_limit);
            match store.list_recent(limit, RecordOrder::ReverseChronological).await {
                Ok(rows) => WellbeingResponse::ok(views(&rows)),
                Err(e) => error_response(e),
            }
        }
        WellbeingRequest::GetAllResponses => {
            match store.list_all(RecordOrder::ReverseChronological).await {
                Ok(rows) => WellbeingResponse::ok(views(&rows)),
                Err(e) => error_response(e),
            }
        }
    }
}

fn views(rows: &[wellbeing_core::SurveyResponse]) -> serde_json::Value {
    let views: Vec<RecordView> = rows.iter().map(RecordView::from).collect();
    serde_json::json!(views)
}

fn error_response(e: WellbeingError) -> WellbeingResponse {
    match e {
        WellbeingError::Validation(v) => {
            tracing::warn!("Rejected survey submission: {}", v);
            WellbeingResponse::err(ErrorKind::Validation, v.to_string())
        }
        other => {
            tracing::error!("Store operation failed: {}", other);
            WellbeingResponse::err(ErrorKind::Store, other.to_string())
        }
    }
}
