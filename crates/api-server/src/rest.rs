//! REST API handlers for segment listing, lookup, and gender statistics.
//!
//! Query-string and path parameters are parsed and type-checked by axum's
//! extractors before any handler body runs; the components behind these
//! handlers assume well-formed input.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, warn};
use uuid::Uuid;

use audience_core::error::AudienceError;
use audience_core::types::{Segment, SegmentGenderData, SegmentMetaData};
use audience_segments::{SegmentEnrichment, SegmentFinder, SegmentStatsAggregator};
use audience_store::SegmentStore;

/// Shared application state for REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SegmentStore>,
    pub finder: Arc<SegmentFinder>,
    pub aggregator: Arc<SegmentStatsAggregator>,
    pub enrichment: Arc<SegmentEnrichment>,
    pub node_id: String,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(store: Arc<dyn SegmentStore>, node_id: String) -> Self {
        let finder = Arc::new(SegmentFinder::new(store.clone()));
        let aggregator = Arc::new(SegmentStatsAggregator::new(store.clone()));
        let enrichment = Arc::new(SegmentEnrichment::new(aggregator.clone()));
        Self {
            store,
            finder,
            aggregator,
            enrichment,
            node_id,
            start_time: Instant::now(),
        }
    }
}

/// Success envelope: `{"success": true, "data": ..., "totalCount"?: n}`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
}

impl<T> ApiResponse<T> {
    fn data(data: T) -> Self {
        Self {
            success: true,
            data,
            total_count: None,
        }
    }

    fn page(data: T, total_count: u64) -> Self {
        Self {
            success: true,
            data,
            total_count: Some(total_count),
        }
    }
}

/// Failure envelope: `{"success": false, "msg": "..."}`.
#[derive(Serialize)]
pub struct FailureResponse {
    pub success: bool,
    pub msg: String,
}

#[derive(Serialize)]
pub struct Ack {
    pub success: bool,
}

type RestError = (StatusCode, Json<FailureResponse>);

fn error_response(context: &'static str, err: AudienceError) -> RestError {
    let status = match &err {
        AudienceError::SegmentNotFound(_) => StatusCode::NOT_FOUND,
        AudienceError::Query(_) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!(error = %err, context, "Request failed");
        metrics::counter!("api.errors").increment(1);
    } else {
        warn!(error = %err, context, "Request rejected");
        metrics::counter!("api.validation_errors").increment(1);
    }
    (
        status,
        Json(FailureResponse {
            success: false,
            msg: err.to_string(),
        }),
    )
}

#[derive(Deserialize)]
pub struct ListParams {
    pub skip: u64,
    pub limit: u64,
    pub q: Option<String>,
}

/// GET /v1/segments — a page of segments, newest first, each enriched with
/// user statistics; `totalCount` covers all matches, not just the page.
pub async fn list_segments(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ApiResponse<Vec<SegmentMetaData>>>, RestError> {
    let page = state
        .finder
        .find(params.skip, params.limit, params.q.as_deref())
        .await
        .map_err(|e| error_response("segment list", e))?;

    let data = state
        .enrichment
        .enrich(page.segments)
        .await
        .map_err(|e| error_response("segment list", e))?;

    Ok(Json(ApiResponse::page(data, page.total_count)))
}

/// GET /v1/segments/:id
pub async fn get_segment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Segment>>, RestError> {
    let segment = state
        .store
        .segment_by_id(id)
        .await
        .map_err(|e| error_response("segment by id", e))?
        .ok_or_else(|| error_response("segment by id", AudienceError::SegmentNotFound(id)))?;

    Ok(Json(ApiResponse::data(segment)))
}

/// PATCH /v1/segments/:id — segments are immutable in this read-side
/// service; the update is acknowledged without touching the store.
pub async fn update_segment(Path(_id): Path<Uuid>) -> Json<Ack> {
    Json(Ack { success: true })
}

/// GET /v1/segments/gender-data/:id — Male/Female member counts with their
/// share of the combined Male+Female population.
pub async fn segment_gender_data(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<SegmentGenderData>>>, RestError> {
    state
        .store
        .segment_by_id(id)
        .await
        .map_err(|e| error_response("gender data", e))?
        .ok_or_else(|| error_response("gender data", AudienceError::SegmentNotFound(id)))?;

    let data = state
        .aggregator
        .compute_gender_distribution(id)
        .await
        .map_err(|e| error_response("gender data", e))?;

    Ok(Json(ApiResponse::data(data)))
}

/// GET /health — Health check endpoint.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        node_id: state.node_id.clone(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// GET /ready — Readiness probe for Kubernetes.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    if state.start_time.elapsed().as_secs() > 0 {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /live — Liveness probe for Kubernetes.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub node_id: String,
    pub uptime_secs: u64,
}
