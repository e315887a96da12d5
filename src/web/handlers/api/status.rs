//! 服务状态处理器

use std::sync::Arc;

use axum::{extract::State, response::Json};

use crate::model::LoadPhase;
use crate::web::types::{AppState, StatusResponse};

/// 状态接口返回的最近日志条数
pub const RECENT_LOGS: usize = 10;

/// 服务与模型加载状态
pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let loader = state.orchestrator.loader();
    let snapshot = loader.snapshot();

    Json(StatusResponse {
        status: "running",
        model_loaded: snapshot.phase == LoadPhase::Ready,
        model_loading: snapshot.phase == LoadPhase::Loading,
        model_error: snapshot.error,
        model_source: snapshot.source,
        model_failures: snapshot.failures,
        model_id: snapshot.model_id,
        model_candidates: loader.candidates(),
        uptime: state.started_at.elapsed().as_secs(),
        total_requests: state.request_log.len(),
        recent_logs: state.request_log.recent(RECENT_LOGS),
    })
}
