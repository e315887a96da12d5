//! 翻译相关API处理器

use std::sync::Arc;

use axum::{
    extract::{Json as ExtractJson, State},
    http::StatusCode,
    response::Json,
};

use crate::translation::{TranslationError, DEFAULT_SOURCE};
use crate::web::request_log::RequestStatus;
use crate::web::types::{
    AppState, TranslateAllRequest, TranslateAllResponse, TranslateRequest, TranslateResponse,
};

type ApiError = (StatusCode, Json<serde_json::Value>);

/// 单条翻译
pub async fn translate(
    State(state): State<Arc<AppState>>,
    ExtractJson(request): ExtractJson<TranslateRequest>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let text = request.text.unwrap_or_default();
    let target_lang = request.target_lang.unwrap_or_default();
    let source_lang = request
        .source_lang
        .unwrap_or_else(|| DEFAULT_SOURCE.to_string());

    let log_id = state.request_log.push(&text, &target_lang);

    match state
        .orchestrator
        .translate_one(&text, Some(source_lang.as_str()), &target_lang)
        .await
    {
        Ok(translation) => {
            state.request_log.finish(log_id, RequestStatus::Success);
            Ok(Json(TranslateResponse {
                translation,
                target_lang,
                source_lang,
            }))
        }
        Err(e) => {
            state.request_log.finish(log_id, RequestStatus::Error);
            Err(error_response(&e, "缺少必要参数", "翻译失败"))
        }
    }
}

/// 批量翻译到所有语言
pub async fn translate_all(
    State(state): State<Arc<AppState>>,
    ExtractJson(request): ExtractJson<TranslateAllRequest>,
) -> Result<Json<TranslateAllResponse>, ApiError> {
    let text = request.text.unwrap_or_default();
    let source_lang = request
        .source_lang
        .unwrap_or_else(|| DEFAULT_SOURCE.to_string());

    let translations = state
        .orchestrator
        .translate_all(&text, Some(source_lang.as_str()))
        .await
        .map_err(|e| error_response(&e, "缺少文本参数", "批量翻译失败"))?;

    Ok(Json(TranslateAllResponse { translations }))
}

/// 把翻译错误映射为 HTTP 响应
///
/// 参数错误和翻译失败的提示文字随接口不同。
pub fn error_response(
    error: &TranslationError,
    invalid_label: &str,
    failure_label: &str,
) -> ApiError {
    match error {
        TranslationError::InvalidRequest(message) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": invalid_label,
                "details": message
            })),
        ),
        TranslationError::UnsupportedLanguage(code) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": "不支持的目标语言",
                "details": code
            })),
        ),
        TranslationError::ResourceUnavailable { details } => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({
                "error": "模型未加载",
                "details": details
            })),
        ),
        TranslationError::TranslationFailed(message) => {
            tracing::error!("{}: {}", failure_label, message);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": failure_label,
                    "details": message
                })),
            )
        }
    }
}
