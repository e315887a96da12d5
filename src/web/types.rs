//! Web 模块的数据类型定义

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::model::{CandidateHost, HostFailure};
use crate::translation::{FanOutResult, TranslationOrchestrator};
use crate::web::request_log::{RequestLog, RequestLogEntry};

/// 应用状态
pub struct AppState {
    pub orchestrator: TranslationOrchestrator,
    pub request_log: RequestLog,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(orchestrator: TranslationOrchestrator) -> Self {
        Self {
            orchestrator,
            request_log: RequestLog::new(),
            started_at: Instant::now(),
        }
    }
}

/// 单条翻译请求
///
/// 字段都是可选的，缺失时由处理器返回 400 而不是反序列化错误。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateRequest {
    pub text: Option<String>,
    pub target_lang: Option<String>,
    pub source_lang: Option<String>,
}

/// 单条翻译响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateResponse {
    pub translation: String,
    pub target_lang: String,
    pub source_lang: String,
}

/// 批量翻译请求
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateAllRequest {
    pub text: Option<String>,
    pub source_lang: Option<String>,
}

/// 批量翻译响应
#[derive(Debug, Serialize)]
pub struct TranslateAllResponse {
    pub translations: FanOutResult,
}

/// 语言列表条目
#[derive(Debug, Serialize)]
pub struct LanguageInfo {
    pub code: String,
    pub name: String,
}

/// 语言列表响应
#[derive(Debug, Serialize)]
pub struct LanguagesResponse {
    pub languages: Vec<LanguageInfo>,
}

/// 服务状态响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub status: &'static str,
    pub model_loaded: bool,
    pub model_loading: bool,
    pub model_error: Option<String>,
    pub model_source: Option<CandidateHost>,
    pub model_failures: Vec<HostFailure>,
    pub model_id: String,
    pub model_candidates: Vec<CandidateHost>,
    pub uptime: u64,
    pub total_requests: usize,
    pub recent_logs: Vec<RequestLogEntry>,
}
