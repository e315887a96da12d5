//! 语言列表处理器

use std::sync::Arc;

use axum::{extract::State, response::Json};

use crate::web::types::{AppState, LanguageInfo, LanguagesResponse};

/// 按目录顺序列出支持的语言
pub async fn list_languages(State(state): State<Arc<AppState>>) -> Json<LanguagesResponse> {
    let languages = state
        .orchestrator
        .catalog()
        .entries()
        .iter()
        .map(|entry| LanguageInfo {
            code: entry.code.clone(),
            name: entry.name.clone(),
        })
        .collect();

    Json(LanguagesResponse { languages })
}
