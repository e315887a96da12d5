//! Web 路由定义

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::web::{handlers::*, types::AppState};

/// 创建 API 路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/languages", get(list_languages))
        .route("/api/translate", post(translate))
        .route("/api/translate-all", post(translate_all))
        .route("/api/status", get(status))
}
