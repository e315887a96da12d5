//! Web 服务器模块
//!
//! 为翻译服务提供 HTTP 接口、请求日志和静态页面

pub mod config;
pub mod handlers;
pub mod request_log;
pub mod routes;
pub mod types;

pub use config::*;
pub use handlers::*;
pub use request_log::*;
pub use routes::*;
pub use types::*;

use std::sync::Arc;

use axum::Router;
use thiserror::Error;
use tower_http::{cors::CorsLayer, services::ServeDir};

use crate::translation::TranslationOrchestrator;

/// Web 服务器错误
#[derive(Error, Debug)]
pub enum WebError {
    #[error("无法绑定地址 {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("服务器错误: {0}")]
    Serve(#[from] std::io::Error),
}

/// Web 服务器
pub struct WebServer {
    config: WebConfig,
    state: Arc<AppState>,
}

impl WebServer {
    /// 创建新的 Web 服务器
    pub fn new(config: WebConfig, orchestrator: TranslationOrchestrator) -> Self {
        let orchestrator = orchestrator.with_fanout_concurrency(config.fanout_concurrency);
        Self {
            config,
            state: Arc::new(AppState::new(orchestrator)),
        }
    }

    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    pub fn router(&self) -> Router {
        create_router(Arc::clone(&self.state), &self.config)
    }

    /// 在后台开始加载模型，失败时等首次请求再重试
    pub fn preload(&self) {
        let loader = self.state.orchestrator.loader().clone();
        tokio::spawn(async move {
            if let Err(e) = loader.acquire().await {
                tracing::warn!("后台加载模型失败，将在首次请求时重试: {}", e);
            }
        });
    }

    /// 启动 Web 服务器
    pub async fn start(&self) -> Result<(), WebError> {
        let address = self.config.listen_address();
        let listener = tokio::net::TcpListener::bind(&address)
            .await
            .map_err(|source| WebError::Bind {
                address: address.clone(),
                source,
            })?;

        tracing::info!("Web server starting at http://{}", address);
        tracing::info!("状态监控: http://{}/api/status", address);

        if self.config.preload {
            self.preload();
        }

        axum::serve(listener, self.router()).await?;

        Ok(())
    }
}

/// 创建路由器
pub fn create_router(app_state: Arc<AppState>, config: &WebConfig) -> Router {
    let mut app = create_routes().with_state(app_state);

    // 添加CORS支持
    app = app.layer(CorsLayer::permissive());

    // 其余路径交给静态文件服务，`/` 对应 index.html
    if let Some(static_dir) = &config.static_dir {
        app = app.fallback_service(ServeDir::new(static_dir));
    }

    app
}
