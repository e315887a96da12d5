//! 镜像回退遍历
//!
//! 按顺序逐个尝试候选镜像，首个成功即停止。每个镜像只尝试一次，
//! 镜像之间严格串行；失败信息按尝试顺序汇总。

use std::fmt;

use tokio_util::sync::CancellationToken;

use super::error::{FetchError, HostFailure, LoadError};
use super::fetcher::{FetchRequest, ModelFetcher, SharedTranslator};
use super::hosts::CandidateHost;

/// 加载过程的生命周期回调
///
/// 回调只用于日志和界面提示，遍历逻辑不依赖它们的结果。
pub trait LoadObserver: Send + Sync {
    fn on_attempt(&self, _candidate: &CandidateHost) {}

    fn on_success(&self, _candidate: &CandidateHost) {}

    fn on_failure(&self, _candidate: &CandidateHost, _error: &FetchError) {}
}

/// 不做任何事的回调
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl LoadObserver for NoopObserver {}

/// 输出到 tracing 的回调
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl LoadObserver for TracingObserver {
    fn on_attempt(&self, candidate: &CandidateHost) {
        tracing::info!("尝试从 {} ({}) 加载模型...", candidate.name, candidate.host);
    }

    fn on_success(&self, candidate: &CandidateHost) {
        tracing::info!("模型加载成功！来源: {} ({})", candidate.name, candidate.host);
    }

    fn on_failure(&self, candidate: &CandidateHost, error: &FetchError) {
        tracing::warn!("从 {} 加载失败: {}", candidate.name, error);
    }
}

/// 遍历成功的结果
#[derive(Clone)]
pub struct Acquired {
    pub translator: SharedTranslator,
    pub source: CandidateHost,
}

impl fmt::Debug for Acquired {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Acquired")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// 遍历所需的模型信息
#[derive(Debug, Clone, Copy)]
pub struct WalkTarget<'a> {
    pub task: &'a str,
    pub model_id: &'a str,
}

/// 依次尝试所有候选镜像
pub async fn walk(
    fetcher: &dyn ModelFetcher,
    target: WalkTarget<'_>,
    candidates: &[CandidateHost],
    observer: &dyn LoadObserver,
    cancel: &CancellationToken,
) -> Result<Acquired, LoadError> {
    if candidates.is_empty() {
        return Err(LoadError::NoCandidates {
            model_id: target.model_id.to_string(),
        });
    }

    let mut failures = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        if cancel.is_cancelled() {
            return Err(LoadError::Cancelled {
                model_id: target.model_id.to_string(),
            });
        }

        observer.on_attempt(candidate);

        let request = FetchRequest {
            task: target.task,
            model_id: target.model_id,
            host: candidate,
        };

        match fetcher.fetch(request, cancel).await {
            Ok(translator) => {
                observer.on_success(candidate);
                return Ok(Acquired {
                    translator,
                    source: candidate.clone(),
                });
            }
            Err(FetchError::Cancelled) => {
                tracing::info!("模型加载在 {} 处被取消", candidate.name);
                return Err(LoadError::Cancelled {
                    model_id: target.model_id.to_string(),
                });
            }
            Err(error) => {
                observer.on_failure(candidate, &error);
                failures.push(HostFailure {
                    host: candidate.host.clone(),
                    name: candidate.name.clone(),
                    message: error.to_string(),
                });
            }
        }
    }

    let last_message = failures
        .last()
        .map(|failure| failure.message.clone())
        .unwrap_or_default();

    Err(LoadError::AcquisitionFailed {
        model_id: target.model_id.to_string(),
        last_message,
        failures,
    })
}
