//! 单例模型加载器
//!
//! 进程内只维护一个共享的翻译资源。状态机为
//! `Idle -> Loading -> Ready`（成功后永久保留）或 `Loading -> Failed`
//! （之后的调用会重新走一遍完整的镜像回退）。
//!
//! 加载进行中到达的调用方不会发起第二次加载，而是等待同一个共享 future，
//! 拿到完全相同的结果。加载在独立的 tokio 任务中进行，不依赖任何调用方继续等待。

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use super::error::{HostFailure, LoadError};
use super::fetcher::ModelFetcher;
use super::hosts::{self, CandidateHost, HostSettings};
use super::walker::{self, Acquired, LoadObserver, TracingObserver, WalkTarget};
use crate::env::{EnvError, EnvResult};

pub const DEFAULT_MODEL_ID: &str = "Xenova/nllb-200-distilled-600M";
pub const DEFAULT_TASK: &str = "translation";

/// 加载器配置
#[derive(Debug, Clone)]
pub struct LoaderSettings {
    pub model_id: String,
    pub task: String,
    pub hosts: HostSettings,
}

impl LoaderSettings {
    pub fn new(model_id: impl Into<String>, hosts: HostSettings) -> Self {
        Self {
            model_id: model_id.into(),
            task: DEFAULT_TASK.to_string(),
            hosts,
        }
    }

    /// 从环境变量创建配置
    pub fn from_env() -> Self {
        use crate::env::{model, EnvVar};

        let model_id = model::ModelId::get().unwrap_or_else(|e| {
            tracing::warn!("{}，使用默认模型 {}", e, DEFAULT_MODEL_ID);
            DEFAULT_MODEL_ID.to_string()
        });
        let task = model::Task::get_or_default(DEFAULT_TASK.to_string());

        Self {
            model_id,
            task,
            hosts: HostSettings::from_env(),
        }
    }

    /// 验证配置
    pub fn validate(&self) -> EnvResult<()> {
        if self.model_id.trim().is_empty() || !self.model_id.contains('/') {
            return Err(EnvError {
                variable: "TRANS22_MODEL_ID".to_string(),
                message: format!("Model id '{}' must look like 'owner/name'", self.model_id),
            });
        }

        if self.task.trim().is_empty() {
            return Err(EnvError {
                variable: "TRANS22_MODEL_TASK".to_string(),
                message: "Task cannot be empty".to_string(),
            });
        }

        if hosts::resolve(&self.hosts).is_empty() {
            tracing::warn!("没有可用的候选镜像，模型将无法加载");
        }

        Ok(())
    }
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL_ID, HostSettings::new(None, None))
    }
}

type SharedLoad = Shared<BoxFuture<'static, Result<Acquired, LoadError>>>;

enum LoaderState {
    Idle,
    Loading {
        load: SharedLoad,
        cancel: CancellationToken,
    },
    Ready(Acquired),
    Failed(LoadError),
}

/// 加载阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadPhase {
    Idle,
    Loading,
    Ready,
    Failed,
}

/// 加载器状态的只读快照
#[derive(Debug, Clone, Serialize)]
pub struct LoaderSnapshot {
    pub phase: LoadPhase,
    pub model_id: String,
    pub source: Option<CandidateHost>,
    pub error: Option<String>,
    pub failures: Vec<HostFailure>,
    pub walks: usize,
}

struct LoaderInner {
    settings: LoaderSettings,
    fetcher: Arc<dyn ModelFetcher>,
    observer: Arc<dyn LoadObserver>,
    state: Mutex<LoaderState>,
    walks: AtomicUsize,
}

impl LoaderInner {
    fn state(&self) -> MutexGuard<'_, LoaderState> {
        // 状态切换都是单条赋值，中毒后的数据仍然一致
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn run(self: Arc<Self>, cancel: CancellationToken) -> Result<Acquired, LoadError> {
        self.walks.fetch_add(1, Ordering::SeqCst);

        let candidates = hosts::resolve(&self.settings.hosts);
        tracing::info!(
            "正在加载翻译模型 ({})，候选镜像 {} 个",
            self.settings.model_id,
            candidates.len()
        );

        let target = WalkTarget {
            task: &self.settings.task,
            model_id: &self.settings.model_id,
        };
        let result = walker::walk(
            self.fetcher.as_ref(),
            target,
            &candidates,
            self.observer.as_ref(),
            &cancel,
        )
        .await;

        self.publish(&result);
        result
    }

    /// 在独立任务中运行遍历，调用方离开后加载仍会继续
    fn spawn_walk(self: &Arc<Self>, cancel: CancellationToken) -> SharedLoad {
        let inner = Arc::clone(self);
        let task = tokio::spawn(async move {
            match AssertUnwindSafe(Arc::clone(&inner).run(cancel))
                .catch_unwind()
                .await
            {
                Ok(result) => result,
                Err(_) => {
                    let error = inner.aborted("加载任务异常退出");
                    inner.publish(&Err(error.clone()));
                    Err(error)
                }
            }
        });

        let inner = Arc::clone(self);
        async move {
            match task.await {
                Ok(result) => result,
                Err(join_error) => {
                    let error = inner.aborted(join_error);
                    inner.publish(&Err(error.clone()));
                    Err(error)
                }
            }
        }
        .boxed()
        .shared()
    }

    fn aborted(&self, reason: impl fmt::Display) -> LoadError {
        LoadError::AcquisitionFailed {
            model_id: self.settings.model_id.clone(),
            last_message: format!("加载任务中止: {}", reason),
            failures: Vec::new(),
        }
    }

    fn publish(&self, result: &Result<Acquired, LoadError>) {
        let next = match result {
            Ok(acquired) => LoaderState::Ready(acquired.clone()),
            Err(error) => {
                tracing::error!("模型加载失败: {}", error);
                for (index, failure) in error.failures().iter().enumerate() {
                    tracing::error!("  [{}] {}: {}", index + 1, failure.name, failure.message);
                }
                LoaderState::Failed(error.clone())
            }
        };
        *self.state() = next;
    }
}

/// 单例模型加载器
///
/// 克隆开销很小，所有克隆共享同一个状态。
#[derive(Clone)]
pub struct ModelLoader {
    inner: Arc<LoaderInner>,
}

impl ModelLoader {
    pub fn new(settings: LoaderSettings, fetcher: Arc<dyn ModelFetcher>) -> Self {
        Self::with_observer(settings, fetcher, Arc::new(TracingObserver))
    }

    pub fn with_observer(
        settings: LoaderSettings,
        fetcher: Arc<dyn ModelFetcher>,
        observer: Arc<dyn LoadObserver>,
    ) -> Self {
        Self {
            inner: Arc::new(LoaderInner {
                settings,
                fetcher,
                observer,
                state: Mutex::new(LoaderState::Idle),
                walks: AtomicUsize::new(0),
            }),
        }
    }

    pub fn model_id(&self) -> &str {
        &self.inner.settings.model_id
    }

    /// 候选镜像列表（与加载时使用的顺序一致）
    pub fn candidates(&self) -> Vec<CandidateHost> {
        hosts::resolve(&self.inner.settings.hosts)
    }

    /// 获取共享的翻译资源
    ///
    /// 已就绪时立即返回；加载中则等待同一次加载；空闲或上次失败时发起新的加载。
    pub async fn acquire(&self) -> Result<Acquired, LoadError> {
        let load = {
            let mut state = self.inner.state();
            let in_flight = match &*state {
                LoaderState::Ready(acquired) => return Ok(acquired.clone()),
                LoaderState::Loading { load, .. } => Some(load.clone()),
                LoaderState::Idle | LoaderState::Failed(_) => None,
            };

            match in_flight {
                Some(load) => load,
                None => {
                    let cancel = CancellationToken::new();
                    let load = self.inner.spawn_walk(cancel.clone());
                    *state = LoaderState::Loading {
                        load: load.clone(),
                        cancel,
                    };
                    load
                }
            }
        };

        load.await
    }

    /// 已就绪的资源，不会触发加载
    pub fn ready(&self) -> Option<Acquired> {
        match &*self.inner.state() {
            LoaderState::Ready(acquired) => Some(acquired.clone()),
            _ => None,
        }
    }

    /// 取消正在进行的加载
    ///
    /// 返回是否有加载被取消。等待方会收到 `LoadError::Cancelled`。
    pub fn cancel(&self) -> bool {
        match &*self.inner.state() {
            LoaderState::Loading { cancel, .. } => {
                tracing::info!("取消模型加载 ({})", self.inner.settings.model_id);
                cancel.cancel();
                true
            }
            _ => false,
        }
    }

    pub fn phase(&self) -> LoadPhase {
        match &*self.inner.state() {
            LoaderState::Idle => LoadPhase::Idle,
            LoaderState::Loading { .. } => LoadPhase::Loading,
            LoaderState::Ready(_) => LoadPhase::Ready,
            LoaderState::Failed(_) => LoadPhase::Failed,
        }
    }

    /// 最近一次失败的错误
    pub fn last_error(&self) -> Option<LoadError> {
        match &*self.inner.state() {
            LoaderState::Failed(error) => Some(error.clone()),
            _ => None,
        }
    }

    pub fn snapshot(&self) -> LoaderSnapshot {
        let (phase, source, error, failures) = match &*self.inner.state() {
            LoaderState::Idle => (LoadPhase::Idle, None, None, Vec::new()),
            LoaderState::Loading { .. } => (LoadPhase::Loading, None, None, Vec::new()),
            LoaderState::Ready(acquired) => {
                (LoadPhase::Ready, Some(acquired.source.clone()), None, Vec::new())
            }
            LoaderState::Failed(error) => (
                LoadPhase::Failed,
                None,
                Some(error.to_string()),
                error.failures().to_vec(),
            ),
        };

        LoaderSnapshot {
            phase,
            model_id: self.inner.settings.model_id.clone(),
            source,
            error,
            failures,
            walks: self.inner.walks.load(Ordering::SeqCst),
        }
    }
}
