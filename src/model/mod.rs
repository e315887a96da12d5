//! 模型获取模块
//!
//! - **hosts**: 候选镜像解析
//! - **fetcher**: 获取调用与翻译调用的抽象
//! - **hub**: 基于镜像下载的获取实现
//! - **walker**: 镜像回退遍历与生命周期回调
//! - **loader**: 单例加载器
//! - **error**: 错误类型

pub mod error;
pub mod fetcher;
pub mod hosts;
pub mod hub;
pub mod loader;
pub mod walker;

pub use error::{FetchError, HostFailure, LoadError, TranslatorError};
pub use fetcher::{
    FetchRequest, ModelFetcher, SharedTranslator, TranslateOptions, TranslationOutput, Translator,
};
pub use hosts::{normalize_host, resolve, CandidateHost, HostSettings};
pub use hub::{HubFetcher, HubOptions};
pub use loader::{LoadPhase, LoaderSettings, LoaderSnapshot, ModelLoader};
pub use walker::{walk, Acquired, LoadObserver, NoopObserver, TracingObserver, WalkTarget};
