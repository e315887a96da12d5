//! # Trans22
//!
//! 本地多语言翻译服务：按需从镜像站点下载翻译模型，并通过 HTTP 接口提供
//! 单条翻译和"一次翻译到所有语言"的批量翻译。
//!
//! ## 模块组织
//!
//! - `env` - 类型安全的环境变量配置
//! - `model` - 候选镜像解析、镜像回退加载和单例模型加载器
//! - `translation` - 语言目录和翻译编排
//! - `web` - Web服务器功能（可选）

pub mod env;
pub mod model;
pub mod translation;
#[cfg(feature = "web")]
pub mod web;

pub use model::{Acquired, CandidateHost, LoadError, ModelLoader};
pub use translation::{LanguageCatalog, TranslationError, TranslationOrchestrator};
