//! 翻译模块
//!
//! - **languages**: 语言目录
//! - **orchestrator**: 单条翻译与批量翻译编排
//! - **error**: 请求级错误
//!
//! # 基本用法
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use trans22::model::{HubFetcher, HubOptions, LoaderSettings, ModelLoader};
//! use trans22::translation::{LanguageCatalog, TranslationOrchestrator};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = Arc::new(HubFetcher::new(HubOptions::from_env())?);
//! let loader = ModelLoader::new(LoaderSettings::from_env(), fetcher);
//! let orchestrator = TranslationOrchestrator::new(loader, Arc::new(LanguageCatalog::builtin()));
//!
//! let text = orchestrator.translate_one("Hello", Some("en"), "ja").await?;
//! let all = orchestrator.translate_all("Hello", Some("en")).await?;
//! println!("{} / {} 种语言", text, all.len());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod languages;
pub mod orchestrator;

pub use error::{TranslationError, TranslationResult};
pub use languages::{CatalogError, LanguageCatalog, LanguageEntry, DEFAULT_SOURCE};
pub use orchestrator::{FanOutItem, FanOutResult, ItemOutcome, TranslationOrchestrator};
