//! 翻译编排
//!
//! 单条翻译：校验请求、等待模型就绪、调用一次翻译。
//! 批量翻译：按目录顺序对除源语言外的每种语言各调用一次，单个语言失败
//! 只记录在该语言的结果中，不影响其余语言。

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

use crate::model::{ModelLoader, TranslateOptions, Translator, TranslatorError};
use crate::translation::error::{TranslationError, TranslationResult};
use crate::translation::languages::{LanguageCatalog, LanguageEntry};

/// 失败槽位中文本的前缀
pub const FAILURE_PREFIX: &str = "翻译失败";

/// 单个语言的翻译结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Translated(String),
    Failed(String),
}

impl ItemOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, ItemOutcome::Failed(_))
    }

    /// 展示用文本，失败时为带前缀的错误信息
    pub fn text(&self) -> String {
        match self {
            ItemOutcome::Translated(text) => text.clone(),
            ItemOutcome::Failed(message) => format!("{}: {}", FAILURE_PREFIX, message),
        }
    }
}

/// 批量翻译中的一项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FanOutItem {
    pub code: String,
    pub name: String,
    pub outcome: ItemOutcome,
}

impl Serialize for FanOutItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut item = serializer.serialize_struct("FanOutItem", 3)?;
        item.serialize_field("name", &self.name)?;
        item.serialize_field("translation", &self.outcome.text())?;
        item.serialize_field("failed", &self.outcome.is_failed())?;
        item.end()
    }
}

/// 批量翻译结果，按目录顺序排列
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FanOutResult {
    items: Vec<FanOutItem>,
}

impl FanOutResult {
    pub fn items(&self) -> &[FanOutItem] {
        &self.items
    }

    pub fn get(&self, code: &str) -> Option<&FanOutItem> {
        self.items.iter().find(|item| item.code == code)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn failed_count(&self) -> usize {
        self.items.iter().filter(|item| item.outcome.is_failed()).count()
    }
}

/// 序列化为以语言代码为键、保持目录顺序的映射
impl Serialize for FanOutResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.items.len()))?;
        for item in &self.items {
            map.serialize_entry(&item.code, item)?;
        }
        map.end()
    }
}

/// 翻译编排器
#[derive(Clone)]
pub struct TranslationOrchestrator {
    loader: ModelLoader,
    catalog: Arc<LanguageCatalog>,
    fanout_concurrency: usize,
}

impl TranslationOrchestrator {
    pub fn new(loader: ModelLoader, catalog: Arc<LanguageCatalog>) -> Self {
        Self {
            loader,
            catalog,
            fanout_concurrency: 1,
        }
    }

    /// 批量翻译时同时进行的语言数，至少为 1
    pub fn with_fanout_concurrency(mut self, concurrency: usize) -> Self {
        self.fanout_concurrency = concurrency.max(1);
        self
    }

    pub fn catalog(&self) -> &LanguageCatalog {
        &self.catalog
    }

    pub fn loader(&self) -> &ModelLoader {
        &self.loader
    }

    /// 翻译到单个目标语言
    pub async fn translate_one(
        &self,
        text: &str,
        source: Option<&str>,
        target: &str,
    ) -> TranslationResult<String> {
        if text.is_empty() {
            return Err(TranslationError::InvalidRequest("缺少文本参数".to_string()));
        }
        if target.is_empty() {
            return Err(TranslationError::InvalidRequest("缺少目标语言".to_string()));
        }

        let target = self
            .catalog
            .get(target)
            .ok_or_else(|| TranslationError::UnsupportedLanguage(target.to_string()))?;
        let source = self.catalog.resolve_source(source);

        let acquired = self.loader.acquire().await?;

        invoke(acquired.translator.as_ref(), text, source, target)
            .await
            .map_err(|e| TranslationError::TranslationFailed(e.message))
    }

    /// 翻译到目录中除源语言外的所有语言
    pub async fn translate_all(
        &self,
        text: &str,
        source: Option<&str>,
    ) -> TranslationResult<FanOutResult> {
        if text.is_empty() {
            return Err(TranslationError::InvalidRequest("缺少文本参数".to_string()));
        }

        let source = self.catalog.resolve_source(source);
        let acquired = self.loader.acquire().await?;
        let translator = acquired.translator.as_ref();

        let targets: Vec<&LanguageEntry> = self
            .catalog
            .entries()
            .iter()
            .filter(|entry| entry.code != source.code)
            .collect();

        tracing::info!(
            "开始批量翻译: {} -> {} 种语言 (并发 {})",
            source.code,
            targets.len(),
            self.fanout_concurrency
        );

        let pending: Vec<_> = targets
            .iter()
            .map(|target| translate_item(translator, text, source, target))
            .collect();

        // buffered 按输入顺序产出结果
        let outcomes: Vec<ItemOutcome> = stream::iter(pending)
            .buffered(self.fanout_concurrency)
            .collect()
            .await;

        let items: Vec<FanOutItem> = targets
            .into_iter()
            .zip(outcomes)
            .map(|(target, outcome)| FanOutItem {
                code: target.code.clone(),
                name: target.name.clone(),
                outcome,
            })
            .collect();

        let result = FanOutResult { items };
        tracing::info!(
            "批量翻译完成: {} 种语言，失败 {}",
            result.len(),
            result.failed_count()
        );
        Ok(result)
    }
}

async fn translate_item(
    translator: &dyn Translator,
    text: &str,
    source: &LanguageEntry,
    target: &LanguageEntry,
) -> ItemOutcome {
    match invoke(translator, text, source, target).await {
        Ok(translation) => ItemOutcome::Translated(translation),
        Err(e) => {
            tracing::warn!("翻译到 {} 失败: {}", target.code, e);
            ItemOutcome::Failed(e.message)
        }
    }
}

async fn invoke(
    translator: &dyn Translator,
    text: &str,
    source: &LanguageEntry,
    target: &LanguageEntry,
) -> Result<String, TranslatorError> {
    let options = TranslateOptions {
        src_lang: source.model_code.clone(),
        tgt_lang: target.model_code.clone(),
    };

    tracing::debug!("翻译 {} -> {}", options.src_lang, options.tgt_lang);

    translator
        .translate(text, &options)
        .await?
        .into_iter()
        .next()
        .map(|output| output.translation_text)
        .ok_or_else(|| TranslatorError::new("模型没有返回翻译结果"))
}
