//! 模型获取与翻译调用的抽象边界

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::error::{FetchError, TranslatorError};
use super::hosts::CandidateHost;

/// 单次获取请求
///
/// 目标镜像作为显式参数传入，而不是读取进程级的全局设置。
#[derive(Debug, Clone, Copy)]
pub struct FetchRequest<'a> {
    pub task: &'a str,
    pub model_id: &'a str,
    pub host: &'a CandidateHost,
}

/// 单条翻译的语言参数（模型内部语言代码）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslateOptions {
    pub src_lang: String,
    pub tgt_lang: String,
}

/// 翻译调用的单条输出
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationOutput {
    pub translation_text: String,
}

/// 已加载的翻译资源
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(
        &self,
        text: &str,
        options: &TranslateOptions,
    ) -> Result<Vec<TranslationOutput>, TranslatorError>;
}

/// 共享的翻译资源句柄
pub type SharedTranslator = Arc<dyn Translator>;

/// 针对单个镜像获取模型
///
/// 实现自行负责网络重试和超时。收到取消信号时应尽快返回
/// `FetchError::Cancelled`。
#[async_trait]
pub trait ModelFetcher: Send + Sync {
    async fn fetch(
        &self,
        request: FetchRequest<'_>,
        cancel: &CancellationToken,
    ) -> Result<SharedTranslator, FetchError>;
}
