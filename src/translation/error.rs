//! 翻译请求错误
//!
//! 单条翻译和批量翻译对调用方暴露的错误。批量翻译中单个语言的失败
//! 不会出现在这里，而是作为数据写入对应的结果槽位。

use thiserror::Error;

use crate::model::LoadError;

/// 翻译错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslationError {
    /// 缺少必要参数
    #[error("请求无效: {0}")]
    InvalidRequest(String),

    /// 目标语言不在目录中
    #[error("不支持的目标语言: {0}")]
    UnsupportedLanguage(String),

    /// 模型未加载
    #[error("模型未加载")]
    ResourceUnavailable { details: Option<String> },

    /// 翻译调用失败
    #[error("翻译失败: {0}")]
    TranslationFailed(String),
}

impl TranslationError {
    /// 是否为调用方错误（不应重试）
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            TranslationError::InvalidRequest(_) | TranslationError::UnsupportedLanguage(_)
        )
    }

    /// 供排查使用的详细信息
    pub fn details(&self) -> Option<String> {
        match self {
            TranslationError::ResourceUnavailable { details } => details.clone(),
            TranslationError::TranslationFailed(message) => Some(message.clone()),
            _ => None,
        }
    }
}

impl From<LoadError> for TranslationError {
    fn from(error: LoadError) -> Self {
        TranslationError::ResourceUnavailable {
            details: Some(error.to_string()),
        }
    }
}

/// 错误结果类型别名
pub type TranslationResult<T> = Result<T, TranslationError>;
