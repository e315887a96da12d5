//! 模型获取错误

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 单个镜像的失败记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostFailure {
    pub host: String,
    pub name: String,
    pub message: String,
}

/// 模型加载错误
///
/// 需要 `Clone`：同一次加载的结果会交给所有等待中的调用方。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// 没有任何可用的候选镜像
    #[error("模型 {model_id} 没有可用的下载镜像")]
    NoCandidates { model_id: String },

    /// 所有候选镜像都失败
    #[error("模型 {model_id} 加载失败: {last_message}")]
    AcquisitionFailed {
        model_id: String,
        last_message: String,
        failures: Vec<HostFailure>,
    },

    /// 加载被取消
    #[error("模型 {model_id} 加载已取消")]
    Cancelled { model_id: String },
}

impl LoadError {
    /// 按尝试顺序排列的镜像失败记录
    pub fn failures(&self) -> &[HostFailure] {
        match self {
            LoadError::AcquisitionFailed { failures, .. } => failures,
            _ => &[],
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, LoadError::Cancelled { .. })
    }
}

/// 单个镜像上的获取错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("已取消")]
    Cancelled,

    #[error("{0}")]
    Failed(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        FetchError::Failed(format!("网络错误: {}", error))
    }
}

impl From<std::io::Error> for FetchError {
    fn from(error: std::io::Error) -> Self {
        FetchError::Failed(format!("IO错误: {}", error))
    }
}

/// 翻译调用错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TranslatorError {
    pub message: String,
}

impl TranslatorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for TranslatorError {
    fn from(error: reqwest::Error) -> Self {
        TranslatorError::new(format!("推理服务请求失败: {}", error))
    }
}
