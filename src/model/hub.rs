//! 基于模型仓库镜像的获取实现
//!
//! 从候选镜像下载模型文件到本地缓存目录（已缓存的文件直接复用），
//! 然后返回一个绑定到本地推理运行时的翻译资源。

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

use super::error::{FetchError, TranslatorError};
use super::fetcher::{
    FetchRequest, ModelFetcher, SharedTranslator, TranslateOptions, TranslationOutput, Translator,
};

/// 翻译模型需要的文件
pub const MODEL_FILES: &[&str] = &[
    "config.json",
    "generation_config.json",
    "tokenizer.json",
    "tokenizer_config.json",
    "onnx/encoder_model_quantized.onnx",
    "onnx/decoder_model_merged_quantized.onnx",
];

/// 支持的任务
pub const SUPPORTED_TASK: &str = "translation";

/// 镜像下载选项
#[derive(Debug, Clone)]
pub struct HubOptions {
    pub cache_dir: PathBuf,
    pub revision: String,
    pub timeout: Duration,
    pub retries: usize,
    pub retry_delay: Duration,
    pub inference_url: String,
    pub files: Vec<String>,
}

impl HubOptions {
    /// 从环境变量创建选项
    pub fn from_env() -> Self {
        use crate::env::{model, EnvVar};

        let defaults = Self::default();
        Self {
            cache_dir: model::CacheDir::get()
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_dir),
            revision: model::Revision::get_or_default(defaults.revision),
            timeout: model::DownloadTimeout::get_or_default(defaults.timeout),
            retries: model::DownloadRetries::get_or_default(defaults.retries),
            retry_delay: defaults.retry_delay,
            inference_url: model::InferenceUrl::get().unwrap_or_else(|e| {
                tracing::warn!("{}，使用默认推理地址", e);
                defaults.inference_url
            }),
            files: defaults.files,
        }
    }
}

impl Default for HubOptions {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("local_models"),
            revision: "main".to_string(),
            timeout: Duration::from_secs(600),
            retries: 2,
            retry_delay: Duration::from_secs(1),
            inference_url: "http://127.0.0.1:8089/translate".to_string(),
            files: MODEL_FILES.iter().map(|file| file.to_string()).collect(),
        }
    }
}

/// 模型文件在镜像上的地址
pub fn file_url(host: &str, model_id: &str, revision: &str, file: &str) -> String {
    format!("{}{}/resolve/{}/{}", host, model_id, revision, file)
}

/// 从镜像下载模型文件的获取器
pub struct HubFetcher {
    client: reqwest::Client,
    options: HubOptions,
}

impl HubFetcher {
    pub fn new(options: HubOptions) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .user_agent(concat!("trans22/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, options })
    }

    pub fn options(&self) -> &HubOptions {
        &self.options
    }

    /// 模型在本地缓存中的目录
    pub fn model_dir(&self, model_id: &str) -> PathBuf {
        self.options.cache_dir.join(model_id)
    }

    async fn download_with_retry(
        &self,
        url: &str,
        dest: &Path,
        cancel: &CancellationToken,
    ) -> Result<(), FetchError> {
        let mut last_error = FetchError::Failed(format!("未尝试下载 {}", url));

        for attempt in 0..=self.options.retries {
            if attempt > 0 {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(FetchError::Cancelled),
                    _ = tokio::time::sleep(self.options.retry_delay * attempt as u32) => {}
                }
            }

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(FetchError::Cancelled),
                result = self.download(url, dest) => result,
            };

            match result {
                Ok(()) => return Ok(()),
                Err(error) => {
                    tracing::debug!(
                        "下载 {} 失败 (第 {}/{} 次): {}",
                        url,
                        attempt + 1,
                        self.options.retries + 1,
                        error
                    );
                    last_error = error;
                }
            }
        }

        Err(last_error)
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        let response = self.client.get(url).send().await?.error_for_status()?;

        let mut partial = dest.as_os_str().to_owned();
        partial.push(".part");
        let partial = PathBuf::from(partial);
        let mut file = tokio::fs::File::create(&partial).await?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            file.write_all(&chunk?).await?;
        }
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&partial, dest).await?;
        Ok(())
    }
}

#[async_trait]
impl ModelFetcher for HubFetcher {
    async fn fetch(
        &self,
        request: FetchRequest<'_>,
        cancel: &CancellationToken,
    ) -> Result<SharedTranslator, FetchError> {
        if request.task != SUPPORTED_TASK {
            return Err(FetchError::Failed(format!("不支持的任务: {}", request.task)));
        }

        let model_dir = self.model_dir(request.model_id);

        for file in &self.options.files {
            let dest = model_dir.join(file);
            if tokio::fs::try_exists(&dest).await.unwrap_or(false) {
                tracing::debug!("使用本地缓存: {}", dest.display());
                continue;
            }

            if let Some(parent) = dest.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }

            let url = file_url(&request.host.host, request.model_id, &self.options.revision, file);
            tracing::debug!("下载 {}", url);
            self.download_with_retry(&url, &dest, cancel)
                .await
                .map_err(|error| match error {
                    FetchError::Cancelled => FetchError::Cancelled,
                    FetchError::Failed(message) => {
                        FetchError::Failed(format!("{}: {}", file, message))
                    }
                })?;
        }

        Ok(Arc::new(HttpTranslator::new(
            self.client.clone(),
            self.options.inference_url.clone(),
            request.model_id.to_string(),
            model_dir,
        )))
    }
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    model: &'a str,
    model_path: &'a str,
    text: &'a str,
    src_lang: &'a str,
    tgt_lang: &'a str,
}

/// 通过本地推理运行时执行翻译
pub struct HttpTranslator {
    client: reqwest::Client,
    endpoint: String,
    model_id: String,
    model_path: String,
}

impl HttpTranslator {
    pub fn new(client: reqwest::Client, endpoint: String, model_id: String, model_dir: PathBuf) -> Self {
        Self {
            client,
            endpoint,
            model_id,
            model_path: model_dir.to_string_lossy().into_owned(),
        }
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate(
        &self,
        text: &str,
        options: &TranslateOptions,
    ) -> Result<Vec<TranslationOutput>, TranslatorError> {
        let body = InferenceRequest {
            model: &self.model_id,
            model_path: &self.model_path,
            text,
            src_lang: &options.src_lang,
            tgt_lang: &options.tgt_lang,
        };

        let outputs = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<TranslationOutput>>()
            .await?;

        Ok(outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::hosts::CandidateHost;

    #[test]
    fn test_file_url_layout() {
        assert_eq!(
            file_url("https://hf-mirror.com/", "Xenova/nllb-200-distilled-600M", "main", "config.json"),
            "https://hf-mirror.com/Xenova/nllb-200-distilled-600M/resolve/main/config.json"
        );
    }

    #[tokio::test]
    async fn test_fully_cached_model_needs_no_network() {
        let cache = tempfile::tempdir().unwrap();
        let options = HubOptions {
            cache_dir: cache.path().to_path_buf(),
            retries: 0,
            ..HubOptions::default()
        };
        let fetcher = HubFetcher::new(options).unwrap();

        let model_dir = fetcher.model_dir("org/model");
        for file in MODEL_FILES {
            let path = model_dir.join(file);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(&path, b"{}").unwrap();
        }

        // 端口 9 上没有服务，只要发起网络请求就会失败
        let host = CandidateHost::new("offline", "http://127.0.0.1:9").unwrap();
        let request = FetchRequest {
            task: SUPPORTED_TASK,
            model_id: "org/model",
            host: &host,
        };

        let result = fetcher.fetch(request, &CancellationToken::new()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_unsupported_task_fails_fast() {
        let cache = tempfile::tempdir().unwrap();
        let fetcher = HubFetcher::new(HubOptions {
            cache_dir: cache.path().to_path_buf(),
            ..HubOptions::default()
        })
        .unwrap();

        let host = CandidateHost::new("offline", "http://127.0.0.1:9").unwrap();
        let request = FetchRequest {
            task: "summarization",
            model_id: "org/model",
            host: &host,
        };

        let error = fetcher
            .fetch(request, &CancellationToken::new())
            .await
            .err()
            .unwrap();
        assert!(error.to_string().contains("summarization"));
    }

    #[tokio::test]
    async fn test_cancelled_download_reports_cancellation() {
        let cache = tempfile::tempdir().unwrap();
        let fetcher = HubFetcher::new(HubOptions {
            cache_dir: cache.path().to_path_buf(),
            retries: 0,
            ..HubOptions::default()
        })
        .unwrap();

        let host = CandidateHost::new("offline", "http://127.0.0.1:9").unwrap();
        let request = FetchRequest {
            task: SUPPORTED_TASK,
            model_id: "org/model",
            host: &host,
        };
        let cancel = CancellationToken::new();
        cancel.cancel();

        let error = fetcher.fetch(request, &cancel).await.err().unwrap();
        assert_eq!(error, FetchError::Cancelled);
    }
}
