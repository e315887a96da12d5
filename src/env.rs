//! 统一的环境变量管理系统
//!
//! 提供类型安全、可验证的环境变量访问。每个变量都是一个零大小类型，
//! 通过 `EnvVar` 特性声明名称、默认值、说明和解析规则。

use std::env;
use std::fmt;
use std::time::Duration;

/// 环境变量解析错误
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => {
                if let Some(default) = Self::DEFAULT {
                    Ok(default)
                } else {
                    Err(EnvError {
                        variable: Self::NAME.to_string(),
                        message: "Required environment variable not set".to_string(),
                    })
                }
            }
        }
    }

    fn get_or_default(default: T) -> T {
        Self::get().unwrap_or(default)
    }
}

/// 核心环境变量定义
pub mod core {
    use super::*;

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "TRANS22_LOG_LEVEL";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("info".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn parse(value: &str) -> EnvResult<String> {
            match value.trim().to_lowercase().as_str() {
                level @ ("trace" | "debug" | "info" | "warn" | "error") => Ok(level.to_string()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid log level '{}'. Use: trace, debug, info, warn, error",
                        value
                    ),
                }),
            }
        }
    }
}

/// 模型获取相关环境变量
pub mod model {
    use super::*;

    /// 模型标识
    pub struct ModelId;
    impl EnvVar<String> for ModelId {
        const NAME: &'static str = "TRANS22_MODEL_ID";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("Xenova/nllb-200-distilled-600M".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Model identifier on the hub (owner/name)";

        fn parse(value: &str) -> EnvResult<String> {
            let id = value.trim().trim_matches('/');
            if id.is_empty() || !id.contains('/') {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Model id must look like 'owner/name'".to_string(),
                });
            }
            Ok(id.to_string())
        }
    }

    /// 模型任务
    pub struct Task;
    impl EnvVar<String> for Task {
        const NAME: &'static str = "TRANS22_MODEL_TASK";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("translation".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Pipeline task requested from the model";

        fn parse(value: &str) -> EnvResult<String> {
            non_empty(value, Self::NAME)
        }
    }

    /// 模型版本
    pub struct Revision;
    impl EnvVar<String> for Revision {
        const NAME: &'static str = "TRANS22_MODEL_REVISION";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("main".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Hub revision (branch, tag or commit)";

        fn parse(value: &str) -> EnvResult<String> {
            non_empty(value, Self::NAME)
        }
    }

    /// 主镜像覆盖
    pub struct Host;
    impl EnvVar<String> for Host {
        const NAME: &'static str = "TRANS22_MODEL_HOST";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok(String::new()),
            }
        }
        const DESCRIPTION: &'static str = "Primary model host, tried before any mirror";

        fn parse(value: &str) -> EnvResult<String> {
            // 宽松处理：格式问题由候选解析阶段静默丢弃
            Ok(value.trim().to_string())
        }
    }

    /// 额外镜像列表
    pub struct Mirrors;
    impl EnvVar<String> for Mirrors {
        const NAME: &'static str = "TRANS22_MODEL_MIRRORS";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok(String::new()),
            }
        }
        const DESCRIPTION: &'static str = "Additional model mirrors (comma-separated)";

        fn parse(value: &str) -> EnvResult<String> {
            Ok(value.trim().to_string())
        }
    }

    /// 本地模型缓存目录
    pub struct CacheDir;
    impl EnvVar<String> for CacheDir {
        const NAME: &'static str = "TRANS22_MODEL_CACHE_DIR";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("local_models".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Directory where downloaded model files are cached";

        fn parse(value: &str) -> EnvResult<String> {
            non_empty(value, Self::NAME)
        }
    }

    /// 单个文件下载超时
    pub struct DownloadTimeout;
    impl EnvVar<Duration> for DownloadTimeout {
        const NAME: &'static str = "TRANS22_DOWNLOAD_TIMEOUT";
        const DEFAULT: Option<Duration> = Some(Duration::from_secs(600));
        const DESCRIPTION: &'static str = "Per-file download timeout in seconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            let seconds = parse_positive_usize(value, Self::NAME, 1, 7200)?;
            Ok(Duration::from_secs(seconds as u64))
        }
    }

    /// 单个镜像内部重试次数
    pub struct DownloadRetries;
    impl EnvVar<usize> for DownloadRetries {
        const NAME: &'static str = "TRANS22_DOWNLOAD_RETRIES";
        const DEFAULT: Option<usize> = Some(2);
        const DESCRIPTION: &'static str = "Retries per file before a host is given up";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 0, 10)
        }
    }

    /// 本地推理运行时地址
    pub struct InferenceUrl;
    impl EnvVar<String> for InferenceUrl {
        const NAME: &'static str = "TRANS22_INFERENCE_URL";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("http://127.0.0.1:8089/translate".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Local inference runtime endpoint";

        fn parse(value: &str) -> EnvResult<String> {
            let url = value.trim();
            if url.starts_with("http://") || url.starts_with("https://") {
                Ok(url.to_string())
            } else {
                Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Inference URL must start with http:// or https://".to_string(),
                })
            }
        }
    }
}

/// 翻译相关环境变量
pub mod translation {
    use super::*;

    /// 批量翻译并发度
    pub struct FanoutConcurrency;
    impl EnvVar<usize> for FanoutConcurrency {
        const NAME: &'static str = "TRANS22_FANOUT_CONCURRENCY";
        const DEFAULT: Option<usize> = Some(1);
        const DESCRIPTION: &'static str = "Concurrent per-language calls in translate-all";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 1, 32)
        }
    }

    /// 语言目录文件
    pub struct LanguagesFile;
    impl EnvVar<String> for LanguagesFile {
        const NAME: &'static str = "TRANS22_LANGUAGES_FILE";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok(String::new()),
            }
        }
        const DESCRIPTION: &'static str = "Optional TOML file replacing the built-in language catalog";

        fn parse(value: &str) -> EnvResult<String> {
            Ok(value.trim().to_string())
        }
    }
}

/// Web服务器相关环境变量
pub mod web {
    use super::*;

    /// 绑定地址
    pub struct BindAddress;
    impl EnvVar<String> for BindAddress {
        const NAME: &'static str = "TRANS22_WEB_BIND_ADDRESS";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("127.0.0.1".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Web server bind address";

        fn parse(value: &str) -> EnvResult<String> {
            let addr = value.trim();
            if addr.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Address cannot be empty".to_string(),
                });
            }
            Ok(addr.to_string())
        }
    }

    /// 端口
    pub struct Port;
    impl EnvVar<u16> for Port {
        const NAME: &'static str = "TRANS22_WEB_PORT";
        const DEFAULT: Option<u16> = Some(3000);
        const DESCRIPTION: &'static str = "Web server port";

        fn parse(value: &str) -> EnvResult<u16> {
            let port: u16 = value.trim().parse().map_err(|_| EnvError {
                variable: Self::NAME.to_string(),
                message: "Must be a valid port number (1-65535)".to_string(),
            })?;

            if port == 0 {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Port cannot be 0".to_string(),
                });
            }

            Ok(port)
        }
    }

    /// 静态文件目录
    pub struct StaticDir;
    impl EnvVar<String> for StaticDir {
        const NAME: &'static str = "TRANS22_WEB_STATIC_DIR";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("public".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Static files directory";

        fn parse(value: &str) -> EnvResult<String> {
            Ok(value.trim().to_string())
        }
    }

    /// 启动时预加载模型
    pub struct Preload;
    impl EnvVar<bool> for Preload {
        const NAME: &'static str = "TRANS22_WEB_PRELOAD";
        const DEFAULT: Option<bool> = Some(true);
        const DESCRIPTION: &'static str = "Start loading the model in the background at startup";

        fn parse(value: &str) -> EnvResult<bool> {
            parse_bool(value, Self::NAME)
        }
    }
}

/// 辅助函数
fn parse_bool(value: &str, var_name: &str) -> EnvResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "enabled" => Ok(true),
        "false" | "0" | "no" | "off" | "disabled" => Ok(false),
        _ => Err(EnvError {
            variable: var_name.to_string(),
            message: format!(
                "Invalid boolean value '{}'. Use: true/false, 1/0, yes/no, on/off, enabled/disabled",
                value
            ),
        }),
    }
}

fn parse_positive_usize(value: &str, var_name: &str, min: usize, max: usize) -> EnvResult<usize> {
    let num: usize = value.trim().parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid positive number".to_string(),
    })?;

    if num < min {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} is below minimum {}", num, min),
        });
    }

    if num > max {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} exceeds maximum {}", num, max),
        });
    }

    Ok(num)
}

fn non_empty(value: &str, var_name: &str) -> EnvResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: "Value cannot be empty".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

/// 环境变量配置汇总
#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub log_level: String,

    // 模型配置
    pub model_id: String,
    pub model_task: String,
    pub model_revision: String,
    pub model_host: String,
    pub model_mirrors: String,
    pub model_cache_dir: String,
    pub download_timeout: Duration,
    pub download_retries: usize,
    pub inference_url: String,

    // 翻译配置
    pub fanout_concurrency: usize,
    pub languages_file: String,

    // Web配置
    pub web_bind_address: String,
    pub web_port: u16,
    pub web_static_dir: String,
    pub web_preload: bool,
}

impl EnvConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> EnvResult<Self> {
        Ok(Self {
            log_level: core::LogLevel::get()?,

            model_id: model::ModelId::get()?,
            model_task: model::Task::get()?,
            model_revision: model::Revision::get()?,
            model_host: model::Host::get()?,
            model_mirrors: model::Mirrors::get()?,
            model_cache_dir: model::CacheDir::get()?,
            download_timeout: model::DownloadTimeout::get()?,
            download_retries: model::DownloadRetries::get()?,
            inference_url: model::InferenceUrl::get()?,

            fanout_concurrency: translation::FanoutConcurrency::get()?,
            languages_file: translation::LanguagesFile::get()?,

            web_bind_address: web::BindAddress::get()?,
            web_port: web::Port::get()?,
            web_static_dir: web::StaticDir::get()?,
            web_preload: web::Preload::get()?,
        })
    }

    /// 打印配置摘要
    pub fn print_summary(&self) {
        println!("Environment Configuration Summary:");
        println!("  Log Level: {}", self.log_level);
        println!("  Model: {} ({})", self.model_id, self.model_revision);
        println!("  Model Cache: {}", self.model_cache_dir);
        if !self.model_host.is_empty() {
            println!("  Model Host: {}", self.model_host);
        }
        if !self.model_mirrors.is_empty() {
            println!("  Model Mirrors: {}", self.model_mirrors);
        }
        println!("  Inference: {}", self.inference_url);
        println!("  Web Server: {}:{}", self.web_bind_address, self.web_port);
    }
}

/// 环境变量文档生成器
pub fn generate_env_docs() -> String {
    let mut docs = String::new();
    docs.push_str("# Environment Variables Documentation\n\n");

    docs.push_str("## Core Configuration\n\n");
    push_doc(&mut docs, core::LogLevel::NAME, core::LogLevel::DESCRIPTION, "info");

    docs.push_str("\n## Model Acquisition\n\n");
    push_doc(&mut docs, model::ModelId::NAME, model::ModelId::DESCRIPTION, "Xenova/nllb-200-distilled-600M");
    push_doc(&mut docs, model::Task::NAME, model::Task::DESCRIPTION, "translation");
    push_doc(&mut docs, model::Revision::NAME, model::Revision::DESCRIPTION, "main");
    push_doc(&mut docs, model::Host::NAME, model::Host::DESCRIPTION, "");
    push_doc(&mut docs, model::Mirrors::NAME, model::Mirrors::DESCRIPTION, "");
    push_doc(&mut docs, model::CacheDir::NAME, model::CacheDir::DESCRIPTION, "local_models");
    push_doc(
        &mut docs,
        model::DownloadTimeout::NAME,
        model::DownloadTimeout::DESCRIPTION,
        &format!("{:?}", model::DownloadTimeout::DEFAULT),
    );
    push_doc(
        &mut docs,
        model::DownloadRetries::NAME,
        model::DownloadRetries::DESCRIPTION,
        &format!("{:?}", model::DownloadRetries::DEFAULT),
    );
    push_doc(&mut docs, model::InferenceUrl::NAME, model::InferenceUrl::DESCRIPTION, "http://127.0.0.1:8089/translate");

    docs.push_str("\n## Translation\n\n");
    push_doc(
        &mut docs,
        translation::FanoutConcurrency::NAME,
        translation::FanoutConcurrency::DESCRIPTION,
        &format!("{:?}", translation::FanoutConcurrency::DEFAULT),
    );
    push_doc(&mut docs, translation::LanguagesFile::NAME, translation::LanguagesFile::DESCRIPTION, "");

    docs.push_str("\n## Web Server Configuration\n\n");
    push_doc(&mut docs, web::BindAddress::NAME, web::BindAddress::DESCRIPTION, "127.0.0.1");
    push_doc(&mut docs, web::Port::NAME, web::Port::DESCRIPTION, &format!("{:?}", web::Port::DEFAULT));
    push_doc(&mut docs, web::StaticDir::NAME, web::StaticDir::DESCRIPTION, "public");
    push_doc(&mut docs, web::Preload::NAME, web::Preload::DESCRIPTION, &format!("{:?}", web::Preload::DEFAULT));

    docs
}

fn push_doc(docs: &mut String, name: &str, description: &str, default: &str) {
    docs.push_str(&format!("- `{}`: {} (default: `{}`)\n", name, description, default));
}
