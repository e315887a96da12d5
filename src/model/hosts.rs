//! 模型镜像候选解析
//!
//! 按优先级合并主机配置：主机覆盖、自定义镜像列表、内置默认镜像。
//! 解析过程是纯函数，不做任何 I/O，格式错误的条目会被静默丢弃。

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// 内置默认镜像，按优先级排列
pub const DEFAULT_HOSTS: &[(&str, &str)] = &[
    ("Hugging Face", "https://huggingface.co/"),
    ("HF-Mirror", "https://hf-mirror.com/"),
];

/// 主机覆盖条目的名称
pub const PRIMARY_HOST_NAME: &str = "自定义主机";

/// 单个候选镜像
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CandidateHost {
    pub name: String,
    pub host: String,
}

impl CandidateHost {
    /// 创建候选镜像，主机地址会被规范化
    ///
    /// 地址为空或无法解析时返回 `None`。
    pub fn new(name: impl Into<String>, host: &str) -> Option<Self> {
        normalize_host(host).map(|host| Self {
            name: name.into(),
            host,
        })
    }
}

/// 候选解析的输入配置
#[derive(Debug, Clone, Default)]
pub struct HostSettings {
    /// 可选的主机覆盖
    pub primary: Option<String>,
    /// 逗号分隔的额外镜像
    pub mirrors: Option<String>,
    /// 是否追加内置默认镜像
    pub include_defaults: bool,
}

impl HostSettings {
    pub fn new(primary: Option<String>, mirrors: Option<String>) -> Self {
        Self {
            primary,
            mirrors,
            include_defaults: true,
        }
    }

    /// 从环境变量读取
    pub fn from_env() -> Self {
        use crate::env::{model, EnvVar};

        let primary = model::Host::get().ok().filter(|value| !value.is_empty());
        let mirrors = model::Mirrors::get().ok().filter(|value| !value.is_empty());
        Self::new(primary, mirrors)
    }
}

/// 规范化主机地址
///
/// 去除首尾空白，缺少协议时补上 `https://`，并保证只有一个结尾斜杠。
/// 对已规范化的地址再次调用结果不变。
pub fn normalize_host(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let lower = trimmed.to_ascii_lowercase();
    let with_scheme = if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let base = with_scheme.trim_end_matches('/');
    let normalized = format!("{}/", base);

    match url::Url::parse(&normalized) {
        Ok(parsed) if parsed.host_str().is_some_and(|host| !host.is_empty()) => Some(normalized),
        _ => None,
    }
}

/// 解析有序、去重的候选镜像列表
///
/// 每个阶段只追加尚未出现的主机，先出现的名称保留。
pub fn resolve(settings: &HostSettings) -> Vec<CandidateHost> {
    let mut seen = HashSet::new();
    let mut resolved = Vec::new();

    let mut push = |candidate: Option<CandidateHost>| {
        if let Some(candidate) = candidate {
            if seen.insert(candidate.host.clone()) {
                resolved.push(candidate);
            }
        }
    };

    if let Some(primary) = settings.primary.as_deref() {
        push(CandidateHost::new(PRIMARY_HOST_NAME, primary));
    }

    if let Some(mirrors) = settings.mirrors.as_deref() {
        let entries = mirrors.split(',').filter(|entry| !entry.trim().is_empty());
        for (index, entry) in entries.enumerate() {
            push(CandidateHost::new(format!("自定义镜像 #{}", index + 1), entry));
        }
    }

    if settings.include_defaults {
        for (name, host) in DEFAULT_HOSTS {
            push(CandidateHost::new(*name, host));
        }
    }

    resolved
}
