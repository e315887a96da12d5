//! 语言目录
//!
//! 外部语言代码到模型内部代码的固定有序映射。目录在启动时加载，之后不再变化。

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 默认源语言
pub const DEFAULT_SOURCE: &str = "en";

const BUILTIN: &[(&str, &str, &str)] = &[
    ("zh-CN", "zho_Hans", "🇨🇳 中文简体"),
    ("zh-TW", "zho_Hant", "🇹🇼 中文繁体"),
    ("en", "eng_Latn", "🇺🇸 英语"),
    ("ja", "jpn_Jpan", "🇯🇵 日语"),
    ("ko", "kor_Hang", "🇰🇷 韩语"),
    ("es", "spa_Latn", "🇪🇸 西班牙语"),
    ("fr", "fra_Latn", "🇫🇷 法语"),
    ("de", "deu_Latn", "🇩🇪 德语"),
    ("it", "ita_Latn", "🇮🇹 意大利语"),
    ("pt", "por_Latn", "🇵🇹 葡萄牙语"),
    ("ru", "rus_Cyrl", "🇷🇺 俄语"),
    ("ar", "arb_Arab", "🇸🇦 阿拉伯语"),
    ("hi", "hin_Deva", "🇮🇳 印地语"),
    ("id", "ind_Latn", "🇮🇩 印尼语"),
    ("th", "tha_Thai", "🇹🇭 泰语"),
    ("vi", "vie_Latn", "🇻🇳 越南语"),
    ("tr", "tur_Latn", "🇹🇷 土耳其语"),
    ("nl", "nld_Latn", "🇳🇱 荷兰语"),
    ("sv", "swe_Latn", "🇸🇪 瑞典语"),
    ("pl", "pol_Latn", "🇵🇱 波兰语"),
    ("no", "nob_Latn", "🇳🇴 挪威语"),
    ("fi", "fin_Latn", "🇫🇮 芬兰语"),
    ("da", "dan_Latn", "🇩🇰 丹麦语"),
    ("cs", "ces_Latn", "🇨🇿 捷克语"),
    ("ro", "ron_Latn", "🇷🇴 罗马尼亚语"),
    ("hu", "hun_Latn", "🇭🇺 匈牙利语"),
    ("el", "ell_Grek", "🇬🇷 希腊语"),
    ("he", "heb_Hebr", "🇮🇱 希伯来语"),
    ("uk", "ukr_Cyrl", "🇺🇦 乌克兰语"),
];

/// 目录条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageEntry {
    /// 对外使用的语言代码
    pub code: String,
    /// 模型内部语言代码
    pub model_code: String,
    /// 显示名称
    pub name: String,
}

impl LanguageEntry {
    pub fn new(code: &str, model_code: &str, name: &str) -> Self {
        Self {
            code: code.to_string(),
            model_code: model_code.to_string(),
            name: name.to_string(),
        }
    }
}

/// 目录构建错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("语言目录为空")]
    Empty,

    #[error("语言代码重复: {0}")]
    DuplicateCode(String),

    #[error("默认源语言 {0} 不在目录中")]
    MissingDefault(String),

    #[error("语言目录解析失败: {0}")]
    Parse(String),

    #[error("读取语言目录失败: {0}")]
    Io(String),
}

impl From<toml::de::Error> for CatalogError {
    fn from(error: toml::de::Error) -> Self {
        CatalogError::Parse(error.to_string())
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(error: std::io::Error) -> Self {
        CatalogError::Io(error.to_string())
    }
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default = "default_source")]
    default_source: String,
    languages: Vec<LanguageEntry>,
}

fn default_source() -> String {
    DEFAULT_SOURCE.to_string()
}

/// 有序语言目录
#[derive(Debug, Clone)]
pub struct LanguageCatalog {
    entries: Vec<LanguageEntry>,
    index: HashMap<String, usize>,
    default_source: usize,
}

impl LanguageCatalog {
    /// 构建目录，代码必须唯一且包含默认源语言
    pub fn new(entries: Vec<LanguageEntry>, default_source: &str) -> Result<Self, CatalogError> {
        if entries.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut index = HashMap::with_capacity(entries.len());
        for (position, entry) in entries.iter().enumerate() {
            if index.insert(entry.code.clone(), position).is_some() {
                return Err(CatalogError::DuplicateCode(entry.code.clone()));
            }
        }

        let default_source = *index
            .get(default_source)
            .ok_or_else(|| CatalogError::MissingDefault(default_source.to_string()))?;

        Ok(Self {
            entries,
            index,
            default_source,
        })
    }

    /// 内置的 29 种语言
    pub fn builtin() -> Self {
        let entries = BUILTIN
            .iter()
            .map(|(code, model_code, name)| LanguageEntry::new(code, model_code, name))
            .collect();

        match Self::new(entries, DEFAULT_SOURCE) {
            Ok(catalog) => catalog,
            Err(e) => unreachable!("built-in language catalog is invalid: {}", e),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(content)?;
        Self::new(file.languages, &file.default_source)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// 按环境变量加载，未配置或加载失败时使用内置目录
    pub fn from_env() -> Self {
        use crate::env::{translation, EnvVar};

        let path = translation::LanguagesFile::get().unwrap_or_default();
        if path.is_empty() {
            return Self::builtin();
        }

        match Self::load(Path::new(&path)) {
            Ok(catalog) => {
                tracing::info!("已加载语言目录 {} ({} 种语言)", path, catalog.len());
                catalog
            }
            Err(e) => {
                tracing::warn!("{}，使用内置语言目录", e);
                Self::builtin()
            }
        }
    }

    pub fn get(&self, code: &str) -> Option<&LanguageEntry> {
        self.index.get(code).map(|&position| &self.entries[position])
    }

    pub fn entries(&self) -> &[LanguageEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn default_source(&self) -> &LanguageEntry {
        &self.entries[self.default_source]
    }

    /// 解析源语言，未指定或无法识别时回退到默认源语言
    pub fn resolve_source(&self, code: Option<&str>) -> &LanguageEntry {
        code.and_then(|code| self.get(code))
            .unwrap_or_else(|| self.default_source())
    }
}

impl Default for LanguageCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
