// 集成测试公共模块
//
// 提供脚本化的获取器、假翻译器和测试辅助工具

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use trans22::model::{
    CandidateHost, FetchError, FetchRequest, HostSettings, LoadObserver, LoaderSettings,
    ModelFetcher, ModelLoader, SharedTranslator, TranslateOptions, TranslationOutput, Translator,
    TranslatorError,
};
use trans22::translation::{LanguageCatalog, TranslationOrchestrator};

/// 测试用模型标识
pub const TEST_MODEL: &str = "test-org/tiny-translator";

/// 镜像脚本
#[derive(Debug, Clone)]
pub enum Script {
    Succeed,
    Fail(String),
    Panic,
}

/// 按镜像地址返回预设结果的获取器
///
/// 未登记的镜像一律失败。可选的闸门会让获取停在半路，直到测试放行或取消。
pub struct ScriptedFetcher {
    scripts: Mutex<HashMap<String, Script>>,
    translator: SharedTranslator,
    attempts: Mutex<Vec<String>>,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedFetcher {
    pub fn new(translator: SharedTranslator) -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            translator,
            attempts: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// 获取开始后等待闸门放行
    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn script(self, host: &str, script: Script) -> Self {
        self.set(host, script);
        self
    }

    pub fn set(&self, host: &str, script: Script) {
        self.scripts
            .lock()
            .unwrap()
            .insert(normalized(host), script);
    }

    /// 按顺序记录的已尝试镜像
    pub fn attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelFetcher for ScriptedFetcher {
    async fn fetch(
        &self,
        request: FetchRequest<'_>,
        cancel: &CancellationToken,
    ) -> Result<SharedTranslator, FetchError> {
        self.attempts
            .lock()
            .unwrap()
            .push(request.host.host.clone());

        if let Some(gate) = &self.gate {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(FetchError::Cancelled),
                permit = gate.acquire() => {
                    permit.map_err(|_| FetchError::Failed("gate closed".to_string()))?;
                }
            }
        }

        let script = self
            .scripts
            .lock()
            .unwrap()
            .get(&request.host.host)
            .cloned()
            .unwrap_or_else(|| Script::Fail(format!("{} unreachable", request.host.host)));

        match script {
            Script::Succeed => Ok(Arc::clone(&self.translator)),
            Script::Fail(message) => Err(FetchError::Failed(message)),
            Script::Panic => panic!("fetcher crashed on {}", request.host.host),
        }
    }
}

/// 回显翻译器：输出 `[tgt] text`
#[derive(Default)]
pub struct EchoTranslator {
    calls: AtomicUsize,
    delays: HashMap<String, Duration>,
}

impl EchoTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为某个模型语言代码增加延迟
    pub fn with_delay(mut self, tgt_lang: &str, delay: Duration) -> Self {
        self.delays.insert(tgt_lang.to_string(), delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Translator for EchoTranslator {
    async fn translate(
        &self,
        text: &str,
        options: &TranslateOptions,
    ) -> Result<Vec<TranslationOutput>, TranslatorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(&options.tgt_lang) {
            tokio::time::sleep(*delay).await;
        }
        Ok(vec![TranslationOutput {
            translation_text: echo(text, &options.tgt_lang),
        }])
    }
}

/// 对指定目标语言失败的翻译器
pub struct FailingTranslator {
    failing: HashSet<String>,
    message: String,
}

impl FailingTranslator {
    pub fn new(failing: &[&str], message: &str) -> Self {
        Self {
            failing: failing.iter().map(|code| code.to_string()).collect(),
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl Translator for FailingTranslator {
    async fn translate(
        &self,
        text: &str,
        options: &TranslateOptions,
    ) -> Result<Vec<TranslationOutput>, TranslatorError> {
        if self.failing.contains(&options.tgt_lang) {
            return Err(TranslatorError::new(self.message.clone()));
        }
        Ok(vec![TranslationOutput {
            translation_text: echo(text, &options.tgt_lang),
        }])
    }
}

/// 不返回任何结果的翻译器
pub struct SilentTranslator;

#[async_trait]
impl Translator for SilentTranslator {
    async fn translate(
        &self,
        _text: &str,
        _options: &TranslateOptions,
    ) -> Result<Vec<TranslationOutput>, TranslatorError> {
        Ok(Vec::new())
    }
}

/// 记录生命周期回调的观察者
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn record(&self, kind: &str, candidate: &CandidateHost) {
        self.events
            .lock()
            .unwrap()
            .push(format!("{}:{}", kind, candidate.host));
    }
}

impl LoadObserver for RecordingObserver {
    fn on_attempt(&self, candidate: &CandidateHost) {
        self.record("attempt", candidate);
    }

    fn on_success(&self, candidate: &CandidateHost) {
        self.record("success", candidate);
    }

    fn on_failure(&self, candidate: &CandidateHost, _error: &FetchError) {
        self.record("failure", candidate);
    }
}

/// 回显翻译器的期望输出
pub fn echo(text: &str, tgt_lang: &str) -> String {
    format!("[{}] {}", tgt_lang, text)
}

/// 与候选解析一致的规范化地址
pub fn normalized(host: &str) -> String {
    trans22::model::normalize_host(host).unwrap_or_else(|| host.to_string())
}

/// 只包含给定镜像、不追加默认镜像的配置
pub fn mirror_settings(hosts: &[&str]) -> LoaderSettings {
    let mirrors = if hosts.is_empty() {
        None
    } else {
        Some(hosts.join(","))
    };
    let hosts = HostSettings {
        primary: None,
        mirrors,
        include_defaults: false,
    };
    LoaderSettings::new(TEST_MODEL, hosts)
}

/// 测试环境构建器
pub struct TestEnvironment {
    pub fetcher: Arc<ScriptedFetcher>,
    pub loader: ModelLoader,
    pub orchestrator: TranslationOrchestrator,
}

impl TestEnvironment {
    /// 单个可用镜像，使用给定翻译器
    pub fn ready_with(translator: SharedTranslator) -> Self {
        let fetcher = ScriptedFetcher::new(translator).script("https://good.example", Script::Succeed);
        Self::build(fetcher, &["https://good.example"])
    }

    /// 所有镜像都失败
    pub fn unreachable(hosts: &[&str]) -> Self {
        Self::build(ScriptedFetcher::new(Arc::new(EchoTranslator::new())), hosts)
    }

    pub fn build(fetcher: ScriptedFetcher, hosts: &[&str]) -> Self {
        let fetcher = Arc::new(fetcher);
        let loader = ModelLoader::new(mirror_settings(hosts), fetcher.clone());
        let orchestrator =
            TranslationOrchestrator::new(loader.clone(), Arc::new(LanguageCatalog::builtin()));

        Self {
            fetcher,
            loader,
            orchestrator,
        }
    }
}

/// 等待条件成立，最多等待约一秒
pub async fn wait_until<F: Fn() -> bool>(condition: F) -> bool {
    for _ in 0..100 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
