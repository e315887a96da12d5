//! 模型预下载工具
//!
//! 按候选镜像顺序下载模型到本地缓存，成功后做一次快速翻译测试。

#[cfg(feature = "cli")]
use std::sync::Arc;

#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use trans22::env::{self, EnvVar};
#[cfg(feature = "cli")]
use trans22::model::{
    CandidateHost, FetchError, HubFetcher, HubOptions, LoadError, LoadObserver, LoaderSettings,
    ModelLoader, TranslateOptions, Translator,
};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "trans22-download", version, about = "Trans22 模型预下载工具")]
struct Args {
    /// 覆盖 TRANS22_MODEL_HOST
    #[arg(long)]
    host: Option<String>,

    /// 覆盖 TRANS22_MODEL_MIRRORS（逗号分隔）
    #[arg(long)]
    mirrors: Option<String>,

    /// 跳过快速翻译测试
    #[arg(long)]
    skip_test: bool,
}

/// 在终端打印加载进度
#[cfg(feature = "cli")]
struct ConsoleObserver;

#[cfg(feature = "cli")]
impl LoadObserver for ConsoleObserver {
    fn on_attempt(&self, candidate: &CandidateHost) {
        println!("\n👉 尝试从 {} ({}) 下载模型...", candidate.name, candidate.host);
    }

    fn on_success(&self, candidate: &CandidateHost) {
        println!("\n✅ 已成功从 {} ({}) 下载模型。", candidate.name, candidate.host);
    }

    fn on_failure(&self, candidate: &CandidateHost, error: &FetchError) {
        eprintln!("❌ 从 {} 下载失败: {}", candidate.name, error);
    }
}

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let level = env::core::LogLevel::get_or_default("warn".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("trans22={}", level))),
        )
        .init();

    let mut settings = LoaderSettings::from_env();
    if args.host.is_some() {
        settings.hosts.primary = args.host;
    }
    if args.mirrors.is_some() {
        settings.hosts.mirrors = args.mirrors;
    }

    println!("==========================================");
    println!("  Trans22 模型预下载工具");
    println!("==========================================\n");
    println!("模型: {}", settings.model_id);
    println!("首次下载可能需要较长时间，请耐心等待...\n");

    let fetcher = match HubFetcher::new(HubOptions::from_env()) {
        Ok(fetcher) => Arc::new(fetcher),
        Err(e) => {
            eprintln!("❌ 无法创建下载客户端: {}", e);
            std::process::exit(1);
        }
    };
    println!("缓存目录: {}", fetcher.model_dir(&settings.model_id).display());

    let loader = ModelLoader::with_observer(settings, fetcher, Arc::new(ConsoleObserver));

    let candidates = loader.candidates();
    if !candidates.is_empty() {
        println!("可用镜像列表:");
        for (index, candidate) in candidates.iter().enumerate() {
            println!(" {}. {} → {}", index + 1, candidate.name, candidate.host);
        }
    }

    let acquired = match loader.acquire().await {
        Ok(acquired) => acquired,
        Err(e) => {
            report_failure(&e);
            std::process::exit(1);
        }
    };

    println!("当前使用镜像: {} ({})", acquired.source.name, acquired.source.host);
    println!("模型已缓存到本地，后续使用无需重新下载。");

    if args.skip_test {
        return;
    }

    println!("\n进行快速测试...");
    let options = TranslateOptions {
        src_lang: "eng_Latn".to_string(),
        tgt_lang: "zho_Hans".to_string(),
    };
    match acquired.translator.translate("Hello, world!", &options).await {
        Ok(outputs) => match outputs.first() {
            Some(output) => {
                println!("测试翻译: \"Hello, world!\" → \"{}\"", output.translation_text);
                println!("\n✅ 所有准备工作完成！现在可以运行 trans22-web 启动服务器。");
            }
            None => eprintln!("⚠️ 测试翻译没有返回结果，请检查推理服务"),
        },
        Err(e) => {
            eprintln!("⚠️ 测试翻译失败: {}", e);
            eprintln!("模型文件已下载，请确认 {} 指向的推理服务已启动", env::model::InferenceUrl::NAME);
        }
    }
}

#[cfg(feature = "cli")]
fn report_failure(error: &LoadError) {
    eprintln!("\n❌ 模型下载失败: {}", error);

    let failures = error.failures();
    if !failures.is_empty() {
        eprintln!("\n尝试过的镜像来源:");
        for (index, failure) in failures.iter().enumerate() {
            eprintln!(" {}. {} ({}): {}", index + 1, failure.name, failure.host, failure.message);
        }
    }

    eprintln!("\n可能的原因:");
    eprintln!("1. 网络连接问题或被防火墙/代理阻断");
    eprintln!("2. 磁盘空间不足");
    eprintln!("3. 镜像服务不可用");

    eprintln!("\n提示:");
    eprintln!(
        "• 可通过设置环境变量 {} 或 {} 指定自定义镜像",
        env::model::Host::NAME,
        env::model::Mirrors::NAME
    );
    eprintln!("  示例: {}=https://hf-mirror.com trans22-download", env::model::Host::NAME);
    eprintln!("• 或直接启动服务，首次请求时模型会自动尝试加载");
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("Error: CLI feature not enabled. Please compile with --features cli");
    std::process::exit(1);
}
