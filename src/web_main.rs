//! Web 服务器主程序入口

#[cfg(feature = "web")]
use std::sync::Arc;

#[cfg(feature = "web")]
use clap::Parser;
#[cfg(feature = "web")]
use trans22::env::{self, EnvVar};
#[cfg(feature = "web")]
use trans22::model::{HubFetcher, HubOptions, LoaderSettings, ModelLoader};
#[cfg(feature = "web")]
use trans22::translation::{LanguageCatalog, TranslationOrchestrator};
#[cfg(feature = "web")]
use trans22::web::{WebConfig, WebServer};

/// Trans22 翻译服务
#[cfg(feature = "web")]
#[derive(Parser, Debug)]
#[command(name = "trans22-web", version, about = "Trans22 Web Server")]
struct Args {
    /// 绑定地址
    #[arg(short, long)]
    bind: Option<String>,

    /// 端口
    #[arg(short, long)]
    port: Option<u16>,

    /// 静态文件目录
    #[arg(long)]
    static_dir: Option<String>,

    /// 不在启动时预加载模型
    #[arg(long)]
    no_preload: bool,

    /// 打印环境变量文档后退出
    #[arg(long)]
    env_docs: bool,
}

#[cfg(feature = "web")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    if args.env_docs {
        print!("{}", env::generate_env_docs());
        return Ok(());
    }

    init_tracing();

    let mut web_config = WebConfig::from_env().unwrap_or_else(|e| {
        tracing::warn!("{}，使用默认 Web 配置", e);
        WebConfig::default()
    });
    if let Some(bind) = args.bind {
        web_config.bind_addr = bind;
    }
    if let Some(port) = args.port {
        web_config.port = port;
    }
    if let Some(static_dir) = args.static_dir {
        web_config.static_dir = Some(static_dir);
    }
    if args.no_preload {
        web_config.preload = false;
    }
    web_config.validate()?;

    let fetcher = Arc::new(HubFetcher::new(HubOptions::from_env())?);
    let settings = LoaderSettings::from_env();
    settings.validate()?;
    let loader = ModelLoader::new(settings, fetcher);

    tracing::info!("模型: {}", loader.model_id());
    for (index, candidate) in loader.candidates().iter().enumerate() {
        tracing::info!("  候选镜像 {}: {} ({})", index + 1, candidate.name, candidate.host);
    }

    let catalog = Arc::new(LanguageCatalog::from_env());
    tracing::info!("支持 {} 种语言", catalog.len());

    let orchestrator = TranslationOrchestrator::new(loader, catalog);
    let server = WebServer::new(web_config, orchestrator);
    server.start().await?;

    Ok(())
}

#[cfg(feature = "web")]
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = env::core::LogLevel::get_or_default("info".to_string());
        EnvFilter::new(format!("trans22={},tower_http=warn", level))
    });

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(not(feature = "web"))]
fn main() {
    eprintln!("Error: Web feature not enabled. Please compile with --features web");
    std::process::exit(1);
}
