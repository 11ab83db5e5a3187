//! Web 服务器主程序入口

use clap::Parser;
use tracing_subscriber::EnvFilter;

use restyle::env::{self, EnvConfig, EnvVar};
use restyle::web::{WebConfig, WebServer};

/// Restyle relay web server
#[derive(Parser, Debug)]
#[command(name = "restyle-web", version, about = "Restyle relay web server")]
struct Args {
    /// Bind address (overrides SERVER_HOST)
    #[arg(short = 'b', long)]
    host: Option<String>,

    /// Port number (overrides SERVER_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print the environment variable reference and exit
    #[arg(long)]
    env_docs: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if args.env_docs {
        println!("{}", env::generate_env_docs());
        return Ok(());
    }

    let dotenv_file = env::load_dotenv();
    init_tracing();

    if let Some(file) = dotenv_file {
        tracing::info!("已加载环境变量文件: {}", file);
    }

    match EnvConfig::from_env() {
        Ok(summary) => summary.print_summary(),
        Err(e) => tracing::warn!("环境变量配置有误: {}", e),
    }

    let mut config = WebConfig::from_env()?;
    if let Some(host) = args.host {
        config.bind_addr = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    WebServer::new(config).start().await?;

    Ok(())
}

/// 初始化日志：`RUST_LOG` 优先，否则使用 `RESTYLE_LOG_LEVEL`
fn init_tracing() {
    let level = env::core::LogLevel::get().unwrap_or_else(|_| "info".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
