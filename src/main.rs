//! OpenCode Notifier CLI
//!
//! 接收 OpenCode 插件钩子，按配置弹出桌面通知并播放提示音

use anyhow::Result;
use clap::{Parser, Subcommand};
use opencode_notifier::cli::{
    handle_config, handle_emit, handle_serve, handle_sounds, ConfigArgs, EmitArgs, ServeArgs,
    SoundsArgs,
};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "ocn")]
#[command(about = "OpenCode Notifier - 代理事件的桌面通知与提示音")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 常驻运行，从 stdin 逐行读取钩子 JSON
    Serve(ServeArgs),
    /// 处理单条钩子 JSON 后退出
    Emit(EmitArgs),
    /// 列出可用音效
    Sounds(SoundsArgs),
    /// 输出各事件的最终配置
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // 日志写入 stderr，stdout 只留给命令输出
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("opencode_notifier=info,ocn=info"));

    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => handle_serve(args).await,
        Commands::Emit(args) => handle_emit(args).await,
        Commands::Sounds(args) => handle_sounds(args),
        Commands::Config(args) => handle_config(args),
    }
}
