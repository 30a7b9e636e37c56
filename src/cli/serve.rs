// src/cli/serve.rs
//! serve / emit 命令处理
//!
//! `serve` 常驻运行，从 stdin 逐行读取宿主钩子（JSON），冷却计时与依赖探测缓存在整个进程内有效。
//! `emit` 只处理一条钩子后退出。

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use super::output::format_output;
use super::PluginArgs;
use crate::notification::{CommandRunner, HostHook};
use crate::plugin::{HandleOutcome, NotifierPlugin};

/// serve 命令参数
#[derive(Args, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub plugin: PluginArgs,
    /// 每处理一条钩子，向 stdout 输出一行 JSON 结果
    #[arg(long)]
    pub echo: bool,
}

/// emit 命令参数
#[derive(Args, Debug)]
pub struct EmitArgs {
    #[command(flatten)]
    pub plugin: PluginArgs,
    /// 钩子 JSON（省略时从 stdin 读取）
    pub payload: Option<String>,
}

/// 钩子流处理统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StreamStats {
    /// 读取的非空行数
    pub lines: usize,
    /// 已分发的通知数
    pub dispatched: usize,
    /// 被关闭、冷却或无需通知的钩子数
    pub suppressed: usize,
    /// 无法解析的行数
    pub invalid: usize,
}

/// 处理 serve 命令
pub async fn handle_serve(args: ServeArgs) -> Result<()> {
    let plugin = args.plugin.build_plugin();
    info!("Waiting for hook events on stdin");

    let stdin = BufReader::new(tokio::io::stdin());
    let stats = run_hook_stream(&plugin, stdin, args.echo).await?;

    info!(
        lines = stats.lines,
        dispatched = stats.dispatched,
        suppressed = stats.suppressed,
        invalid = stats.invalid,
        "Hook stream closed"
    );
    Ok(())
}

/// 处理 emit 命令
pub async fn handle_emit(args: EmitArgs) -> Result<()> {
    let payload = match args.payload {
        Some(payload) => payload,
        None => tokio::task::spawn_blocking(|| std::io::read_to_string(std::io::stdin())).await??,
    };

    let hook = HostHook::parse(payload.trim())?;
    let plugin = args.plugin.build_plugin();
    let outcome = plugin.on_hook(&hook).await;

    println!("{}", format_output(&outcome, true));
    Ok(())
}

/// 逐行处理钩子直到 EOF；坏行只记录日志，不会中断循环
pub async fn run_hook_stream<R, I>(
    plugin: &NotifierPlugin<R>,
    input: I,
    echo: bool,
) -> Result<StreamStats>
where
    R: CommandRunner,
    I: AsyncBufRead + Unpin,
{
    let mut stats = StreamStats::default();
    let mut lines = input.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        stats.lines += 1;

        let hook = match HostHook::parse(line) {
            Ok(hook) => hook,
            Err(e) => {
                warn!(error = %e, "Skipping invalid hook line");
                stats.invalid += 1;
                continue;
            }
        };

        let outcome = plugin.on_hook(&hook).await;
        match &outcome {
            Some(HandleOutcome::Dispatched { .. }) => stats.dispatched += 1,
            Some(other) => {
                debug!(?other, "Hook did not produce a notification");
                stats.suppressed += 1;
            }
            None => stats.suppressed += 1,
        }

        if echo {
            println!("{}", format_output(&outcome, false));
        }
    }

    Ok(stats)
}
