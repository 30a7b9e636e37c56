// src/cli/config.rs
//! config 命令 - 输出各事件的最终配置，或示例配置文件

use std::collections::BTreeMap;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use super::output::format_output;
use super::PluginArgs;
use crate::notification::{EffectiveEventConfig, NotificationEventType, PluginConfig};

/// config 命令参数
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub plugin: PluginArgs,
    /// 输出示例配置文件（JSONC）
    #[arg(long)]
    pub example: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigReport<'a> {
    path: String,
    enabled: bool,
    cooldown: f64,
    title: String,
    /// 文件中实际生效的原始字段
    raw: &'a PluginConfig,
    events: BTreeMap<&'static str, EffectiveEventConfig>,
}

/// 处理 config 命令
pub fn handle_config(args: ConfigArgs) -> Result<()> {
    if args.example {
        print!("{}", PluginConfig::example());
        return Ok(());
    }

    let plugin = args.plugin.build_plugin();
    let config = plugin.config();

    let report = ConfigReport {
        path: args.plugin.config_path().display().to_string(),
        enabled: config.is_enabled(),
        cooldown: config.cooldown_secs(),
        title: config.title().to_string(),
        raw: config,
        events: NotificationEventType::ALL
            .into_iter()
            .map(|t| (t.as_str(), plugin.effective_config(t)))
            .collect(),
    };

    println!("{}", format_output(&report, true));
    Ok(())
}
