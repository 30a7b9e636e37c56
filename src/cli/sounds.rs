// src/cli/sounds.rs
//! sounds 命令 - 列出可用音效，并显示种子会选中的文件

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use super::output::format_output;
use super::PluginArgs;

/// sounds 命令参数
#[derive(Args, Debug)]
pub struct SoundsArgs {
    #[command(flatten)]
    pub plugin: PluginArgs,
    /// 显示该种子选中的声音文件
    #[arg(long)]
    pub seed: Option<String>,
}

#[derive(Debug, Serialize)]
struct SoundsReport {
    dir: String,
    files: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    picked: Option<String>,
}

/// 处理 sounds 命令
pub fn handle_sounds(args: SoundsArgs) -> Result<()> {
    let catalog = args.plugin.sound_catalog();
    let seed_path = args.plugin.context().seed_path();

    let report = SoundsReport {
        dir: catalog.dir().display().to_string(),
        files: catalog.list_sound_files(),
        picked: args
            .seed
            .as_deref()
            .map(|seed| catalog.pick_sound_file(&seed_path, seed)),
    };

    println!("{}", format_output(&report, true));
    Ok(())
}
