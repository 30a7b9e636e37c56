//! CLI command handling

pub mod config;
pub mod output;
pub mod serve;
pub mod sounds;

pub use config::*;
pub use output::*;
pub use serve::*;
pub use sounds::*;

use std::path::PathBuf;

use clap::Args;

use crate::notification::config::{default_assets_dir, default_config_path, load_config};
use crate::notification::{NotificationDispatcher, PluginConfig, SoundCatalog};
use crate::plugin::{NotifierPlugin, PluginContext};

/// 插件公共参数
#[derive(Args, Debug, Clone)]
pub struct PluginArgs {
    /// 配置文件路径 (默认: ~/.config/opencode/plugin/notif.jsonc)
    #[arg(long, env = "OCN_CONFIG")]
    pub config: Option<PathBuf>,
    /// 资源目录，音效位于其 sounds/ 子目录 (默认: ~/.config/opencode/plugin/assets)
    #[arg(long, env = "OCN_ASSETS")]
    pub assets: Option<PathBuf>,
    /// 项目工作目录 (默认: 当前目录)
    #[arg(long)]
    pub directory: Option<PathBuf>,
    /// Git worktree 根目录
    #[arg(long)]
    pub worktree: Option<PathBuf>,
}

impl PluginArgs {
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(default_config_path)
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.assets.clone().unwrap_or_else(default_assets_dir)
    }

    /// 加载配置，失败时为空配置
    pub fn load_config(&self) -> PluginConfig {
        load_config(&self.config_path())
    }

    pub fn sound_catalog(&self) -> SoundCatalog {
        SoundCatalog::from_assets_dir(&self.assets_dir())
    }

    pub fn context(&self) -> PluginContext {
        let directory = self
            .directory
            .clone()
            .or_else(|| std::env::current_dir().ok());
        PluginContext {
            directory,
            worktree: self.worktree.clone(),
        }
    }

    /// 创建使用系统命令的插件实例
    pub fn build_plugin(&self) -> NotifierPlugin {
        let dispatcher = NotificationDispatcher::system(self.sound_catalog());
        NotifierPlugin::new(self.load_config(), &self.context(), dispatcher)
    }
}
