//! 通知流水线 - 从宿主事件到桌面通知/提示音
//!
//! # 流程
//! 1. `router` 把宿主钩子映射为四种事件类型之一
//! 2. `config` 合并全局默认值与事件覆盖，得到完整配置
//! 3. `cooldown` 共享冷却检查，通过后才会继续
//! 4. `formatter` 渲染消息模板
//! 5. `dispatcher` 并发执行桌面通知与提示音，失败只记录日志
//!
//! # 使用示例
//! ```ignore
//! use opencode_notifier::notification::{NotificationDispatcher, SoundCatalog};
//!
//! let dispatcher = NotificationDispatcher::system(SoundCatalog::from_assets_dir(&assets));
//! dispatcher.send_notification("OpenCode", "Generation completed").await;
//! ```

pub mod channel;
pub mod config;
pub mod cooldown;
pub mod dispatcher;
pub mod event;
pub mod formatter;
pub mod router;
pub mod runner;
pub mod sounds;

pub use channel::{Availability, Channel, Platform, ProbeCache, SendResult, WarnLatch};
pub use config::{
    load_config, parse_config, strip_json_comments, EffectiveEventConfig,
    EventNotificationConfig, PluginConfig,
};
pub use cooldown::CooldownManager;
pub use dispatcher::{clamp_volume, NotificationDispatcher};
pub use event::NotificationEventType;
pub use formatter::{format_message, MessageContext};
pub use router::{HostHook, PermissionInput, PluginEvent, ToolInput};
pub use runner::{CommandOutput, CommandRunner, SystemCommandRunner};
pub use sounds::SoundCatalog;
