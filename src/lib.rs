//! OpenCode Notifier - AI 编码代理生命周期事件的桌面通知与提示音

pub mod cli;
pub mod notification;
pub mod plugin;

pub use notification::{
    Channel, CommandRunner, CooldownManager, EffectiveEventConfig, HostHook,
    NotificationDispatcher, NotificationEventType, PluginConfig, PluginEvent, SendResult,
    SoundCatalog, SystemCommandRunner,
};
pub use plugin::{HandleOutcome, NotifierPlugin, PluginContext};
