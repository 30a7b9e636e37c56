//! 通知插件 - 持有单个插件实例的全部状态并编排通知流水线
//!
//! 配置、冷却计时、项目名、分发器（含依赖探测缓存）都属于实例本身，
//! 同一进程内创建多个实例时互不影响。

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use crate::notification::config::DEFAULT_SOUND_FILE;
use crate::notification::{
    format_message, router, Channel, CommandRunner, CooldownManager, EffectiveEventConfig,
    HostHook, MessageContext, NotificationDispatcher, NotificationEventType, PermissionInput,
    PluginConfig, PluginEvent, SendResult, SystemCommandRunner, ToolInput,
};

/// 插件启动上下文
#[derive(Debug, Clone, Default)]
pub struct PluginContext {
    /// 工作目录
    pub directory: Option<PathBuf>,
    /// Git worktree 根目录（优先用于声音种子）
    pub worktree: Option<PathBuf>,
}

impl PluginContext {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: Some(directory.into()),
            worktree: None,
        }
    }

    pub fn with_worktree(mut self, worktree: impl Into<PathBuf>) -> Self {
        self.worktree = Some(worktree.into());
        self
    }

    /// 项目名：工作目录的最后一段
    pub fn project_name(&self) -> Option<String> {
        self.directory
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
    }

    /// 声音种子使用的项目路径
    pub fn seed_path(&self) -> String {
        self.worktree
            .as_deref()
            .or(self.directory.as_deref())
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// 单次处理结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum HandleOutcome {
    /// 总开关关闭
    Disabled,
    /// 该事件被关闭
    EventDisabled,
    /// 冷却中
    CooledDown,
    /// 已分发
    Dispatched {
        message: String,
        results: Vec<(Channel, SendResult)>,
    },
}

/// 通知插件实例
pub struct NotifierPlugin<R: CommandRunner = SystemCommandRunner> {
    config: PluginConfig,
    cooldown: CooldownManager,
    project_name: Option<String>,
    fallback_sound: String,
    dispatcher: NotificationDispatcher<R>,
    last_session_id: Mutex<Option<String>>,
}

impl<R: CommandRunner> NotifierPlugin<R> {
    /// 创建插件实例，配置在此之后不再变化
    pub fn new(
        config: PluginConfig,
        context: &PluginContext,
        dispatcher: NotificationDispatcher<R>,
    ) -> Self {
        let cooldown = CooldownManager::new(config.cooldown_secs());
        let project_name = context.project_name();

        let fallback_sound = match &config.sound_file_seed {
            Some(seed) => dispatcher.sounds().pick_sound_file(&context.seed_path(), seed),
            None => DEFAULT_SOUND_FILE.to_string(),
        };

        info!(
            project = project_name.as_deref().unwrap_or("-"),
            enabled = config.is_enabled(),
            cooldown_secs = config.cooldown_secs(),
            fallback_sound = %fallback_sound,
            "Notifier plugin initialized"
        );

        Self {
            config,
            cooldown,
            project_name,
            fallback_sound,
            dispatcher,
            last_session_id: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    pub fn cooldown(&self) -> &CooldownManager {
        &self.cooldown
    }

    pub fn dispatcher(&self) -> &NotificationDispatcher<R> {
        &self.dispatcher
    }

    pub fn project_name(&self) -> Option<&str> {
        self.project_name.as_deref()
    }

    /// 最近一次 `session.created` 的会话 ID
    pub fn last_session_id(&self) -> Option<String> {
        self.last_session_id
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// 某事件的完整配置（含种子声音兜底）
    pub fn effective_config(&self, event_type: NotificationEventType) -> EffectiveEventConfig {
        self.config.resolve_with_fallback_sound(event_type, &self.fallback_sound)
    }

    /// 处理一条宿主钩子；无需通知的钩子返回 None
    pub async fn on_hook(&self, hook: &HostHook) -> Option<HandleOutcome> {
        match hook {
            HostHook::Event { event } => self.on_event(event).await,
            HostHook::PermissionAsk { input } => Some(self.on_permission_ask(input).await),
            HostHook::ToolExecuteBefore { input } => self.on_tool_execute_before(input).await,
        }
    }

    /// `event` 钩子
    pub async fn on_event(&self, event: &PluginEvent) -> Option<HandleOutcome> {
        if event.event_type == "session.created" {
            if let Some(session_id) = &event.session_id {
                debug!(session_id = %session_id, "Session created");
                *self
                    .last_session_id
                    .lock()
                    .unwrap_or_else(|e| e.into_inner()) = Some(session_id.clone());
            }
        }

        match router::route_event(event) {
            Some(event_type) => Some(self.handle(event_type).await),
            None => {
                debug!(event = %event.event_type, "Ignoring host event");
                None
            }
        }
    }

    /// `permission.ask` 钩子
    pub async fn on_permission_ask(&self, input: &PermissionInput) -> HandleOutcome {
        debug!(permission = %input.permission_type, "Permission requested");
        self.handle(router::route_permission(input)).await
    }

    /// `tool.execute.before` 钩子
    pub async fn on_tool_execute_before(&self, input: &ToolInput) -> Option<HandleOutcome> {
        match router::route_tool(input) {
            Some(event_type) => Some(self.handle(event_type).await),
            None => None,
        }
    }

    /// 统一处理入口
    pub async fn handle(&self, event_type: NotificationEventType) -> HandleOutcome {
        self.handle_at(event_type, Utc::now().timestamp_millis()).await
    }

    /// 统一处理入口（带时间戳，用于测试）
    ///
    /// 冷却只在第 3 步扣除；之后渠道失败也不会退还
    pub async fn handle_at(&self, event_type: NotificationEventType, now_ms: i64) -> HandleOutcome {
        if !self.config.is_enabled() {
            debug!(%event_type, "Notifications disabled");
            return HandleOutcome::Disabled;
        }

        let effective = self.effective_config(event_type);
        if !effective.enabled {
            debug!(%event_type, "Notifications disabled for event");
            return HandleOutcome::EventDisabled;
        }

        if !self.cooldown.can_notify_at(now_ms) {
            debug!(%event_type, "Notification skipped (cooldown)");
            return HandleOutcome::CooledDown;
        }

        let context = MessageContext {
            project_name: self.project_name.as_deref(),
            event_type,
        };
        let message = format_message(
            effective.message.as_deref(),
            event_type.default_message(),
            &context,
        );

        let results = self
            .dispatcher
            .dispatch(self.config.title(), &message, &effective)
            .await;

        info!(
            %event_type,
            message = %message,
            channels = results.len(),
            "Notification dispatched"
        );

        HandleOutcome::Dispatched { message, results }
    }
}
