//! 通知配置 - 全局默认值与按事件覆盖的分层合并
//!
//! 配置文件为 JSONC（允许 `//` 与 `/* */` 注释），进程启动时加载一次，之后只读。
//! 字段逐个宽松解析：类型错误的字段视为缺省，不影响整份配置。

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Number, Value};
use tracing::{debug, info, warn};

use super::event::NotificationEventType;

/// 内置默认声音文件
pub const DEFAULT_SOUND_FILE: &str = "default.mp3";
/// 内置默认音量
pub const DEFAULT_VOLUME: f64 = 0.8;
/// 内置默认冷却时间（秒）
pub const DEFAULT_COOLDOWN_SECS: f64 = 30.0;
/// 内置默认通知标题
pub const DEFAULT_TITLE: &str = "OpenCode";

/// 配置文件名
pub const CONFIG_FILE_NAME: &str = "notif.jsonc";

/// 字符串字面量、行注释、块注释；字符串原样保留，注释删除
static JSONC_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)("(?:[^"\\]|\\.)*")|//[^\n]*|/\*.*?\*/"#).unwrap());

/// 单个事件的覆盖配置，所有字段可选
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventNotificationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_desktop_notification: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound_alert: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl EventNotificationConfig {
    fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            enabled: field(obj, "enabled"),
            show_desktop_notification: field(obj, "showDesktopNotification"),
            sound_alert: field(obj, "soundAlert"),
            sound_file: sound_file_field(obj, "soundFile"),
            volume: field(obj, "volume"),
            message: field(obj, "message"),
        }
    }
}

/// 用户原始配置
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginConfig {
    /// 总开关，缺省为 true
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_desktop_notification: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound_alert: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    /// 冷却时间（秒）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooldown: Option<f64>,
    /// 桌面通知标题
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// 声音文件种子：未显式指定 soundFile 时，用它从声音目录中确定性地挑选一个
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound_file_seed: Option<String>,
    /// 按事件覆盖
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub permissions: HashMap<NotificationEventType, EventNotificationConfig>,
}

/// 单个事件解析后的完整配置，不含可选字段
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveEventConfig {
    pub enabled: bool,
    pub show_desktop_notification: bool,
    pub sound_alert: bool,
    pub sound_file: String,
    pub volume: f64,
    /// 模板；None 表示使用内置默认消息
    pub message: Option<String>,
}

impl PluginConfig {
    /// 从 JSON 值宽松解析
    ///
    /// 非对象视为空配置；未知事件名、类型错误的字段一律忽略
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            warn!("Notification config is not a JSON object, using defaults");
            return Self::default();
        };

        let mut permissions = HashMap::new();
        if let Some(entries) = obj.get("permissions").and_then(Value::as_object) {
            for (name, entry) in entries {
                let Ok(event_type) = name.parse::<NotificationEventType>() else {
                    debug!(event_type = %name, "Ignoring unknown event type in permissions");
                    continue;
                };
                match entry.as_object() {
                    Some(entry) => {
                        permissions.insert(event_type, EventNotificationConfig::from_object(entry));
                    }
                    None => {
                        debug!(event_type = %name, "Ignoring malformed permissions entry");
                    }
                }
            }
        }

        Self {
            enabled: field(obj, "enabled"),
            show_desktop_notification: field(obj, "showDesktopNotification"),
            sound_alert: field(obj, "soundAlert"),
            sound_file: sound_file_field(obj, "soundFile"),
            volume: field(obj, "volume"),
            cooldown: field(obj, "cooldown"),
            title: field(obj, "title"),
            sound_file_seed: seed_field(obj, "soundFileSeed"),
            permissions,
        }
    }

    /// 总开关
    pub fn is_enabled(&self) -> bool {
        self.enabled != Some(false)
    }

    /// 冷却时间（秒），负数按 0 处理
    pub fn cooldown_secs(&self) -> f64 {
        self.cooldown.unwrap_or(DEFAULT_COOLDOWN_SECS).max(0.0)
    }

    /// 桌面通知标题
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(DEFAULT_TITLE)
    }

    /// 解析某事件的完整配置，兜底声音为 `default.mp3`
    pub fn resolve(&self, event_type: NotificationEventType) -> EffectiveEventConfig {
        self.resolve_with_fallback_sound(event_type, DEFAULT_SOUND_FILE)
    }

    /// 解析某事件的完整配置
    ///
    /// 每个字段取第一个有值的来源：事件覆盖 → 全局默认 → 内置默认。
    /// `message` 没有全局层，只有事件覆盖或 None。
    pub fn resolve_with_fallback_sound(
        &self,
        event_type: NotificationEventType,
        fallback_sound: &str,
    ) -> EffectiveEventConfig {
        let empty = EventNotificationConfig::default();
        let event = self.permissions.get(&event_type).unwrap_or(&empty);

        EffectiveEventConfig {
            enabled: event.enabled.unwrap_or(true),
            show_desktop_notification: event
                .show_desktop_notification
                .or(self.show_desktop_notification)
                .unwrap_or(true),
            sound_alert: event.sound_alert.or(self.sound_alert).unwrap_or(true),
            sound_file: event
                .sound_file
                .clone()
                .or_else(|| self.sound_file.clone())
                .unwrap_or_else(|| fallback_sound.to_string()),
            volume: event.volume.or(self.volume).unwrap_or(DEFAULT_VOLUME),
            message: event.message.clone(),
        }
    }

    /// 示例配置文件内容
    pub fn example() -> String {
        r#"// opencode-notifier configuration
// Place this file at ~/.config/opencode/plugin/notif.jsonc
{
  // Master switch
  "enabled": true,

  // Global defaults, overridable per event
  "showDesktopNotification": true,
  "soundAlert": true,
  "soundFile": "default.mp3",
  "volume": 0.8,

  // Minimum seconds between two notifications (shared by all events)
  "cooldown": 30,

  /* Per-event overrides: generationCompleted, permissionRequested,
     questionAsked, sessionError */
  "permissions": {
    "generationCompleted": {
      "message": "{projectName}: generation completed"
    },
    "sessionError": {
      "soundAlert": true,
      "volume": 1.0,
      "message": "{eventType} in {projectName}"
    }
  }
}
"#
        .to_string()
    }
}

/// 读取单个字段，类型不符时视为缺省
fn field<T: DeserializeOwned>(obj: &Map<String, Value>, key: &str) -> Option<T> {
    let value = obj.get(key)?;
    match serde_json::from_value(value.clone()) {
        Ok(v) => Some(v),
        Err(e) => {
            debug!(field = key, error = %e, "Ignoring malformed config field");
            None
        }
    }
}

/// 空字符串的声音文件视为缺省
fn sound_file_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    field::<String>(obj, key).filter(|s| !s.trim().is_empty())
}

/// 种子允许字符串或数字
fn seed_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(number_to_seed(n)),
        other => {
            debug!(field = key, value = %other, "Ignoring malformed config field");
            None
        }
    }
}

const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// 数字种子的字符串形式：整数值的浮点数不带小数部分（`7.0` → `"7"`）
fn number_to_seed(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < MAX_SAFE_INTEGER => {
            (f as i64).to_string()
        }
        _ => n.to_string(),
    }
}

/// 删除 JSONC 注释，字符串内的 `//` 保持不变
pub fn strip_json_comments(content: &str) -> String {
    JSONC_PATTERN
        .replace_all(content, |caps: &Captures| {
            caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default()
        })
        .into_owned()
}

/// 解析 JSONC 文本
pub fn parse_config(content: &str) -> anyhow::Result<PluginConfig> {
    let stripped = strip_json_comments(content);
    let value: Value = serde_json::from_str(&stripped)?;
    Ok(PluginConfig::from_value(&value))
}

/// 默认插件目录 (~/.config/opencode/plugin)
pub fn default_plugin_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config")
        })
        .join("opencode")
        .join("plugin")
}

/// 默认配置文件路径
pub fn default_config_path() -> PathBuf {
    default_plugin_dir().join(CONFIG_FILE_NAME)
}

/// 默认资源目录
pub fn default_assets_dir() -> PathBuf {
    default_plugin_dir().join("assets")
}

/// 加载配置文件
///
/// 缺失、无法读取或无法解析时记录一次警告并返回空配置，不会向上传播错误
pub fn load_config(path: &Path) -> PluginConfig {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read notification config, using defaults");
            return PluginConfig::default();
        }
    };

    match parse_config(&content) {
        Ok(config) => {
            info!(path = %path.display(), "Loaded notification config");
            config
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to parse notification config, using defaults");
            PluginConfig::default()
        }
    }
}
