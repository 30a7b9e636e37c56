//! 消息格式化模块 - 将模板渲染为通知文本
//!
//! 支持的占位符：
//! - `{projectName}` 项目名（缺失时为 `Unknown Project`）
//! - `{eventType}` 事件类型原始名称，如 `sessionError`

use super::event::NotificationEventType;

/// 项目名缺失时的占位文本
pub const UNKNOWN_PROJECT: &str = "Unknown Project";

/// 模板上下文
#[derive(Debug, Clone, Copy)]
pub struct MessageContext<'a> {
    pub project_name: Option<&'a str>,
    pub event_type: NotificationEventType,
}

/// 渲染通知消息
///
/// 模板为 None 时使用默认消息；占位符全部替换
pub fn format_message(
    template: Option<&str>,
    default_message: &str,
    context: &MessageContext<'_>,
) -> String {
    template
        .unwrap_or(default_message)
        .replace("{projectName}", context.project_name.unwrap_or(UNKNOWN_PROJECT))
        .replace("{eventType}", context.event_type.as_str())
}
