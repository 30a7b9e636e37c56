//! 事件路由 - 将宿主（OpenCode）的插件钩子映射为通知事件类型
//!
//! 支持的钩子：
//! - `event`: `session.idle` → generationCompleted，`session.error` → sessionError
//! - `permission.ask`: 任意权限类型 → permissionRequested
//! - `tool.execute.before`: 仅提问类工具 → questionAsked

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::event::NotificationEventType;

/// 会被视为"提问"的工具
pub const QUESTION_TOOLS: [&str; 2] = ["question", "mcp_question"];

/// `event` 钩子载荷
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(rename = "sessionID", default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl PluginEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            session_id: None,
        }
    }
}

/// `permission.ask` 钩子载荷，类型只用于日志
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PermissionInput {
    #[serde(rename = "type", default)]
    pub permission_type: String,
}

/// `tool.execute.before` 钩子载荷
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInput {
    pub tool: String,
}

/// 宿主发来的一条钩子调用
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "hook")]
pub enum HostHook {
    #[serde(rename = "event")]
    Event { event: PluginEvent },
    #[serde(rename = "permission.ask")]
    PermissionAsk {
        #[serde(default)]
        input: PermissionInput,
    },
    #[serde(rename = "tool.execute.before")]
    ToolExecuteBefore { input: ToolInput },
}

impl HostHook {
    /// 解析一行 JSON
    pub fn parse(line: &str) -> Result<Self> {
        serde_json::from_str(line).with_context(|| format!("Invalid hook payload: {}", line))
    }

    /// 映射到通知事件类型，无需通知时返回 None
    pub fn route(&self) -> Option<NotificationEventType> {
        match self {
            HostHook::Event { event } => route_event(event),
            HostHook::PermissionAsk { input } => Some(route_permission(input)),
            HostHook::ToolExecuteBefore { input } => route_tool(input),
        }
    }
}

/// 生命周期事件
pub fn route_event(event: &PluginEvent) -> Option<NotificationEventType> {
    match event.event_type.as_str() {
        "session.idle" => Some(NotificationEventType::GenerationCompleted),
        "session.error" => Some(NotificationEventType::SessionError),
        _ => None,
    }
}

/// 权限请求：不按类型过滤
pub fn route_permission(_input: &PermissionInput) -> NotificationEventType {
    NotificationEventType::PermissionRequested
}

/// 工具执行前：只有提问类工具触发
pub fn route_tool(input: &ToolInput) -> Option<NotificationEventType> {
    is_question_tool(&input.tool).then_some(NotificationEventType::QuestionAsked)
}

pub fn is_question_tool(tool: &str) -> bool {
    QUESTION_TOOLS.contains(&tool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_lifecycle_events() {
        assert_eq!(
            route_event(&PluginEvent::new("session.idle")),
            Some(NotificationEventType::GenerationCompleted)
        );
        assert_eq!(
            route_event(&PluginEvent::new("session.error")),
            Some(NotificationEventType::SessionError)
        );
        assert_eq!(route_event(&PluginEvent::new("session.created")), None);
        assert_eq!(route_event(&PluginEvent::new("message.updated")), None);
    }

    #[test]
    fn test_route_permission_ignores_type() {
        for t in ["bash", "edit", ""] {
            let input = PermissionInput {
                permission_type: t.to_string(),
            };
            assert_eq!(route_permission(&input), NotificationEventType::PermissionRequested);
        }
    }

    #[test]
    fn test_route_tool_only_question_tools() {
        let route = |tool: &str| route_tool(&ToolInput { tool: tool.to_string() });
        assert_eq!(route("question"), Some(NotificationEventType::QuestionAsked));
        assert_eq!(route("mcp_question"), Some(NotificationEventType::QuestionAsked));
        assert_eq!(route("bash"), None);
        assert_eq!(route("Question"), None);
    }

    #[test]
    fn test_parse_hook_lines() {
        let hook =
            HostHook::parse(r#"{"hook":"event","event":{"type":"session.idle","sessionID":"s1"}}"#)
                .unwrap();
        assert_eq!(
            hook,
            HostHook::Event {
                event: PluginEvent {
                    event_type: "session.idle".to_string(),
                    session_id: Some("s1".to_string()),
                }
            }
        );
        assert_eq!(hook.route(), Some(NotificationEventType::GenerationCompleted));

        let hook = HostHook::parse(r#"{"hook":"permission.ask","input":{"type":"bash"}}"#).unwrap();
        assert_eq!(hook.route(), Some(NotificationEventType::PermissionRequested));

        let hook = HostHook::parse(r#"{"hook":"permission.ask"}"#).unwrap();
        assert_eq!(hook.route(), Some(NotificationEventType::PermissionRequested));

        let hook =
            HostHook::parse(r#"{"hook":"tool.execute.before","input":{"tool":"read"}}"#).unwrap();
        assert_eq!(hook.route(), None);
    }

    #[test]
    fn test_parse_rejects_unknown_hook() {
        assert!(HostHook::parse(r#"{"hook":"chat.message"}"#).is_err());
        assert!(HostHook::parse("not json").is_err());
    }
}
