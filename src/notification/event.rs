//! 通知事件类型
//!
//! 四种会触发通知的事件，与配置文件 `permissions` 下的键名一一对应。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 事件类型枚举（封闭集合）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationEventType {
    /// 生成完成（会话空闲）
    GenerationCompleted,
    /// 权限请求
    PermissionRequested,
    /// Agent 提问
    QuestionAsked,
    /// 会话错误
    SessionError,
}

impl NotificationEventType {
    /// 全部事件类型，顺序固定
    pub const ALL: [NotificationEventType; 4] = [
        NotificationEventType::GenerationCompleted,
        NotificationEventType::PermissionRequested,
        NotificationEventType::QuestionAsked,
        NotificationEventType::SessionError,
    ];

    /// 配置文件和模板中使用的原始名称
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationEventType::GenerationCompleted => "generationCompleted",
            NotificationEventType::PermissionRequested => "permissionRequested",
            NotificationEventType::QuestionAsked => "questionAsked",
            NotificationEventType::SessionError => "sessionError",
        }
    }

    /// 内置默认消息
    pub fn default_message(&self) -> &'static str {
        match self {
            NotificationEventType::GenerationCompleted => "Generation completed",
            NotificationEventType::PermissionRequested => "Permission requested",
            NotificationEventType::QuestionAsked => "Question asked",
            NotificationEventType::SessionError => "Session error occurred",
        }
    }
}

impl fmt::Display for NotificationEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationEventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown event type: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_messages() {
        assert_eq!(
            NotificationEventType::GenerationCompleted.default_message(),
            "Generation completed"
        );
        assert_eq!(
            NotificationEventType::PermissionRequested.default_message(),
            "Permission requested"
        );
        assert_eq!(NotificationEventType::QuestionAsked.default_message(), "Question asked");
        assert_eq!(
            NotificationEventType::SessionError.default_message(),
            "Session error occurred"
        );
    }

    #[test]
    fn test_parse_event_type() {
        for t in NotificationEventType::ALL {
            assert_eq!(t.as_str().parse::<NotificationEventType>().unwrap(), t);
        }
        assert!("session_error".parse::<NotificationEventType>().is_err());
    }

    #[test]
    fn test_serde_uses_camel_case() {
        let json = serde_json::to_string(&NotificationEventType::QuestionAsked).unwrap();
        assert_eq!(json, "\"questionAsked\"");
    }
}
