//! 通知渠道公共类型 - 发送结果、平台、依赖探测缓存

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use serde::Serialize;

/// 通知渠道
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// 桌面通知
    Desktop,
    /// 提示音
    Sound,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Desktop => "desktop",
            Channel::Sound => "sound",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 发送结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", content = "reason", rename_all = "snake_case")]
pub enum SendResult {
    /// 发送成功
    Sent,
    /// 跳过（依赖缺失、平台不支持、文件不存在）
    Skipped(String),
    /// 发送失败
    Failed(String),
}

impl SendResult {
    pub fn is_sent(&self) -> bool {
        matches!(self, SendResult::Sent)
    }
}

/// 运行平台
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Linux,
    Unsupported(String),
}

impl Platform {
    /// 当前编译目标平台
    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    pub fn from_os(os: &str) -> Self {
        match os {
            "macos" => Platform::MacOs,
            "linux" => Platform::Linux,
            other => Platform::Unsupported(other.to_string()),
        }
    }
}

/// 依赖可用性（三态）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Availability {
    #[default]
    Unknown,
    Available,
    Unavailable,
}

/// 外部命令可用性缓存，每个实例最多探测一次
#[derive(Debug, Default)]
pub struct ProbeCache {
    state: Mutex<Availability>,
}

impl ProbeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Availability {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// 返回是否可用；首次调用时执行 `probe` 并缓存，第二个返回值表示本次是否为首次探测
    pub fn check(&self, probe: impl FnOnce() -> bool) -> (bool, bool) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        match *state {
            Availability::Available => (true, false),
            Availability::Unavailable => (false, false),
            Availability::Unknown => {
                let available = probe();
                *state = if available {
                    Availability::Available
                } else {
                    Availability::Unavailable
                };
                (available, true)
            }
        }
    }
}

/// 一次性警告开关
#[derive(Debug, Default)]
pub struct WarnLatch {
    shown: AtomicBool,
}

impl WarnLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// 首次调用返回 true，之后都返回 false
    pub fn first(&self) -> bool {
        !self.shown.swap(true, Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_platform_from_os() {
        assert_eq!(Platform::from_os("macos"), Platform::MacOs);
        assert_eq!(Platform::from_os("linux"), Platform::Linux);
        assert_eq!(
            Platform::from_os("windows"),
            Platform::Unsupported("windows".to_string())
        );
    }

    #[test]
    fn test_probe_cache_runs_probe_once() {
        let cache = ProbeCache::new();
        let calls = Cell::new(0);
        let probe = || {
            calls.set(calls.get() + 1);
            false
        };

        assert_eq!(cache.state(), Availability::Unknown);
        assert_eq!(cache.check(probe), (false, true));
        assert_eq!(cache.check(probe), (false, false));
        assert_eq!(cache.check(|| true), (false, false));
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.state(), Availability::Unavailable);
    }

    #[test]
    fn test_warn_latch() {
        let latch = WarnLatch::new();
        assert!(latch.first());
        assert!(!latch.first());
        assert!(!latch.first());
    }

    #[test]
    fn test_send_result_serialization() {
        let json = serde_json::to_value(SendResult::Skipped("missing".into())).unwrap();
        assert_eq!(json, serde_json::json!({"result": "skipped", "reason": "missing"}));
        let json = serde_json::to_value(SendResult::Sent).unwrap();
        assert_eq!(json, serde_json::json!({"result": "sent"}));
    }
}
