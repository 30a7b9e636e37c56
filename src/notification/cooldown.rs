//! 通知冷却 - 所有事件类型共享一个计时器，防止短时间内连续弹出通知

use std::sync::Mutex;

use chrono::Utc;
use tracing::debug;

/// 冷却管理器
///
/// 任一事件通过冷却检查都会重置所有事件的计时。
/// 检查与更新在同一把锁内完成，并发调用时只有一个能拿到通知名额。
#[derive(Debug)]
pub struct CooldownManager {
    /// 上次放行的时间（毫秒时间戳），None 表示从未放行
    last_notification_time: Mutex<Option<i64>>,
    /// 冷却间隔（毫秒）
    cooldown_ms: Mutex<i64>,
}

impl CooldownManager {
    /// 创建冷却管理器
    pub fn new(cooldown_secs: f64) -> Self {
        Self {
            last_notification_time: Mutex::new(None),
            cooldown_ms: Mutex::new(secs_to_ms(cooldown_secs)),
        }
    }

    /// 是否允许发送通知；允许时占用名额
    pub fn can_notify(&self) -> bool {
        self.can_notify_at(Utc::now().timestamp_millis())
    }

    /// 是否允许发送通知（带时间戳，用于测试）
    pub fn can_notify_at(&self, now_ms: i64) -> bool {
        let cooldown_ms = self.cooldown_ms();
        let mut last = self
            .last_notification_time
            .lock()
            .unwrap_or_else(|e| e.into_inner());

        if let Some(prev) = *last {
            let elapsed = now_ms.saturating_sub(prev);
            if elapsed < cooldown_ms {
                debug!(elapsed_ms = elapsed, cooldown_ms, "Notification suppressed by cooldown");
                return false;
            }
        }

        *last = Some(now_ms);
        true
    }

    /// 修改冷却间隔，不重置上次放行时间
    pub fn update_cooldown(&self, cooldown_secs: f64) {
        *self.cooldown_ms.lock().unwrap_or_else(|e| e.into_inner()) = secs_to_ms(cooldown_secs);
    }

    /// 当前冷却间隔（毫秒）
    pub fn cooldown_ms(&self) -> i64 {
        *self.cooldown_ms.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// 上次放行的时间
    pub fn last_notification_time(&self) -> Option<i64> {
        *self
            .last_notification_time
            .lock()
            .unwrap_or_else(|e| e.into_inner())
    }
}

fn secs_to_ms(secs: f64) -> i64 {
    if secs.is_finite() && secs > 0.0 {
        (secs * 1000.0).round() as i64
    } else {
        0
    }
}
