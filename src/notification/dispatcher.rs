//! 通知分发器 - 桌面通知与提示音
//!
//! 两个渠道互相独立：任一渠道失败只记录日志，不影响另一渠道，也不向调用方传播。
//! 外部依赖的探测结果与"平台不支持"警告都由实例持有，每个实例最多探测/警告一次。

use tracing::{debug, warn};

use super::channel::{Channel, Platform, ProbeCache, SendResult, WarnLatch};
use super::config::EffectiveEventConfig;
use super::runner::{CommandRunner, SystemCommandRunner};
use super::sounds::SoundCatalog;

/// Linux 桌面通知命令
pub const NOTIFY_SEND: &str = "notify-send";
/// Linux 音频播放命令
pub const FFPLAY: &str = "ffplay";
/// macOS 音频播放命令
pub const AFPLAY: &str = "afplay";
/// macOS 通知脚本执行命令
pub const OSASCRIPT: &str = "osascript";

/// 通知分发器
pub struct NotificationDispatcher<R: CommandRunner = SystemCommandRunner> {
    runner: R,
    platform: Platform,
    sounds: SoundCatalog,
    notifier_probe: ProbeCache,
    player_probe: ProbeCache,
    unsupported_notify: WarnLatch,
    unsupported_sound: WarnLatch,
}

impl NotificationDispatcher<SystemCommandRunner> {
    /// 使用系统命令和当前平台创建
    pub fn system(sounds: SoundCatalog) -> Self {
        Self::new(SystemCommandRunner, Platform::current(), sounds)
    }
}

impl<R: CommandRunner> NotificationDispatcher<R> {
    pub fn new(runner: R, platform: Platform, sounds: SoundCatalog) -> Self {
        Self {
            runner,
            platform,
            sounds,
            notifier_probe: ProbeCache::new(),
            player_probe: ProbeCache::new(),
            unsupported_notify: WarnLatch::new(),
            unsupported_sound: WarnLatch::new(),
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn sounds(&self) -> &SoundCatalog {
        &self.sounds
    }

    /// 按配置并发执行已启用的渠道，等待全部完成
    pub async fn dispatch(
        &self,
        title: &str,
        message: &str,
        effective: &EffectiveEventConfig,
    ) -> Vec<(Channel, SendResult)> {
        let desktop = async {
            if effective.show_desktop_notification {
                Some(self.send_notification(title, message).await)
            } else {
                None
            }
        };
        let sound = async {
            if effective.sound_alert {
                Some(
                    self.play_notification_sound(&effective.sound_file, effective.volume)
                        .await,
                )
            } else {
                None
            }
        };

        let (desktop, sound) = tokio::join!(desktop, sound);

        let mut results = Vec::with_capacity(2);
        if let Some(result) = desktop {
            results.push((Channel::Desktop, result));
        }
        if let Some(result) = sound {
            results.push((Channel::Sound, result));
        }
        results
    }

    /// 发送桌面通知
    pub async fn send_notification(&self, title: &str, message: &str) -> SendResult {
        match &self.platform {
            Platform::MacOs => {
                let script = format!(
                    "display notification \"{}\" with title \"{}\"",
                    escape_applescript(message),
                    escape_applescript(title)
                );
                let command = format!("{} -e '{}'", OSASCRIPT, escape_single_quotes(&script));
                self.run(Channel::Desktop, "sh", vec!["-c".to_string(), command])
                    .await
            }
            Platform::Linux => {
                if !self.probe(&self.notifier_probe, NOTIFY_SEND) {
                    return SendResult::Skipped(format!("{} not installed", NOTIFY_SEND));
                }
                let args = vec![escape_notify_send(title), escape_notify_send(message)];
                self.run(Channel::Desktop, NOTIFY_SEND, args).await
            }
            Platform::Unsupported(os) => {
                if self.unsupported_notify.first() {
                    warn!(platform = %os, "Desktop notifications are not supported on this platform");
                }
                SendResult::Skipped(format!("unsupported platform: {}", os))
            }
        }
    }

    /// 播放提示音
    ///
    /// 音量先限制在 [0, 1]；文件名越出声音目录或文件不存在时直接跳过
    pub async fn play_notification_sound(&self, sound_file: &str, volume: f64) -> SendResult {
        let Some(path) = self.sounds.path_for(sound_file) else {
            warn!(sound_file, "Sound file name must be a plain file name, skipping playback");
            return SendResult::Skipped(format!("invalid sound file name: {}", sound_file));
        };
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            warn!(path = %path.display(), "Sound file not found, skipping playback");
            return SendResult::Skipped(format!("sound file not found: {}", path.display()));
        }

        let volume = clamp_volume(volume);
        let path = path.to_string_lossy().into_owned();

        match &self.platform {
            Platform::MacOs => {
                let afplay_volume = (volume * 255.0).round() / 255.0;
                let args = vec!["-v".to_string(), afplay_volume.to_string(), path];
                self.run(Channel::Sound, AFPLAY, args).await
            }
            Platform::Linux => {
                if !self.probe(&self.player_probe, FFPLAY) {
                    return SendResult::Skipped(format!("{} not installed", FFPLAY));
                }
                let percent = (volume * 100.0).round() as u32;
                let args = vec![
                    "-nodisp".to_string(),
                    "-autoexit".to_string(),
                    "-loglevel".to_string(),
                    "quiet".to_string(),
                    "-volume".to_string(),
                    percent.to_string(),
                    path,
                ];
                self.run(Channel::Sound, FFPLAY, args).await
            }
            Platform::Unsupported(os) => {
                if self.unsupported_sound.first() {
                    warn!(platform = %os, "Sound playback is not supported on this platform");
                }
                SendResult::Skipped(format!("unsupported platform: {}", os))
            }
        }
    }

    fn probe(&self, cache: &ProbeCache, program: &str) -> bool {
        let (available, first) = cache.check(|| self.runner.is_available(program));
        if first && !available {
            warn!(program, "Required command not found, channel disabled");
        }
        available
    }

    async fn run(&self, channel: Channel, program: &str, args: Vec<String>) -> SendResult {
        match self.runner.run(program, &args).await {
            Ok(output) if output.success => {
                debug!(%channel, program, "Channel dispatched");
                SendResult::Sent
            }
            Ok(output) => {
                warn!(
                    %channel,
                    program,
                    code = ?output.code,
                    stderr = %output.stderr,
                    "Notification command failed"
                );
                SendResult::Failed(format!(
                    "{} exited with {:?}: {}",
                    program, output.code, output.stderr
                ))
            }
            Err(e) => {
                warn!(%channel, program, error = %e, "Failed to run notification command");
                SendResult::Failed(format!("{}: {}", program, e))
            }
        }
    }
}

/// 音量限制在 [0, 1]，NaN 视为 0
pub fn clamp_volume(volume: f64) -> f64 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}

/// 关闭单引号字符串、插入转义的单引号、再重新打开
pub fn escape_single_quotes(s: &str) -> String {
    s.replace('\'', "'\"'\"'")
}

/// AppleScript 字符串字面量转义
fn escape_applescript(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// notify-send 参数转义：双引号与换行
pub fn escape_notify_send(s: &str) -> String {
    s.replace('"', "\\\"").replace('\n', "\\n")
}
