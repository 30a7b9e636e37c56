//! 外部命令执行能力
//!
//! 分发器只通过 `CommandRunner` 调用系统命令（osascript、notify-send、afplay、ffplay），
//! 测试中可替换为记录调用的假实现。

use std::future::Future;
use std::process::Stdio;

use tokio::process::Command;
use tracing::trace;

/// 命令执行结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// 是否以 0 退出
    pub success: bool,
    /// 退出码（被信号终止时为 None）
    pub code: Option<i32>,
    /// 标准错误输出
    pub stderr: String,
}

impl CommandOutput {
    pub fn ok() -> Self {
        Self {
            success: true,
            code: Some(0),
            stderr: String::new(),
        }
    }

    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            code: Some(code),
            stderr: stderr.into(),
        }
    }
}

/// 外部命令执行 trait
pub trait CommandRunner: Send + Sync {
    /// 运行命令并等待退出
    fn run(
        &self,
        program: &str,
        args: &[String],
    ) -> impl Future<Output = std::io::Result<CommandOutput>> + Send;

    /// 命令是否存在于 PATH 中
    fn is_available(&self, program: &str) -> bool;
}

/// 真实的系统命令执行器
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    async fn run(&self, program: &str, args: &[String]) -> std::io::Result<CommandOutput> {
        trace!(program, ?args, "Running command");

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await?;

        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }

    fn is_available(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}
