//! 一次完整的挂载或卸载
//!
//! 启动diskpart后同时等待三件事：子进程退出、协议状态机结束、超时。
//! 最先完成的一方决定结果，其余两方随即被取消（释放管道、终止子进程）。

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;
use tokio::time;

use crate::{Action, HelperLauncher, Machine, StepError, VolumeSelector};

/// 默认的会话超时
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(100);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub tool: ToolCommand,
    pub unlock_helper: PathBuf,
    pub lock_helper: PathBuf,
    pub timeout: Duration,
    /// `None`时无限等待辅助程序
    pub helper_timeout: Option<Duration>,
    pub expected_computer: Option<String>,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to start {}: {source}", .program.display())]
    Spawn { program: PathBuf, source: io::Error },
    #[error(transparent)]
    Step(#[from] StepError),
    #[error("diskpart did not finish within {0:?}")]
    Timeout(Duration),
    #[error("diskpart exited unexpectedly (exit code {code:?})")]
    ProcessExitAnomaly { code: Option<i32> },
    #[error("failed to launch {}: {source}", .program.display())]
    Helper { program: PathBuf, source: io::Error },
    #[error("{} did not exit within {limit:?}", .program.display())]
    HelperTimeout { program: PathBuf, limit: Duration },
}

/// 三方竞争中最先完成的一方
#[derive(Debug)]
enum Race {
    Finished(Result<(), StepError>),
    Exited(io::Result<Option<i32>>),
    TimedOut,
}

/// 没有出错的会话如何结束
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// 协议走到了`Exit`
    Completed,
    /// diskpart在协议结束前以退出码0退出，盘符未被改动
    ToolExited,
}

impl ToolCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tool: ToolCommand::new("diskpart.exe"),
            unlock_helper: PathBuf::from("bdeunlock.exe"),
            lock_helper: PathBuf::from("manage-bde.exe"),
            timeout: DEFAULT_TIMEOUT,
            helper_timeout: None,
            expected_computer: None,
        }
    }
}

pub struct Session<'a, L> {
    config: &'a SessionConfig,
    launcher: L,
}

impl<'a, L: HelperLauncher> Session<'a, L> {
    pub fn new(config: &'a SessionConfig, launcher: L) -> Self {
        Self { config, launcher }
    }

    /// 分配盘符，然后启动解锁程序
    pub async fn mount(&self, selector: &VolumeSelector) -> Result<SessionOutcome, SessionError> {
        if self.negotiate(Action::Mount, selector).await? == SessionOutcome::ToolExited {
            log::warn!("diskpart left early, skipping the unlock helper");
            return Ok(SessionOutcome::ToolExited);
        }

        log::info!("prompting for the BitLocker password");
        self.launch(&self.config.unlock_helper, &[selector.letter.drive()])
            .await?;
        log::info!("mount complete");

        Ok(SessionOutcome::Completed)
    }

    /// 先锁定卷，再移除盘符
    pub async fn unmount(&self, selector: &VolumeSelector) -> Result<SessionOutcome, SessionError> {
        log::info!("locking partition {}", selector.letter.drive());
        let args = [
            "-lock".to_owned(),
            "-ForceDismount".to_owned(),
            selector.letter.drive(),
        ];
        self.launch(&self.config.lock_helper, &args).await?;

        let outcome = self.negotiate(Action::Unmount, selector).await?;
        match outcome {
            SessionOutcome::Completed => log::info!("unmount complete"),
            SessionOutcome::ToolExited => log::warn!("diskpart left early, letter not removed"),
        }

        Ok(outcome)
    }

    async fn negotiate(
        &self,
        action: Action,
        selector: &VolumeSelector,
    ) -> Result<SessionOutcome, SessionError> {
        let tool = &self.config.tool;
        let spawn_error = |source: io::Error| SessionError::Spawn {
            program: tool.program.clone(),
            source,
        };

        let mut child = Command::new(&tool.program)
            .args(&tool.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(spawn_error)?;
        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            return Err(spawn_error(io::Error::other("diskpart pipes unavailable")));
        };

        let mut machine = Machine::new(stdout, stdin, action, *selector);
        if let Some(name) = &self.config.expected_computer {
            machine = machine.expect_computer(name.as_str());
        }

        // 未完成的一方在此被丢弃：管道随状态机关闭，计时器随之取消
        let race = tokio::select! {
            biased;
            result = machine.run() => Race::Finished(result),
            status = child.wait() => Race::Exited(status.map(|status| status.code())),
            () = time::sleep(self.config.timeout) => Race::TimedOut,
        };

        if !matches!(race, Race::Exited(_)) {
            terminate(&mut child).await;
        }

        match race {
            Race::Finished(Ok(())) => Ok(SessionOutcome::Completed),
            Race::Finished(Err(err)) => {
                log::error!("diskpart negotiation failed: {err}");
                Err(err.into())
            }
            Race::Exited(Ok(Some(0))) => {
                log::info!("diskpart exited with code 0 before the exchange finished");
                Ok(SessionOutcome::ToolExited)
            }
            Race::Exited(Ok(code)) => {
                log::warn!("diskpart exited with code {code:?}");
                Err(SessionError::ProcessExitAnomaly { code })
            }
            Race::Exited(Err(err)) => {
                log::warn!("failed to wait for diskpart: {err}");
                Err(SessionError::ProcessExitAnomaly { code: None })
            }
            Race::TimedOut => {
                log::error!("something went wrong, timed out");
                Err(SessionError::Timeout(self.config.timeout))
            }
        }
    }

    async fn launch(&self, program: &Path, args: &[String]) -> Result<Option<i32>, SessionError> {
        let launched = self.launcher.launch(program, args);
        let result = match self.config.helper_timeout {
            Some(limit) => time::timeout(limit, launched)
                .await
                .map_err(|_| SessionError::HelperTimeout {
                    program: program.to_owned(),
                    limit,
                })?,
            None => launched.await,
        };

        let code = result.map_err(|source| SessionError::Helper {
            program: program.to_owned(),
            source,
        })?;
        log::info!("{} exited with code {code:?}", program.display());

        Ok(code)
    }
}

async fn terminate(child: &mut tokio::process::Child) {
    if let Err(err) = child.start_kill() {
        log::debug!("killing diskpart: {err}");
    }
    if let Err(err) = child.wait().await {
        log::debug!("reaping diskpart: {err}");
    }
}
