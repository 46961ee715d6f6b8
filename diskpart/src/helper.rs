//! 以管理员权限启动的外部程序（解锁、锁定BitLocker卷）

use std::future::Future;
use std::io;
use std::path::Path;

use tokio::process::Command;

pub trait HelperLauncher {
    /// Runs `program` with `args`, waits for it and returns its exit code.
    fn launch(&self, program: &Path, args: &[String]) -> impl Future<Output = io::Result<Option<i32>>>;
}

impl<T: HelperLauncher + ?Sized> HelperLauncher for &T {
    fn launch(&self, program: &Path, args: &[String]) -> impl Future<Output = io::Result<Option<i32>>> {
        (**self).launch(program, args)
    }
}

/// 通过系统外壳启动
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellLauncher {
    elevate: bool,
}

impl ShellLauncher {
    /// Windows上请求"RunAs"提权，其他平台直接运行
    pub fn elevated() -> Self {
        Self {
            elevate: cfg!(windows),
        }
    }

    pub fn direct() -> Self {
        Self { elevate: false }
    }

    /// 放弃等待时子进程随之被杀死
    ///
    /// 提权时被杀死的只是PowerShell，由`Start-Process`启动的程序会继续运行。
    fn command(&self, program: &Path, args: &[String]) -> Command {
        if !self.elevate {
            let mut command = Command::new(program);
            command.args(args).kill_on_drop(true);
            return command;
        }

        let arguments = args
            .iter()
            .map(|arg| quote(arg))
            .collect::<Vec<_>>()
            .join(",");
        let script = format!(
            "$p = Start-Process -FilePath {} -ArgumentList {} -Verb RunAs -Wait -PassThru; exit $p.ExitCode",
            quote(&program.to_string_lossy()),
            if arguments.is_empty() { "@()".to_owned() } else { arguments },
        );

        let mut command = Command::new("powershell.exe");
        command
            .args(["-NoProfile", "-NonInteractive", "-Command", &script])
            .kill_on_drop(true);
        command
    }
}

impl HelperLauncher for ShellLauncher {
    async fn launch(&self, program: &Path, args: &[String]) -> io::Result<Option<i32>> {
        log::debug!("launching {} {args:?}", program.display());
        let status = self.command(program, args).status().await?;

        Ok(status.code())
    }
}

/// PowerShell的单引号字符串
fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}
