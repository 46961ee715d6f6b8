use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use diskpart::{
    Action, DEFAULT_TIMEOUT, DriveLetter, SessionConfig, Target, ToolCommand, VolumeSelector,
};

use crate::paths;

/// Attach a BitLocker partition to a drive letter and unlock it, or lock it
/// and detach the letter again.
///
/// bitlocker-tool mount 0:1863:GiB 6:362:GiB X
#[derive(Parser)]
#[command(version)]
pub struct Cli {
    pub action: ActionArg,

    /// Disk as `number:capacity:unit`, unit one of KiB, MiB, GiB
    pub disk: Target,

    /// Partition as `number:capacity:unit`, unit one of KiB, MiB, GiB
    pub partition: Target,

    /// Drive letter to assign or remove
    pub letter: DriveLetter,

    /// Seconds to wait for diskpart before giving up
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    pub timeout: u64,

    /// Seconds to wait for the unlock/lock helper; waits forever when omitted
    #[arg(long)]
    pub helper_timeout: Option<u64>,

    /// Refuse to proceed unless diskpart reports this computer name
    #[arg(long)]
    pub computer: Option<String>,

    /// diskpart executable [default: <SystemRoot>\System32\diskpart.exe]
    #[arg(long)]
    pub diskpart: Option<PathBuf>,

    /// Unlock helper [default: <SystemRoot>\System32\bdeunlock.exe]
    #[arg(long)]
    pub unlock_helper: Option<PathBuf>,

    /// Lock helper [default: <SystemRoot>\System32\manage-bde.exe]
    #[arg(long)]
    pub lock_helper: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ActionArg {
    Mount,
    Unmount,
}

impl From<ActionArg> for Action {
    fn from(action: ActionArg) -> Self {
        match action {
            ActionArg::Mount => Action::Mount,
            ActionArg::Unmount => Action::Unmount,
        }
    }
}

impl Cli {
    pub fn selector(&self) -> VolumeSelector {
        VolumeSelector {
            disk: self.disk,
            partition: self.partition,
            letter: self.letter,
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        let system32 = paths::system32();
        let resolve = |path: &Option<PathBuf>, exe: &str| {
            path.clone().unwrap_or_else(|| system32.join(exe))
        };

        SessionConfig {
            tool: ToolCommand::new(resolve(&self.diskpart, paths::DISKPART)),
            unlock_helper: resolve(&self.unlock_helper, paths::BDEUNLOCK),
            lock_helper: resolve(&self.lock_helper, paths::MANAGE_BDE),
            timeout: Duration::from_secs(self.timeout),
            helper_timeout: self.helper_timeout.map(Duration::from_secs),
            expected_computer: self.computer.clone(),
        }
    }
}
