use thiserror::Error;

/// 协议步骤的失败原因
///
/// 判别值即进程退出码，成功由`Ok(())`表示。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[repr(u8)]
pub enum StepError {
    #[error("the host tool runs on a different computer")]
    MismatchComputer = 1,
    #[error("no listed disk matches the requested number and capacity")]
    MismatchDisk,
    #[error("no listed partition matches the requested number and capacity")]
    MismatchPartition,
    #[error("the host tool selected a different disk")]
    SelectDiskFailed,
    #[error("the host tool selected a different partition")]
    SelectPartitionFailed,
    #[error("the host tool did not confirm the drive letter assignment")]
    AssignLetterFailed,
    #[error("the host tool did not confirm the drive letter removal")]
    RemoveLetterFailed,
    #[error("unexpected transcript from the host tool")]
    ParseFailed,
    #[error("pipe I/O with the host tool failed")]
    Io,
}

impl StepError {
    pub const fn code(self) -> u8 {
        self as u8
    }
}
