//! 协议状态机
//!
//! 挂载与卸载都是固定的线性流程，任何一步失败都会关闭管道并结束。

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use crate::{Action, StepError, Transcript, VolumeSelector, step};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolState {
    StartUp,
    ListDisk,
    ReadListDisk,
    SelectDisk,
    ReadSelectDisk,
    ListPartition,
    ReadListPartition,
    SelectPartition,
    ReadSelectPartition,
    AssignLetter,
    ReadAssignLetter,
    RemoveLetter,
    ReadRemoveLetter,
    Exit,
}

impl ProtocolState {
    /// `Exit`之后没有后继状态
    pub fn next(self, action: Action) -> Option<Self> {
        use ProtocolState::*;

        let next = match self {
            StartUp => ListDisk,
            ListDisk => ReadListDisk,
            ReadListDisk => SelectDisk,
            SelectDisk => ReadSelectDisk,
            ReadSelectDisk => ListPartition,
            ListPartition => ReadListPartition,
            ReadListPartition => SelectPartition,
            SelectPartition => ReadSelectPartition,
            ReadSelectPartition => match action {
                Action::Mount => AssignLetter,
                Action::Unmount => RemoveLetter,
            },
            AssignLetter => ReadAssignLetter,
            RemoveLetter => ReadRemoveLetter,
            ReadAssignLetter | ReadRemoveLetter => Exit,
            Exit => return None,
        };

        Some(next)
    }
}

/// 独占一次会话的管道与输出缓冲
pub struct Machine<R, W> {
    reader: BufReader<R>,
    writer: W,
    transcript: Transcript,
    action: Action,
    selector: VolumeSelector,
    expected_computer: Option<String>,
}

impl<R, W> Machine<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W, action: Action, selector: VolumeSelector) -> Self {
        Self {
            reader: BufReader::new(reader),
            writer,
            transcript: Transcript::new(),
            action,
            selector,
            expected_computer: None,
        }
    }

    /// 核对启动信息中的计算机名
    pub fn expect_computer(mut self, name: impl Into<String>) -> Self {
        self.expected_computer = Some(name.into());
        self
    }

    /// Walks the program from `StartUp` to `Exit`.
    ///
    /// On the first failing step both pipe halves are closed and the error is
    /// returned; no later step runs.
    pub async fn run(mut self) -> Result<(), StepError> {
        let mut state = ProtocolState::StartUp;

        loop {
            if let Err(err) = self.step(state).await {
                log::error!("{state:?} failed: {err}");
                self.close().await;
                return Err(err);
            }

            let Some(next) = state.next(self.action) else {
                return Ok(());
            };
            self.transcript.clear();
            state = next;
        }
    }

    async fn step(&mut self, state: ProtocolState) -> Result<(), StepError> {
        let Self {
            reader,
            writer,
            transcript,
            selector,
            expected_computer,
            ..
        } = self;

        match state {
            ProtocolState::StartUp => {
                step::read_computer_name(transcript, reader, expected_computer.as_deref()).await
            }
            ProtocolState::ListDisk => step::list_disk(writer).await,
            ProtocolState::ReadListDisk => {
                step::read_list_disk(transcript, reader, &selector.disk).await
            }
            ProtocolState::SelectDisk => step::select_disk(writer, selector.disk.number).await,
            ProtocolState::ReadSelectDisk => {
                step::read_select_disk(transcript, reader, selector.disk.number).await
            }
            ProtocolState::ListPartition => step::list_partition(writer).await,
            ProtocolState::ReadListPartition => {
                step::read_list_partition(transcript, reader, &selector.partition).await
            }
            ProtocolState::SelectPartition => {
                step::select_partition(writer, selector.partition.number).await
            }
            ProtocolState::ReadSelectPartition => {
                step::read_select_partition(transcript, reader, selector.partition.number).await
            }
            ProtocolState::AssignLetter => step::assign_letter(writer, selector.letter).await,
            ProtocolState::ReadAssignLetter => step::read_assign_letter(transcript, reader).await,
            ProtocolState::RemoveLetter => step::remove_letter(writer, selector.letter).await,
            ProtocolState::ReadRemoveLetter => step::read_remove_letter(transcript, reader).await,
            ProtocolState::Exit => step::exit(writer).await,
        }
    }

    /// 关闭写端，读端随`self`一同释放
    async fn close(mut self) {
        if let Err(err) = self.writer.shutdown().await {
            log::debug!("closing diskpart stdin: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program(action: Action) -> Vec<ProtocolState> {
        let mut states = vec![ProtocolState::StartUp];
        while let Some(next) = states.last().and_then(|state| state.next(action)) {
            states.push(next);
        }
        states
    }

    #[test]
    fn mount_program() {
        use ProtocolState::*;

        assert_eq!(
            program(Action::Mount),
            [
                StartUp,
                ListDisk,
                ReadListDisk,
                SelectDisk,
                ReadSelectDisk,
                ListPartition,
                ReadListPartition,
                SelectPartition,
                ReadSelectPartition,
                AssignLetter,
                ReadAssignLetter,
                Exit,
            ]
        );
    }

    #[test]
    fn unmount_program() {
        use ProtocolState::*;

        let states = program(Action::Unmount);
        assert_eq!(&states[..9], &program(Action::Mount)[..9]);
        assert_eq!(&states[9..], [RemoveLetter, ReadRemoveLetter, Exit]);
    }
}
