//! 协议的单个步骤
//!
//! 每个步骤只进行一次管道操作：写步骤发送一条命令，读步骤读取到提示符为止并解析输出。

use capacity::BinaryUnit;
use derive_more::Display;
use tokio::io::{AsyncBufRead, AsyncWrite, AsyncWriteExt};

use crate::matcher::{self, ListingRow, MalformedRow};
use crate::{DriveLetter, StepError, Target, Transcript};

/// 简短确认的读取上限
const CONFIRMATION_CAP: usize = 1024;
/// 启动信息与列表的读取上限
const LISTING_CAP: usize = 8 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Command {
    #[display(fmt = "list disk")]
    ListDisk,
    #[display(fmt = "select disk {}", _0)]
    SelectDisk(u32),
    #[display(fmt = "list partition")]
    ListPartition,
    #[display(fmt = "select partition {}", _0)]
    SelectPartition(u32),
    #[display(fmt = "assign letter={}", _0)]
    AssignLetter(DriveLetter),
    #[display(fmt = "remove letter={}", _0)]
    RemoveLetter(DriveLetter),
    #[display(fmt = "exit")]
    Exit,
}

/// 发送一条以换行结尾的命令
pub async fn send<W>(pipe: &mut W, command: Command) -> Result<(), StepError>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let line = format!("{command}\n");
    let written = match pipe.write_all(line.as_bytes()).await {
        Ok(()) => pipe.flush().await,
        Err(err) => Err(err),
    };

    match written {
        Ok(()) => {
            log::info!("diskpart> {command}");
            Ok(())
        }
        Err(err) => {
            log::error!("failed to send {command:?}: {err}");
            Err(StepError::Io)
        }
    }
}

async fn read<R>(transcript: &mut Transcript, pipe: &mut R, cap: usize) -> Result<(), StepError>
where
    R: AsyncBufRead + Unpin + ?Sized,
{
    transcript.read_prompt(pipe, cap).await.map_err(|err| {
        log::error!("failed to read from diskpart: {err}");
        StepError::Io
    })
}

/// 读取启动信息
///
/// 没有给出`expected`时只记录计算机名。
pub async fn read_computer_name<R>(
    transcript: &mut Transcript,
    pipe: &mut R,
    expected: Option<&str>,
) -> Result<(), StepError>
where
    R: AsyncBufRead + Unpin + ?Sized,
{
    read(transcript, pipe, LISTING_CAP).await?;

    let text = transcript.text();
    let name = matcher::computer_name(&text);
    log::info!("computer: {}", name.unwrap_or("<unknown>"));

    match (expected, name) {
        (None, _) => Ok(()),
        (Some(expected), Some(name)) if name.eq_ignore_ascii_case(expected) => Ok(()),
        (Some(expected), name) => {
            log::error!("expected computer {expected:?}, diskpart runs on {name:?}");
            Err(StepError::MismatchComputer)
        }
    }
}

pub async fn list_disk<W>(pipe: &mut W) -> Result<(), StepError>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    send(pipe, Command::ListDisk).await
}

pub async fn read_list_disk<R>(
    transcript: &mut Transcript,
    pipe: &mut R,
    disk: &Target,
) -> Result<(), StepError>
where
    R: AsyncBufRead + Unpin + ?Sized,
{
    read(transcript, pipe, LISTING_CAP).await?;

    let text = transcript.text();
    find_listed("disk", matcher::disk_rows(&text), disk, StepError::MismatchDisk)
}

pub async fn select_disk<W>(pipe: &mut W, number: u32) -> Result<(), StepError>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    send(pipe, Command::SelectDisk(number)).await
}

pub async fn read_select_disk<R>(
    transcript: &mut Transcript,
    pipe: &mut R,
    number: u32,
) -> Result<(), StepError>
where
    R: AsyncBufRead + Unpin + ?Sized,
{
    read(transcript, pipe, CONFIRMATION_CAP).await?;

    match matcher::selected_disk(&transcript.text()) {
        Some(selected) if selected == number => {
            log::info!("disk #{selected} selected");
            Ok(())
        }
        Some(selected) => {
            log::error!("diskpart selected disk #{selected} instead of #{number}");
            Err(StepError::SelectDiskFailed)
        }
        None => {
            log::debug!("diskpart: {}", transcript.text());
            Err(StepError::ParseFailed)
        }
    }
}

pub async fn list_partition<W>(pipe: &mut W) -> Result<(), StepError>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    send(pipe, Command::ListPartition).await
}

pub async fn read_list_partition<R>(
    transcript: &mut Transcript,
    pipe: &mut R,
    partition: &Target,
) -> Result<(), StepError>
where
    R: AsyncBufRead + Unpin + ?Sized,
{
    read(transcript, pipe, LISTING_CAP).await?;

    let text = transcript.text();
    find_listed(
        "partition",
        matcher::partition_rows(&text),
        partition,
        StepError::MismatchPartition,
    )
}

pub async fn select_partition<W>(pipe: &mut W, number: u32) -> Result<(), StepError>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    send(pipe, Command::SelectPartition(number)).await
}

pub async fn read_select_partition<R>(
    transcript: &mut Transcript,
    pipe: &mut R,
    number: u32,
) -> Result<(), StepError>
where
    R: AsyncBufRead + Unpin + ?Sized,
{
    read(transcript, pipe, CONFIRMATION_CAP).await?;

    match matcher::selected_partition(&transcript.text()) {
        Some(selected) if selected == number => {
            log::info!("partition #{selected} selected");
            Ok(())
        }
        Some(selected) => {
            log::error!("diskpart selected partition #{selected} instead of #{number}");
            Err(StepError::SelectPartitionFailed)
        }
        None => {
            log::debug!("diskpart: {}", transcript.text());
            Err(StepError::ParseFailed)
        }
    }
}

pub async fn assign_letter<W>(pipe: &mut W, letter: DriveLetter) -> Result<(), StepError>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    send(pipe, Command::AssignLetter(letter)).await
}

pub async fn read_assign_letter<R>(transcript: &mut Transcript, pipe: &mut R) -> Result<(), StepError>
where
    R: AsyncBufRead + Unpin + ?Sized,
{
    read(transcript, pipe, CONFIRMATION_CAP).await?;
    confirm(transcript, matcher::ASSIGNED, StepError::AssignLetterFailed)
}

pub async fn remove_letter<W>(pipe: &mut W, letter: DriveLetter) -> Result<(), StepError>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    send(pipe, Command::RemoveLetter(letter)).await
}

pub async fn read_remove_letter<R>(transcript: &mut Transcript, pipe: &mut R) -> Result<(), StepError>
where
    R: AsyncBufRead + Unpin + ?Sized,
{
    read(transcript, pipe, CONFIRMATION_CAP).await?;
    confirm(transcript, matcher::REMOVED, StepError::RemoveLetterFailed)
}

pub async fn exit<W>(pipe: &mut W) -> Result<(), StepError>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    send(pipe, Command::Exit).await
}

/// 扫描整张列表；任何一行格式错误都立即失败
fn find_listed<'a>(
    kind: &str,
    rows: impl Iterator<Item = Result<ListingRow<'a>, MalformedRow>>,
    target: &Target,
    missing: StepError,
) -> Result<(), StepError> {
    let mut found = false;

    for row in rows {
        let row = row.map_err(|err| {
            log::error!("{err}");
            StepError::ParseFailed
        })?;
        let Some(unit) = BinaryUnit::from_tool_label(row.unit) else {
            log::error!("unknown capacity unit {:?} for {kind} #{}", row.unit, row.number);
            return Err(StepError::ParseFailed);
        };

        let capacity = unit.bytes(row.magnitude);
        log::debug!("listed {kind} #{} ({})", row.number, capacity.human());
        if row.number == target.number && capacity == target.capacity {
            log::info!("found desired {kind} #{}", row.number);
            found = true;
        }
    }

    if found {
        Ok(())
    } else {
        log::error!(
            "no {kind} #{} of {} listed",
            target.number,
            target.capacity.human()
        );
        Err(missing)
    }
}

fn confirm(transcript: &Transcript, phrase: &str, missing: StepError) -> Result<(), StepError> {
    let text = transcript.text();
    if matcher::success_banner(&text, phrase) {
        log::info!("{phrase}");
        Ok(())
    } else {
        log::debug!("diskpart: {text}");
        Err(missing)
    }
}
