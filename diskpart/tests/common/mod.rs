#![allow(dead_code)]

use capacity::{Capacity, Gibibytes};
use diskpart::{DriveLetter, Target, VolumeSelector};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};

pub const BANNER: &str = "\r\nMicrosoft DiskPart version 10.0.19041.3636\r\n\r\n\
    Copyright (C) Microsoft Corporation.\r\nOn computer: WORKSTATION\r\n\r\nDISKPART> ";

pub const LIST_DISK: &str = "\r\n  Disk ###  Status         Size     Free     Dyn  Gpt\r\n  \
    --------  -------------  -------  -------  ---  ---\r\n  \
    Disk 0    Online         1863 GB      0 B        *\r\n  \
    Disk 1    Online          476 GB  1024 KB        *\r\n\r\nDISKPART> ";

pub const SELECT_DISK: &str = "\r\nDisk 0 is now the selected disk.\r\n\r\nDISKPART> ";

pub const LIST_PARTITION: &str = "\r\n  Partition ###  Type              Size     Offset\r\n  \
    -------------  ----------------  -------  -------\r\n  \
    Partition 1    Reserved            16 MB    17 KB\r\n  \
    Partition 6    Primary            362 GB  1500 GB\r\n\r\nDISKPART> ";

pub const SELECT_PARTITION: &str =
    "\r\nPartition 6 is now the selected partition.\r\n\r\nDISKPART> ";

pub const ASSIGNED: &str =
    "\r\nDiskPart successfully assigned the drive letter or mount point.\r\n\r\nDISKPART> ";

pub const REMOVED: &str =
    "\r\nDiskPart successfully removed the drive letter or mount point.\r\n\r\nDISKPART> ";

pub const REJECTED: &str = "\r\nVirtual Disk Service error:\r\n\
    The specified drive letter is not free to be assigned.\r\n\r\nDISKPART> ";

/// 磁盘0 (1863 GiB) 上的分区6 (362 GiB)，盘符X
pub fn selector() -> VolumeSelector {
    VolumeSelector {
        disk: Target::new(0, Capacity::<Gibibytes>::new(1863).to_bytes()),
        partition: Target::new(6, Capacity::<Gibibytes>::new(362).to_bytes()),
        letter: DriveLetter::new('x').unwrap(),
    }
}

pub fn mount_replies() -> Vec<&'static str> {
    vec![LIST_DISK, SELECT_DISK, LIST_PARTITION, SELECT_PARTITION, ASSIGNED]
}

pub fn unmount_replies() -> Vec<&'static str> {
    vec![LIST_DISK, SELECT_DISK, LIST_PARTITION, SELECT_PARTITION, REMOVED]
}

/// 模拟diskpart：先打印启动信息，之后每收到一行命令回复下一段输出。
///
/// 回复用完或对端关闭时停止，返回收到的全部命令。
pub async fn fake_diskpart(stream: DuplexStream, replies: Vec<&'static str>) -> Vec<String> {
    let (read, mut write) = tokio::io::split(stream);
    let mut lines = BufReader::new(read).lines();
    let mut replies = replies.into_iter();
    let mut received = Vec::new();

    if write.write_all(BANNER.as_bytes()).await.is_err() {
        return received;
    }

    while let Ok(Some(line)) = lines.next_line().await {
        let command = line.trim_end().to_owned();
        let exiting = command == "exit";
        received.push(command);
        if exiting {
            break;
        }

        let Some(reply) = replies.next() else {
            break;
        };
        if write.write_all(reply.as_bytes()).await.is_err() {
            break;
        }
    }

    received
}
