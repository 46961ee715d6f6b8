//! 从diskpart的输出中提取信息
//!
//! diskpart的表格列宽不固定，这里只依赖每行中字段的先后顺序。

use std::sync::LazyLock;

use regex::{Captures, Regex};
use thiserror::Error;

pub const ASSIGNED: &str = "DiskPart successfully assigned the drive letter or mount point.";
pub const REMOVED: &str = "DiskPart successfully removed the drive letter or mount point.";

static COMPUTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"On computer: ([^\r\n]*)").expect("computer name pattern"));

// `Disk 0    Online         1863 GB      0 B        *`
static DISK_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Disk[ \t]+(\d+)[ \t]+.+?[ \t]+(\d+)[ \t]+(\S+)").expect("disk row pattern")
});

// `Partition 6    Primary            362 GB  1500 GB`
static PARTITION_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Partition[ \t]+(\d+)[ \t]+.+?[ \t]+(\d+)[ \t]+(\S+)")
        .expect("partition row pattern")
});

static SELECTED_DISK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Disk (\d+) is now the selected disk").expect("selected disk pattern")
});

static SELECTED_PARTITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Partition (\d+) is now the selected partition")
        .expect("selected partition pattern")
});

/// 列表中的一行，单位标签原样保留
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingRow<'a> {
    pub number: u32,
    pub magnitude: u64,
    pub unit: &'a str,
}

/// 行的格式正确，但数字无法解析
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed listing row {0:?}")]
pub struct MalformedRow(pub String);

impl<'a> ListingRow<'a> {
    fn from_captures(caps: Captures<'a>) -> Result<Self, MalformedRow> {
        let malformed = || MalformedRow(caps[0].to_owned());

        let number: u32 = caps[1].parse().map_err(|_| malformed())?;
        let magnitude: u64 = caps[2].parse().map_err(|_| malformed())?;
        let unit = caps.get(3).map_or("", |unit| unit.as_str());

        Ok(Self {
            number,
            magnitude,
            unit,
        })
    }
}

pub fn computer_name(text: &str) -> Option<&str> {
    COMPUTER
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|name| name.as_str().trim())
}

/// Every `Disk N ... size unit` row, anywhere in `text`.
pub fn disk_rows(text: &str) -> impl Iterator<Item = Result<ListingRow<'_>, MalformedRow>> {
    DISK_ROW.captures_iter(text).map(ListingRow::from_captures)
}

/// Every `Partition N ... size unit` row, anywhere in `text`.
pub fn partition_rows(
    text: &str,
) -> impl Iterator<Item = Result<ListingRow<'_>, MalformedRow>> {
    PARTITION_ROW.captures_iter(text).map(ListingRow::from_captures)
}

/// 数字无法解析时同样视为缺失
pub fn selected_disk(text: &str) -> Option<u32> {
    SELECTED_DISK
        .captures(text)
        .and_then(|caps| caps[1].parse().ok())
}

pub fn selected_partition(text: &str) -> Option<u32> {
    SELECTED_PARTITION
        .captures(text)
        .and_then(|caps| caps[1].parse().ok())
}

pub fn success_banner(text: &str, phrase: &str) -> bool {
    text.contains(phrase)
}
