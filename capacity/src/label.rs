use core::num::ParseIntError;
use core::str::FromStr;

use thiserror::Error;

use crate::{Capacity, CapacityBytes, Gibibytes, Kibibytes, Mebibytes};

/// 二进制（1024进制）单位
///
/// 磁盘工具的输出写作`KB`/`MB`/`GB`，调用者的输入写作`KiB`/`MiB`/`GiB`，两者含义相同。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryUnit {
    Kibibytes,
    Mebibytes,
    Gibibytes,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapacityParseError {
    #[error("unsupported capacity unit {0:?}")]
    UnknownUnit(String),
    #[error("malformed capacity magnitude: {0}")]
    Magnitude(#[from] ParseIntError),
}

impl BinaryUnit {
    /// Labels printed by the partitioning tool.
    pub fn from_tool_label(label: &str) -> Option<Self> {
        match label {
            "KB" => Some(Self::Kibibytes),
            "MB" => Some(Self::Mebibytes),
            "GB" => Some(Self::Gibibytes),
            _ => None,
        }
    }

    /// Labels accepted from the caller.
    pub fn from_iec_label(label: &str) -> Option<Self> {
        match label {
            "KiB" => Some(Self::Kibibytes),
            "MiB" => Some(Self::Mebibytes),
            "GiB" => Some(Self::Gibibytes),
            _ => None,
        }
    }

    pub fn bytes(self, magnitude: u64) -> CapacityBytes {
        match self {
            Self::Kibibytes => Capacity::<Kibibytes>::new(magnitude).cast(),
            Self::Mebibytes => Capacity::<Mebibytes>::new(magnitude).cast(),
            Self::Gibibytes => Capacity::<Gibibytes>::new(magnitude).cast(),
        }
    }
}

impl FromStr for BinaryUnit {
    type Err = CapacityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_iec_label(s).ok_or_else(|| CapacityParseError::UnknownUnit(s.to_owned()))
    }
}

/// 解析调用者给出的`<magnitude>`与`<unit>`
pub fn parse_iec(magnitude: &str, unit: &str) -> Result<CapacityBytes, CapacityParseError> {
    let unit: BinaryUnit = unit.parse()?;
    let magnitude: u64 = magnitude.parse()?;

    Ok(unit.bytes(magnitude))
}
