//! 调用者请求的卷
//!
//! 磁盘与分区的序号会被系统重用或重排，所以每次选择都同时核对序号与容量。

use core::str::FromStr;

use capacity::{CapacityBytes, CapacityParseError};
use derive_more::{Display, Into};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Mount,
    Unmount,
}

/// A disk or partition: ordinal plus exact capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub number: u32,
    pub capacity: CapacityBytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Into)]
pub struct DriveLetter(char);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeSelector {
    pub disk: Target,
    pub partition: Target,
    pub letter: DriveLetter,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorParseError {
    #[error("expected `number:capacity:unit`, got {0:?}")]
    Shape(String),
    #[error("malformed number {0:?}")]
    Number(String),
    #[error(transparent)]
    Capacity(#[from] CapacityParseError),
    #[error("drive letter must be a single ASCII letter, got {0:?}")]
    Letter(String),
}

impl Target {
    pub const fn new(number: u32, capacity: CapacityBytes) -> Self {
        Self { number, capacity }
    }
}

impl FromStr for Target {
    type Err = SelectorParseError;

    /// `0:1863:GiB`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut fields = s.splitn(3, ':');
        let (Some(number), Some(magnitude), Some(unit)) =
            (fields.next(), fields.next(), fields.next())
        else {
            return Err(SelectorParseError::Shape(s.to_owned()));
        };

        let number = number
            .parse()
            .map_err(|_| SelectorParseError::Number(number.to_owned()))?;
        let capacity = capacity::parse_iec(magnitude, unit)?;

        Ok(Self { number, capacity })
    }
}

impl DriveLetter {
    /// 只接受ASCII字母，统一为大写
    pub fn new(letter: char) -> Option<Self> {
        letter
            .is_ascii_alphabetic()
            .then(|| Self(letter.to_ascii_uppercase()))
    }

    #[inline]
    pub fn as_char(self) -> char {
        self.0
    }

    /// `X:`
    pub fn drive(self) -> String {
        format!("{}:", self.0)
    }
}

impl FromStr for DriveLetter {
    type Err = SelectorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(letter), None) => {
                Self::new(letter).ok_or_else(|| SelectorParseError::Letter(s.to_owned()))
            }
            _ => Err(SelectorParseError::Letter(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use capacity::{Capacity, Gibibytes, Mebibytes};

    use super::*;

    #[test]
    fn parse_target() {
        let disk: Target = "0:1863:GiB".parse().unwrap();
        assert_eq!(disk.number, 0);
        assert_eq!(disk.capacity, Capacity::<Gibibytes>::new(1863));

        let partition: Target = "6:512:MiB".parse().unwrap();
        assert_eq!(partition.number, 6);
        assert_eq!(partition.capacity, Capacity::<Mebibytes>::new(512));
    }

    #[test]
    fn reject_malformed_target() {
        assert_eq!(
            "0:1863".parse::<Target>(),
            Err(SelectorParseError::Shape("0:1863".to_owned()))
        );
        assert_eq!(
            "x:1863:GiB".parse::<Target>(),
            Err(SelectorParseError::Number("x".to_owned()))
        );
        assert!(matches!(
            "0:1863:GB".parse::<Target>(),
            Err(SelectorParseError::Capacity(
                CapacityParseError::UnknownUnit(_)
            ))
        ));
        assert!(matches!(
            "0:-1:GiB".parse::<Target>(),
            Err(SelectorParseError::Capacity(CapacityParseError::Magnitude(
                _
            )))
        ));
    }

    #[test]
    fn drive_letter() {
        assert_eq!("x".parse::<DriveLetter>().unwrap().as_char(), 'X');
        assert_eq!("Z".parse::<DriveLetter>().unwrap().drive(), "Z:");
        assert_eq!(DriveLetter::new('q').map(char::from), Some('Q'));
        assert_eq!(DriveLetter::new('q').unwrap().to_string(), "Q");
        assert!("XY".parse::<DriveLetter>().is_err());
        assert!("".parse::<DriveLetter>().is_err());
        assert!("1".parse::<DriveLetter>().is_err());
        assert!("é".parse::<DriveLetter>().is_err());
    }
}
