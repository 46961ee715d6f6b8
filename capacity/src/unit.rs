//! 容量单位
//!
//! 每个单位都是一个零大小的标记类型，以`NUM / DEN`字节的比例描述自身。

use core::fmt::Debug;
use core::marker::PhantomData;

pub trait Unit: Debug + Clone + Copy + Default + 'static {
    /// 每单位的字节数（分子）
    const NUM: u64;
    /// 每单位的字节数（分母）
    const DEN: u64 = 1;
    const SYMBOL: &'static str;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Bytes;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Kibibytes;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Mebibytes;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Gibibytes;

impl Unit for Bytes {
    const NUM: u64 = 1;
    const SYMBOL: &'static str = "B";
}

impl Unit for Kibibytes {
    const NUM: u64 = 1 << 10;
    const SYMBOL: &'static str = "KiB";
}

impl Unit for Mebibytes {
    const NUM: u64 = 1 << 20;
    const SYMBOL: &'static str = "MiB";
}

impl Unit for Gibibytes {
    const NUM: u64 = 1 << 30;
    const SYMBOL: &'static str = "GiB";
}

/// `S`到`T`的换算比例，编译期约分
pub(crate) struct Ratio<S, T>(PhantomData<(S, T)>);

impl<S: Unit, T: Unit> Ratio<S, T> {
    const RAW_NUM: u128 = S::NUM as u128 * T::DEN as u128;
    const RAW_DEN: u128 = S::DEN as u128 * T::NUM as u128;
    const GCD: u128 = gcd(Self::RAW_NUM, Self::RAW_DEN);

    pub(crate) const NUM: u128 = Self::RAW_NUM / Self::GCD;
    pub(crate) const DEN: u128 = Self::RAW_DEN / Self::GCD;
}

const fn gcd(mut a: u128, mut b: u128) -> u128 {
    if a == 0 && b == 0 {
        return 1;
    }

    while b != 0 {
        (a, b) = (b, a % b);
    }

    a
}
