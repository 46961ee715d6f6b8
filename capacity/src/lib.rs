//! 带单位的容量
//!
//! 不同单位之间的比较先换算到公共单位，换算只截断不舍入。

mod label;
mod unit;

use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;
use core::ops::{Add, Mul, Sub};

use typed_bytesize::ByteSizeIec;

pub use self::{
    label::{BinaryUnit, CapacityParseError, parse_iec},
    unit::{Bytes, Gibibytes, Kibibytes, Mebibytes, Unit},
};
use self::unit::Ratio;

pub type CapacityBytes = Capacity<Bytes>;

#[derive(Clone, Copy, Default)]
pub struct Capacity<U: Unit> {
    magnitude: u64,
    _unit: PhantomData<U>,
}

impl<U: Unit> Capacity<U> {
    pub const fn new(magnitude: u64) -> Self {
        Self {
            magnitude,
            _unit: PhantomData,
        }
    }

    #[inline]
    pub const fn magnitude(&self) -> u64 {
        self.magnitude
    }

    /// 换算到单位`T`，结果向下取整，超出`u64`时饱和
    pub fn cast<T: Unit>(self) -> Capacity<T> {
        let scaled =
            (self.magnitude as u128).saturating_mul(Ratio::<U, T>::NUM) / Ratio::<U, T>::DEN;

        Capacity::new(u64::try_from(scaled).unwrap_or(u64::MAX))
    }

    pub fn to_bytes(self) -> CapacityBytes {
        self.cast()
    }

    /// 便于日志输出的IEC格式
    pub fn human(self) -> ByteSizeIec {
        ByteSizeIec(self.to_bytes().magnitude)
    }
}

impl<U: Unit, T: Unit> PartialEq<Capacity<T>> for Capacity<U> {
    fn eq(&self, other: &Capacity<T>) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl<U: Unit> Eq for Capacity<U> {}

impl<U: Unit, T: Unit> PartialOrd<Capacity<T>> for Capacity<U> {
    fn partial_cmp(&self, other: &Capacity<T>) -> Option<Ordering> {
        // 两边同乘换算比例的分母，避免截断
        let lhs = (self.magnitude as u128).checked_mul(Ratio::<U, T>::NUM);
        let rhs = (other.magnitude as u128).checked_mul(Ratio::<U, T>::DEN);

        match (lhs, rhs) {
            (Some(lhs), Some(rhs)) => Some(lhs.cmp(&rhs)),
            (None, Some(_)) => Some(Ordering::Greater),
            (Some(_), None) => Some(Ordering::Less),
            (None, None) => None,
        }
    }
}

impl<U: Unit> Ord for Capacity<U> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.magnitude.cmp(&other.magnitude)
    }
}

impl<U: Unit> Hash for Capacity<U> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.magnitude.hash(state);
    }
}

// 与`cast`一样在边界处饱和
impl<U: Unit> Add for Capacity<U> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.magnitude.saturating_add(rhs.magnitude))
    }
}

impl<U: Unit> Sub for Capacity<U> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.magnitude.saturating_sub(rhs.magnitude))
    }
}

impl<U: Unit> Mul<u64> for Capacity<U> {
    type Output = Self;

    fn mul(self, rhs: u64) -> Self::Output {
        Self::new(self.magnitude.saturating_mul(rhs))
    }
}

impl<U: Unit> fmt::Debug for Capacity<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Capacity({} {})", self.magnitude, U::SYMBOL)
    }
}

impl<U: Unit> fmt::Display for Capacity<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.magnitude, U::SYMBOL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GIB: u64 = 1 << 30;

    #[test]
    fn cast_round_trips_whole_units() {
        for n in [0, 1, 362, 1863, 4096] {
            let bytes = CapacityBytes::new(n * GIB);
            assert_eq!(bytes.cast::<Gibibytes>().cast::<Bytes>(), bytes);
            assert_eq!(bytes.cast::<Gibibytes>().magnitude(), n);
        }
    }

    #[test]
    fn cast_truncates() {
        let bytes = CapacityBytes::new(2 * GIB - 1);
        assert_eq!(bytes.cast::<Gibibytes>().magnitude(), 1);
        assert_eq!(Capacity::<Mebibytes>::new(1535).cast::<Gibibytes>().magnitude(), 1);
        assert_eq!(Capacity::<Kibibytes>::new(1023).cast::<Mebibytes>().magnitude(), 0);
    }

    #[test]
    fn cast_saturates() {
        let huge = Capacity::<Gibibytes>::new(u64::MAX);
        assert_eq!(huge.cast::<Bytes>().magnitude(), u64::MAX);
    }

    #[test]
    fn compares_across_units() {
        assert_eq!(Capacity::<Gibibytes>::new(1), Capacity::<Mebibytes>::new(1024));
        assert_ne!(Capacity::<Gibibytes>::new(1), Capacity::<Mebibytes>::new(1023));
        assert!(Capacity::<Mebibytes>::new(1025) > Capacity::<Gibibytes>::new(1));
        // 1 GiB + 1 B 不会因截断而与 1 GiB 相等
        assert!(CapacityBytes::new(GIB + 1) > Capacity::<Gibibytes>::new(1));
        assert_ne!(CapacityBytes::new(GIB + 1), Capacity::<Gibibytes>::new(1));
    }

    #[test]
    fn arithmetic_returns_new_values() {
        let a = Capacity::<Mebibytes>::new(100);
        let b = a + Capacity::new(28);
        assert_eq!(a.magnitude(), 100);
        assert_eq!(b.magnitude(), 128);
        assert_eq!((b - a).magnitude(), 28);
        assert_eq!((a * 3).magnitude(), 300);
    }

    #[test]
    fn arithmetic_saturates() {
        let max = Capacity::<Gibibytes>::new(u64::MAX);
        assert_eq!((max + Capacity::new(1)).magnitude(), u64::MAX);
        assert_eq!((max * 2).magnitude(), u64::MAX);
        assert_eq!(
            (Capacity::<Gibibytes>::new(1) - Capacity::new(2)).magnitude(),
            0
        );
    }

    #[test]
    fn display() {
        assert_eq!(Capacity::<Gibibytes>::new(1863).to_string(), "1863 GiB");
        assert_eq!(CapacityBytes::new(7).to_string(), "7 B");
    }
}
