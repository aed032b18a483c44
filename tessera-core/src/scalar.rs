//! Element kinds and their arithmetic
//!
//! Four scalar domains back every matrix: boolean, 64-bit signed integer,
//! IEEE-754 double and complex double. Each defines its own arithmetic,
//! comparison and conversion rules through the [`Element`] trait:
//! - booleans form GF(2): `+` and `-` are XOR, `*` is AND, negation is a no-op;
//! - integers wrap on overflow;
//! - reals and complexes follow IEEE-754.

use crate::format::{parse_complex, render_complex, render_real};
use crate::kind::ElementKind;
use std::any::Any;
use std::cmp::Ordering;
use std::fmt::Debug;

pub type Boolean = bool;
pub type Integer = i64;
pub type Real = f64;
pub type Complex = num_complex::Complex<f64>;

/// A scalar that can be stored in a matrix.
pub trait Element: Copy + Debug + PartialEq + Default + Send + Sync + 'static {
    const KIND: ElementKind;
    /// Bytes per element in the binary matrix format
    const WIDTH: usize;

    fn zero() -> Self;
    fn one() -> Self;

    fn plus(self, other: Self) -> Self;
    fn minus(self, other: Self) -> Self;
    fn times(self, other: Self) -> Self;
    fn negated(self) -> Self;

    /// `None` when the divisor is zero for the exact kinds
    fn quotient(self, other: Self) -> Option<Self>;

    /// Complex conjugate; identity for the other kinds
    fn conjugated(self) -> Self {
        self
    }

    fn is_zero(self) -> bool {
        self == Self::zero()
    }

    /// Absolute value as a double
    fn magnitude(self) -> f64;

    fn to_complex(self) -> Complex;

    /// Narrowing conversion: booleans test for non-zero, integers truncate
    /// the real part, reals drop the imaginary part.
    fn from_complex(value: Complex) -> Self;

    /// Exact conversion; `None` when the value is not representable
    fn try_from_complex(value: Complex) -> Option<Self>;

    fn from_f64(value: f64) -> Self {
        Self::from_complex(Complex::new(value, 0.0))
    }

    /// Total numeric order (reals use IEEE total order, complexes compare
    /// real then imaginary parts)
    fn order(&self, other: &Self) -> Ordering;

    /// Append the little-endian encoding (`WIDTH` bytes)
    fn write_le(self, out: &mut Vec<u8>);

    /// Decode from exactly `WIDTH` little-endian bytes
    fn read_le(bytes: &[u8]) -> Self;

    /// Canonical short rendering
    fn render(self) -> String;

    fn parse(text: &str) -> Option<Self>;
}

fn le_array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut buf = [0u8; N];
    let n = bytes.len().min(N);
    buf[..n].copy_from_slice(&bytes[..n]);
    buf
}

impl Element for bool {
    const KIND: ElementKind = ElementKind::Boolean;
    const WIDTH: usize = 1;

    fn zero() -> Self {
        false
    }

    fn one() -> Self {
        true
    }

    fn plus(self, other: Self) -> Self {
        self ^ other
    }

    fn minus(self, other: Self) -> Self {
        self ^ other
    }

    fn times(self, other: Self) -> Self {
        self & other
    }

    fn negated(self) -> Self {
        self
    }

    fn quotient(self, other: Self) -> Option<Self> {
        other.then_some(self)
    }

    fn magnitude(self) -> f64 {
        if self {
            1.0
        } else {
            0.0
        }
    }

    fn to_complex(self) -> Complex {
        Complex::new(self.magnitude(), 0.0)
    }

    fn from_complex(value: Complex) -> Self {
        value.re != 0.0 || value.im != 0.0
    }

    fn try_from_complex(value: Complex) -> Option<Self> {
        if value.im != 0.0 {
            return None;
        }
        if value.re == 0.0 {
            Some(false)
        } else if value.re == 1.0 {
            Some(true)
        } else {
            None
        }
    }

    fn order(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    fn write_le(self, out: &mut Vec<u8>) {
        out.push(self as u8);
    }

    fn read_le(bytes: &[u8]) -> Self {
        bytes.first().map_or(false, |&b| b != 0)
    }

    fn render(self) -> String {
        if self { "1" } else { "0" }.to_string()
    }

    fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            "0" | "false" => Some(false),
            "1" | "true" => Some(true),
            _ => None,
        }
    }
}

impl Element for i64 {
    const KIND: ElementKind = ElementKind::Integer;
    const WIDTH: usize = 8;

    fn zero() -> Self {
        0
    }

    fn one() -> Self {
        1
    }

    fn plus(self, other: Self) -> Self {
        self.wrapping_add(other)
    }

    fn minus(self, other: Self) -> Self {
        self.wrapping_sub(other)
    }

    fn times(self, other: Self) -> Self {
        self.wrapping_mul(other)
    }

    fn negated(self) -> Self {
        self.wrapping_neg()
    }

    fn quotient(self, other: Self) -> Option<Self> {
        (other != 0).then(|| self.wrapping_div(other))
    }

    fn magnitude(self) -> f64 {
        (self as f64).abs()
    }

    fn to_complex(self) -> Complex {
        Complex::new(self as f64, 0.0)
    }

    fn from_complex(value: Complex) -> Self {
        value.re as i64
    }

    fn try_from_complex(value: Complex) -> Option<Self> {
        let re = value.re;
        if value.im != 0.0 || re.fract() != 0.0 || !re.is_finite() {
            return None;
        }
        if re < i64::MIN as f64 || re >= i64::MAX as f64 {
            return None;
        }
        Some(re as i64)
    }

    fn order(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    fn write_le(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }

    fn read_le(bytes: &[u8]) -> Self {
        i64::from_le_bytes(le_array::<8>(bytes))
    }

    fn render(self) -> String {
        self.to_string()
    }

    fn parse(text: &str) -> Option<Self> {
        text.trim().parse().ok()
    }
}

impl Element for f64 {
    const KIND: ElementKind = ElementKind::Real;
    const WIDTH: usize = 8;

    fn zero() -> Self {
        0.0
    }

    fn one() -> Self {
        1.0
    }

    fn plus(self, other: Self) -> Self {
        self + other
    }

    fn minus(self, other: Self) -> Self {
        self - other
    }

    fn times(self, other: Self) -> Self {
        self * other
    }

    fn negated(self) -> Self {
        -self
    }

    fn quotient(self, other: Self) -> Option<Self> {
        Some(self / other)
    }

    fn magnitude(self) -> f64 {
        self.abs()
    }

    fn to_complex(self) -> Complex {
        Complex::new(self, 0.0)
    }

    fn from_complex(value: Complex) -> Self {
        value.re
    }

    fn try_from_complex(value: Complex) -> Option<Self> {
        (value.im == 0.0).then_some(value.re)
    }

    fn order(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }

    fn write_le(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }

    fn read_le(bytes: &[u8]) -> Self {
        f64::from_le_bytes(le_array::<8>(bytes))
    }

    fn render(self) -> String {
        render_real(self)
    }

    fn parse(text: &str) -> Option<Self> {
        text.trim().parse().ok()
    }
}

impl Element for Complex {
    const KIND: ElementKind = ElementKind::Complex;
    const WIDTH: usize = 16;

    fn zero() -> Self {
        Complex::new(0.0, 0.0)
    }

    fn one() -> Self {
        Complex::new(1.0, 0.0)
    }

    fn plus(self, other: Self) -> Self {
        self + other
    }

    fn minus(self, other: Self) -> Self {
        self - other
    }

    fn times(self, other: Self) -> Self {
        self * other
    }

    fn negated(self) -> Self {
        -self
    }

    fn quotient(self, other: Self) -> Option<Self> {
        Some(self / other)
    }

    fn conjugated(self) -> Self {
        self.conj()
    }

    fn magnitude(self) -> f64 {
        self.norm()
    }

    fn to_complex(self) -> Complex {
        self
    }

    fn from_complex(value: Complex) -> Self {
        value
    }

    fn try_from_complex(value: Complex) -> Option<Self> {
        Some(value)
    }

    fn order(&self, other: &Self) -> Ordering {
        self.re.total_cmp(&other.re).then_with(|| self.im.total_cmp(&other.im))
    }

    fn write_le(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.re.to_le_bytes());
        out.extend_from_slice(&self.im.to_le_bytes());
    }

    fn read_le(bytes: &[u8]) -> Self {
        let re = f64::from_le_bytes(le_array::<8>(bytes));
        let im = f64::from_le_bytes(le_array::<8>(bytes.get(8..).unwrap_or(&[])));
        Complex::new(re, im)
    }

    fn render(self) -> String {
        render_complex(self)
    }

    fn parse(text: &str) -> Option<Self> {
        parse_complex(text)
    }
}

/// Narrow or widen an element to another kind
pub fn convert<S: Element, T: Element>(value: S) -> T {
    // same kind: keep every bit of wide integers
    if let Some(&same) = (&value as &dyn Any).downcast_ref::<T>() {
        return same;
    }
    T::from_complex(value.to_complex())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean_is_gf2() {
        assert!(true.plus(false));
        assert!(!true.plus(true));
        assert!(!true.times(false));
        assert!(true.negated());
        assert_eq!(true.minus(true), true.plus(true.negated()));
    }

    #[test]
    fn test_integer_wraps() {
        assert_eq!(i64::MAX.plus(1), i64::MIN);
        assert_eq!(i64::MIN.negated(), i64::MIN);
    }

    #[test]
    fn test_conversions() {
        assert_eq!(convert::<f64, i64>(2.9), 2);
        assert!(convert::<f64, bool>(0.5));
        assert_eq!(convert::<i64, Complex>(3), Complex::new(3.0, 0.0));
        assert_eq!(convert::<i64, i64>(i64::MAX - 1), i64::MAX - 1);
        assert_eq!(i64::try_from_complex(Complex::new(2.5, 0.0)), None);
        assert_eq!(i64::try_from_complex(Complex::new(4.0, 0.0)), Some(4));
        assert_eq!(f64::try_from_complex(Complex::new(1.0, 1.0)), None);
        assert_eq!(bool::try_from_complex(Complex::new(2.0, 0.0)), None);
    }

    #[test]
    fn test_byte_round_trip() {
        let mut buf = Vec::new();
        Complex::new(1.5, -2.0).write_le(&mut buf);
        (-7i64).write_le(&mut buf);
        true.write_le(&mut buf);
        assert_eq!(buf.len(), Complex::WIDTH + i64::WIDTH + bool::WIDTH);
        assert_eq!(Complex::read_le(&buf[..16]), Complex::new(1.5, -2.0));
        assert_eq!(i64::read_le(&buf[16..24]), -7);
        assert!(bool::read_le(&buf[24..]));
    }

    #[test]
    fn test_total_order() {
        assert_eq!(f64::NAN.order(&f64::NAN), Ordering::Equal);
        assert_eq!(1.0f64.order(&2.0), Ordering::Less);
        assert_eq!(
            Complex::new(1.0, 5.0).order(&Complex::new(1.0, -5.0)),
            Ordering::Greater
        );
    }

    #[test]
    fn test_parse_and_render() {
        assert_eq!(bool::parse("1"), Some(true));
        assert_eq!(i64::parse(" -12 "), Some(-12));
        assert_eq!(f64::parse("2.5"), Some(2.5));
        assert_eq!(Complex::parse("1-1j"), Some(Complex::new(1.0, -1.0)));
        assert_eq!(true.render(), "1");
        assert_eq!(0.25f64.render(), "0.25");
    }
}
