//! Integer ranges `first, second .. last`

use std::fmt;
use tessera_core::{ModelError, ModelResult};

/// Arithmetic progression from `first` towards `last` (inclusive).
///
/// The step is `second - first` when a second term is given, otherwise 1.
/// A step pointing away from `last` gives an empty range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    first: i64,
    step: i64,
    last: i64,
}

impl Range {
    pub fn new(first: i64, last: i64) -> Self {
        Self { first, step: 1, last }
    }

    pub fn with_second(first: i64, second: i64, last: i64) -> ModelResult<Self> {
        let step = second.checked_sub(first).filter(|&s| s != 0).ok_or_else(|| {
            ModelError::parameter("second", format!("{} gives no step from {}", second, first))
        })?;
        Ok(Self { first, step, last })
    }

    pub fn first(&self) -> i64 {
        self.first
    }

    pub fn step(&self) -> i64 {
        self.step
    }

    pub fn last(&self) -> i64 {
        self.last
    }

    fn count(&self) -> i128 {
        let span = self.last as i128 - self.first as i128;
        let step = self.step as i128;
        if span != 0 && (span < 0) != (step < 0) {
            return 0;
        }
        span / step + 1
    }

    /// Number of terms, saturating at `usize::MAX`
    pub fn len(&self) -> usize {
        usize::try_from(self.count()).unwrap_or(usize::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        let (first, step) = (self.first as i128, self.step as i128);
        (0..self.count()).map(move |k| (first + step * k) as i64)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.step == 1 {
            write!(f, "{}..{}", self.first, self.last)
        } else {
            write!(f, "{},{}..{}", self.first, self.first.wrapping_add(self.step), self.last)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple() {
        let r = Range::new(1, 4);
        assert_eq!(r.iter().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
        assert_eq!(r.to_string(), "1..4");
        assert!(Range::new(3, 1).is_empty());
        assert_eq!(Range::new(2, 2).len(), 1);
    }

    #[test]
    fn test_stepped() {
        let down = Range::with_second(10, 7, 0).unwrap();
        assert_eq!(down.iter().collect::<Vec<_>>(), vec![10, 7, 4, 1]);
        assert_eq!(down.to_string(), "10,7..0");
        assert!(Range::with_second(1, 3, 0).unwrap().is_empty());
        assert!(Range::with_second(5, 5, 9).is_err());
    }

    #[test]
    fn test_extreme_bounds() {
        let r = Range::with_second(i64::MIN, -1, i64::MAX).unwrap();
        assert_eq!(r.iter().collect::<Vec<_>>(), vec![i64::MIN, -1, i64::MAX - 1]);
        assert!(Range::with_second(i64::MIN, 0, 1).is_err());
    }

    #[test]
    fn test_full_width_length_saturates() {
        let r = Range::new(i64::MIN, i64::MAX);
        assert_eq!(r.len(), usize::MAX);
        assert!(!r.is_empty());
        assert_eq!(r.iter().take(2).collect::<Vec<_>>(), vec![i64::MIN, i64::MIN + 1]);
        assert_eq!(Range::new(i64::MIN, i64::MAX - 1).len(), usize::MAX);
    }
}
