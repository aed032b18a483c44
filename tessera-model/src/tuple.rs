//! Ordered sequences of variants
//!
//! Tuples are 1-indexed at the API surface. Storage is a shared
//! copy-on-write double-ended queue, so appending at either end is cheap and
//! copies of a tuple share their elements until one is modified.
//!
//! Strings travel as tuples of integer code points (`from_utf8`,
//! `to_utf8_string`).

use crate::range::Range;
use crate::set::Set;
use crate::variant::Variant;
use std::cmp::Ordering;
use std::collections::{vec_deque, VecDeque};
use std::fmt;
use std::ops::{Div, Mul};
use std::sync::Arc;
use tessera_core::{ModelError, ModelResult};

#[derive(Debug, Clone, Default)]
pub struct Tuple {
    items: Arc<VecDeque<Variant>>,
}

/// Delimiters for [`Tuple::split`]
#[derive(Debug, Clone, Copy)]
pub enum SplitOn<'a> {
    /// Split at non-overlapping occurrences of a sub-tuple
    Sequence(&'a Tuple),
    /// Split at any single element of the set
    AnyOf(&'a Set),
}

impl Tuple {
    pub fn new() -> Self {
        Self::default()
    }

    /// One integer per Unicode scalar value
    pub fn from_utf8(text: &str) -> Self {
        text.chars().map(|ch| Variant::Integer(ch as i64)).collect()
    }

    /// Decode a tuple of integer code points
    pub fn to_utf8_string(&self) -> ModelResult<String> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let code = match v {
                    Variant::Integer(code) => *code,
                    other => {
                        return Err(ModelError::not_a_string(format!(
                            "element {} is {}",
                            i + 1,
                            other.value_type()
                        )))
                    }
                };
                u32::try_from(code)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| ModelError::not_a_string(format!("element {} ({}) is not a code point", i + 1, code)))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> vec_deque::Iter<'_, Variant> {
        self.items.iter()
    }

    fn items_mut(&mut self) -> &mut VecDeque<Variant> {
        Arc::make_mut(&mut self.items)
    }

    // ========== Growth ==========

    pub fn append(&mut self, value: Variant) {
        self.items_mut().push_back(value);
    }

    pub fn append_range(&mut self, range: Range) {
        self.items_mut().extend(range.iter().map(Variant::Integer));
    }

    pub fn append_all(&mut self, values: impl IntoIterator<Item = Variant>) {
        self.items_mut().extend(values);
    }

    pub fn prepend(&mut self, value: Variant) {
        self.items_mut().push_front(value);
    }

    /// Prepend the range keeping its order
    pub fn prepend_range(&mut self, range: Range) {
        let items = self.items_mut();
        let values: Vec<i64> = range.iter().collect();
        for v in values.into_iter().rev() {
            items.push_front(Variant::Integer(v));
        }
    }

    /// Prepend the values keeping their order
    pub fn prepend_all(&mut self, values: impl IntoIterator<Item = Variant>) {
        let values: Vec<Variant> = values.into_iter().collect();
        let items = self.items_mut();
        for v in values.into_iter().rev() {
            items.push_front(v);
        }
    }

    pub fn take_first(&mut self) -> Option<Variant> {
        if self.is_empty() {
            return None;
        }
        self.items_mut().pop_front()
    }

    pub fn take_last(&mut self) -> Option<Variant> {
        if self.is_empty() {
            return None;
        }
        self.items_mut().pop_back()
    }

    // ========== Access ==========

    fn check_index(&self, index: i64) -> ModelResult<usize> {
        if index < 1 || index as u64 > self.len() as u64 {
            return Err(ModelError::InvalidIndex {
                index,
                bound: self.len(),
            });
        }
        Ok(index as usize - 1)
    }

    /// 1-based read
    pub fn at(&self, index: i64) -> ModelResult<&Variant> {
        let i = self.check_index(index)?;
        Ok(&self.items[i])
    }

    /// 1-based write; gaps past the end fill with `Variant::None`
    pub fn update(&mut self, index: i64, value: Variant) -> ModelResult<()> {
        if index < 1 {
            return Err(ModelError::InvalidIndex {
                index,
                bound: self.len(),
            });
        }
        let i = usize::try_from(index - 1).map_err(|_| ModelError::InvalidIndex {
            index,
            bound: self.len(),
        })?;
        let bound = self.len();
        let items = self.items_mut();
        if i >= items.len() {
            items.try_reserve(i + 1 - items.len()).map_err(|e| {
                ModelError::parameter("index", format!("{} can not grow a tuple of {}: {}", index, bound, e))
            })?;
            items.resize(i + 1, Variant::None);
        }
        items[i] = value;
        Ok(())
    }

    /// Elements `start..end` (0-based, half-open)
    fn slice(&self, start: usize, end: usize) -> Tuple {
        self.items.range(start..end).cloned().collect()
    }

    // ========== Algebra ==========

    pub fn concatenated(&self, other: &Tuple) -> Tuple {
        let mut out = self.clone();
        out.append_all(other.iter().cloned());
        out
    }

    pub fn ends_with(&self, suffix: &Tuple) -> bool {
        suffix.len() <= self.len() && self.items.iter().rev().zip(suffix.items.iter().rev()).all(|(a, b)| a == b)
    }

    /// Remove a trailing occurrence of `suffix`; unchanged if absent
    pub fn right_cancelled(&self, suffix: &Tuple) -> Tuple {
        if suffix.is_empty() || !self.ends_with(suffix) {
            return self.clone();
        }
        self.slice(0, self.len() - suffix.len())
    }

    fn matches_at(&self, pattern: &Tuple, at: usize) -> bool {
        at + pattern.len() <= self.len() && pattern.iter().enumerate().all(|(k, v)| &self.items[at + k] == v)
    }

    /// 1-based position of the first occurrence of `pattern` at or after
    /// `starting_at`, or 0 when absent
    pub fn find(&self, pattern: &Tuple, starting_at: i64) -> ModelResult<usize> {
        if starting_at < 1 {
            return Err(ModelError::parameter("starting_at", format!("{} is not positive", starting_at)));
        }
        let start = (starting_at - 1) as usize;
        if start > self.len() {
            return Ok(0);
        }
        Ok((start..=self.len() - pattern.len().min(self.len()))
            .find(|&at| self.matches_at(pattern, at))
            .map_or(0, |at| at + 1))
    }

    /// Partition at non-overlapping delimiters.
    ///
    /// With `keep_split` each delimiter stays at the end of the partition it
    /// closes; with `remove_empty` empty partitions are dropped.
    pub fn split(&self, on: SplitOn<'_>, keep_split: bool, remove_empty: bool) -> Vec<Tuple> {
        let mut parts = Vec::new();
        let mut start = 0;
        let mut at = 0;
        while at < self.len() {
            let width = match on {
                SplitOn::Sequence(pattern) if !pattern.is_empty() && self.matches_at(pattern, at) => pattern.len(),
                SplitOn::AnyOf(terms) if terms.contains(&self.items[at]) => 1,
                _ => 0,
            };
            if width == 0 {
                at += 1;
                continue;
            }
            let end = if keep_split { at + width } else { at };
            parts.push(self.slice(start, end));
            at += width;
            start = at;
        }
        parts.push(self.slice(start, self.len()));
        if remove_empty {
            parts.retain(|p| !p.is_empty());
        }
        parts
    }

    /// Length first, then element-wise
    pub fn relative_order(&self, other: &Tuple) -> Ordering {
        self.len()
            .cmp(&other.len())
            .then_with(|| self.items.iter().cmp(other.items.iter()))
    }
}

impl FromIterator<Variant> for Tuple {
    fn from_iter<I: IntoIterator<Item = Variant>>(iter: I) -> Self {
        Tuple {
            items: Arc::new(iter.into_iter().collect()),
        }
    }
}

impl<'a> IntoIterator for &'a Tuple {
    type Item = &'a Variant;
    type IntoIter = vec_deque::Iter<'a, Variant>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Mul for &Tuple {
    type Output = Tuple;

    fn mul(self, rhs: &Tuple) -> Tuple {
        self.concatenated(rhs)
    }
}

impl Mul for Tuple {
    type Output = Tuple;

    fn mul(mut self, rhs: Tuple) -> Tuple {
        self.append_all(rhs.iter().cloned());
        self
    }
}

impl Div for &Tuple {
    type Output = Tuple;

    fn div(self, rhs: &Tuple) -> Tuple {
        self.right_cancelled(rhs)
    }
}

impl Div for Tuple {
    type Output = Tuple;

    fn div(self, rhs: Tuple) -> Tuple {
        self.right_cancelled(&rhs)
    }
}

impl PartialEq for Tuple {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.items, &other.items) || self.items == other.items
    }
}

impl Eq for Tuple {}

impl PartialOrd for Tuple {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tuple {
    fn cmp(&self, other: &Self) -> Ordering {
        self.relative_order(other)
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, v) in self.items.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", v)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i64]) -> Tuple {
        values.iter().map(|&v| Variant::from(v)).collect()
    }

    #[test]
    fn test_append_prepend() {
        let mut t = Tuple::new();
        t.append(Variant::from(2i64));
        t.prepend(Variant::from(1i64));
        t.append_range(Range::new(3, 4));
        t.prepend_range(Range::with_second(-2, -1, 0).unwrap());
        t.prepend_all([Variant::from(-4i64), Variant::from(-3i64)]);
        assert_eq!(t, ints(&[-4, -3, -2, -1, 0, 1, 2, 3, 4]));
        assert_eq!(t.take_first(), Some(Variant::from(-4i64)));
        assert_eq!(t.take_last(), Some(Variant::from(4i64)));
        assert_eq!(t.len(), 7);
        assert_eq!(Tuple::new().take_first(), None);
    }

    #[test]
    fn test_indexing() {
        let mut t = ints(&[10, 20]);
        assert_eq!(t.at(2).unwrap(), &Variant::from(20i64));
        assert!(matches!(t.at(0), Err(ModelError::InvalidIndex { index: 0, bound: 2 })));
        assert!(t.at(3).is_err());
        t.update(5, Variant::from(50i64)).unwrap();
        assert_eq!(t.len(), 5);
        assert!(t.at(4).unwrap().is_none());
        assert!(t.update(0, Variant::None).is_err());
    }

    #[test]
    fn test_update_beyond_memory_fails_cleanly() {
        let mut t = ints(&[1, 2]);
        assert!(matches!(
            t.update(i64::MAX, Variant::from(3i64)),
            Err(ModelError::InvalidParameterValue { .. })
        ));
        assert_eq!(t, ints(&[1, 2]));
    }

    #[test]
    fn test_copy_on_write() {
        let a = ints(&[1, 2]);
        let mut b = a.clone();
        b.append(Variant::from(3i64));
        assert_eq!(a.len(), 2);
        assert_eq!(b.len(), 3);
    }

    #[test]
    fn test_concat_and_cancel() {
        let x = ints(&[1, 2, 3]);
        let y = ints(&[4, 5]);
        let xy = &x * &y;
        assert_eq!(&xy / &y, x);
        assert_eq!(&x / &y, x);
        assert_eq!(xy.find(&y, 1).unwrap(), x.len() + 1);
        assert_eq!(x.clone() * Tuple::new(), x);
    }

    #[test]
    fn test_find() {
        let t = ints(&[1, 2, 1, 2, 3]);
        let p = ints(&[1, 2]);
        assert_eq!(t.find(&p, 1).unwrap(), 1);
        assert_eq!(t.find(&p, 2).unwrap(), 3);
        assert_eq!(t.find(&p, 4).unwrap(), 0);
        assert_eq!(t.find(&ints(&[9]), 1).unwrap(), 0);
        assert_eq!(t.find(&p, 99).unwrap(), 0);
        assert!(t.find(&p, 0).is_err());
    }

    #[test]
    fn test_split_on_string() {
        let text = Tuple::from_utf8("a,b,,c");
        let comma = Tuple::from_utf8(",");
        let parts = text.split(SplitOn::Sequence(&comma), false, false);
        assert_eq!(parts.iter().map(Tuple::len).collect::<Vec<_>>(), vec![1, 1, 0, 1]);

        let kept = text.split(SplitOn::Sequence(&comma), true, false);
        assert_eq!(kept.iter().map(Tuple::len).sum::<usize>(), text.len());
        assert_eq!(kept[0].to_utf8_string().unwrap(), "a,");

        let dense = text.split(SplitOn::Sequence(&comma), false, true);
        assert_eq!(dense.len(), 3);
    }

    #[test]
    fn test_split_on_set() {
        let t = Tuple::from_utf8("a-b+c");
        let terms: Set = Tuple::from_utf8("+-").iter().cloned().collect();
        let parts = t.split(SplitOn::AnyOf(&terms), false, false);
        let words: Vec<String> = parts.iter().map(|p| p.to_utf8_string().unwrap()).collect();
        assert_eq!(words, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_utf8() {
        let t = Tuple::from_utf8("héllo ✓");
        assert_eq!(t.len(), 7);
        assert_eq!(t.to_utf8_string().unwrap(), "héllo ✓");
        assert!(ints(&[0x110000]).to_utf8_string().is_err());
        let mixed: Tuple = [Variant::from(65i64), Variant::from(1.0)].into_iter().collect();
        assert!(matches!(mixed.to_utf8_string(), Err(ModelError::CanNotConvertToString { .. })));
    }

    #[test]
    fn test_order_and_display() {
        assert!(ints(&[9]) < ints(&[1, 1]));
        assert!(ints(&[1, 2]) < ints(&[1, 3]));
        assert_eq!(ints(&[1, 2]).to_string(), "(1, 2)");
    }
}
