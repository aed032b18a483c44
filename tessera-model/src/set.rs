//! Ordered sets of variants
//!
//! Elements live in a shared, copy-on-write ordered tree. Copies of a set
//! share the tree until one of them is modified. Iterators hold their own
//! reference to the tree, so reassigning or modifying the set they came from
//! leaves the traversal on the original contents.

use crate::range::Range;
use crate::tuple::Tuple;
use crate::variant::Variant;
use std::cmp::Ordering;
use std::collections::btree_set;
use std::collections::BTreeSet;
use std::fmt;
use std::ops::Bound::{Excluded, Unbounded};
use std::ops::Sub;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct Set {
    items: Arc<BTreeSet<Variant>>,
}

impl Set {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items = Arc::default();
    }

    /// Returns false if the value was already present
    pub fn insert(&mut self, value: Variant) -> bool {
        Arc::make_mut(&mut self.items).insert(value)
    }

    /// Insert every integer of `range`; false if any was already present
    pub fn insert_range(&mut self, range: Range) -> bool {
        let items = Arc::make_mut(&mut self.items);
        range.iter().fold(true, |fresh, v| items.insert(Variant::Integer(v)) && fresh)
    }

    pub fn remove(&mut self, value: &Variant) -> bool {
        if !self.items.contains(value) {
            return false;
        }
        Arc::make_mut(&mut self.items).remove(value)
    }

    pub fn contains(&self, value: &Variant) -> bool {
        self.items.contains(value)
    }

    pub fn find(&self, value: &Variant) -> Option<&Variant> {
        self.items.get(value)
    }

    /// Borrowing iterator in element order
    pub fn elements(&self) -> btree_set::Iter<'_, Variant> {
        self.items.iter()
    }

    /// Owning iterator that keeps the current contents alive
    pub fn iter(&self) -> SetIter {
        SetIter {
            items: Arc::clone(&self.items),
            last: None,
        }
    }

    // ========== Algebra ==========

    pub fn unite_with(&mut self, other: &Set) {
        if Arc::ptr_eq(&self.items, &other.items) {
            return;
        }
        let items = Arc::make_mut(&mut self.items);
        items.extend(other.items.iter().cloned());
    }

    pub fn united_with(&self, other: &Set) -> Set {
        let mut out = self.clone();
        out.unite_with(other);
        out
    }

    pub fn intersect_with(&mut self, other: &Set) {
        if self.items.iter().all(|v| other.contains(v)) {
            return;
        }
        Arc::make_mut(&mut self.items).retain(|v| other.contains(v));
    }

    pub fn intersected_with(&self, other: &Set) -> Set {
        self.items.intersection(&other.items).cloned().collect()
    }

    pub fn difference(&self, other: &Set) -> Set {
        self.items.difference(&other.items).cloned().collect()
    }

    /// Set of pairs `(a, b)` as tuples
    pub fn cartesian_product(&self, other: &Set) -> Set {
        let mut out = BTreeSet::new();
        for a in self.items.iter() {
            for b in other.items.iter() {
                out.insert(Variant::Tuple(Tuple::from_iter([a.clone(), b.clone()])));
            }
        }
        Set { items: Arc::new(out) }
    }

    /// Size first, then element-wise
    pub fn relative_order(&self, other: &Set) -> Ordering {
        self.len()
            .cmp(&other.len())
            .then_with(|| self.items.iter().cmp(other.items.iter()))
    }

    // ========== Predicates ==========

    pub fn is_subset_of(&self, other: &Set) -> bool {
        self.items.is_subset(&other.items)
    }

    pub fn is_proper_subset_of(&self, other: &Set) -> bool {
        self.len() < other.len() && self.is_subset_of(other)
    }

    pub fn is_superset_of(&self, other: &Set) -> bool {
        other.is_subset_of(self)
    }

    pub fn is_proper_superset_of(&self, other: &Set) -> bool {
        other.is_proper_subset_of(self)
    }

    pub fn is_not_subset_of(&self, other: &Set) -> bool {
        !self.is_subset_of(other)
    }

    pub fn is_not_proper_subset_of(&self, other: &Set) -> bool {
        !self.is_proper_subset_of(other)
    }

    pub fn is_not_superset_of(&self, other: &Set) -> bool {
        !self.is_superset_of(other)
    }

    pub fn is_not_proper_superset_of(&self, other: &Set) -> bool {
        !self.is_proper_superset_of(other)
    }
}

/// Iterator over a snapshot of a set.
///
/// Resumes after the last key it returned, so each step is `O(log n)`.
#[derive(Debug, Clone)]
pub struct SetIter {
    items: Arc<BTreeSet<Variant>>,
    last: Option<Variant>,
}

impl Iterator for SetIter {
    type Item = Variant;

    fn next(&mut self) -> Option<Variant> {
        let next = match &self.last {
            None => self.items.iter().next(),
            Some(last) => self.items.range((Excluded(last), Unbounded)).next(),
        }
        .cloned();
        if let Some(v) = &next {
            self.last = Some(v.clone());
        }
        next
    }
}

impl<'a> IntoIterator for &'a Set {
    type Item = &'a Variant;
    type IntoIter = btree_set::Iter<'a, Variant>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements()
    }
}

impl FromIterator<Variant> for Set {
    fn from_iter<I: IntoIterator<Item = Variant>>(iter: I) -> Self {
        Set {
            items: Arc::new(iter.into_iter().collect()),
        }
    }
}

impl Extend<Variant> for Set {
    fn extend<I: IntoIterator<Item = Variant>>(&mut self, iter: I) {
        Arc::make_mut(&mut self.items).extend(iter);
    }
}

impl Sub for &Set {
    type Output = Set;

    fn sub(self, rhs: &Set) -> Set {
        self.difference(rhs)
    }
}

impl PartialEq for Set {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.items, &other.items) || self.items == other.items
    }
}

impl Eq for Set {}

impl PartialOrd for Set {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Set {
    fn cmp(&self, other: &Self) -> Ordering {
        self.relative_order(other)
    }
}

impl fmt::Display for Set {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, v) in self.items.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", v)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_of(values: &[i64]) -> Set {
        values.iter().map(|&v| Variant::from(v)).collect()
    }

    #[test]
    fn test_insert_and_membership() {
        let mut s = Set::new();
        assert!(s.insert(Variant::from(2i64)));
        assert!(!s.insert(Variant::from(2i64)));
        assert!(s.insert(Variant::from(2.0)));
        assert_eq!(s.len(), 2);
        assert!(s.contains(&Variant::from(2i64)));
        assert!(s.find(&Variant::from(3i64)).is_none());
        assert!(s.remove(&Variant::from(2.0)));
        assert!(!s.remove(&Variant::from(2.0)));
    }

    #[test]
    fn test_insert_range() {
        let mut s = set_of(&[3]);
        assert!(!s.insert_range(Range::new(1, 4)));
        assert_eq!(s, set_of(&[1, 2, 3, 4]));
        assert!(s.insert_range(Range::new(5, 6)));
    }

    #[test]
    fn test_cardinalities() {
        let a = set_of(&[1, 2, 3]);
        let b = set_of(&[3, 4]);
        assert_eq!(a.united_with(&b).len(), 4);
        assert_eq!(a.intersected_with(&b).len(), 1);
        assert_eq!((&a - &b).len(), 2);
        assert_eq!(a.cartesian_product(&b).len(), 6);
    }

    #[test]
    fn test_algebra_laws() {
        let a = set_of(&[1, 5, 7]);
        let b = set_of(&[5, 6]);
        assert_eq!(a.united_with(&b), b.united_with(&a));
        assert_eq!(a.intersected_with(&b), b.intersected_with(&a));
        assert!((&a - &a).is_empty());
        assert!(a.is_subset_of(&a.united_with(&b)));
        assert!(a.intersected_with(&b).is_subset_of(&a));

        let mut c = a.clone();
        c.intersect_with(&b);
        assert_eq!(c, set_of(&[5]));
        c.unite_with(&b);
        assert_eq!(c, b);
    }

    #[test]
    fn test_subset_predicates() {
        let small = set_of(&[1]);
        let big = set_of(&[1, 2]);
        assert!(small.is_proper_subset_of(&big));
        assert!(big.is_proper_superset_of(&small));
        assert!(big.is_superset_of(&big));
        assert!(big.is_not_proper_subset_of(&big));
        assert!(big.is_not_subset_of(&small));
        assert!(small.is_not_superset_of(&big));
        assert!(small.is_not_proper_superset_of(&small));
    }

    #[test]
    fn test_iterator_survives_reassignment() {
        let mut s = set_of(&[1, 2, 3]);
        let mut it = s.iter();
        assert_eq!(it.next(), Some(Variant::from(1i64)));
        s = set_of(&[10]);
        s.insert(Variant::from(0i64));
        assert_eq!(it.collect::<Vec<_>>(), vec![Variant::from(2i64), Variant::from(3i64)]);
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn test_iterator_survives_mutation() {
        let mut s = set_of(&[1, 2]);
        let it = s.iter();
        s.insert(Variant::from(0i64));
        s.remove(&Variant::from(2i64));
        assert_eq!(it.count(), 2);
        assert_eq!(s, set_of(&[0, 1]));
    }

    #[test]
    fn test_order() {
        assert!(set_of(&[5]) < set_of(&[1, 2]));
        assert!(set_of(&[1, 2]) < set_of(&[1, 3]));
        assert_eq!(set_of(&[]).to_string(), "{}");
    }
}
