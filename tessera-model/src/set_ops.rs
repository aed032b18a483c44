//! Set-theoretic free functions and the built-in type sets
//!
//! Binary functions accept any mix of sets and variants; a variant that does
//! not hold a set stands for the singleton containing it. The n-ary forms
//! take a container of variants that must all hold sets.

use crate::set::Set;
use crate::tuple::Tuple;
use crate::variant::Variant;
use std::collections::BTreeMap;
use tessera_core::{ElementKind, ModelError, ModelResult};

/// Anything usable as a set operand
pub trait SetOperand {
    fn to_operand_set(&self) -> Set;
}

impl SetOperand for Set {
    fn to_operand_set(&self) -> Set {
        self.clone()
    }
}

impl SetOperand for Variant {
    fn to_operand_set(&self) -> Set {
        match self {
            Variant::Set(s) => s.clone(),
            other => Set::from_iter([other.clone()]),
        }
    }
}

impl<S: SetOperand + ?Sized> SetOperand for &S {
    fn to_operand_set(&self) -> Set {
        (**self).to_operand_set()
    }
}

fn pair(a: Variant, b: Variant) -> Variant {
    Variant::Tuple(Tuple::from_iter([a, b]))
}

fn tagged(tag: usize, set: &Set) -> impl Iterator<Item = Variant> + '_ {
    set.elements().map(move |v| pair(Variant::Integer(tag as i64), v.clone()))
}

// ============================================================================
// Binary forms
// ============================================================================

pub fn union_of(a: impl SetOperand, b: impl SetOperand) -> Set {
    a.to_operand_set().united_with(&b.to_operand_set())
}

pub fn intersection_of(a: impl SetOperand, b: impl SetOperand) -> Set {
    a.to_operand_set().intersected_with(&b.to_operand_set())
}

/// Elements tagged with their operand: `(1, a)` and `(2, b)`
pub fn disjoint_union_of(a: impl SetOperand, b: impl SetOperand) -> Set {
    let (a, b) = (a.to_operand_set(), b.to_operand_set());
    tagged(1, &a).chain(tagged(2, &b)).collect()
}

pub fn cartesian_product_of(a: impl SetOperand, b: impl SetOperand) -> Set {
    a.to_operand_set().cartesian_product(&b.to_operand_set())
}

/// Elements of `a` that are not in `b`
pub fn relative_complement_of(a: impl SetOperand, b: impl SetOperand) -> Set {
    a.to_operand_set().difference(&b.to_operand_set())
}

pub fn symmetric_difference_of(a: impl SetOperand, b: impl SetOperand) -> Set {
    let (a, b) = (a.to_operand_set(), b.to_operand_set());
    a.difference(&b).united_with(&b.difference(&a))
}

pub fn is_element_of(x: &Variant, set: &Set) -> bool {
    set.contains(x)
}

// ============================================================================
// N-ary forms
// ============================================================================

fn sets_in<'a>(container: impl IntoIterator<Item = &'a Variant>) -> ModelResult<Vec<Set>> {
    container
        .into_iter()
        .enumerate()
        .map(|(i, v)| match v {
            Variant::Set(s) => Ok(s.clone()),
            other => Err(ModelError::InvalidContainerContents {
                position: i + 1,
                found: other.value_type(),
            }),
        })
        .collect()
}

pub fn union_of_all<'a>(container: impl IntoIterator<Item = &'a Variant>) -> ModelResult<Set> {
    let mut out = Set::new();
    for s in sets_in(container)? {
        out.unite_with(&s);
    }
    Ok(out)
}

/// Intersection of every set; empty for an empty container
pub fn intersection_of_all<'a>(container: impl IntoIterator<Item = &'a Variant>) -> ModelResult<Set> {
    let mut sets = sets_in(container)?.into_iter();
    let Some(mut out) = sets.next() else {
        return Ok(Set::new());
    };
    for s in sets {
        out.intersect_with(&s);
    }
    Ok(out)
}

/// Elements tagged with the 1-based position of their set
pub fn disjoint_union_of_all<'a>(container: impl IntoIterator<Item = &'a Variant>) -> ModelResult<Set> {
    let sets = sets_in(container)?;
    Ok(sets.iter().enumerate().flat_map(|(i, s)| tagged(i + 1, s)).collect())
}

/// Set of n-tuples; the empty product holds the empty tuple
pub fn cartesian_product_of_all<'a>(container: impl IntoIterator<Item = &'a Variant>) -> ModelResult<Set> {
    let mut tuples = vec![Tuple::new()];
    for s in sets_in(container)? {
        tuples = tuples
            .iter()
            .flat_map(|prefix| {
                s.elements().map(move |v| {
                    let mut t = prefix.clone();
                    t.append(v.clone());
                    t
                })
            })
            .collect();
    }
    Ok(tuples.into_iter().map(Variant::Tuple).collect())
}

/// The first set minus every following one
pub fn relative_complement_of_all<'a>(container: impl IntoIterator<Item = &'a Variant>) -> ModelResult<Set> {
    let mut sets = sets_in(container)?.into_iter();
    let Some(mut out) = sets.next() else {
        return Ok(Set::new());
    };
    for s in sets {
        out = out.difference(&s);
    }
    Ok(out)
}

/// Elements found in an odd number of the sets
pub fn symmetric_difference_of_all<'a>(container: impl IntoIterator<Item = &'a Variant>) -> ModelResult<Set> {
    let mut counts: BTreeMap<Variant, usize> = BTreeMap::new();
    for s in sets_in(container)? {
        for v in s.elements() {
            *counts.entry(v.clone()).or_default() += 1;
        }
    }
    Ok(counts.into_iter().filter(|(_, n)| n % 2 == 1).map(|(v, _)| v).collect())
}

// ============================================================================
// Type sets
// ============================================================================

/// The infinite sets of all booleans, integers, reals and complexes.
///
/// Membership tests the value, not only its kind: `Real(2.0)` belongs to
/// `Integer`, `Integer(1)` to `Boolean`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TypeSet {
    Boolean,
    Integer,
    Real,
    Complex,
}

impl TypeSet {
    pub fn element_kind(self) -> ElementKind {
        match self {
            TypeSet::Boolean => ElementKind::Boolean,
            TypeSet::Integer => ElementKind::Integer,
            TypeSet::Real => ElementKind::Real,
            TypeSet::Complex => ElementKind::Complex,
        }
    }

    pub fn contains(self, x: &Variant) -> bool {
        if !x.is_scalar() {
            return false;
        }
        match self {
            TypeSet::Boolean => x.to_boolean().is_ok(),
            TypeSet::Integer => x.to_integer().is_ok(),
            TypeSet::Real => x.to_real().is_ok(),
            TypeSet::Complex => x.to_complex().is_ok(),
        }
    }

    /// `Boolean ⊂ Integer ⊂ Real ⊂ Complex`
    pub fn is_subset_of(self, other: TypeSet) -> bool {
        self.element_kind().promotes_to(other.element_kind())
    }

    pub fn is_proper_subset_of(self, other: TypeSet) -> bool {
        self != other && self.is_subset_of(other)
    }

    pub fn is_superset_of(self, other: TypeSet) -> bool {
        other.is_subset_of(self)
    }

    pub fn is_proper_superset_of(self, other: TypeSet) -> bool {
        other.is_proper_subset_of(self)
    }

    /// A finite set is inside a type set when every element is
    pub fn includes_set(self, set: &Set) -> bool {
        set.elements().all(|v| self.contains(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::Complex;

    fn set_of(values: &[i64]) -> Set {
        values.iter().map(|&v| Variant::from(v)).collect()
    }

    #[test]
    fn test_binary_cardinalities() {
        let a = set_of(&[1, 2, 3]);
        let b = set_of(&[3, 4]);
        assert_eq!(union_of(&a, &b).len(), 4);
        assert_eq!(intersection_of(&a, &b).len(), 1);
        assert_eq!(relative_complement_of(&a, &b).len(), 2);
        assert_eq!(disjoint_union_of(&a, &b).len(), 5);
        assert_eq!(symmetric_difference_of(&a, &b), set_of(&[1, 2, 4]));
        assert_eq!(cartesian_product_of(&a, &b).len(), 6);
    }

    #[test]
    fn test_variant_operands() {
        let a = set_of(&[1, 2]);
        let three = Variant::from(3i64);
        assert_eq!(union_of(&a, &three), set_of(&[1, 2, 3]));
        assert_eq!(union_of(&three, Variant::from(4i64)), set_of(&[3, 4]));
        assert_eq!(intersection_of(Variant::from(a.clone()), &a), a);
        assert!(is_element_of(&Variant::from(2i64), &a));
        assert!(!is_element_of(&Variant::from(2.0), &a));
    }

    #[test]
    fn test_disjoint_union_tags() {
        let a = set_of(&[1]);
        let u = disjoint_union_of(&a, &a);
        assert_eq!(u.len(), 2);
        let first = u.elements().next().unwrap().as_tuple().unwrap().clone();
        assert_eq!(first.at(1).unwrap(), &Variant::from(1i64));
    }

    #[test]
    fn test_n_ary() {
        let container = vec![
            Variant::from(set_of(&[1, 2, 3])),
            Variant::from(set_of(&[2, 3, 4])),
            Variant::from(set_of(&[3, 5])),
        ];
        assert_eq!(union_of_all(&container).unwrap(), set_of(&[1, 2, 3, 4, 5]));
        assert_eq!(intersection_of_all(&container).unwrap(), set_of(&[3]));
        assert_eq!(relative_complement_of_all(&container).unwrap(), set_of(&[1]));
        assert_eq!(symmetric_difference_of_all(&container).unwrap(), set_of(&[1, 3, 4, 5]));
        assert_eq!(disjoint_union_of_all(&container).unwrap().len(), 8);
        assert_eq!(cartesian_product_of_all(&container).unwrap().len(), 18);
        assert_eq!(cartesian_product_of_all(&Vec::<Variant>::new()).unwrap().len(), 1);
    }

    #[test]
    fn test_n_ary_rejects_non_sets() {
        let container = vec![Variant::from(set_of(&[1])), Variant::from(2.5)];
        assert!(matches!(
            union_of_all(&container),
            Err(ModelError::InvalidContainerContents { position: 2, .. })
        ));
    }

    #[test]
    fn test_type_sets() {
        assert!(TypeSet::Integer.contains(&Variant::from(4i64)));
        assert!(TypeSet::Integer.contains(&Variant::from(4.0)));
        assert!(!TypeSet::Integer.contains(&Variant::from(4.5)));
        assert!(TypeSet::Boolean.contains(&Variant::from(1i64)));
        assert!(TypeSet::Real.contains(&Variant::from(true)));
        assert!(!TypeSet::Real.contains(&Variant::from(Complex::new(0.0, 1.0))));
        assert!(!TypeSet::Complex.contains(&Variant::from(set_of(&[1]))));
        assert!(TypeSet::Integer.contains(&Variant::from(Complex::new(2.0, 0.0))));

        assert!(TypeSet::Boolean.is_proper_subset_of(TypeSet::Complex));
        assert!(TypeSet::Real.is_subset_of(TypeSet::Real));
        assert!(!TypeSet::Real.is_proper_subset_of(TypeSet::Real));
        assert!(TypeSet::Complex.is_proper_superset_of(TypeSet::Integer));
        assert!(TypeSet::Integer.includes_set(&set_of(&[-1, 7])));
    }
}
