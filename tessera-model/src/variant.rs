//! The polymorphic runtime value
//!
//! A `Variant` holds a scalar of one of the four element kinds, a set, a
//! tuple, or a matrix of any element kind. Variants are totally ordered:
//! first by value kind (declaration order of [`ValueKind`]), then by
//! payload.
//!
//! Coercions (`to_*`) are exact: widening along
//! `Boolean < Integer < Real < Complex` always succeeds, narrowing succeeds
//! only when no information is lost (`Real(2.0)` to `Integer`, `Integer(1)`
//! to `Boolean`). 1×1 matrices coerce to scalars and scalars to 1×1
//! matrices.

use crate::set::Set;
use crate::tuple::Tuple;
use std::cmp::Ordering;
use std::fmt;
use tessera_core::format::{render_complex, render_real};
use tessera_core::{convert, Complex, Element, ModelError, ModelResult, ValueKind};
use tessera_matrix::{BooleanMatrix, ComplexMatrix, IntegerMatrix, Matrix, RealMatrix};

#[derive(Debug, Clone, Default)]
pub enum Variant {
    #[default]
    None,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    Complex(Complex),
    Set(Set),
    Tuple(Tuple),
    MatrixBoolean(BooleanMatrix),
    MatrixInteger(IntegerMatrix),
    MatrixReal(RealMatrix),
    MatrixComplex(ComplexMatrix),
}

/// Exact element conversion
fn lossless<S: Element, T: Element>(value: S) -> Option<T> {
    if S::KIND.promotes_to(T::KIND) {
        Some(convert(value))
    } else {
        T::try_from_complex(value.to_complex())
    }
}

fn matrix_to<S: Element, T: Element>(m: &Matrix<S>) -> Option<Matrix<T>> {
    if S::KIND.promotes_to(T::KIND) {
        return Some(Matrix::from_matrix(m));
    }
    if m.column_major().into_iter().all(|x| lossless::<S, T>(x).is_some()) {
        Some(m.map_entries(convert::<S, T>))
    } else {
        None
    }
}

fn single<S: Element, T: Element>(m: &Matrix<S>) -> Option<T> {
    if m.dims() == (1, 1) {
        m.get(0, 0).and_then(lossless)
    } else {
        None
    }
}

impl Variant {
    pub fn value_type(&self) -> ValueKind {
        match self {
            Variant::None => ValueKind::None,
            Variant::Boolean(_) => ValueKind::Boolean,
            Variant::Integer(_) => ValueKind::Integer,
            Variant::Real(_) => ValueKind::Real,
            Variant::Complex(_) => ValueKind::Complex,
            Variant::Set(_) => ValueKind::Set,
            Variant::Tuple(_) => ValueKind::Tuple,
            Variant::MatrixBoolean(_) => ValueKind::MatrixBoolean,
            Variant::MatrixInteger(_) => ValueKind::MatrixInteger,
            Variant::MatrixReal(_) => ValueKind::MatrixReal,
            Variant::MatrixComplex(_) => ValueKind::MatrixComplex,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Variant::None)
    }

    pub fn is_scalar(&self) -> bool {
        self.value_type().is_scalar()
    }

    pub fn is_matrix(&self) -> bool {
        self.value_type().is_matrix()
    }

    // ========== Accessors (exact kind, never convert) ==========

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Variant::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Variant::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            Variant::Real(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_complex(&self) -> Option<Complex> {
        match self {
            Variant::Complex(z) => Some(*z),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&Set> {
        match self {
            Variant::Set(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&Tuple> {
        match self {
            Variant::Tuple(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_boolean_matrix(&self) -> Option<&BooleanMatrix> {
        match self {
            Variant::MatrixBoolean(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_integer_matrix(&self) -> Option<&IntegerMatrix> {
        match self {
            Variant::MatrixInteger(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_real_matrix(&self) -> Option<&RealMatrix> {
        match self {
            Variant::MatrixReal(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_complex_matrix(&self) -> Option<&ComplexMatrix> {
        match self {
            Variant::MatrixComplex(m) => Some(m),
            _ => None,
        }
    }

    // ========== Coercion ==========

    fn scalar_to<T: Element>(&self) -> Option<T> {
        match self {
            Variant::Boolean(b) => lossless(*b),
            Variant::Integer(i) => lossless(*i),
            Variant::Real(x) => lossless(*x),
            Variant::Complex(z) => lossless(*z),
            Variant::MatrixBoolean(m) => single(m),
            Variant::MatrixInteger(m) => single(m),
            Variant::MatrixReal(m) => single(m),
            Variant::MatrixComplex(m) => single(m),
            _ => None,
        }
    }

    fn matrix_of<T: Element>(&self) -> Option<Matrix<T>> {
        match self {
            Variant::MatrixBoolean(m) => matrix_to(m),
            Variant::MatrixInteger(m) => matrix_to(m),
            Variant::MatrixReal(m) => matrix_to(m),
            Variant::MatrixComplex(m) => matrix_to(m),
            _ => self.scalar_to::<T>().map(|v| Matrix::from_rows(&[vec![v]])).and_then(Result::ok),
        }
    }

    fn conversion_error(&self, to: ValueKind) -> ModelError {
        ModelError::conversion(self.value_type(), to)
    }

    pub fn to_boolean(&self) -> ModelResult<bool> {
        self.scalar_to().ok_or_else(|| self.conversion_error(ValueKind::Boolean))
    }

    pub fn to_integer(&self) -> ModelResult<i64> {
        self.scalar_to().ok_or_else(|| self.conversion_error(ValueKind::Integer))
    }

    pub fn to_real(&self) -> ModelResult<f64> {
        self.scalar_to().ok_or_else(|| self.conversion_error(ValueKind::Real))
    }

    pub fn to_complex(&self) -> ModelResult<Complex> {
        self.scalar_to().ok_or_else(|| self.conversion_error(ValueKind::Complex))
    }

    /// Sets pass through; tuples give their distinct elements
    pub fn to_set(&self) -> ModelResult<Set> {
        match self {
            Variant::Set(s) => Ok(s.clone()),
            Variant::Tuple(t) => Ok(t.iter().cloned().collect()),
            _ => Err(self.conversion_error(ValueKind::Set)),
        }
    }

    /// Tuples pass through; sets give their elements in order
    pub fn to_tuple(&self) -> ModelResult<Tuple> {
        match self {
            Variant::Tuple(t) => Ok(t.clone()),
            Variant::Set(s) => Ok(s.elements().cloned().collect()),
            _ => Err(self.conversion_error(ValueKind::Tuple)),
        }
    }

    pub fn to_matrix<T: Coefficient>(&self) -> ModelResult<Matrix<T>> {
        self.matrix_of()
            .ok_or_else(|| self.conversion_error(T::KIND.matrix_kind()))
    }

    pub fn to_boolean_matrix(&self) -> ModelResult<BooleanMatrix> {
        self.to_matrix()
    }

    pub fn to_integer_matrix(&self) -> ModelResult<IntegerMatrix> {
        self.to_matrix()
    }

    pub fn to_real_matrix(&self) -> ModelResult<RealMatrix> {
        self.to_matrix()
    }

    pub fn to_complex_matrix(&self) -> ModelResult<ComplexMatrix> {
        self.to_matrix()
    }

    /// Whether `to_*` for `kind` would succeed
    pub fn can_translate_to(&self, kind: ValueKind) -> bool {
        match kind {
            ValueKind::Variant => true,
            ValueKind::None => self.is_none(),
            ValueKind::Boolean => self.scalar_to::<bool>().is_some(),
            ValueKind::Integer => self.scalar_to::<i64>().is_some(),
            ValueKind::Real => self.scalar_to::<f64>().is_some(),
            ValueKind::Complex => self.scalar_to::<Complex>().is_some(),
            ValueKind::Set | ValueKind::Tuple => matches!(self, Variant::Set(_) | Variant::Tuple(_)),
            ValueKind::MatrixBoolean => self.matrix_of::<bool>().is_some(),
            ValueKind::MatrixInteger => self.matrix_of::<i64>().is_some(),
            ValueKind::MatrixReal => self.matrix_of::<f64>().is_some(),
            ValueKind::MatrixComplex => self.matrix_of::<Complex>().is_some(),
        }
    }

    // ========== Ordering ==========

    /// Value kind first, then payload: numbers by value, sets and tuples by
    /// size then element-wise, matrices by storage, dimensions and bytes
    pub fn relative_order(&self, other: &Variant) -> Ordering {
        match (self, other) {
            (Variant::None, Variant::None) => Ordering::Equal,
            (Variant::Boolean(a), Variant::Boolean(b)) => a.cmp(b),
            (Variant::Integer(a), Variant::Integer(b)) => a.cmp(b),
            (Variant::Real(a), Variant::Real(b)) => a.order(b),
            (Variant::Complex(a), Variant::Complex(b)) => a.order(b),
            (Variant::Set(a), Variant::Set(b)) => a.relative_order(b),
            (Variant::Tuple(a), Variant::Tuple(b)) => a.relative_order(b),
            (Variant::MatrixBoolean(a), Variant::MatrixBoolean(b)) => a.relative_order(b),
            (Variant::MatrixInteger(a), Variant::MatrixInteger(b)) => a.relative_order(b),
            (Variant::MatrixReal(a), Variant::MatrixReal(b)) => a.relative_order(b),
            (Variant::MatrixComplex(a), Variant::MatrixComplex(b)) => a.relative_order(b),
            _ => self.value_type().cmp(&other.value_type()),
        }
    }
}

impl PartialEq for Variant {
    fn eq(&self, other: &Self) -> bool {
        self.relative_order(other) == Ordering::Equal
    }
}

impl Eq for Variant {}

impl PartialOrd for Variant {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Variant {
    fn cmp(&self, other: &Self) -> Ordering {
        self.relative_order(other)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::None => write!(f, "none"),
            Variant::Boolean(b) => write!(f, "{}", b),
            Variant::Integer(i) => write!(f, "{}", i),
            Variant::Real(x) => write!(f, "{}", render_real(*x)),
            Variant::Complex(z) => write!(f, "{}", render_complex(*z)),
            Variant::Set(s) => write!(f, "{}", s),
            Variant::Tuple(t) => write!(f, "{}", t),
            Variant::MatrixBoolean(m) => write!(f, "{}", m),
            Variant::MatrixInteger(m) => write!(f, "{}", m),
            Variant::MatrixReal(m) => write!(f, "{}", m),
            Variant::MatrixComplex(m) => write!(f, "{}", m),
        }
    }
}

// ============================================================================
// Matrix element bridge
// ============================================================================

/// Element kinds that can travel inside a `Variant`
pub trait Coefficient: Element {
    fn from_variant(value: &Variant) -> ModelResult<Self>;
    fn into_variant(self) -> Variant;
    fn matrix_into_variant(matrix: Matrix<Self>) -> Variant;
}

macro_rules! coefficient {
    ($t:ty, $scalar:ident, $matrix:ident, $to:ident) => {
        impl Coefficient for $t {
            fn from_variant(value: &Variant) -> ModelResult<Self> {
                value.$to()
            }

            fn into_variant(self) -> Variant {
                Variant::$scalar(self)
            }

            fn matrix_into_variant(matrix: Matrix<Self>) -> Variant {
                Variant::$matrix(matrix)
            }
        }

        impl From<$t> for Variant {
            fn from(value: $t) -> Self {
                Variant::$scalar(value)
            }
        }

        impl From<Matrix<$t>> for Variant {
            fn from(matrix: Matrix<$t>) -> Self {
                Variant::$matrix(matrix)
            }
        }
    };
}

coefficient!(bool, Boolean, MatrixBoolean, to_boolean);
coefficient!(i64, Integer, MatrixInteger, to_integer);
coefficient!(f64, Real, MatrixReal, to_real);
coefficient!(Complex, Complex, MatrixComplex, to_complex);

impl From<Set> for Variant {
    fn from(set: Set) -> Self {
        Variant::Set(set)
    }
}

impl From<Tuple> for Variant {
    fn from(tuple: Tuple) -> Self {
        Variant::Tuple(tuple)
    }
}
