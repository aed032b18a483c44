//! Indexing facade
//!
//! Every row or column index is an [`IndexSpec`]. Each spec first resolves to
//! 1-based integer positions: a single position for scalar specs, a list for
//! ranges, sets, tuples and matrices. One dispatcher then serves every
//! combination. Two scalar positions read one element; anything else reads
//! a sub-matrix.

use crate::range::Range;
use crate::set::Set;
use crate::tuple::Tuple;
use crate::variant::{Coefficient, Variant};
use tessera_core::{Complex, Element, ModelError, ModelResult, StorageKind, ValueKind};
use tessera_matrix::{ComplexMatrix, IntegerMatrix, Matrix, RealMatrix};

#[derive(Debug, Clone, Copy)]
pub enum IndexSpec<'a> {
    Integer(i64),
    /// Must be integral
    Real(f64),
    /// Must be real and integral
    Complex(Complex),
    Range(Range),
    Set(&'a Set),
    Tuple(&'a Tuple),
    /// Column-major list of positions
    IntegerMatrix(&'a IntegerMatrix),
    RealMatrix(&'a RealMatrix),
    ComplexMatrix(&'a ComplexMatrix),
    Variant(&'a Variant),
}

/// Resolved 1-based positions
#[derive(Debug, Clone, PartialEq)]
enum Positions {
    Scalar(i64),
    List {
        indices: Vec<i64>,
        /// Shape of a matrix index
        shape: Option<(usize, usize)>,
    },
}

impl Positions {
    fn list(indices: Vec<i64>) -> Self {
        Positions::List { indices, shape: None }
    }

    fn into_indices(self) -> Vec<i64> {
        match self {
            Positions::Scalar(i) => vec![i],
            Positions::List { indices, .. } => indices,
        }
    }
}

fn integral<S: Element>(value: S) -> ModelResult<i64> {
    i64::try_from_complex(value.to_complex())
        .ok_or_else(|| ModelError::conversion(S::KIND.scalar_kind(), ValueKind::Integer))
}

fn matrix_positions<S: Element>(m: &Matrix<S>) -> ModelResult<Positions> {
    let indices = m.column_major().into_iter().map(integral).collect::<ModelResult<_>>()?;
    Ok(Positions::List {
        indices,
        shape: Some(m.dims()),
    })
}

fn element_positions<'v>(values: impl Iterator<Item = &'v Variant>) -> ModelResult<Positions> {
    values.map(Variant::to_integer).collect::<ModelResult<_>>().map(Positions::list)
}

impl IndexSpec<'_> {
    fn positions(&self) -> ModelResult<Positions> {
        match *self {
            IndexSpec::Integer(i) => Ok(Positions::Scalar(i)),
            IndexSpec::Real(x) => integral(x).map(Positions::Scalar),
            IndexSpec::Complex(z) => integral(z).map(Positions::Scalar),
            IndexSpec::Range(r) => Ok(Positions::list(r.iter().collect())),
            IndexSpec::Set(s) => element_positions(s.elements()),
            IndexSpec::Tuple(t) => element_positions(t.iter()),
            IndexSpec::IntegerMatrix(m) => Ok(Positions::List {
                indices: m.column_major(),
                shape: Some(m.dims()),
            }),
            IndexSpec::RealMatrix(m) => matrix_positions(m),
            IndexSpec::ComplexMatrix(m) => matrix_positions(m),
            IndexSpec::Variant(v) => match v {
                Variant::Boolean(_) | Variant::Integer(_) | Variant::Real(_) | Variant::Complex(_) => {
                    v.to_integer().map(Positions::Scalar)
                }
                Variant::Set(s) => IndexSpec::Set(s).positions(),
                Variant::Tuple(t) => IndexSpec::Tuple(t).positions(),
                Variant::MatrixBoolean(m) => matrix_positions(m),
                Variant::MatrixInteger(m) => IndexSpec::IntegerMatrix(m).positions(),
                Variant::MatrixReal(m) => matrix_positions(m),
                Variant::MatrixComplex(m) => matrix_positions(m),
                Variant::None => Err(ModelError::conversion(ValueKind::None, ValueKind::Integer)),
            },
        }
    }
}

macro_rules! index_from {
    ($t:ty, $variant:ident) => {
        impl<'a> From<$t> for IndexSpec<'a> {
            fn from(value: $t) -> Self {
                IndexSpec::$variant(value)
            }
        }
    };
}

index_from!(i64, Integer);
index_from!(f64, Real);
index_from!(Complex, Complex);
index_from!(Range, Range);
index_from!(&'a Set, Set);
index_from!(&'a Tuple, Tuple);
index_from!(&'a IntegerMatrix, IntegerMatrix);
index_from!(&'a RealMatrix, RealMatrix);
index_from!(&'a ComplexMatrix, ComplexMatrix);
index_from!(&'a Variant, Variant);

/// Result of an indexed read
#[derive(Debug, Clone, PartialEq)]
pub enum Indexed<T: Element> {
    Scalar(T),
    Matrix(Matrix<T>),
}

impl<T: Coefficient> Indexed<T> {
    pub fn scalar(self) -> Option<T> {
        match self {
            Indexed::Scalar(v) => Some(v),
            Indexed::Matrix(_) => None,
        }
    }

    pub fn matrix(self) -> Option<Matrix<T>> {
        match self {
            Indexed::Matrix(m) => Some(m),
            Indexed::Scalar(_) => None,
        }
    }

    pub fn into_variant(self) -> Variant {
        match self {
            Indexed::Scalar(v) => v.into_variant(),
            Indexed::Matrix(m) => T::matrix_into_variant(m),
        }
    }
}

/// Indexed reads and writes over every [`IndexSpec`] combination
pub trait MatrixIndex<T: Coefficient> {
    fn at_spec(&self, row: IndexSpec<'_>, col: IndexSpec<'_>) -> ModelResult<Indexed<T>>;

    /// Column-major linear indexing
    fn at_linear_spec(&self, index: IndexSpec<'_>) -> ModelResult<Indexed<T>>;

    /// Write `value` at every selected position, growing the matrix as
    /// needed. Returns false, leaving the matrix untouched, when `value` does
    /// not convert exactly to the element kind.
    fn set_value(&mut self, row: IndexSpec<'_>, col: IndexSpec<'_>, value: &Variant) -> ModelResult<bool>;

    fn set_value_linear(&mut self, index: IndexSpec<'_>, value: &Variant) -> ModelResult<bool>;
}

fn with_storage<T: Element>(m: Matrix<T>, kind: StorageKind) -> Matrix<T> {
    match kind {
        StorageKind::Dense => m,
        StorageKind::Sparse => m.to_sparse(),
    }
}

impl<T: Coefficient> MatrixIndex<T> for Matrix<T> {
    fn at_spec(&self, row: IndexSpec<'_>, col: IndexSpec<'_>) -> ModelResult<Indexed<T>> {
        let (rows, cols) = (row.positions()?, col.positions()?);
        if let (Positions::Scalar(r), Positions::Scalar(c)) = (&rows, &cols) {
            return self.at(*r, *c).map(Indexed::Scalar);
        }
        let (rows, cols) = (rows.into_indices(), cols.into_indices());
        let mut values = Vec::with_capacity(rows.len() * cols.len());
        for &c in &cols {
            for &r in &rows {
                values.push(self.at(r, c)?);
            }
        }
        let sub = Matrix::from_column_major(rows.len(), cols.len(), &values)?;
        Ok(Indexed::Matrix(with_storage(sub, self.storage_kind())))
    }

    fn at_linear_spec(&self, index: IndexSpec<'_>) -> ModelResult<Indexed<T>> {
        let (indices, shape) = match index.positions()? {
            Positions::Scalar(i) => return self.at_linear(i).map(Indexed::Scalar),
            Positions::List { indices, shape } => (indices, shape),
        };
        let values = indices.iter().map(|&i| self.at_linear(i)).collect::<ModelResult<Vec<T>>>()?;
        let (rows, cols) = shape.unwrap_or(if self.rows() == 1 {
            (1, values.len())
        } else {
            (values.len(), 1)
        });
        let sub = Matrix::from_column_major(rows, cols, &values)?;
        Ok(Indexed::Matrix(with_storage(sub, self.storage_kind())))
    }

    fn set_value(&mut self, row: IndexSpec<'_>, col: IndexSpec<'_>, value: &Variant) -> ModelResult<bool> {
        let Ok(value) = T::from_variant(value) else {
            return Ok(false);
        };
        let rows = row.positions()?.into_indices();
        let cols = col.positions()?.into_indices();
        let mut cells = Vec::with_capacity(rows.len().saturating_mul(cols.len()));
        for &c in &cols {
            for &r in &rows {
                cells.push(self.write_position(r, c)?);
            }
        }
        commit(self, &cells, value)?;
        Ok(true)
    }

    fn set_value_linear(&mut self, index: IndexSpec<'_>, value: &Variant) -> ModelResult<bool> {
        let Ok(value) = T::from_variant(value) else {
            return Ok(false);
        };
        let indices = index.positions()?.into_indices();
        if let Some(&bad) = indices.iter().find(|&&i| i < 1) {
            return Err(ModelError::InvalidIndex {
                index: bad,
                bound: self.number_coefficients(),
            });
        }
        // the largest index fixes the grown shape; smaller ones land inside it
        let Some(&largest) = indices.iter().max() else {
            return Ok(true);
        };
        let (r, c) = self.linear_write_position(largest)?;
        self.grow_to(r + 1, c + 1)?;
        let cells = indices
            .iter()
            .map(|&i| self.linear_write_position(i))
            .collect::<ModelResult<Vec<_>>>()?;
        commit(self, &cells, value)?;
        Ok(true)
    }
}

/// Grow once to cover every cell, then write; nothing is written when growth fails
fn commit<T: Element>(m: &mut Matrix<T>, cells: &[(usize, usize)], value: T) -> ModelResult<()> {
    let rows = cells.iter().map(|&(r, _)| r + 1).max().unwrap_or(0);
    let cols = cells.iter().map(|&(_, c)| c + 1).max().unwrap_or(0);
    m.grow_to(rows, cols)?;
    for &(r, c) in cells {
        m.update(r as i64 + 1, c as i64 + 1, value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_matrix::BooleanMatrix;

    fn sample() -> IntegerMatrix {
        IntegerMatrix::from_rows(&[vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9]]).unwrap()
    }

    #[test]
    fn test_scalar_specs() {
        let m = sample();
        assert_eq!(m.at_spec(2i64.into(), 3i64.into()).unwrap(), Indexed::Scalar(6));
        assert_eq!(m.at_spec(IndexSpec::Real(3.0), IndexSpec::Complex(Complex::new(1.0, 0.0))).unwrap(), Indexed::Scalar(7));
        assert!(matches!(
            m.at_spec(IndexSpec::Real(1.5), 1i64.into()),
            Err(ModelError::InvalidRuntimeConversion { from: ValueKind::Real, .. })
        ));
        assert!(m.at_spec(IndexSpec::Complex(Complex::new(1.0, 1.0)), 1i64.into()).is_err());
        assert!(matches!(m.at_spec(4i64.into(), 1i64.into()), Err(ModelError::InvalidRow { index: 4, bound: 3 })));
        assert!(matches!(m.at_spec(1i64.into(), 0i64.into()), Err(ModelError::InvalidColumn { index: 0, .. })));
    }

    #[test]
    fn test_sub_matrix_specs() {
        let m = sample();
        let sub = m.at_spec(Range::new(2, 3).into(), 1i64.into()).unwrap().matrix().unwrap();
        assert_eq!(sub.to_rows(), vec![vec![4], vec![7]]);

        let cols: Tuple = [Variant::from(3i64), Variant::from(1i64)].into_iter().collect();
        let sub = m.at_spec(1i64.into(), (&cols).into()).unwrap().matrix().unwrap();
        assert_eq!(sub.to_rows(), vec![vec![3, 1]]);

        let rows: Set = [Variant::from(3i64), Variant::from(1i64)].into_iter().collect();
        let picks = RealMatrix::row_vector(&[2.0]);
        let sub = m.at_spec((&rows).into(), (&picks).into()).unwrap().matrix().unwrap();
        assert_eq!(sub.to_rows(), vec![vec![2], vec![8]]);

        let bad = IntegerMatrix::row_vector(&[1, 5]);
        assert!(matches!(m.at_spec((&bad).into(), 1i64.into()), Err(ModelError::InvalidRow { index: 5, .. })));
    }

    #[test]
    fn test_variant_dispatch() {
        let m = sample().transpose();
        let two = Variant::from(2.0);
        let all = Variant::from(IntegerMatrix::row_vector(&[1, 2, 3]));
        assert_eq!(m.at_spec((&two).into(), 1i64.into()).unwrap(), Indexed::Scalar(2));
        let row = m.at_spec((&two).into(), (&all).into()).unwrap();
        assert_eq!(row.into_variant(), Variant::from(IntegerMatrix::row_vector(&[2, 5, 8])));
        assert!(m.at_spec((&Variant::None).into(), 1i64.into()).is_err());
    }

    #[test]
    fn test_linear_specs() {
        let m = sample();
        assert_eq!(m.at_linear_spec(4i64.into()).unwrap(), Indexed::Scalar(2));
        let shaped = IntegerMatrix::from_rows(&[vec![1, 2], vec![3, 4]]).unwrap();
        let sub = m.at_linear_spec((&shaped).into()).unwrap().matrix().unwrap();
        assert_eq!(sub.to_rows(), vec![vec![1, 4], vec![7, 2]]);
        let listed = m.at_linear_spec(Range::new(1, 2).into()).unwrap().matrix().unwrap();
        assert_eq!(listed.dims(), (2, 1));
        assert!(matches!(m.at_linear_spec(10i64.into()), Err(ModelError::InvalidIndex { index: 10, bound: 9 })));
    }

    #[test]
    fn test_linear_matches_two_dimensional() {
        let m = sample().scaled(3);
        for r in 1..=3i64 {
            for c in 1..=3i64 {
                let linear = (c - 1) * 3 + r;
                assert_eq!(m.at_spec(r.into(), c.into()).unwrap(), m.at_linear_spec(linear.into()).unwrap());
            }
        }
    }

    #[test]
    fn test_set_value() {
        let mut m = RealMatrix::new(2, 2);
        assert!(m.set_value(1i64.into(), 2i64.into(), &Variant::from(7i64)).unwrap());
        assert_eq!(m.at(1, 2).unwrap(), 7.0);
        assert!(!m.set_value(1i64.into(), 1i64.into(), &Variant::from(Complex::new(0.0, 1.0))).unwrap());
        assert_eq!(m.at(1, 1).unwrap(), 0.0);

        assert!(m.set_value(Range::new(1, 3).into(), 3i64.into(), &Variant::from(1.5)).unwrap());
        assert_eq!(m.dims(), (3, 3));
        assert_eq!(m.at(3, 3).unwrap(), 1.5);

        let mut b = BooleanMatrix::new(1, 2);
        assert!(b.set_value_linear(2i64.into(), &Variant::from(1i64)).unwrap());
        assert!(b.at(1, 2).unwrap());
        assert!(!b.set_value_linear(1i64.into(), &Variant::from(2i64)).unwrap());
    }

    #[test]
    fn test_set_value_rejects_before_writing() {
        let mut m = IntegerMatrix::from_rows(&[vec![1, 2], vec![3, 4]]).unwrap();
        let before = m.to_rows();

        let rows = IntegerMatrix::column_vector(&[1, 0]);
        assert!(matches!(
            m.set_value((&rows).into(), 1i64.into(), &Variant::from(9i64)),
            Err(ModelError::InvalidRow { index: 0, .. })
        ));
        assert_eq!(m.to_rows(), before);

        let cols: Tuple = [Variant::from(2i64), Variant::from(-1i64)].into_iter().collect();
        assert!(matches!(
            m.set_value(1i64.into(), (&cols).into(), &Variant::from(9i64)),
            Err(ModelError::InvalidColumn { index: -1, .. })
        ));
        assert_eq!(m.to_rows(), before);

        let linear = IntegerMatrix::row_vector(&[1, 3, 0]);
        assert!(matches!(
            m.set_value_linear((&linear).into(), &Variant::from(9i64)),
            Err(ModelError::InvalidIndex { index: 0, bound: 4 })
        ));
        assert_eq!(m.to_rows(), before);

        let huge = IntegerMatrix::column_vector(&[1, i64::MAX]);
        assert!(m.set_value((&huge).into(), i64::MAX.into(), &Variant::from(9i64)).is_err());
        assert_eq!(m.to_rows(), before);
        assert_eq!(m.dims(), (2, 2));
    }

    #[test]
    fn test_set_value_linear_grows_once() {
        let mut m = IntegerMatrix::row_vector(&[1, 2]);
        let indices = IntegerMatrix::row_vector(&[4, 1]);
        assert!(m.set_value_linear((&indices).into(), &Variant::from(7i64)).unwrap());
        assert_eq!(m.to_rows(), vec![vec![7, 2, 0, 7]]);
    }
}
