//! Matrix handles
//!
//! A [`Matrix`] is a value-semantic view of a shared backing store plus
//! deferred state `(T, α)`: the logical matrix is `α · T(S)` where `S` is the
//! stored matrix and `T` one of none, transpose, conjugate or adjoint.
//! Cloning a handle shares the store; transposing, conjugating and scaling
//! only touch the handle. Writes materialise the deferred state and fork the
//! store when it is shared.
//!
//! Indices are 1-based on the public surface (`at`, `update`) and 0-based
//! inside the crate (`entry`).

use crate::backing::Backing;
use crate::store::{DenseStore, SparseStore, Store};
use crate::transform::Transform;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use tessera_core::{convert, Complex, Element, ModelError, ModelResult, StorageKind};

#[derive(Clone)]
pub struct Matrix<T: Element> {
    backing: Backing<T>,
    transform: Transform,
    scalar: T,
}

pub type BooleanMatrix = Matrix<bool>;
pub type IntegerMatrix = Matrix<i64>;
pub type RealMatrix = Matrix<f64>;
pub type ComplexMatrix = Matrix<Complex>;

impl<T: Element> Matrix<T> {
    // ========== Construction ==========

    /// Zero-filled dense matrix
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::from_store(Store::Dense(DenseStore::zeros(rows, cols)))
    }

    /// Empty sparse matrix
    pub fn sparse(rows: usize, cols: usize) -> Self {
        Self::from_store(Store::Sparse(SparseStore::zeros(rows, cols)))
    }

    pub fn zeros(kind: StorageKind, rows: usize, cols: usize) -> Self {
        Self::from_store(Store::zeros(kind, rows, cols))
    }

    pub fn from_store(store: Store<T>) -> Self {
        Self {
            backing: Backing::new(store),
            transform: Transform::NONE,
            scalar: T::one(),
        }
    }

    /// Copy a contiguous column-major buffer
    pub fn from_column_major(rows: usize, cols: usize, data: &[T]) -> ModelResult<Self> {
        let store = DenseStore::from_column_major(rows, cols, data.to_vec())?;
        Ok(Self::from_store(Store::Dense(store)))
    }

    /// Build from a list of rows of equal length
    pub fn from_rows(rows: &[Vec<T>]) -> ModelResult<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(ModelError::dimensions("from_rows", (i + 1, row.len()), (rows.len(), cols)));
        }
        let store = DenseStore::from_fn(rows.len(), cols, |r, c| rows[r][c]);
        Ok(Self::from_store(Store::Dense(store)))
    }

    pub fn column_vector(values: &[T]) -> Self {
        let store = DenseStore::from_fn(values.len(), 1, |r, _| values[r]);
        Self::from_store(Store::Dense(store))
    }

    pub fn row_vector(values: &[T]) -> Self {
        let store = DenseStore::from_fn(1, values.len(), |_, c| values[c]);
        Self::from_store(Store::Dense(store))
    }

    pub fn identity(n: usize) -> Self {
        let store = DenseStore::from_fn(n, n, |r, c| if r == c { T::one() } else { T::zero() });
        Self::from_store(Store::Dense(store))
    }

    pub fn ones(rows: usize, cols: usize) -> Self {
        Self::from_store(Store::Dense(DenseStore::from_fn(rows, cols, |_, _| T::one())))
    }

    /// Cross-kind construction.
    ///
    /// Widening keeps the source's deferred state. Narrowing keeps it only
    /// when the pending scalar is the identity; otherwise the source is
    /// materialised first so that truncation sees the scaled values.
    pub fn from_matrix<S: Element>(other: &Matrix<S>) -> Self {
        let widening = S::KIND.promotes_to(T::KIND);
        let scalar = T::try_from_complex(other.scalar.to_complex());
        match scalar {
            Some(scalar) if widening || other.scalar == S::one() => Self {
                backing: Backing::new(other.store().map(convert::<S, T>)),
                transform: other.transform.for_kind(T::KIND),
                scalar,
            },
            _ => Self::from_store(other.materialised().store().map(convert::<S, T>)),
        }
    }

    /// Convert to another element kind
    pub fn to_kind<U: Element>(&self) -> Matrix<U> {
        Matrix::<U>::from_matrix(self)
    }

    // ========== Inspection ==========

    pub fn rows(&self) -> usize {
        if self.transform.is_transposed() {
            self.store().cols()
        } else {
            self.store().rows()
        }
    }

    pub fn cols(&self) -> usize {
        if self.transform.is_transposed() {
            self.store().rows()
        } else {
            self.store().cols()
        }
    }

    pub fn dims(&self) -> (usize, usize) {
        (self.rows(), self.cols())
    }

    pub fn number_coefficients(&self) -> usize {
        self.rows() * self.cols()
    }

    pub fn is_empty(&self) -> bool {
        self.number_coefficients() == 0
    }

    pub fn is_square(&self) -> bool {
        self.rows() == self.cols()
    }

    /// True for 1×n and n×1 matrices
    pub fn is_vector(&self) -> bool {
        self.rows() == 1 || self.cols() == 1
    }

    pub fn storage_kind(&self) -> StorageKind {
        self.store().storage_kind()
    }

    pub fn number_nonzeros(&self) -> usize {
        if self.scalar.is_zero() {
            0
        } else {
            self.store().number_nonzeros()
        }
    }

    pub fn pending_transform(&self) -> Transform {
        self.transform
    }

    pub fn pending_scalar(&self) -> T {
        self.scalar
    }

    /// True when no transform or scaling is pending
    pub fn is_canonical(&self) -> bool {
        self.transform.is_none() && self.scalar == T::one()
    }

    /// Identity test on the backing store
    pub fn shares_backing_with(&self, other: &Matrix<T>) -> bool {
        self.backing.ptr_eq(&other.backing)
    }

    pub fn reference_count(&self) -> usize {
        self.backing.reference_count()
    }

    pub(crate) fn store(&self) -> &Store<T> {
        self.backing.store()
    }

    // ========== Element access ==========

    /// Apply the pending transform and scalar to a stored value
    fn apply(&self, value: T) -> T {
        let value = if self.transform.is_conjugated() {
            value.conjugated()
        } else {
            value
        };
        if self.scalar == T::one() {
            value
        } else {
            self.scalar.times(value)
        }
    }

    /// Logical element at 0-based `(row, col)`, computed through the
    /// pending state
    pub(crate) fn entry(&self, row: usize, col: usize) -> T {
        let stored = if self.transform.is_transposed() {
            self.store().at(col, row)
        } else {
            self.store().at(row, col)
        };
        self.apply(stored)
    }

    /// Checked 0-based read
    pub fn get(&self, row: usize, col: usize) -> Option<T> {
        (row < self.rows() && col < self.cols()).then(|| self.entry(row, col))
    }

    pub(crate) fn check_row(&self, row: i64) -> ModelResult<usize> {
        if row < 1 || row as u64 > self.rows() as u64 {
            return Err(ModelError::InvalidRow {
                index: row,
                bound: self.rows(),
            });
        }
        Ok(row as usize - 1)
    }

    pub(crate) fn check_column(&self, col: i64) -> ModelResult<usize> {
        if col < 1 || col as u64 > self.cols() as u64 {
            return Err(ModelError::InvalidColumn {
                index: col,
                bound: self.cols(),
            });
        }
        Ok(col as usize - 1)
    }

    /// 1-based element read
    pub fn at(&self, row: i64, col: i64) -> ModelResult<T> {
        let r = self.check_row(row)?;
        let c = self.check_column(col)?;
        Ok(self.entry(r, c))
    }

    /// 1-based column-major linear read
    pub fn at_linear(&self, index: i64) -> ModelResult<T> {
        let count = self.number_coefficients();
        if index < 1 || index as u64 > count as u64 {
            return Err(ModelError::InvalidIndex { index, bound: count });
        }
        let i = index as usize - 1;
        let rows = self.rows();
        Ok(self.entry(i % rows, i / rows))
    }

    /// Logical elements in column-major order
    pub fn column_major(&self) -> Vec<T> {
        if self.is_canonical() {
            return self.store().column_major();
        }
        DenseStore::from_fn(self.rows(), self.cols(), |r, c| self.entry(r, c)).into_vec()
    }

    /// Logical elements as a list of rows
    pub fn to_rows(&self) -> Vec<Vec<T>> {
        (0..self.rows())
            .map(|r| (0..self.cols()).map(|c| self.entry(r, c)).collect())
            .collect()
    }

    /// Logical non-zeros keyed by 0-based `(row, col)`
    pub(crate) fn logical_nonzeros(&self) -> BTreeMap<(usize, usize), T> {
        if self.scalar.is_zero() {
            return BTreeMap::new();
        }
        let transposed = self.transform.is_transposed();
        self.store()
            .nonzeros()
            .into_iter()
            .filter_map(|(r, c, v)| {
                let key = if transposed { (c, r) } else { (r, c) };
                let v = self.apply(v);
                (!v.is_zero()).then_some((key, v))
            })
            .collect()
    }

    // ========== Update ==========

    /// 1-based write; grows the matrix when `(row, col)` lies outside it
    pub fn update(&mut self, row: i64, col: i64, value: T) -> ModelResult<()> {
        let (r, c) = self.write_position(row, col)?;
        self.write(r, c, value)
    }

    /// 0-based cell that `update(row, col, _)` writes
    pub fn write_position(&self, row: i64, col: i64) -> ModelResult<(usize, usize)> {
        if row < 1 {
            return Err(ModelError::InvalidRow {
                index: row,
                bound: self.rows(),
            });
        }
        if col < 1 {
            return Err(ModelError::InvalidColumn {
                index: col,
                bound: self.cols(),
            });
        }
        Ok(((row - 1) as usize, (col - 1) as usize))
    }

    /// 1-based column-major linear write with the same growth policy.
    ///
    /// Vectors grow along their length; other matrices gain columns.
    pub fn update_linear(&mut self, index: i64, value: T) -> ModelResult<()> {
        let (r, c) = self.linear_write_position(index)?;
        self.write(r, c, value)
    }

    /// 0-based cell that `update_linear(index, _)` writes
    pub fn linear_write_position(&self, index: i64) -> ModelResult<(usize, usize)> {
        if index < 1 {
            return Err(ModelError::InvalidIndex {
                index,
                bound: self.number_coefficients(),
            });
        }
        let i = (index - 1) as usize;
        let (rows, cols) = self.dims();
        let shape_rows = if i < rows.saturating_mul(cols) {
            rows
        } else if rows == 1 && cols > 1 {
            1
        } else if rows == 0 || cols == 0 || cols == 1 {
            i + 1
        } else {
            rows
        };
        Ok((i % shape_rows, i / shape_rows))
    }

    /// Grow to at least `rows × cols`; never shrinks
    pub fn grow_to(&mut self, rows: usize, cols: usize) -> ModelResult<()> {
        if rows <= self.rows() && cols <= self.cols() {
            return Ok(());
        }
        let (rows, cols) = (self.rows().max(rows), self.cols().max(cols));
        self.apply_transform_and_scaling();
        self.backing.store_mut().resize_to(rows, cols, false)
    }

    fn write(&mut self, r: usize, c: usize, value: T) -> ModelResult<()> {
        self.grow_to(r + 1, c + 1)?;
        self.apply_transform_and_scaling();
        self.backing.store_mut().update(r, c, value);
        Ok(())
    }

    /// Resize, keeping the overlap; new cells are zero
    pub fn resize(&mut self, rows: usize, cols: usize) -> ModelResult<()> {
        self.apply_transform_and_scaling();
        self.backing.store_mut().resize_to(rows, cols, false)
    }

    // ========== Lazy state ==========

    fn with_lazy(&self, transform: Transform, scalar: T) -> Self {
        Self {
            backing: self.backing.add_reference(),
            transform: transform.for_kind(T::KIND),
            scalar,
        }
    }

    pub fn transpose(&self) -> Self {
        self.with_lazy(self.transform.then(Transform::TRANSPOSE), self.scalar)
    }

    /// Complex conjugate; identity for the other kinds
    pub fn conjugate(&self) -> Self {
        self.with_lazy(self.transform.then(Transform::CONJUGATE), self.scalar.conjugated())
    }

    /// Conjugate transpose; the plain transpose for non-complex kinds
    pub fn adjoint(&self) -> Self {
        self.with_lazy(self.transform.then(Transform::ADJOINT), self.scalar.conjugated())
    }

    /// Fold a scalar factor into the pending state
    pub fn scaled(&self, factor: T) -> Self {
        self.with_lazy(self.transform, self.scalar.times(factor))
    }

    /// Division by a scalar. Real and complex handles fold `1/k` into the
    /// pending scalar; integer and boolean handles divide element-wise.
    pub fn divided_by(&self, divisor: T) -> ModelResult<Self> {
        let zero_divisor = || ModelError::numeric("divisor", divisor.magnitude());
        if T::KIND.promotes_to(tessera_core::ElementKind::Integer) {
            T::one().quotient(divisor).ok_or_else(zero_divisor)?;
            let canonical = self.materialised();
            let store = canonical.store().map(|v| v.quotient(divisor).unwrap_or(v));
            Ok(Self::from_store(store))
        } else {
            let reciprocal = T::one().quotient(divisor).ok_or_else(zero_divisor)?;
            Ok(self.scaled(reciprocal))
        }
    }

    /// Materialise the pending transform and scalar into a fresh store
    pub fn apply_transform_and_scaling(&mut self) {
        if self.is_canonical() {
            return;
        }
        tracing::trace!(
            transform = %self.transform,
            rows = self.rows(),
            cols = self.cols(),
            "materialising lazy state"
        );
        let (rows, cols) = self.dims();
        let store = match self.store() {
            Store::Dense(_) => Store::Dense(DenseStore::from_fn(rows, cols, |r, c| self.entry(r, c))),
            Store::Sparse(_) => Store::Sparse(SparseStore::from_entries(rows, cols, self.logical_nonzeros())),
        };
        self.backing.replace(store);
        self.transform = Transform::NONE;
        self.scalar = T::one();
    }

    /// Canonical copy; shares the store when nothing is pending
    pub fn materialised(&self) -> Self {
        let mut copy = self.clone();
        copy.apply_transform_and_scaling();
        copy
    }

    pub fn to_dense(&self) -> Self {
        match self.storage_kind() {
            StorageKind::Dense => self.clone(),
            StorageKind::Sparse => Self {
                backing: Backing::new(self.store().to_dense()),
                transform: self.transform,
                scalar: self.scalar,
            },
        }
    }

    pub fn to_sparse(&self) -> Self {
        match self.storage_kind() {
            StorageKind::Sparse => self.clone(),
            StorageKind::Dense => Self {
                backing: Backing::new(self.store().to_sparse()),
                transform: self.transform,
                scalar: self.scalar,
            },
        }
    }

    // ========== Shape operations ==========

    pub fn row_reverse(&self) -> Self {
        Self::from_store(self.materialised().store().row_reverse())
    }

    pub fn column_reverse(&self) -> Self {
        Self::from_store(self.materialised().store().column_reverse())
    }

    /// `[self, other]`; row counts must match
    pub fn combine_left_right(&self, other: &Matrix<T>) -> ModelResult<Self> {
        let store = self.materialised().store().combine_left_right(other.materialised().store())?;
        Ok(Self::from_store(store))
    }

    /// `[self; other]`; column counts must match
    pub fn combine_top_bottom(&self, other: &Matrix<T>) -> ModelResult<Self> {
        let store = self.materialised().store().combine_top_bottom(other.materialised().store())?;
        Ok(Self::from_store(store))
    }

    /// Main diagonal as a column vector
    pub fn diagonal_entries(&self) -> Self {
        let n = self.rows().min(self.cols());
        Self::from_store(Store::Dense(DenseStore::from_fn(n, 1, |i, _| self.entry(i, i))))
    }

    /// Square matrix with this vector on its diagonal
    pub fn diagonal(&self) -> ModelResult<Self> {
        if !self.is_vector() {
            return Err(ModelError::dimensions("diagonal", self.dims(), (1, self.number_coefficients())));
        }
        let values = self.column_major();
        let n = values.len();
        let store = match self.storage_kind() {
            StorageKind::Dense => Store::Dense(DenseStore::from_fn(n, n, |r, c| {
                if r == c {
                    values[r]
                } else {
                    T::zero()
                }
            })),
            StorageKind::Sparse => Store::Sparse(SparseStore::from_entries(
                n,
                n,
                values.iter().enumerate().map(|(i, &v)| ((i, i), v)),
            )),
        };
        Ok(Self::from_store(store))
    }

    // ========== Comparison ==========

    /// Shape then element-wise equality of the logical matrices
    pub fn is_equal_to(&self, other: &Matrix<T>) -> bool {
        if self.dims() != other.dims() {
            return false;
        }
        if self.shares_backing_with(other) && self.transform == other.transform && self.scalar == other.scalar {
            return true;
        }
        match (self.storage_kind(), other.storage_kind()) {
            (StorageKind::Sparse, StorageKind::Sparse) => self.logical_nonzeros() == other.logical_nonzeros(),
            _ => self.column_major() == other.column_major(),
        }
    }

    /// Total order: storage kind, then dimensions, then element bytes
    pub fn relative_order(&self, other: &Matrix<T>) -> Ordering {
        self.materialised()
            .store()
            .relative_order(other.materialised().store())
    }
}

impl<T: Element> PartialEq for Matrix<T> {
    fn eq(&self, other: &Self) -> bool {
        self.is_equal_to(other)
    }
}

impl<T: Element> Default for Matrix<T> {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl<T: Element> fmt::Debug for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matrix")
            .field("kind", &T::KIND)
            .field("storage", &self.storage_kind())
            .field("dims", &self.dims())
            .field("transform", &self.transform)
            .field("scalar", &self.scalar)
            .field("rows", &self.to_rows())
            .finish()
    }
}

impl<T: Element> fmt::Display for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for r in 0..self.rows() {
            if r > 0 {
                write!(f, ", ")?;
            }
            write!(f, "[")?;
            for c in 0..self.cols() {
                if c > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", self.entry(r, c).render())?;
            }
            write!(f, "]")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RealMatrix {
        RealMatrix::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap()
    }

    fn complex_sample() -> ComplexMatrix {
        ComplexMatrix::from_rows(&[
            vec![Complex::new(1.0, 1.0), Complex::new(2.0, -1.0)],
            vec![Complex::new(0.0, 3.0), Complex::new(4.0, 0.5)],
        ])
        .unwrap()
    }

    #[test]
    fn test_lazy_transpose_does_not_copy() {
        let original = RealMatrix::new(1000, 1000);
        let mut m = original.clone();
        for _ in 0..1000 {
            m = m.transpose();
        }
        assert!(m.shares_backing_with(&original));
        assert_eq!(m.pending_transform(), Transform::NONE);
        assert_eq!(original.reference_count(), 2);
    }

    #[test]
    fn test_copy_on_write() {
        let a = sample();
        let mut b = a.clone();
        b.update(1, 1, 42.0).unwrap();
        assert_eq!(a.at(1, 1).unwrap(), 1.0);
        assert_eq!(b.at(1, 1).unwrap(), 42.0);
        assert!(!a.shares_backing_with(&b));
    }

    #[test]
    fn test_transpose_reads_through() {
        let t = sample().transpose();
        assert_eq!(t.dims(), (3, 2));
        assert_eq!(t.at(3, 2).unwrap(), 6.0);
        assert_eq!(t.transpose(), sample());
    }

    #[test]
    fn test_complex_involutions() {
        let a = complex_sample();
        assert_eq!(a.adjoint().adjoint(), a);
        assert_eq!(a.conjugate().conjugate(), a);
        assert_eq!(a.adjoint(), a.transpose().conjugate());
        assert_eq!(a.adjoint(), a.conjugate().transpose());
        assert_eq!(a.adjoint().at(1, 2).unwrap(), Complex::new(0.0, -3.0));
    }

    #[test]
    fn test_scalar_fusion() {
        let a = complex_sample();
        let alpha = Complex::new(2.0, 1.0);
        let beta = Complex::new(-1.0, 0.5);
        let left = a.scaled(alpha).scaled(beta);
        let right = a.scaled(alpha * beta);
        assert!(left.shares_backing_with(&a));
        assert_eq!(left, right);
    }

    #[test]
    fn test_conjugate_folds_into_scalar() {
        let a = complex_sample();
        let alpha = Complex::new(0.0, 2.0);
        let lazy = a.scaled(alpha).adjoint();
        let mut eager = lazy.clone();
        eager.apply_transform_and_scaling();
        assert!(eager.is_canonical());
        assert_eq!(lazy, eager);
        let expected = (alpha * a.at(2, 1).unwrap()).conj();
        assert_eq!(lazy.at(1, 2).unwrap(), expected);
    }

    #[test]
    fn test_zero_scalar() {
        let z = sample().scaled(0.0);
        assert_eq!(z.number_nonzeros(), 0);
        assert_eq!(z, RealMatrix::new(2, 3));
    }

    #[test]
    fn test_index_round_trip() {
        let mut a = sample().transpose();
        a.update(2, 1, -7.5).unwrap();
        assert_eq!(a.at(2, 1).unwrap(), -7.5);
        assert!(a.is_canonical());
    }

    #[test]
    fn test_linear_matches_two_dimensional() {
        let a = sample();
        for r in 1..=2 {
            for c in 1..=3 {
                let linear = (c - 1) * 2 + r;
                assert_eq!(a.at(r, c).unwrap(), a.at_linear(linear).unwrap());
            }
        }
        assert!(matches!(a.at_linear(0), Err(ModelError::InvalidIndex { .. })));
        assert!(matches!(a.at_linear(7), Err(ModelError::InvalidIndex { .. })));
    }

    #[test]
    fn test_out_of_range() {
        let a = sample();
        assert!(matches!(a.at(3, 1), Err(ModelError::InvalidRow { index: 3, bound: 2 })));
        assert!(matches!(a.at(1, 0), Err(ModelError::InvalidColumn { index: 0, bound: 3 })));
    }

    #[test]
    fn test_update_grows() {
        let mut a = sample();
        a.update(3, 4, 9.0).unwrap();
        assert_eq!(a.dims(), (3, 4));
        assert_eq!(a.at(3, 4).unwrap(), 9.0);
        assert_eq!(a.at(3, 1).unwrap(), 0.0);

        let mut v = RealMatrix::column_vector(&[1.0, 2.0]);
        v.update_linear(4, 3.0).unwrap();
        assert_eq!(v.dims(), (4, 1));

        let mut w = RealMatrix::row_vector(&[1.0, 2.0]);
        w.update_linear(3, 3.0).unwrap();
        assert_eq!(w.dims(), (1, 3));
    }

    #[test]
    fn test_update_too_large_to_allocate() {
        let mut a = sample();
        let before = a.clone().materialised();
        assert!(matches!(
            a.update(i64::MAX, i64::MAX, 1.0),
            Err(ModelError::InvalidParameterValue { .. })
        ));
        assert!(a.update(1 << 40, 1 << 30, 1.0).is_err());
        assert!(a.update_linear(i64::MAX, 1.0).is_err());
        assert_eq!(a, before);

        let mut s = RealMatrix::sparse(2, 2);
        s.update(i64::MAX, 1, 4.0).unwrap();
        assert_eq!(s.rows(), i64::MAX as usize);
        assert_eq!(s.number_nonzeros(), 1);
    }

    #[test]
    fn test_sparse_handle() {
        let mut s = RealMatrix::sparse(3, 3);
        s.update(2, 3, 5.0).unwrap();
        assert_eq!(s.number_nonzeros(), 1);
        assert_eq!(s.transpose().at(3, 2).unwrap(), 5.0);
        assert_eq!(s.to_dense(), s);
        assert_eq!(s.to_dense().storage_kind(), StorageKind::Dense);
    }

    #[test]
    fn test_cross_kind_construction() {
        let i = IntegerMatrix::from_rows(&[vec![1, 0], vec![3, -2]]).unwrap();
        let r = RealMatrix::from_matrix(&i.transpose());
        assert_eq!(r.pending_transform(), Transform::TRANSPOSE);
        assert_eq!(r.at(1, 2).unwrap(), 3.0);

        let b = BooleanMatrix::from_matrix(&i);
        assert_eq!(b.column_major(), vec![true, true, false, true]);

        let c = complex_sample().scaled(Complex::new(0.0, 1.0));
        let demoted = RealMatrix::from_matrix(&c);
        assert_eq!(demoted.at(1, 1).unwrap(), -1.0);
    }

    #[test]
    fn test_diagonal() {
        let v = RealMatrix::row_vector(&[1.0, 2.0, 3.0]);
        let d = v.diagonal().unwrap();
        assert_eq!(d.dims(), (3, 3));
        assert_eq!(d.at(2, 2).unwrap(), 2.0);
        assert_eq!(d.diagonal_entries(), v.transpose());
        assert!(sample().diagonal().is_err());
    }

    #[test]
    fn test_divided_by() {
        let i = IntegerMatrix::row_vector(&[7, -9]);
        assert_eq!(i.divided_by(2).unwrap().column_major(), vec![3, -4]);
        assert!(i.divided_by(0).is_err());
        let r = sample().divided_by(2.0).unwrap();
        assert_eq!(r.at(2, 3).unwrap(), 3.0);
    }

    #[test]
    fn test_relative_order() {
        let a = sample();
        assert_eq!(a.relative_order(&a.materialised()), Ordering::Equal);
        assert_eq!(a.relative_order(&a.to_sparse()), Ordering::Less);
    }

    #[test]
    fn test_display() {
        let m = RealMatrix::from_rows(&[vec![0.5, 2.0], vec![-1.0, 0.1 + 0.2]]).unwrap();
        assert_eq!(m.to_string(), "[[0.5, 2], [-1, 0.3]]");
    }
}
