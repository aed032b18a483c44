//! Bridge to nalgebra for the numerical kernels
//!
//! Numerical algorithms run on real and complex handles. Boolean and integer
//! handles reach them through [`Matrix::to_kind`].

use crate::handle::Matrix;
use crate::store::{DenseStore, Store};
use nalgebra::{ComplexField, DMatrix};
use tessera_core::{Complex, Element, ModelError, ModelResult};

/// Element kinds the linear-algebra kernels accept
pub trait Numeric: Element + ComplexField<RealField = f64> {}

impl Numeric for f64 {}
impl Numeric for Complex {}

impl<T: Numeric> Matrix<T> {
    /// Logical matrix as an nalgebra matrix
    pub fn to_dmatrix(&self) -> DMatrix<T> {
        DMatrix::from_column_slice(self.rows(), self.cols(), &self.column_major())
    }

    pub fn from_dmatrix(m: &DMatrix<T>) -> Self {
        Self::from_store(Store::Dense(DenseStore::from_fn(m.nrows(), m.ncols(), |r, c| m[(r, c)])))
    }

    pub(crate) fn require_square(&self, operation: &str) -> ModelResult<()> {
        if !self.is_square() {
            return Err(ModelError::dimensions(operation, self.dims(), (self.rows(), self.rows())));
        }
        Ok(())
    }

    // ========== Inverse, determinant, rank ==========

    /// Inverse and a flag that is false when the matrix is singular
    pub fn inverse(&self) -> ModelResult<(Self, bool)> {
        self.require_square("inverse")?;
        let n = self.rows();
        match self.to_dmatrix().try_inverse() {
            Some(inv) => Ok((Self::from_dmatrix(&inv), true)),
            None => Ok((Self::new(n, n), false)),
        }
    }

    pub fn determinant(&self) -> ModelResult<T> {
        self.require_square("determinant")?;
        if self.is_empty() {
            return Ok(<T as Element>::one());
        }
        Ok(self.to_dmatrix().determinant())
    }

    /// Number of singular values above `epsilon`; negative selects the
    /// configured default tolerance
    pub fn rank(&self, epsilon: f64) -> usize {
        if self.is_empty() {
            return 0;
        }
        let eps = tessera_core::config::current().tolerance(epsilon);
        self.to_dmatrix().rank(eps)
    }
}
