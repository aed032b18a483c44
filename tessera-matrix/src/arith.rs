//! Matrix arithmetic
//!
//! Addition and multiplication read both operands through their pending
//! transform and scalar, so they never materialise the inputs. Every binary
//! kernel dispatches on the storage pair: sparse with sparse yields a sparse
//! result, anything involving a dense operand yields a dense one.
//!
//! Operators also accept operands of different element kinds. The narrower
//! operand is widened to the joined kind first, keeping its pending state.

use crate::handle::Matrix;
use crate::store::{DenseStore, SparseStore, Store};
use std::collections::BTreeMap;
use std::ops::{Add, Mul, Neg, Sub};
use tessera_core::{Complex, Element, ModelError, ModelResult, StorageKind};

fn check_same_dims<T: Element>(op: &str, a: &Matrix<T>, b: &Matrix<T>) -> ModelResult<()> {
    if a.dims() != b.dims() {
        return Err(ModelError::dimensions(op, a.dims(), b.dims()));
    }
    Ok(())
}

fn check_matmul_dims<T: Element>(a: &Matrix<T>, b: &Matrix<T>) -> ModelResult<()> {
    if a.cols() != b.rows() {
        return Err(ModelError::dimensions("multiply", a.dims(), b.dims()));
    }
    Ok(())
}

impl<T: Element> Matrix<T> {
    // ========== Element-wise combination ==========

    /// Combine two equally shaped matrices with `f`, which must map
    /// `(0, 0)` to `0`.
    pub(crate) fn zip_with(&self, other: &Matrix<T>, op: &str, f: impl Fn(T, T) -> T) -> ModelResult<Self> {
        check_same_dims(op, self, other)?;
        let (rows, cols) = self.dims();
        let store = match (self.storage_kind(), other.storage_kind()) {
            (StorageKind::Sparse, StorageKind::Sparse) => {
                let a = self.logical_nonzeros();
                let b = other.logical_nonzeros();
                let mut out = BTreeMap::new();
                for key in a.keys().chain(b.keys()) {
                    out.entry(*key).or_insert_with(|| {
                        let x = a.get(key).copied().unwrap_or_else(T::zero);
                        let y = b.get(key).copied().unwrap_or_else(T::zero);
                        f(x, y)
                    });
                }
                Store::Sparse(SparseStore::from_entries(rows, cols, out))
            }
            _ => Store::Dense(DenseStore::from_fn(rows, cols, |r, c| f(self.entry(r, c), other.entry(r, c)))),
        };
        Ok(Self::from_store(store))
    }

    pub fn add_matrix(&self, other: &Matrix<T>) -> ModelResult<Self> {
        self.zip_with(other, "add", T::plus)
    }

    pub fn sub_matrix(&self, other: &Matrix<T>) -> ModelResult<Self> {
        self.zip_with(other, "subtract", T::minus)
    }

    // ========== Multiplication ==========

    /// Matrix product with both operands' pending state fused in
    pub fn matmul(&self, other: &Matrix<T>) -> ModelResult<Self> {
        check_matmul_dims(self, other)?;
        let (m, n) = (self.rows(), other.cols());
        let inner = self.cols();

        let store = match (self.storage_kind(), other.storage_kind()) {
            (StorageKind::Sparse, StorageKind::Sparse) => {
                let mut b_rows: Vec<Vec<(usize, T)>> = vec![Vec::new(); inner];
                for ((k, j), w) in other.logical_nonzeros() {
                    b_rows[k].push((j, w));
                }
                let mut acc: BTreeMap<(usize, usize), T> = BTreeMap::new();
                for ((i, k), v) in self.logical_nonzeros() {
                    for &(j, w) in &b_rows[k] {
                        let slot = acc.entry((i, j)).or_insert_with(T::zero);
                        *slot = slot.plus(v.times(w));
                    }
                }
                Store::Sparse(SparseStore::from_entries(m, n, acc))
            }
            (StorageKind::Sparse, StorageKind::Dense) => {
                let mut out = vec![T::zero(); m * n];
                for ((i, k), v) in self.logical_nonzeros() {
                    for j in 0..n {
                        let slot = &mut out[j * m + i];
                        *slot = slot.plus(v.times(other.entry(k, j)));
                    }
                }
                Store::Dense(DenseStore::from_column_major(m, n, out)?)
            }
            (StorageKind::Dense, StorageKind::Sparse) => {
                let mut out = vec![T::zero(); m * n];
                for ((k, j), w) in other.logical_nonzeros() {
                    for i in 0..m {
                        let slot = &mut out[j * m + i];
                        *slot = slot.plus(self.entry(i, k).times(w));
                    }
                }
                Store::Dense(DenseStore::from_column_major(m, n, out)?)
            }
            (StorageKind::Dense, StorageKind::Dense) => {
                let a = self.column_major();
                let b = other.column_major();
                let mut out = vec![T::zero(); m * n];
                for j in 0..n {
                    for k in 0..inner {
                        let w = b[j * inner + k];
                        if w.is_zero() {
                            continue;
                        }
                        for i in 0..m {
                            let slot = &mut out[j * m + i];
                            *slot = slot.plus(a[k * m + i].times(w));
                        }
                    }
                }
                Store::Dense(DenseStore::from_column_major(m, n, out)?)
            }
        };
        Ok(Self::from_store(store))
    }
}

// ============================================================================
// Operator overloads
// ============================================================================

impl<T: Element> Add for &Matrix<T> {
    type Output = ModelResult<Matrix<T>>;

    fn add(self, rhs: Self) -> Self::Output {
        self.add_matrix(rhs)
    }
}

impl<T: Element> Sub for &Matrix<T> {
    type Output = ModelResult<Matrix<T>>;

    fn sub(self, rhs: Self) -> Self::Output {
        self.sub_matrix(rhs)
    }
}

impl<T: Element> Mul for &Matrix<T> {
    type Output = ModelResult<Matrix<T>>;

    fn mul(self, rhs: Self) -> Self::Output {
        self.matmul(rhs)
    }
}

/// Widen `m` to the joined kind `U`
fn promoted<S: Element, U: Element>(m: &Matrix<S>) -> Matrix<U> {
    debug_assert_eq!(U::KIND, S::KIND.join(U::KIND));
    m.to_kind::<U>()
}

macro_rules! promoted_binary_op {
    ($trait:ident, $method:ident, $kernel:ident, $lesser:ty, $greater:ty) => {
        impl $trait<&Matrix<$greater>> for &Matrix<$lesser> {
            type Output = ModelResult<Matrix<$greater>>;

            fn $method(self, rhs: &Matrix<$greater>) -> Self::Output {
                promoted::<$lesser, $greater>(self).$kernel(rhs)
            }
        }

        impl $trait<&Matrix<$lesser>> for &Matrix<$greater> {
            type Output = ModelResult<Matrix<$greater>>;

            fn $method(self, rhs: &Matrix<$lesser>) -> Self::Output {
                self.$kernel(&promoted::<$lesser, $greater>(rhs))
            }
        }
    };
}

macro_rules! promoted_binary_ops {
    ($($lesser:ty => $greater:ty),* $(,)?) => {
        $(
            promoted_binary_op!(Add, add, add_matrix, $lesser, $greater);
            promoted_binary_op!(Sub, sub, sub_matrix, $lesser, $greater);
            promoted_binary_op!(Mul, mul, matmul, $lesser, $greater);
        )*
    };
}

promoted_binary_ops! {
    bool => i64,
    bool => f64,
    bool => Complex,
    i64 => f64,
    i64 => Complex,
    f64 => Complex,
}

impl<T: Element> Mul<T> for &Matrix<T> {
    type Output = Matrix<T>;

    fn mul(self, rhs: T) -> Matrix<T> {
        self.scaled(rhs)
    }
}

impl<T: Element> Mul<T> for Matrix<T> {
    type Output = Matrix<T>;

    fn mul(self, rhs: T) -> Matrix<T> {
        self.scaled(rhs)
    }
}

impl<T: Element> Neg for &Matrix<T> {
    type Output = Matrix<T>;

    fn neg(self) -> Matrix<T> {
        self.scaled(T::one().negated())
    }
}

impl<T: Element> Neg for Matrix<T> {
    type Output = Matrix<T>;

    fn neg(self) -> Matrix<T> {
        -&self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::{BooleanMatrix, ComplexMatrix, IntegerMatrix, RealMatrix};
    use tessera_core::Complex;

    fn approx_eq(a: &RealMatrix, b: &RealMatrix, tol: f64) -> bool {
        a.dims() == b.dims()
            && a.column_major()
                .iter()
                .zip(b.column_major())
                .all(|(x, y)| (x - y).abs() <= tol)
    }

    fn a() -> RealMatrix {
        RealMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap()
    }

    fn b() -> RealMatrix {
        RealMatrix::from_rows(&[vec![0.5, -1.0, 2.0], vec![1.5, 0.0, -3.0]]).unwrap()
    }

    #[test]
    fn test_identity_and_zero() {
        let m = a();
        assert_eq!((&m * &RealMatrix::identity(2)).unwrap(), m);
        assert_eq!((&RealMatrix::identity(3) * &m).unwrap(), m);
        assert_eq!((&m + &RealMatrix::new(3, 2)).unwrap(), m);
    }

    #[test]
    fn test_product_transpose_rule() {
        let ab = (&a() * &b()).unwrap();
        let bt_at = (&b().transpose() * &a().transpose()).unwrap();
        assert!(approx_eq(&ab.transpose().materialised(), &bt_at, 1e-12));
    }

    #[test]
    fn test_associativity() {
        let c = RealMatrix::from_rows(&[vec![1.0, 0.0], vec![2.0, -1.0], vec![0.0, 4.0]]).unwrap();
        let left = (&(&a() * &b()).unwrap() * &c).unwrap();
        let right = (&a() * &(&b() * &c).unwrap()).unwrap();
        assert!(approx_eq(&left, &right, 1e-12));
    }

    #[test]
    fn test_fused_matches_materialised() {
        let lazy = a().transpose().scaled(2.5);
        let eager = lazy.materialised();
        let rhs = a().scaled(-1.0);
        assert_eq!((&lazy * &rhs).unwrap(), (&eager * &rhs.materialised()).unwrap());
        assert_eq!((&lazy + &b()).unwrap(), (&eager + &b()).unwrap());
    }

    #[test]
    fn test_complex_adjoint_product() {
        let x = ComplexMatrix::from_rows(&[
            vec![Complex::new(1.0, 2.0), Complex::new(0.0, -1.0)],
            vec![Complex::new(3.0, 0.0), Complex::new(1.0, 1.0)],
        ])
        .unwrap();
        let y = x.scaled(Complex::new(0.5, -2.0)).transpose();
        let lhs = (&x * &y).unwrap().adjoint().materialised();
        let rhs = (&y.adjoint() * &x.adjoint()).unwrap();
        for (p, q) in lhs.column_major().iter().zip(rhs.column_major()) {
            assert!((p - q).norm() < 1e-12);
        }
    }

    #[test]
    fn test_storage_dispatch() {
        let dense = a();
        let sparse = a().to_sparse();
        let rhs = b().to_sparse();
        let ss = (&sparse * &rhs).unwrap();
        assert_eq!(ss.storage_kind(), StorageKind::Sparse);
        let expected = (&dense * &b()).unwrap();
        assert_eq!(ss, expected);
        assert_eq!((&sparse * &b()).unwrap(), expected);
        assert_eq!((&dense * &rhs).unwrap(), expected);
        assert_eq!((&sparse - &sparse).unwrap().number_nonzeros(), 0);
    }

    #[test]
    fn test_dimension_mismatch() {
        assert!(matches!(&a() * &a(), Err(ModelError::InvalidMatrixDimensions { .. })));
        assert!((&a() + &b()).is_err());
    }

    #[test]
    fn test_negation_and_scaling() {
        let m = -&a();
        assert_eq!(m.at(3, 2).unwrap(), -6.0);
        assert_eq!((a() * 2.0).at(1, 2).unwrap(), 4.0);
    }

    #[test]
    fn test_boolean_and_integer_kinds() {
        let x = BooleanMatrix::from_rows(&[vec![true, true], vec![false, true]]).unwrap();
        // GF(2): [[1,1],[0,1]]^2 = [[1,0],[0,1]]
        assert_eq!((&x * &x).unwrap(), BooleanMatrix::identity(2));

        let big = IntegerMatrix::row_vector(&[i64::MAX]);
        assert_eq!((&big + &IntegerMatrix::row_vector(&[1])).unwrap().at(1, 1).unwrap(), i64::MIN);
    }

    #[test]
    fn test_mixed_kinds_promote() {
        let ints = IntegerMatrix::from_rows(&[vec![1, 2], vec![3, 4], vec![5, 6]]).unwrap();
        let sum: RealMatrix = (&a().scaled(0.5) + &ints).unwrap();
        assert_eq!(sum.to_rows(), vec![vec![1.5, 3.0], vec![4.5, 6.0], vec![7.5, 9.0]]);
        let diff: RealMatrix = (&ints - &a()).unwrap();
        assert_eq!(diff.number_nonzeros(), 0);

        // lazy transpose survives the widening
        let product: RealMatrix = (&ints.transpose() * &a()).unwrap();
        let expected = (&a().transpose() * &a()).unwrap();
        assert_eq!(product, expected);

        let mask = BooleanMatrix::from_rows(&[vec![true, false], vec![false, true]]).unwrap();
        let z = ComplexMatrix::from_rows(&[
            vec![Complex::new(1.0, 1.0), Complex::new(2.0, 0.0)],
            vec![Complex::new(0.0, -3.0), Complex::new(4.0, 0.5)],
        ])
        .unwrap();
        let masked: ComplexMatrix = (&mask * &z).unwrap();
        assert_eq!(masked, z);
        assert_eq!((&z * &mask).unwrap(), z);

        let counts: IntegerMatrix = (&mask + &IntegerMatrix::identity(2)).unwrap();
        assert_eq!(counts.to_rows(), vec![vec![2, 0], vec![0, 2]]);

        assert!(matches!(&ints * &a(), Err(ModelError::InvalidMatrixDimensions { .. })));
    }
}
