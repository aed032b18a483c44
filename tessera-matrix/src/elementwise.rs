//! Element-wise maps, Hadamard and Kronecker products, rounding

use crate::handle::{ComplexMatrix, IntegerMatrix, Matrix, RealMatrix};
use crate::store::{DenseStore, SparseStore, Store};
use tessera_core::{Element, ModelResult, StorageKind};

impl<T: Element> Matrix<T> {
    /// Map every logical element; `f` must send zero to zero
    pub fn map_entries<U: Element>(&self, f: impl Fn(T) -> U) -> Matrix<U> {
        Matrix::from_store(self.materialised().store().map(f))
    }

    /// Element-wise product
    pub fn hadamard(&self, other: &Matrix<T>) -> ModelResult<Self> {
        self.zip_with(other, "hadamard", T::times)
    }

    /// Kronecker product `self ⊗ other`
    pub fn kronecker(&self, other: &Matrix<T>) -> Self {
        let (m, n) = self.dims();
        let (p, q) = other.dims();
        let store = match (self.storage_kind(), other.storage_kind()) {
            (StorageKind::Sparse, StorageKind::Sparse) => {
                let b = other.logical_nonzeros();
                let entries = self.logical_nonzeros().into_iter().flat_map(|((i, j), x)| {
                    b.iter()
                        .map(move |(&(k, l), &y)| ((i * p + k, j * q + l), x.times(y)))
                        .collect::<Vec<_>>()
                });
                Store::Sparse(SparseStore::from_entries(m * p, n * q, entries))
            }
            _ => Store::Dense(DenseStore::from_fn(m * p, n * q, |r, c| {
                self.entry(r / p, c / q).times(other.entry(r % p, c % q))
            })),
        };
        Self::from_store(store)
    }

    /// Absolute value of every element
    pub fn abs_entries(&self) -> RealMatrix {
        self.map_entries(T::magnitude)
    }
}

impl ComplexMatrix {
    pub fn real_part(&self) -> RealMatrix {
        self.map_entries(|z| z.re)
    }

    pub fn imag_part(&self) -> RealMatrix {
        self.map_entries(|z| z.im)
    }
}

// ============================================================================
// Rounding
// ============================================================================

/// Round half away from zero
fn nint(x: f64) -> f64 {
    x.round()
}

fn to_integer(x: f64) -> i64 {
    // saturating; NaN becomes 0
    x as i64
}

impl RealMatrix {
    pub fn floor(&self) -> RealMatrix {
        self.map_entries(f64::floor)
    }

    pub fn ceil(&self) -> RealMatrix {
        self.map_entries(f64::ceil)
    }

    pub fn nint(&self) -> RealMatrix {
        self.map_entries(nint)
    }

    pub fn truncate_to_integer(&self) -> IntegerMatrix {
        self.map_entries(|x| to_integer(x.trunc()))
    }

    pub fn floor_to_integer(&self) -> IntegerMatrix {
        self.map_entries(|x| to_integer(x.floor()))
    }

    pub fn ceil_to_integer(&self) -> IntegerMatrix {
        self.map_entries(|x| to_integer(x.ceil()))
    }

    pub fn nint_to_integer(&self) -> IntegerMatrix {
        self.map_entries(|x| to_integer(nint(x)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::Complex;

    #[test]
    fn test_hadamard() {
        let a = IntegerMatrix::from_rows(&[vec![1, 2], vec![3, 4]]).unwrap();
        let h = a.hadamard(&a.transpose()).unwrap();
        assert_eq!(h.to_rows(), vec![vec![1, 6], vec![6, 16]]);
        assert!(a.hadamard(&IntegerMatrix::new(1, 2)).is_err());
    }

    #[test]
    fn test_kronecker() {
        let a = IntegerMatrix::from_rows(&[vec![1, 2], vec![3, 4]]).unwrap();
        let b = IntegerMatrix::from_rows(&[vec![0, 5], vec![6, 7]]).unwrap();
        let k = a.kronecker(&b);
        assert_eq!(k.dims(), (4, 4));
        assert_eq!(k.to_rows()[0], vec![0, 5, 0, 10]);
        assert_eq!(k.to_rows()[3], vec![18, 21, 24, 28]);

        let sparse = a.to_sparse().kronecker(&b.to_sparse().scaled(2));
        assert_eq!(sparse.storage_kind(), StorageKind::Sparse);
        assert_eq!(sparse, a.kronecker(&b.scaled(2)));
    }

    #[test]
    fn test_rounding() {
        let r = RealMatrix::row_vector(&[-2.5, -0.4, 0.5, 1.7]);
        assert_eq!(r.floor().column_major(), vec![-3.0, -1.0, 0.0, 1.0]);
        assert_eq!(r.ceil().column_major(), vec![-2.0, -0.0, 1.0, 2.0]);
        assert_eq!(r.nint_to_integer().column_major(), vec![-3, 0, 1, 2]);
        assert_eq!(r.truncate_to_integer().column_major(), vec![-2, 0, 0, 1]);
        assert_eq!(r.floor_to_integer().column_major(), vec![-3, -1, 0, 1]);
        assert_eq!(r.ceil_to_integer().column_major(), vec![-2, 0, 1, 2]);
    }

    #[test]
    fn test_parts() {
        let z = ComplexMatrix::row_vector(&[Complex::new(3.0, -4.0), Complex::new(0.0, 1.0)]);
        assert_eq!(z.real_part().column_major(), vec![3.0, 0.0]);
        assert_eq!(z.conjugate().imag_part().column_major(), vec![4.0, -1.0]);
        assert_eq!(z.abs_entries().column_major(), vec![5.0, 1.0]);
    }
}
