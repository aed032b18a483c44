//! Structural predicates
//!
//! Tolerances are absolute; a negative tolerance selects the configured
//! default.

use crate::handle::Matrix;
use tessera_core::config;
use tessera_core::Element;

impl<T: Element> Matrix<T> {
    fn mirror_holds(&self, tolerance: f64, rule: impl Fn(T, T) -> T) -> bool {
        if !self.is_square() {
            return false;
        }
        let tol = config::current().tolerance(tolerance);
        let n = self.rows();
        for i in 0..n {
            for j in i..n {
                if rule(self.entry(i, j), self.entry(j, i)).magnitude() > tol {
                    return false;
                }
            }
        }
        true
    }

    /// `A == Aᵀ`
    pub fn is_symmetric(&self, tolerance: f64) -> bool {
        self.mirror_holds(tolerance, |a, b| a.minus(b))
    }

    /// `A == Aᴴ`
    pub fn is_hermitian(&self, tolerance: f64) -> bool {
        self.mirror_holds(tolerance, |a, b| a.minus(b.conjugated()))
    }

    /// `A == -Aᵀ`
    pub fn is_skew_symmetric(&self, tolerance: f64) -> bool {
        self.mirror_holds(tolerance, |a, b| a.plus(b))
    }

    /// `A == -Aᴴ`
    pub fn is_skew_hermitian(&self, tolerance: f64) -> bool {
        self.mirror_holds(tolerance, |a, b| a.plus(b.conjugated()))
    }

    /// `A·Aᴴ == Aᴴ·A`
    pub fn is_normal(&self, tolerance: f64) -> bool {
        if !self.is_square() {
            return false;
        }
        let tol = config::current().tolerance(tolerance);
        let adjoint = self.adjoint();
        match (self.matmul(&adjoint), adjoint.matmul(self)) {
            (Ok(left), Ok(right)) => left
                .column_major()
                .into_iter()
                .zip(right.column_major())
                .all(|(x, y)| x.minus(y).magnitude() <= tol),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::handle::{ComplexMatrix, IntegerMatrix, RealMatrix};
    use tessera_core::Complex;

    #[test]
    fn test_symmetric() {
        let m = RealMatrix::from_rows(&[vec![1.0, 2.0], vec![2.0, 3.0]]).unwrap();
        assert!(m.is_symmetric(0.0));
        assert!(m.is_normal(-1.0));
        let n = RealMatrix::from_rows(&[vec![1.0, 2.0], vec![2.0 + 1e-9, 3.0]]).unwrap();
        assert!(!n.is_symmetric(-1.0));
        assert!(n.is_symmetric(1e-6));
        assert!(!RealMatrix::new(2, 3).is_symmetric(1.0));
    }

    #[test]
    fn test_skew() {
        let m = IntegerMatrix::from_rows(&[vec![0, 2], vec![-2, 0]]).unwrap();
        assert!(m.is_skew_symmetric(0.0));
        assert!(!m.is_symmetric(0.0));
    }

    #[test]
    fn test_hermitian() {
        let h = ComplexMatrix::from_rows(&[
            vec![Complex::new(2.0, 0.0), Complex::new(1.0, -1.0)],
            vec![Complex::new(1.0, 1.0), Complex::new(3.0, 0.0)],
        ])
        .unwrap();
        assert!(h.is_hermitian(0.0));
        assert!(!h.is_symmetric(0.0));
        assert!(h.scaled(Complex::new(0.0, 1.0)).is_skew_hermitian(1e-15));
        assert!(h.is_normal(1e-12));
    }

    #[test]
    fn test_not_normal() {
        let m = RealMatrix::from_rows(&[vec![1.0, 1.0], vec![0.0, 1.0]]).unwrap();
        assert!(!m.is_normal(1e-12));
    }
}
