//! Matrix norms and condition number

use crate::handle::Matrix;
use crate::numeric::Numeric;
use tessera_core::{Element, ModelError, ModelResult};

impl<T: Element> Matrix<T> {
    fn magnitudes(&self) -> impl Iterator<Item = ((usize, usize), f64)> {
        self.logical_nonzeros().into_iter().map(|(k, v)| (k, v.magnitude()))
    }

    /// Entry-wise p-norm for `p ≥ 1`; `p = ∞` gives the largest magnitude
    pub fn p_norm(&self, p: f64) -> ModelResult<f64> {
        if p.is_nan() || p < 1.0 {
            return Err(ModelError::parameter("p", format!("{} is not >= 1", p)));
        }
        if p.is_infinite() {
            return Ok(self.magnitudes().map(|(_, m)| m).fold(0.0, f64::max));
        }
        if p == 1.0 {
            return Ok(self.magnitudes().map(|(_, m)| m).sum());
        }
        if p == 2.0 {
            return Ok(self.euclidean_norm());
        }
        let sum: f64 = self.magnitudes().map(|(_, m)| m.powf(p)).sum();
        Ok(sum.powf(1.0 / p))
    }

    /// `p_norm(2)`
    pub fn euclidean_norm(&self) -> f64 {
        // scaled to avoid overflow in the squares
        let scale = self.magnitudes().map(|(_, m)| m).fold(0.0, f64::max);
        if scale == 0.0 || !scale.is_finite() {
            return scale;
        }
        let sum: f64 = self.magnitudes().map(|(_, m)| (m / scale).powi(2)).sum();
        scale * sum.sqrt()
    }

    /// Largest column sum of magnitudes
    pub fn one_norm(&self) -> f64 {
        let mut sums = vec![0.0; self.cols()];
        for ((_, c), m) in self.magnitudes() {
            sums[c] += m;
        }
        sums.into_iter().fold(0.0, f64::max)
    }

    /// Largest row sum of magnitudes
    pub fn infinity_norm(&self) -> f64 {
        let mut sums = vec![0.0; self.rows()];
        for ((r, _), m) in self.magnitudes() {
            sums[r] += m;
        }
        sums.into_iter().fold(0.0, f64::max)
    }
}

impl<T: Numeric> Matrix<T> {
    /// `‖A⁻¹‖₂·‖A‖₂`; infinite for singular matrices
    pub fn condition_number(&self) -> ModelResult<f64> {
        let (inverse, nonsingular) = self.inverse()?;
        if !nonsingular {
            return Ok(f64::INFINITY);
        }
        Ok(inverse.euclidean_norm() * self.euclidean_norm())
    }
}

#[cfg(test)]
mod tests {
    use crate::handle::{ComplexMatrix, IntegerMatrix, RealMatrix};
    use tessera_core::Complex;

    fn sample() -> RealMatrix {
        RealMatrix::from_rows(&[vec![1.0, -2.0], vec![-3.0, 4.0]]).unwrap()
    }

    #[test]
    fn test_norms() {
        let a = sample();
        assert_eq!(a.one_norm(), 6.0);
        assert_eq!(a.infinity_norm(), 7.0);
        assert_eq!(a.p_norm(1.0).unwrap(), 10.0);
        assert_eq!(a.p_norm(f64::INFINITY).unwrap(), 4.0);
        assert!((a.euclidean_norm() - 30.0f64.sqrt()).abs() < 1e-12);
        assert!((a.p_norm(3.0).unwrap() - 100.0f64.cbrt()).abs() < 1e-12);
        assert!(a.p_norm(0.5).is_err());
    }

    #[test]
    fn test_norms_follow_lazy_state() {
        let a = sample();
        assert_eq!(a.transpose().one_norm(), a.infinity_norm());
        assert_eq!(a.scaled(-2.0).to_sparse().one_norm(), 12.0);
        let z = ComplexMatrix::row_vector(&[Complex::new(3.0, 4.0)]);
        assert_eq!(z.euclidean_norm(), 5.0);
        assert_eq!(IntegerMatrix::new(0, 0).one_norm(), 0.0);
    }

    #[test]
    fn test_condition_number() {
        assert!((RealMatrix::identity(3).condition_number().unwrap() - 3.0).abs() < 1e-12);
        let singular = RealMatrix::from_rows(&[vec![1.0, 2.0], vec![2.0, 4.0]]).unwrap();
        assert_eq!(singular.condition_number().unwrap(), f64::INFINITY);
    }
}
