//! Matrix decompositions
//!
//! Every decomposition materialises its input first. Numerical failures
//! (singularity, non-convergence) are reported through the `success` or
//! `nonsingular` flag of the result rather than as errors.

use crate::handle::{ComplexMatrix, Matrix};
use crate::numeric::Numeric;
use nalgebra::linalg::{Cholesky, Hessenberg as NaHessenberg, Schur as NaSchur, SVD};
use nalgebra::{DMatrix, DVector};
use tessera_core::{config, Complex, Element, ModelResult};

/// `A = P·L·U`
#[derive(Debug, Clone)]
pub struct Plu<T: Element> {
    pub p: Matrix<T>,
    pub l: Matrix<T>,
    pub u: Matrix<T>,
    pub nonsingular: bool,
}

/// `A = U·S·Vᴴ` (thin)
#[derive(Debug, Clone)]
pub struct Svd<T: Element> {
    pub u: Matrix<T>,
    pub s: Matrix<T>,
    pub vh: Matrix<T>,
    pub success: bool,
}

/// `A = Q·R` (thin)
#[derive(Debug, Clone)]
pub struct Qr<T: Element> {
    pub q: Matrix<T>,
    pub r: Matrix<T>,
    pub success: bool,
}

/// `A = L·Q` (thin)
#[derive(Debug, Clone)]
pub struct Lq<T: Element> {
    pub l: Matrix<T>,
    pub q: Matrix<T>,
    pub success: bool,
}

/// `A = Q·H·Qᴴ` with `H` upper Hessenberg
#[derive(Debug, Clone)]
pub struct Hessenberg<T: Element> {
    pub q: Matrix<T>,
    pub h: Matrix<T>,
}

/// Complex Schur form `A = Q·U·Qᴴ`; `w` holds the diagonal of `U`
#[derive(Debug, Clone)]
pub struct Schur {
    pub q: ComplexMatrix,
    pub u: ComplexMatrix,
    pub w: ComplexMatrix,
    pub success: bool,
}

/// Eigenvalues (1×n row), the Schur factors they came from, and one unit
/// eigenvector per eigenvalue
#[derive(Debug, Clone)]
pub struct Eigen {
    pub values: ComplexMatrix,
    pub q: ComplexMatrix,
    pub u: ComplexMatrix,
    pub vectors: Vec<ComplexMatrix>,
    pub success: bool,
}

impl<T: Numeric> Matrix<T> {
    // ========== PLU ==========

    pub fn plu(&self) -> ModelResult<Plu<T>> {
        self.require_square("plu")?;
        let n = self.rows();
        if n == 0 {
            return Ok(Plu {
                p: Self::new(0, 0),
                l: Self::new(0, 0),
                u: Self::new(0, 0),
                nonsingular: true,
            });
        }
        let lu = self.to_dmatrix().lu();
        let nonsingular = lu.is_invertible();
        let (perm, l, u) = lu.unpack();
        // perm applied to the identity gives P' with P'·A = L·U
        let mut p = DMatrix::<T>::identity(n, n);
        perm.permute_rows(&mut p);
        Ok(Plu {
            p: Self::from_dmatrix(&p.transpose()),
            l: Self::from_dmatrix(&l),
            u: Self::from_dmatrix(&u),
            nonsingular,
        })
    }

    // ========== SVD ==========

    pub fn svd(&self) -> Svd<T> {
        let (rows, cols) = self.dims();
        let k = rows.min(cols);
        let failed = || Svd {
            u: Self::new(rows, k),
            s: Self::new(k, k),
            vh: Self::new(k, cols),
            success: false,
        };
        if k == 0 {
            return Svd { success: true, ..failed() };
        }
        let cfg = config::current();
        let Some(svd) = SVD::try_new(self.to_dmatrix(), true, true, cfg.convergence_epsilon, cfg.iteration_limit) else {
            tracing::warn!(rows, cols, "svd did not converge");
            return failed();
        };
        let (Some(u), Some(vh)) = (svd.u.as_ref(), svd.v_t.as_ref()) else {
            return failed();
        };
        let sigma: Vec<T> = svd.singular_values.iter().map(|&s| T::from_real(s)).collect();
        Svd {
            u: Self::from_dmatrix(u),
            s: Self::column_vector(&sigma).diagonal().unwrap_or_else(|_| Self::new(k, k)),
            vh: Self::from_dmatrix(vh),
            success: true,
        }
    }

    // ========== QR / LQ ==========

    pub fn qr(&self) -> Qr<T> {
        if self.is_empty() {
            let k = self.rows().min(self.cols());
            return Qr {
                q: Self::new(self.rows(), k),
                r: Self::new(k, self.cols()),
                success: true,
            };
        }
        let qr = self.to_dmatrix().qr();
        Qr {
            q: Self::from_dmatrix(&qr.q()),
            r: Self::from_dmatrix(&qr.r()),
            success: true,
        }
    }

    /// From the QR of the adjoint: `Aᴴ = Q₁R₁` gives `A = R₁ᴴ·Q₁ᴴ`
    pub fn lq(&self) -> Lq<T> {
        let qr = self.adjoint().qr();
        Lq {
            l: qr.r.adjoint().materialised(),
            q: qr.q.adjoint().materialised(),
            success: qr.success,
        }
    }

    // ========== Cholesky ==========

    /// Lower factor `L` with `A = L·Lᴴ`; empty when `A` is not Hermitian
    /// positive definite
    pub fn cholesky(&self) -> Self {
        // relative to the matrix scale; only the lower triangle is factored
        let tolerance = config::current().default_tolerance * self.infinity_norm().max(1.0);
        if !self.is_hermitian(tolerance) {
            return Self::new(0, 0);
        }
        if self.is_empty() {
            return Self::new(0, 0);
        }
        match Cholesky::new(self.to_dmatrix()) {
            Some(chol) => Self::from_dmatrix(&chol.l()),
            None => {
                tracing::warn!(n = self.rows(), "cholesky: matrix is not positive definite");
                Self::new(0, 0)
            }
        }
    }

    /// Upper factor `U = Lᴴ` with `A = Uᴴ·U`
    pub fn upper_cholesky(&self) -> Self {
        self.cholesky().adjoint().materialised()
    }

    // ========== Hessenberg ==========

    pub fn hessenberg(&self) -> ModelResult<Hessenberg<T>> {
        self.require_square("hessenberg")?;
        if self.is_empty() {
            return Ok(Hessenberg {
                q: Self::new(0, 0),
                h: Self::new(0, 0),
            });
        }
        let (q, h) = NaHessenberg::new(self.to_dmatrix()).unpack();
        Ok(Hessenberg {
            q: Self::from_dmatrix(&q),
            h: Self::from_dmatrix(&h),
        })
    }

    // ========== Schur / eigen ==========

    /// Complex Schur decomposition; real inputs are promoted
    pub fn schur(&self) -> ModelResult<Schur> {
        self.require_square("schur")?;
        complex_schur(&self.to_kind::<Complex>())
    }

    /// Eigenvalues and eigenvectors. Right eigenvectors satisfy `A·v = λ·v`;
    /// left ones satisfy `vᴴ·A = λ·vᴴ`.
    pub fn eigenvectors(&self, right: bool) -> ModelResult<Eigen> {
        self.require_square("eigenvectors")?;
        let promoted = self.to_kind::<Complex>();
        let source = if right { promoted } else { promoted.adjoint() };
        let schur = complex_schur(&source)?;
        let n = source.rows();

        let t = schur.u.to_dmatrix();
        let q = schur.q.to_dmatrix();
        let scale = t.iter().map(|z| z.norm()).fold(0.0, f64::max);
        let small = (f64::EPSILON * scale).max(f64::MIN_POSITIVE);

        let mut vectors = Vec::with_capacity(n);
        for k in 0..n {
            let lambda = t[(k, k)];
            let mut y = DVector::<Complex>::zeros(n);
            y[k] = Complex::new(1.0, 0.0);
            for i in (0..k).rev() {
                let mut sum = Complex::new(0.0, 0.0);
                for j in i + 1..=k {
                    sum += t[(i, j)] * y[j];
                }
                let mut d = t[(i, i)] - lambda;
                if d.norm() < small {
                    d = Complex::new(small, 0.0);
                }
                y[i] = -sum / d;
            }
            let v = (&q * y).normalize();
            vectors.push(ComplexMatrix::column_vector(v.as_slice()));
        }

        let diag = schur.w.column_major();
        let values: Vec<Complex> = if right {
            diag
        } else {
            diag.iter().map(|z| z.conj()).collect()
        };
        Ok(Eigen {
            values: ComplexMatrix::row_vector(&values),
            q: schur.q,
            u: schur.u,
            vectors,
            success: schur.success,
        })
    }
}

fn complex_schur(m: &ComplexMatrix) -> ModelResult<Schur> {
    let n = m.rows();
    if n == 0 {
        return Ok(Schur {
            q: ComplexMatrix::new(0, 0),
            u: ComplexMatrix::new(0, 0),
            w: ComplexMatrix::new(0, 1),
            success: true,
        });
    }
    let cfg = config::current();
    match NaSchur::try_new(m.to_dmatrix(), cfg.convergence_epsilon, cfg.iteration_limit) {
        Some(schur) => {
            let (q, mut u) = schur.unpack();
            // clear round-off below the diagonal
            for c in 0..n {
                for r in c + 1..n {
                    u[(r, c)] = Complex::new(0.0, 0.0);
                }
            }
            let u = ComplexMatrix::from_dmatrix(&u);
            Ok(Schur {
                q: ComplexMatrix::from_dmatrix(&q),
                w: u.diagonal_entries(),
                u,
                success: true,
            })
        }
        None => {
            tracing::warn!(n, "schur decomposition did not converge");
            Ok(Schur {
                q: ComplexMatrix::new(n, n),
                u: ComplexMatrix::new(n, n),
                w: ComplexMatrix::new(n, 1),
                success: false,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::RealMatrix;

    fn approx_eq_real(a: &RealMatrix, b: &RealMatrix, tol: f64) -> bool {
        a.dims() == b.dims()
            && a.column_major()
                .iter()
                .zip(b.column_major())
                .all(|(x, y)| (x - y).abs() <= tol)
    }

    fn approx_eq_complex(a: &ComplexMatrix, b: &ComplexMatrix, tol: f64) -> bool {
        a.dims() == b.dims()
            && a.column_major()
                .iter()
                .zip(b.column_major())
                .all(|(x, y)| (x - y).norm() <= tol)
    }

    fn product(parts: &[&RealMatrix]) -> RealMatrix {
        parts[1..]
            .iter()
            .fold(parts[0].clone(), |acc, m| acc.matmul(m).unwrap())
    }

    fn sample() -> RealMatrix {
        RealMatrix::from_rows(&[
            vec![4.0, 1.0, -2.0],
            vec![1.0, 2.0, 0.5],
            vec![3.0, -1.0, 5.0],
        ])
        .unwrap()
    }

    fn hermitian() -> ComplexMatrix {
        ComplexMatrix::from_rows(&[
            vec![Complex::new(4.0, 0.0), Complex::new(1.0, -1.0)],
            vec![Complex::new(1.0, 1.0), Complex::new(3.0, 0.0)],
        ])
        .unwrap()
    }

    #[test]
    fn test_plu_reconstruction() {
        let a = RealMatrix::from_rows(&[vec![2.0, 1.0], vec![4.0, 3.0]]).unwrap();
        let plu = a.plu().unwrap();
        assert!(plu.nonsingular);
        assert!(approx_eq_real(&product(&[&plu.p, &plu.l, &plu.u]), &a, 1e-12));
        assert_eq!(plu.l.at(1, 1).unwrap(), 1.0);
    }

    #[test]
    fn test_plu_singular_flag() {
        let a = RealMatrix::from_rows(&[vec![1.0, 2.0], vec![2.0, 4.0]]).unwrap();
        assert!(!a.plu().unwrap().nonsingular);
    }

    #[test]
    fn test_svd_reconstruction() {
        let a = RealMatrix::from_rows(&[vec![3.0, 2.0, 2.0], vec![2.0, 3.0, -2.0]]).unwrap();
        let svd = a.svd();
        assert!(svd.success);
        assert_eq!(svd.s.dims(), (2, 2));
        assert!(approx_eq_real(&product(&[&svd.u, &svd.s, &svd.vh]), &a, 1e-10));
    }

    #[test]
    fn test_qr_and_lq() {
        let a = sample();
        let qr = a.qr();
        assert!(approx_eq_real(&product(&[&qr.q, &qr.r]), &a, 1e-12));
        assert!(qr.r.at(3, 1).unwrap().abs() < 1e-12);

        let wide = RealMatrix::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        let lq = wide.lq();
        assert_eq!(lq.l.dims(), (2, 2));
        assert!(approx_eq_real(&product(&[&lq.l, &lq.q]), &wide, 1e-12));
        assert!(lq.l.at(1, 2).unwrap().abs() < 1e-12);
    }

    #[test]
    fn test_cholesky() {
        let h = hermitian();
        let l = h.cholesky();
        assert!(approx_eq_complex(&l.matmul(&l.adjoint()).unwrap(), &h, 1e-12));
        let u = h.upper_cholesky();
        assert!(approx_eq_complex(&u.adjoint().matmul(&u).unwrap(), &h, 1e-12));
        assert!(sample().cholesky().is_empty());
    }

    #[test]
    fn test_cholesky_tolerance_scales_with_norm() {
        let near = RealMatrix::from_rows(&[vec![4.0e6, 2.0e6 + 1.0e-8], vec![2.0e6, 3.0e6]]).unwrap();
        assert!(!near.is_hermitian(-1.0));
        let l = near.cholesky();
        assert_eq!(l.dims(), (2, 2));
        assert!((l.at(1, 1).unwrap() - 2.0e3).abs() < 1e-9);
        assert!((l.at(2, 1).unwrap() - 1.0e3).abs() < 1e-9);

        let skewed = RealMatrix::from_rows(&[vec![4.0e6, 2.0e6], vec![1.0e6, 3.0e6]]).unwrap();
        assert!(skewed.cholesky().is_empty());
    }

    #[test]
    fn test_hessenberg() {
        let a = sample();
        let hess = a.hessenberg().unwrap();
        let back = product(&[&hess.q, &hess.h, &hess.q.transpose()]);
        assert!(approx_eq_real(&back, &a, 1e-12));
        assert!(hess.h.at(3, 1).unwrap().abs() < 1e-12);
    }

    #[test]
    fn test_schur() {
        let a = sample();
        let schur = a.schur().unwrap();
        assert!(schur.success);
        let back = schur.q.matmul(&schur.u).unwrap().matmul(&schur.q.adjoint()).unwrap();
        assert!(approx_eq_complex(&back, &a.to_kind::<Complex>(), 1e-10));
        assert_eq!(schur.w.dims(), (3, 1));
    }

    #[test]
    fn test_eigenvectors() {
        // rotation: eigenvalues ±i
        let a = RealMatrix::from_rows(&[vec![0.0, -1.0], vec![1.0, 0.0]]).unwrap();
        let eig = a.eigenvectors(true).unwrap();
        assert!(eig.success);
        assert_eq!(eig.values.dims(), (1, 2));
        let z = a.to_kind::<Complex>();
        for (k, v) in eig.vectors.iter().enumerate() {
            let lambda = eig.values.at(1, k as i64 + 1).unwrap();
            assert!((lambda.norm() - 1.0).abs() < 1e-10);
            assert!(approx_eq_complex(&z.matmul(v).unwrap(), &v.scaled(lambda), 1e-10));
        }
    }

    #[test]
    fn test_left_eigenvectors() {
        let a = sample();
        let z = a.to_kind::<Complex>();
        let eig = a.eigenvectors(false).unwrap();
        for (k, v) in eig.vectors.iter().enumerate() {
            let lambda = eig.values.at(1, k as i64 + 1).unwrap();
            let lhs = v.adjoint().matmul(&z).unwrap();
            assert!(approx_eq_complex(&lhs, &v.adjoint().scaled(lambda), 1e-9));
        }
    }

    #[test]
    fn test_requires_square() {
        assert!(RealMatrix::new(2, 3).plu().is_err());
        assert!(RealMatrix::new(2, 3).schur().is_err());
    }
}
