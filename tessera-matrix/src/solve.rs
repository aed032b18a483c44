//! Linear systems, least squares, equilibration

use crate::handle::{Matrix, RealMatrix};
use crate::numeric::Numeric;
use tessera_core::{Element, ModelError, ModelResult};

/// Row and column scale factors that bring every entry of `R·A·C` to at
/// most one in magnitude
#[derive(Debug, Clone)]
pub struct Equilibration {
    /// rows × 1
    pub row_scale: RealMatrix,
    /// 1 × cols
    pub col_scale: RealMatrix,
    /// False when a row or column is entirely zero
    pub success: bool,
}

impl<T: Numeric> Matrix<T> {
    /// Solve `A·x = y` by LU; the flag is false when `A` is singular
    pub fn solve(&self, y: &Matrix<T>) -> ModelResult<(Self, bool)> {
        self.require_square("solve")?;
        if y.rows() != self.rows() {
            return Err(ModelError::dimensions("solve", self.dims(), y.dims()));
        }
        if self.is_empty() {
            return Ok((Self::new(0, y.cols()), true));
        }
        match self.to_dmatrix().lu().solve(&y.to_dmatrix()) {
            Some(x) => Ok((Self::from_dmatrix(&x), true)),
            None => Ok((Self::new(self.cols(), y.cols()), false)),
        }
    }

    /// Minimise `‖A·x − b‖₂`: QR when over-determined, minimum-norm LQ when
    /// under-determined
    pub fn least_squares(&self, b: &Matrix<T>) -> ModelResult<(Self, bool)> {
        if b.rows() != self.rows() {
            return Err(ModelError::dimensions("least_squares", self.dims(), b.dims()));
        }
        let failed = || (Self::new(self.cols(), b.cols()), false);
        if self.is_empty() {
            return Ok((Self::new(self.cols(), b.cols()), true));
        }

        let rhs = b.to_dmatrix();
        if self.rows() >= self.cols() {
            let qr = self.to_dmatrix().qr();
            let projected = qr.q().adjoint() * rhs;
            Ok(match qr.r().solve_upper_triangular(&projected) {
                Some(x) => (Self::from_dmatrix(&x), true),
                None => failed(),
            })
        } else {
            // Aᴴ = Q₁R₁, so A = L·Q with L = R₁ᴴ and Q = Q₁ᴴ
            let qr = self.adjoint().to_dmatrix().qr();
            let l = qr.r().adjoint();
            Ok(match l.solve_lower_triangular(&rhs) {
                Some(z) => (Self::from_dmatrix(&(qr.q() * z)), true),
                None => failed(),
            })
        }
    }
}

impl<T: Element> Matrix<T> {
    /// Row then column scaling in the manner of LAPACK's equilibration:
    /// `r_i = 1 / max_j |a_ij|`, then `c_j = 1 / max_i r_i·|a_ij|`
    pub fn equilibrate(&self) -> Equilibration {
        let (rows, cols) = self.dims();
        let mut row_max = vec![0.0f64; rows];
        let mut entries = Vec::new();
        for r in 0..rows {
            for c in 0..cols {
                let m = self.entry(r, c).magnitude();
                if m > 0.0 {
                    row_max[r] = row_max[r].max(m);
                    entries.push((r, c, m));
                }
            }
        }
        let mut success = row_max.iter().all(|&m| m > 0.0);
        let row_scale: Vec<f64> = row_max.iter().map(|&m| if m > 0.0 { 1.0 / m } else { 1.0 }).collect();

        let mut col_max = vec![0.0f64; cols];
        for &(r, c, m) in &entries {
            col_max[c] = col_max[c].max(row_scale[r] * m);
        }
        success &= col_max.iter().all(|&m| m > 0.0);
        let col_scale: Vec<f64> = col_max.iter().map(|&m| if m > 0.0 { 1.0 / m } else { 1.0 }).collect();

        Equilibration {
            row_scale: RealMatrix::column_vector(&row_scale),
            col_scale: RealMatrix::row_vector(&col_scale),
            success,
        }
    }
}
