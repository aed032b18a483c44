//! Discrete Fourier and cosine transforms, Hilbert transform
//!
//! Vectors (one dimension equal to 1) are transformed along their length;
//! other matrices along columns and then rows.
//!
//! - DFT is unnormalised, the inverse scales by `1/N`;
//! - DCT is the orthonormal type II, its inverse the orthonormal type III.

use crate::handle::{ComplexMatrix, Matrix, RealMatrix};
use crate::store::{DenseStore, Store};
use std::f64::consts::PI;
use tessera_core::{Complex, Element, ModelError, ModelResult};

// ============================================================================
// 1-D kernels
// ============================================================================

/// In-place iterative radix-2 FFT; `buf.len()` must be a power of two
fn radix2(buf: &mut [Complex], inverse: bool) {
    let n = buf.len();
    let mut j = 0;
    for i in 1..n {
        let mut bit = n >> 1;
        while j & bit != 0 {
            j ^= bit;
            bit >>= 1;
        }
        j |= bit;
        if i < j {
            buf.swap(i, j);
        }
    }

    let sign = if inverse { 1.0 } else { -1.0 };
    let mut len = 2;
    while len <= n {
        let half = len / 2;
        let step = sign * 2.0 * PI / len as f64;
        for start in (0..n).step_by(len) {
            for k in 0..half {
                let w = Complex::from_polar(1.0, step * k as f64);
                let u = buf[start + k];
                let v = buf[start + k + half] * w;
                buf[start + k] = u + v;
                buf[start + k + half] = u - v;
            }
        }
        len <<= 1;
    }
}

/// Arbitrary-length DFT through Bluestein's chirp-z convolution
fn bluestein(input: &[Complex], inverse: bool) -> Vec<Complex> {
    let n = input.len();
    let m = (2 * n - 1).next_power_of_two();
    let sign = if inverse { 1.0 } else { -1.0 };
    let chirp: Vec<Complex> = (0..n)
        .map(|k| {
            // k² mod 2n keeps the angle small
            let k2 = (k as u128 * k as u128 % (2 * n as u128)) as f64;
            Complex::from_polar(1.0, sign * PI * k2 / n as f64)
        })
        .collect();

    let mut a = vec![Complex::new(0.0, 0.0); m];
    for k in 0..n {
        a[k] = input[k] * chirp[k];
    }
    let mut b = vec![Complex::new(0.0, 0.0); m];
    b[0] = chirp[0].conj();
    for k in 1..n {
        b[k] = chirp[k].conj();
        b[m - k] = chirp[k].conj();
    }

    radix2(&mut a, false);
    radix2(&mut b, false);
    for (x, y) in a.iter_mut().zip(&b) {
        *x *= y;
    }
    radix2(&mut a, true);

    let scale = 1.0 / m as f64;
    (0..n).map(|k| a[k] * scale * chirp[k]).collect()
}

fn dft_vector(input: &[Complex], inverse: bool) -> Vec<Complex> {
    let n = input.len();
    let mut out = if n <= 1 {
        input.to_vec()
    } else if n.is_power_of_two() {
        let mut buf = input.to_vec();
        radix2(&mut buf, inverse);
        buf
    } else {
        bluestein(input, inverse)
    };
    if inverse && n > 1 {
        let scale = 1.0 / n as f64;
        for x in &mut out {
            *x *= scale;
        }
    }
    out
}

fn dct_weight(k: usize, n: usize) -> f64 {
    if k == 0 {
        (1.0 / n as f64).sqrt()
    } else {
        (2.0 / n as f64).sqrt()
    }
}

fn dct_vector(input: &[f64]) -> Vec<f64> {
    let n = input.len();
    (0..n)
        .map(|k| {
            let sum: f64 = input
                .iter()
                .enumerate()
                .map(|(i, &x)| x * (PI * (i as f64 + 0.5) * k as f64 / n as f64).cos())
                .sum();
            dct_weight(k, n) * sum
        })
        .collect()
}

fn idct_vector(input: &[f64]) -> Vec<f64> {
    let n = input.len();
    (0..n)
        .map(|i| {
            input
                .iter()
                .enumerate()
                .map(|(k, &x)| dct_weight(k, n) * x * (PI * (i as f64 + 0.5) * k as f64 / n as f64).cos())
                .sum()
        })
        .collect()
}

// ============================================================================
// Axis handling
// ============================================================================

fn along_axes<T: Element>(m: &Matrix<T>, f: impl Fn(&[T]) -> Vec<T>) -> Matrix<T> {
    let (rows, cols) = m.dims();
    let mut data = m.column_major();
    if rows == 1 || cols == 1 {
        data = f(&data);
    } else {
        for c in 0..cols {
            let column = f(&data[c * rows..(c + 1) * rows]);
            data[c * rows..(c + 1) * rows].copy_from_slice(&column);
        }
        for r in 0..rows {
            let row: Vec<T> = (0..cols).map(|c| data[c * rows + r]).collect();
            for (c, v) in f(&row).into_iter().enumerate() {
                data[c * rows + r] = v;
            }
        }
    }
    Matrix::from_store(Store::Dense(DenseStore::from_fn(rows, cols, |r, c| data[c * rows + r])))
}

impl ComplexMatrix {
    pub fn dft(&self) -> ComplexMatrix {
        along_axes(self, |v| dft_vector(v, false))
    }

    pub fn idft(&self) -> ComplexMatrix {
        along_axes(self, |v| dft_vector(v, true))
    }
}

impl RealMatrix {
    pub fn dct(&self) -> RealMatrix {
        along_axes(self, dct_vector)
    }

    pub fn idct(&self) -> RealMatrix {
        along_axes(self, idct_vector)
    }

    /// Analytic signal `x + i·H(x)` of a real vector
    pub fn hilbert_transform(&self) -> ModelResult<ComplexMatrix> {
        if !self.is_vector() && !self.is_empty() {
            return Err(ModelError::dimensions("hilbert_transform", self.dims(), (1, self.number_coefficients())));
        }
        let n = self.number_coefficients();
        let signal: Vec<Complex> = self.column_major().into_iter().map(|x| Complex::new(x, 0.0)).collect();
        let mut spectrum = dft_vector(&signal, false);
        for (k, x) in spectrum.iter_mut().enumerate() {
            let weight = if k == 0 || (n % 2 == 0 && k == n / 2) {
                1.0
            } else if k < (n + 1) / 2 {
                2.0
            } else {
                0.0
            };
            *x *= weight;
        }
        let analytic = dft_vector(&spectrum, true);
        let (rows, cols) = self.dims();
        ComplexMatrix::from_column_major(rows, cols, &analytic)
    }
}
