//! Pseudo-random real matrices
//!
//! Every constructor draws from a caller-owned generator, so per-thread state
//! stays with the caller. Distribution parameters outside their domain fail
//! with `InvalidNumericValue`.

use crate::handle::RealMatrix;
use crate::store::{DenseStore, Store};
use rand::distributions::{Distribution, Open01, OpenClosed01, Standard};
use rand::Rng;
use rand_distr::{Cauchy, ChiSquared, Exp, Gamma, LogNormal, Normal, StandardNormal, Weibull};
use tessera_core::{ModelError, ModelResult};

fn require_positive(parameter: &str, value: f64) -> ModelResult<f64> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(ModelError::numeric(parameter, value))
    }
}

fn require_finite(parameter: &str, value: f64) -> ModelResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ModelError::numeric(parameter, value))
    }
}

impl RealMatrix {
    /// Fill column by column from `draw`
    pub fn random_with<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R, mut draw: impl FnMut(&mut R) -> f64) -> Self {
        Self::from_store(Store::Dense(DenseStore::from_fn(rows, cols, |_, _| draw(rng))))
    }

    fn sampled<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R, dist: impl Distribution<f64>) -> Self {
        Self::random_with(rows, cols, rng, |r| dist.sample(r))
    }

    // ========== Uniform ==========

    /// Uniform on `[0, 1]`
    pub fn random_uniform_closed<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Self {
        Self::random_with(rows, cols, rng, |r| r.gen_range(0.0..=1.0))
    }

    /// Uniform on `[0, 1)`
    pub fn random_uniform<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Self {
        Self::sampled(rows, cols, rng, Standard)
    }

    /// Uniform on `(0, 1]`
    pub fn random_uniform_open_closed<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Self {
        Self::sampled(rows, cols, rng, OpenClosed01)
    }

    /// Uniform on `(0, 1)`
    pub fn random_uniform_open<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Self {
        Self::sampled(rows, cols, rng, Open01)
    }

    // ========== Normal family ==========

    pub fn random_standard_normal<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Self {
        Self::sampled(rows, cols, rng, StandardNormal)
    }

    pub fn random_normal<R: Rng + ?Sized>(rows: usize, cols: usize, mean: f64, sigma: f64, rng: &mut R) -> ModelResult<Self> {
        let mean = require_finite("mean", mean)?;
        let sigma = require_positive("sigma", sigma)?;
        let dist = Normal::new(mean, sigma).map_err(|_| ModelError::numeric("sigma", sigma))?;
        Ok(Self::sampled(rows, cols, rng, dist))
    }

    pub fn random_standard_log_normal<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Self {
        Self::random_with(rows, cols, rng, |r| {
            let z: f64 = r.sample(StandardNormal);
            z.exp()
        })
    }

    pub fn random_log_normal<R: Rng + ?Sized>(rows: usize, cols: usize, mean: f64, sigma: f64, rng: &mut R) -> ModelResult<Self> {
        let mean = require_finite("mean", mean)?;
        let sigma = require_positive("sigma", sigma)?;
        let dist = LogNormal::new(mean, sigma).map_err(|_| ModelError::numeric("sigma", sigma))?;
        Ok(Self::sampled(rows, cols, rng, dist))
    }

    // ========== Other distributions ==========

    /// Weibull with the given scale and shape, shifted right by `delay`
    pub fn random_weibull<R: Rng + ?Sized>(
        rows: usize,
        cols: usize,
        scale: f64,
        shape: f64,
        delay: f64,
        rng: &mut R,
    ) -> ModelResult<Self> {
        let scale = require_positive("scale", scale)?;
        let shape = require_positive("shape", shape)?;
        let delay = require_finite("delay", delay)?;
        let dist = Weibull::new(scale, shape).map_err(|_| ModelError::numeric("shape", shape))?;
        Ok(Self::random_with(rows, cols, rng, |r| delay + dist.sample(r)))
    }

    pub fn random_exponential<R: Rng + ?Sized>(rows: usize, cols: usize, rate: f64, rng: &mut R) -> ModelResult<Self> {
        let rate = require_positive("rate", rate)?;
        let dist = Exp::new(rate).map_err(|_| ModelError::numeric("rate", rate))?;
        Ok(Self::sampled(rows, cols, rng, dist))
    }

    /// Gamma with shape `k` and scale `s`
    pub fn random_gamma<R: Rng + ?Sized>(rows: usize, cols: usize, k: f64, s: f64, rng: &mut R) -> ModelResult<Self> {
        let k = require_positive("k", k)?;
        let s = require_positive("s", s)?;
        let dist = Gamma::new(k, s).map_err(|_| ModelError::numeric("k", k))?;
        Ok(Self::sampled(rows, cols, rng, dist))
    }

    pub fn random_rayleigh<R: Rng + ?Sized>(rows: usize, cols: usize, scale: f64, rng: &mut R) -> ModelResult<Self> {
        let scale = require_positive("scale", scale)?;
        // inverse CDF on (0, 1]
        Ok(Self::random_with(rows, cols, rng, |r| {
            let u: f64 = r.sample(OpenClosed01);
            scale * (-2.0 * u.ln()).sqrt()
        }))
    }

    pub fn random_chi_squared<R: Rng + ?Sized>(rows: usize, cols: usize, k: f64, rng: &mut R) -> ModelResult<Self> {
        let k = require_positive("k", k)?;
        let dist = ChiSquared::new(k).map_err(|_| ModelError::numeric("k", k))?;
        Ok(Self::sampled(rows, cols, rng, dist))
    }

    /// Cauchy-Lorentz with the given location and scale
    pub fn random_cauchy<R: Rng + ?Sized>(rows: usize, cols: usize, location: f64, scale: f64, rng: &mut R) -> ModelResult<Self> {
        let location = require_finite("location", location)?;
        let scale = require_positive("scale", scale)?;
        let dist = Cauchy::new(location, scale).map_err(|_| ModelError::numeric("scale", scale))?;
        Ok(Self::sampled(rows, cols, rng, dist))
    }
}
