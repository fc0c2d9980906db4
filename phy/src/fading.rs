//! Rayleigh flat fading by sum of sinusoids, after Zheng and Xiao.
//!
//! Every call to [`ZhengFading::realize`] draws a fresh channel (one arrival
//! angle offset plus per-sinusoid phases) and evaluates it at the requested
//! sample instants, so consecutive calls give independent realizations.

use crate::PhyError;
use log::debug;
use num_complex::Complex64;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::f64::consts::PI;

pub const DEFAULT_SINUSOIDS: usize = 8;

#[derive(Debug, Clone)]
pub struct ZhengFading<R = ChaCha8Rng> {
    f_d: f64,
    f_s: f64,
    n_sin: usize,
    rng: R,
}

impl ZhengFading<ChaCha8Rng> {
    /// Generator with a reproducible random source.
    pub fn with_seed(f_d: f64, f_s: f64, seed: u64) -> Result<Self, PhyError> {
        Self::new(f_d, f_s, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> ZhengFading<R> {
    /// Doppler `f_d` and sample rate `f_s` in Hz.
    pub fn new(f_d: f64, f_s: f64, rng: R) -> Result<Self, PhyError> {
        if !f_d.is_finite() {
            return Err(PhyError::InvalidParameter(format!(
                "Doppler frequency must be finite, got {}",
                f_d
            )));
        }
        if !(f_s.is_finite() && f_s > 0.0) {
            return Err(PhyError::InvalidParameter(format!(
                "sample rate must be > 0, got {}",
                f_s
            )));
        }
        Ok(Self {
            f_d,
            f_s,
            n_sin: DEFAULT_SINUSOIDS,
            rng,
        })
    }

    pub fn with_sinusoids(mut self, n_sin: usize) -> Result<Self, PhyError> {
        if n_sin == 0 {
            return Err(PhyError::InvalidParameter(
                "number of sinusoids must be > 0".to_string(),
            ));
        }
        self.n_sin = n_sin;
        Ok(self)
    }

    pub fn sinusoids(&self) -> usize {
        self.n_sin
    }

    /// Channel gains at sample indices `n_s` (time `n / f_s`).
    pub fn realize(&mut self, n_s: &[f64]) -> Vec<Complex64> {
        let n = self.n_sin as f64;
        let scale = (2.0 / n).sqrt();
        let two_pi_fd = 2.0 * PI * self.f_d;

        let theta = self.rng.gen_range(-PI..PI);
        let sinusoids: Vec<[f64; 4]> = (0..self.n_sin)
            .map(|i| {
                let phi_re = self.rng.gen_range(-PI..PI);
                let phi_im = self.rng.gen_range(-PI..PI);
                let alpha = (PI * (2 * i + 1) as f64 + theta) / (4.0 * n);
                [two_pi_fd * alpha.cos(), phi_re, two_pi_fd * alpha.sin(), phi_im]
            })
            .collect();

        debug!(
            "Fading realization: f_d={} Hz, f_s={} Hz, {} sinusoids, {} samples",
            self.f_d,
            self.f_s,
            self.n_sin,
            n_s.len()
        );

        n_s.iter()
            .map(|&sample| {
                let t = sample / self.f_s;
                let (re, im) = sinusoids.iter().fold((0.0f64, 0.0f64), |(re, im), [w_re, p_re, w_im, p_im]| {
                    (re + (w_re * t + p_re).cos(), im + (w_im * t + p_im).cos())
                });
                Complex64::new(re, im) * scale
            })
            .collect()
    }

    /// Channel gains at sample indices `0..len`.
    pub fn realize_len(&mut self, len: usize) -> Vec<Complex64> {
        let n_s: Vec<f64> = (0..len).map(|i| i as f64).collect();
        self.realize(&n_s)
    }
}
