// config.rs — Filter-bank and stimulus parameters.
//
// All parameters are plain numbers with defaults matching the classic
// quadrature motion-energy model (Adelson & Bergen 1985 style filters).
// `validate()` is the single gate every constructor goes through, so a
// `MotionEnergyModel` never holds an invalid configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{MotionError, Result};

/// Largest filter order accepted. Higher orders put the temporal peak
/// (near t = n/k) far outside any practical kernel window.
pub const MAX_FILTER_ORDER: u32 = 160;

/// Motion-energy model configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MotionEnergyConfig {
    /// Number of spatial samples in each kernel.
    pub nx: usize,
    /// Spatial axis spans [-max_x, max_x].
    pub max_x: f64,
    /// Gaussian envelope width of the spatial Gabor filters.
    pub sx: f64,
    /// Spatial carrier frequency (cycles per unit distance).
    pub sf: f64,
    /// Number of temporal samples in each kernel.
    pub nt: usize,
    /// Temporal axis spans [0, max_t].
    pub max_t: f64,
    /// Time scale of the temporal impulse responses.
    pub k: f64,
    /// Order of the slow temporal filter.
    pub slow_n: u32,
    /// Order of the fast temporal filter.
    pub fast_n: u32,
    /// Weight of the negative lobe of the temporal filters.
    pub beta: f64,
    /// Half-width of synthetic stimuli (x ∈ [-stim_width, stim_width]).
    pub stim_width: f64,
    /// Duration of synthetic stimuli (t ∈ [0, stim_dur]).
    pub stim_dur: f64,
}

impl Default for MotionEnergyConfig {
    fn default() -> Self {
        MotionEnergyConfig {
            nx: 80,
            max_x: 2.0,
            sx: 0.5,
            sf: 1.1,
            nt: 100,
            max_t: 0.5,
            k: 100.0,
            slow_n: 9,
            fast_n: 6,
            beta: 0.9,
            stim_width: 4.0,
            stim_dur: 1.5,
        }
    }
}

impl MotionEnergyConfig {
    /// Check every parameter, reporting the first offending one.
    pub fn validate(&self) -> Result<()> {
        if self.nx == 0 {
            return Err(MotionError::config("nx", self.nx, "must be > 0"));
        }
        if self.nt == 0 {
            return Err(MotionError::config("nt", self.nt, "must be > 0"));
        }
        if !(self.max_x.is_finite() && self.max_x >= 0.0) {
            return Err(MotionError::config("max_x", self.max_x, "must be finite and >= 0"));
        }
        if !(self.max_t.is_finite() && self.max_t >= 0.0) {
            return Err(MotionError::config("max_t", self.max_t, "must be finite and >= 0"));
        }
        if !(self.sx.is_finite() && self.sx > 0.0) {
            return Err(MotionError::config("sx", self.sx, "must be finite and > 0"));
        }
        if !self.sf.is_finite() {
            return Err(MotionError::config("sf", self.sf, "must be finite"));
        }
        if !(self.k.is_finite() && self.k > 0.0) {
            return Err(MotionError::config("k", self.k, "must be finite and > 0"));
        }
        if !self.beta.is_finite() {
            return Err(MotionError::config("beta", self.beta, "must be finite"));
        }
        if self.slow_n > MAX_FILTER_ORDER {
            return Err(MotionError::config(
                "slow_n",
                self.slow_n,
                "exceeds the maximum filter order",
            ));
        }
        if self.fast_n > MAX_FILTER_ORDER {
            return Err(MotionError::config(
                "fast_n",
                self.fast_n,
                "exceeds the maximum filter order",
            ));
        }
        if !(self.stim_width.is_finite() && self.stim_width >= 0.0) {
            return Err(MotionError::config(
                "stim_width",
                self.stim_width,
                "must be finite and >= 0",
            ));
        }
        if !(self.stim_dur.is_finite() && self.stim_dur >= 0.0) {
            return Err(MotionError::config("stim_dur", self.stim_dur, "must be finite and >= 0"));
        }
        Ok(())
    }

    /// Spatial sample spacing of the kernels (0 when nx == 1).
    pub fn dx(&self) -> f64 {
        linspace_step(-self.max_x, self.max_x, self.nx)
    }

    /// Temporal sample spacing of the kernels (0 when nt == 1).
    pub fn dt(&self) -> f64 {
        linspace_step(0.0, self.max_t, self.nt)
    }

    /// Kernel shape implied by this configuration.
    pub fn kernel_shape(&self) -> crate::oriented::KernelShape {
        crate::oriented::KernelShape {
            time: self.nt,
            space: self.nx,
        }
    }
}

/// `n` samples uniformly spaced over `[start, stop]`, both ends included.
///
/// `n == 1` yields `[start]`, `n == 0` yields an empty vector.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    let step = linspace_step(start, stop, n);
    (0..n)
        .map(|i| if i + 1 == n && n > 1 { stop } else { start + step * i as f64 })
        .collect()
}

fn linspace_step(start: f64, stop: f64, n: usize) -> f64 {
    if n > 1 {
        (stop - start) / (n - 1) as f64
    } else {
        0.0
    }
}
