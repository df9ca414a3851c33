// spatial.rs — Even/odd Gabor spatial filters.
//
// The spatial receptive field is a Gabor: a sinusoidal carrier at `sf`
// cycles per unit under a Gaussian envelope of width `sx`.
//
//   gaussian(x) = exp(-x² / sx²)
//   even(x)     = cos(2π·sf·x) · gaussian(x)
//   odd(x)      = sin(2π·sf·x) · gaussian(x)
//
// The axis is symmetric around 0, so `even` is exactly symmetric and `odd`
// exactly antisymmetric as sampled. The pair is in quadrature:
// even² + odd² = gaussian² at every sample.

use std::f64::consts::PI;

use tracing::debug;

use crate::config::{linspace, MotionEnergyConfig};

/// Spatial sample positions, uniformly spaced over [-max_x, max_x].
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialAxis(Vec<f64>);

impl SpatialAxis {
    pub fn new(nx: usize, max_x: f64) -> Self {
        SpatialAxis(linspace(-max_x, max_x, nx))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Quadrature pair of Gabor filters sampled on a `SpatialAxis`.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialFilterBank {
    pub axis: SpatialAxis,
    /// Gaussian envelope shared by both filters.
    pub gaussian: Vec<f64>,
    /// Cosine-phase Gabor.
    pub even: Vec<f64>,
    /// Sine-phase Gabor.
    pub odd: Vec<f64>,
    pub sx: f64,
    pub sf: f64,
}

impl SpatialFilterBank {
    /// Build the filters from raw parameters.
    ///
    /// Parameters are assumed valid (see `MotionEnergyConfig::validate`).
    pub fn new(nx: usize, max_x: f64, sx: f64, sf: f64) -> Self {
        let axis = SpatialAxis::new(nx, max_x);
        let sx_sq = sx * sx;

        let mut gaussian = Vec::with_capacity(nx);
        let mut even = Vec::with_capacity(nx);
        let mut odd = Vec::with_capacity(nx);
        for &x in axis.as_slice() {
            let g = (-x * x / sx_sq).exp();
            let phase = 2.0 * PI * sf * x;
            gaussian.push(g);
            even.push(phase.cos() * g);
            odd.push(phase.sin() * g);
        }

        debug!(nx, max_x, sx, sf, "built spatial Gabor pair");
        SpatialFilterBank {
            axis,
            gaussian,
            even,
            odd,
            sx,
            sf,
        }
    }

    /// Build from a (validated) configuration.
    pub fn from_config(config: &MotionEnergyConfig) -> Self {
        Self::new(config.nx, config.max_x, config.sx, config.sf)
    }

    pub fn len(&self) -> usize {
        self.axis.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axis.is_empty()
    }
}
