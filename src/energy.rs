// energy.rs — Squaring, directional pooling and normalization.
//
// Given the four response maps:
//
//   energy_left   = left_1²  + left_2²        (element-wise)
//   energy_right  = right_1² + right_2²
//   total_energy  = Σ energy_left + Σ energy_right
//   RR1 = Σ right_1² / total   (RR2, LR1, LR2 likewise)
//   motion_energy = (RR1 + RR2) − (LR1 + LR2)      ∈ [-1, 1]
//
// Spatial output:
//
//   energy_opponent = energy_right − energy_left
//   energy_flicker  = total_energy / (rows · cols)
//   motion_contrast = energy_opponent / energy_flicker
//
// Every quantity is divided by the stimulus's own energy, so the scalar and
// the map are invariant to the overall gain of the stimulus. A stimulus with
// no energy at all has no direction; that is reported as
// `MotionError::DegenerateInput` rather than letting NaN escape.
//
// `peak` is only for presentation (symmetric colour range); the contrast map
// itself is left unscaled.

use std::fmt;

use tracing::{debug, warn};

use crate::convolution::ResponseMaps;
use crate::error::{MotionError, Result};
use crate::image::Image;
use crate::oriented::FilterId;

/// `|motion_energy|` below this is reported as no net motion by
/// `MotionEnergy::net_motion`.
pub const NET_MOTION_TOLERANCE: f64 = 1e-6;

/// Element-wise squares of the four response maps.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyMaps {
    pub left_1: Image<f64>,
    pub left_2: Image<f64>,
    pub right_1: Image<f64>,
    pub right_2: Image<f64>,
}

impl EnergyMaps {
    pub fn from_responses(responses: &ResponseMaps) -> Self {
        let square = |img: &Image<f64>| img.map(|v| v * v);
        EnergyMaps {
            left_1: square(&responses.left_1),
            left_2: square(&responses.left_2),
            right_1: square(&responses.right_1),
            right_2: square(&responses.right_2),
        }
    }

    pub fn get(&self, id: FilterId) -> &Image<f64> {
        match id {
            FilterId::Left1 => &self.left_1,
            FilterId::Left2 => &self.left_2,
            FilterId::Right1 => &self.right_1,
            FilterId::Right2 => &self.right_2,
        }
    }
}

/// Share of the total energy captured by each oriented filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyFractions {
    pub left_1: f64,
    pub left_2: f64,
    pub right_1: f64,
    pub right_2: f64,
}

impl EnergyFractions {
    pub fn right_total(&self) -> f64 {
        self.right_1 + self.right_2
    }

    pub fn left_total(&self) -> f64 {
        self.left_1 + self.left_2
    }

    pub fn get(&self, id: FilterId) -> f64 {
        match id {
            FilterId::Left1 => self.left_1,
            FilterId::Left2 => self.left_2,
            FilterId::Right1 => self.right_1,
            FilterId::Right2 => self.right_2,
        }
    }
}

/// Sign of the net motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetMotion {
    Rightward,
    Leftward,
    None,
}

impl fmt::Display for NetMotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetMotion::Rightward => write!(f, "rightward"),
            NetMotion::Leftward => write!(f, "leftward"),
            NetMotion::None => write!(f, "none"),
        }
    }
}

/// Everything the pipeline produces for one stimulus.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionEnergy {
    pub energy_maps: EnergyMaps,
    /// left_1² + left_2².
    pub energy_left: Image<f64>,
    /// right_1² + right_2².
    pub energy_right: Image<f64>,
    pub total_energy: f64,
    pub fractions: EnergyFractions,
    /// Net rightward minus leftward energy fraction, in [-1, 1].
    pub motion_energy: f64,
    /// energy_right − energy_left.
    pub energy_opponent: Image<f64>,
    /// Mean energy per output position.
    pub energy_flicker: f64,
    /// Opponent energy normalized by `energy_flicker`.
    pub motion_contrast: Image<f64>,
    /// max(|max(motion_contrast)|, |min(motion_contrast)|).
    pub peak: f64,
}

impl MotionEnergy {
    pub fn right_total(&self) -> f64 {
        self.fractions.right_total()
    }

    pub fn left_total(&self) -> f64 {
        self.fractions.left_total()
    }

    /// Direction classification with `NET_MOTION_TOLERANCE`.
    pub fn net_motion(&self) -> NetMotion {
        if self.motion_energy > NET_MOTION_TOLERANCE {
            NetMotion::Rightward
        } else if self.motion_energy < -NET_MOTION_TOLERANCE {
            NetMotion::Leftward
        } else {
            NetMotion::None
        }
    }

    /// Symmetric display range for `motion_contrast`.
    pub fn display_range(&self) -> (f64, f64) {
        (-self.peak, self.peak)
    }
}

impl fmt::Display for MotionEnergy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "motion energy {:+.4} ({})",
            self.motion_energy,
            self.net_motion()
        )?;
        writeln!(
            f,
            "  right {:.4} (R1 {:.4}, R2 {:.4})  left {:.4} (L1 {:.4}, L2 {:.4})",
            self.right_total(),
            self.fractions.right_1,
            self.fractions.right_2,
            self.left_total(),
            self.fractions.left_1,
            self.fractions.left_2,
        )?;
        write!(
            f,
            "  total {:.4e}, flicker {:.4e}, contrast map {}×{} peak {:.4}",
            self.total_energy,
            self.energy_flicker,
            self.motion_contrast.width(),
            self.motion_contrast.height(),
            self.peak,
        )
    }
}

/// Pools squared responses into motion energy.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnergyPool;

impl EnergyPool {
    /// Run the full pooling and normalization on one set of response maps.
    pub fn pool(&self, responses: &ResponseMaps) -> Result<MotionEnergy> {
        let energy_maps = EnergyMaps::from_responses(responses);

        let sums = [
            energy_maps.left_1.sum(),
            energy_maps.left_2.sum(),
            energy_maps.right_1.sum(),
            energy_maps.right_2.sum(),
        ];

        let energy_left = energy_maps
            .left_1
            .linear_combination(1.0, &energy_maps.left_2, 1.0);
        let energy_right = energy_maps
            .right_1
            .linear_combination(1.0, &energy_maps.right_2, 1.0);

        let total_energy = energy_right.sum() + energy_left.sum();
        if total_energy == 0.0 || !total_energy.is_finite() {
            warn!(total_energy, "stimulus produced no usable motion energy");
            return Err(MotionError::DegenerateInput { total_energy });
        }

        let fractions = EnergyFractions {
            left_1: sums[0] / total_energy,
            left_2: sums[1] / total_energy,
            right_1: sums[2] / total_energy,
            right_2: sums[3] / total_energy,
        };
        let motion_energy = fractions.right_total() - fractions.left_total();

        let energy_opponent = energy_right.linear_combination(1.0, &energy_left, -1.0);
        let energy_flicker = total_energy / energy_left.len() as f64;
        let motion_contrast = energy_opponent.map(|v| v / energy_flicker);
        let peak = motion_contrast
            .min_max()
            .map_or(0.0, |(lo, hi)| hi.abs().max(lo.abs()));

        debug!(
            motion_energy,
            total_energy,
            energy_flicker,
            peak,
            "pooled motion energy"
        );

        Ok(MotionEnergy {
            energy_maps,
            energy_left,
            energy_right,
            total_energy,
            fractions,
            motion_energy,
            energy_opponent,
            energy_flicker,
            motion_contrast,
            peak,
        })
    }
}
