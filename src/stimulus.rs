// stimulus.rs — Time × space luminance input.
//
// A `Stimulus` is always stored time-major: row y is the luminance profile
// at time sample y, column x is the time course at space sample x. That is
// the same axis order as the kernels ([nt, nx]), so convolution dimensions
// line up by construction.
//
// Callers hand data over in whichever layout they have and SAY which one it
// is (`AxisOrder`). There is no guessing from the shape: a square array
// would make any heuristic ambiguous, and a silent transpose swaps the
// meaning of "left" and "right".
//
// The `Grating` generator produces sinusoidal test patterns sampled on the
// same grid spacing as the kernels, covering x ∈ [-stim_width, stim_width]
// and t ∈ [0, stim_dur].

use std::f64::consts::PI;

use tracing::debug;

use crate::config::{linspace, MotionEnergyConfig};
use crate::error::{MotionError, Result};
use crate::image::{Image, Pixel};

/// Axis layout of caller-supplied stimulus data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisOrder {
    /// Rows are time samples, columns are space samples.
    TimeBySpace,
    /// Rows are space samples, columns are time samples.
    SpaceByTime,
}

/// Read-only luminance array, rows = time, columns = space.
#[derive(Debug, Clone, PartialEq)]
pub struct Stimulus {
    data: Image<f64>,
}

impl Stimulus {
    /// Wrap an image whose layout is given by `order`.
    ///
    /// Fails with `MotionError::Shape` if the image is empty or contains
    /// non-finite samples.
    pub fn from_image<T: Pixel>(image: &Image<T>, order: AxisOrder) -> Result<Self> {
        if image.is_empty() {
            return Err(MotionError::Shape(format!(
                "stimulus is empty ({}×{})",
                image.width(),
                image.height()
            )));
        }
        let as_f64 = image.map(|v| v.to_f64());
        if let Some((x, y, v)) = as_f64.pixels().find(|(_, _, v)| !v.is_finite()) {
            return Err(MotionError::Shape(format!(
                "non-finite sample {v} at row {y}, column {x}"
            )));
        }
        let data = match order {
            AxisOrder::TimeBySpace => as_f64,
            AxisOrder::SpaceByTime => as_f64.transpose(),
        };
        Ok(Stimulus { data })
    }

    /// Build from a row-major buffer of `rows × cols` samples.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>, order: AxisOrder) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(MotionError::Shape(format!(
                "data length {} does not match {rows} rows × {cols} columns",
                data.len()
            )));
        }
        Self::from_image(&Image::from_vec(cols, rows, data), order)
    }

    /// Build from nested rows. All rows must have the same length.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R], order: AxisOrder) -> Result<Self> {
        let cols = rows.first().map_or(0, |r| r.as_ref().len());
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(MotionError::Shape(format!(
                    "row {i} has {} samples, expected {cols}",
                    row.len()
                )));
            }
            data.extend_from_slice(row);
        }
        Self::from_vec(rows.len(), cols, data, order)
    }

    /// Time-major samples.
    pub fn image(&self) -> &Image<f64> {
        &self.data
    }

    /// Number of time samples (rows).
    pub fn time_len(&self) -> usize {
        self.data.height()
    }

    /// Number of space samples (columns).
    pub fn space_len(&self) -> usize {
        self.data.width()
    }

    /// The same stimulus played backwards in time.
    pub fn time_reversed(&self) -> Stimulus {
        Stimulus {
            data: self.data.flip_rows(),
        }
    }

    /// The same stimulus mirrored in space.
    pub fn space_mirrored(&self) -> Stimulus {
        let w = self.data.width();
        Stimulus {
            data: Image::from_fn(w, self.data.height(), |x, y| self.data.get(w - 1 - x, y)),
        }
    }

    /// Multiply every sample by `gain`.
    pub fn scaled(&self, gain: f64) -> Stimulus {
        Stimulus {
            data: self.data.map(|v| v * gain),
        }
    }
}

/// Drift direction of a synthetic grating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drift {
    /// Bars move towards +x as time advances.
    Rightward,
    /// Bars move towards -x as time advances.
    Leftward,
    /// Time-invariant pattern.
    Static,
}

/// Sinusoidal luminance grating `contrast · cos(2π(sf·x ∓ tf·t) + phase)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Grating {
    /// Cycles per unit distance.
    pub spatial_freq: f64,
    /// Cycles per unit time (ignored for `Drift::Static`).
    pub temporal_freq: f64,
    pub contrast: f64,
    /// Phase offset in radians.
    pub phase: f64,
    pub drift: Drift,
}

impl Grating {
    pub fn new(spatial_freq: f64, temporal_freq: f64, drift: Drift) -> Self {
        Grating {
            spatial_freq,
            temporal_freq,
            contrast: 1.0,
            phase: 0.0,
            drift,
        }
    }

    /// A grating tuned to the filter bank: spatial frequency `sf` and the
    /// temporal frequency at which the fast and slow filters are in
    /// quadrature.
    pub fn preferred(config: &MotionEnergyConfig, drift: Drift) -> Self {
        Self::new(config.sf, preferred_temporal_freq(config), drift)
    }

    /// Luminance at position `x`, time `t`.
    pub fn sample(&self, x: f64, t: f64) -> f64 {
        let tf = match self.drift {
            Drift::Rightward => self.temporal_freq,
            Drift::Leftward => -self.temporal_freq,
            Drift::Static => 0.0,
        };
        self.contrast * (2.0 * PI * (self.spatial_freq * x - tf * t) + self.phase).cos()
    }

    /// Sample on the kernel grid over the configured stimulus extent.
    pub fn render(&self, config: &MotionEnergyConfig) -> Stimulus {
        let xs = stimulus_axis(-config.stim_width, config.stim_width, config.dx());
        let ts = stimulus_axis(0.0, config.stim_dur, config.dt());
        debug!(
            time = ts.len(),
            space = xs.len(),
            drift = ?self.drift,
            "rendering grating stimulus"
        );
        Stimulus {
            data: Image::from_fn(xs.len(), ts.len(), |x, y| self.sample(xs[x], ts[y])),
        }
    }
}

/// Temporal frequency where the slow filter lags the fast one by a quarter
/// cycle: the per-order phase lag is atan(ω/k), so the quarter cycle is
/// reached at ω = k·tan(π / (2·Δn)).
///
/// Returns 0 when both orders are equal (no quadrature is possible).
pub fn preferred_temporal_freq(config: &MotionEnergyConfig) -> f64 {
    let dn = config.slow_n.abs_diff(config.fast_n);
    if dn == 0 {
        return 0.0;
    }
    let angle = PI / (2.0 * dn as f64);
    if angle >= PI / 2.0 {
        // Δn = 1 only approaches a quarter cycle asymptotically; use the
        // 45° point instead.
        return config.k / (2.0 * PI);
    }
    config.k * angle.tan() / (2.0 * PI)
}

/// Axis from `start` to `stop` with the given spacing, endpoints included.
fn stimulus_axis(start: f64, stop: f64, step: f64) -> Vec<f64> {
    let n = if step > 0.0 {
        ((stop - start) / step).round() as usize + 1
    } else {
        1
    };
    linspace(start, stop, n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_by_time_is_transposed() {
        // 2 space samples × 3 time samples.
        let rows = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
        let s = Stimulus::from_rows(&rows, AxisOrder::SpaceByTime).unwrap();
        assert_eq!(s.time_len(), 3);
        assert_eq!(s.space_len(), 2);
        assert_eq!(s.image().row(0), &[1.0, 4.0]);
        assert_eq!(s.image().row(2), &[3.0, 6.0]);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let rows = vec![vec![1.0, 2.0], vec![3.0]];
        let err = Stimulus::from_rows(&rows, AxisOrder::TimeBySpace).unwrap_err();
        assert!(matches!(err, MotionError::Shape(_)));
    }

    #[test]
    fn test_empty_rejected() {
        let rows: Vec<Vec<f64>> = Vec::new();
        assert!(Stimulus::from_rows(&rows, AxisOrder::TimeBySpace).is_err());
    }

    #[test]
    fn test_nan_rejected() {
        let err = Stimulus::from_vec(1, 2, vec![0.0, f64::NAN], AxisOrder::TimeBySpace)
            .unwrap_err();
        assert!(err.to_string().contains("non-finite"), "{err}");
    }

    #[test]
    fn test_u8_image_accepted() {
        let img = Image::from_vec(3, 2, vec![0u8, 128, 255, 1, 2, 3]);
        let s = Stimulus::from_image(&img, AxisOrder::TimeBySpace).unwrap();
        assert_eq!(s.image().get(2, 0), 255.0);
    }

    #[test]
    fn test_render_covers_configured_extent() {
        let cfg = MotionEnergyConfig::default();
        let s = Grating::preferred(&cfg, Drift::Rightward).render(&cfg);
        // 8 units at 4/79 spacing → 158 intervals; 1.5 s at 0.5/99 → 297.
        assert_eq!(s.space_len(), 159);
        assert_eq!(s.time_len(), 298);
    }

    #[test]
    fn test_static_grating_is_time_invariant() {
        let cfg = MotionEnergyConfig::default();
        let s = Grating::preferred(&cfg, Drift::Static).render(&cfg);
        let first = s.image().row(0).to_vec();
        for y in 1..s.time_len() {
            assert_eq!(s.image().row(y), first.as_slice());
        }
    }

    #[test]
    fn test_rightward_grating_moves_right() {
        // The crest at x = 0, t = 0 sits at x = tf/sf · t later on.
        let g = Grating::new(1.0, 2.0, Drift::Rightward);
        assert!((g.sample(0.0, 0.0) - 1.0).abs() < 1e-12);
        assert!((g.sample(0.5, 0.25) - 1.0).abs() < 1e-12);
        let l = Grating::new(1.0, 2.0, Drift::Leftward);
        assert!((l.sample(-0.5, 0.25) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_preferred_frequency_default() {
        // Δn = 3 → ω = k·tan(30°) → f = 100·0.57735/2π ≈ 9.19 Hz.
        let f = preferred_temporal_freq(&MotionEnergyConfig::default());
        assert!((f - 9.1888).abs() < 1e-3, "got {f}");
    }

    #[test]
    fn test_time_reversal_round_trip() {
        let s = Stimulus::from_vec(3, 1, vec![1.0, 2.0, 3.0], AxisOrder::TimeBySpace).unwrap();
        assert_eq!(s.time_reversed().image().as_slice(), &[3.0, 2.0, 1.0]);
        assert_eq!(s.time_reversed().time_reversed(), s);
    }
}
