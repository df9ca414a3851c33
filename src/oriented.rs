// oriented.rs — Space-time oriented quadrature filters.
//
// Four separable base kernels are outer products temporal ⊗ spatial,
// each of shape [nt, nx] (rows = time, columns = space):
//
//   SE_TS = slow ⊗ even     SO_TS = slow ⊗ odd
//   SE_TF = fast ⊗ even     SO_TF = fast ⊗ odd
//
// They combine into two quadrature pairs per direction:
//
//   left_1  =  SO_TF + SE_TS        right_1 = -SO_TF + SE_TS
//   left_2  = -SO_TS + SE_TF        right_2 =  SO_TS + SE_TF
//
// Flipping the sign of the odd component swaps the phase velocity the
// filter is tuned to, which is the only difference between left and right.
// A static pattern drives left and right pairs equally (the temporal DC
// gains cancel in the pooled energy), so only motion survives opponency.
//
// Each oriented kernel remembers its two separable terms, so convolution can
// run as two cheap 1D passes per term instead of one full 2D pass.

use std::fmt;

use tracing::debug;

use crate::image::Image;
use crate::spatial::SpatialFilterBank;
use crate::temporal::TemporalFilterBank;

/// Shape of a space-time kernel, with named axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelShape {
    /// Number of rows (time samples).
    pub time: usize,
    /// Number of columns (space samples).
    pub space: usize,
}

impl fmt::Display for KernelShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[time {} × space {}]", self.time, self.space)
    }
}

/// Temporal half of a base kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalKind {
    Slow,
    Fast,
}

/// Spatial half of a base kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpatialPhase {
    Even,
    Odd,
}

/// Preferred direction of an oriented filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
}

/// The four oriented filters, in the order they are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterId {
    Left1,
    Left2,
    Right1,
    Right2,
}

impl FilterId {
    pub const ALL: [FilterId; 4] = [
        FilterId::Left1,
        FilterId::Left2,
        FilterId::Right1,
        FilterId::Right2,
    ];

    pub fn direction(self) -> Direction {
        match self {
            FilterId::Left1 | FilterId::Left2 => Direction::Left,
            FilterId::Right1 | FilterId::Right2 => Direction::Right,
        }
    }

    /// The fixed quadrature combination: `(sign, temporal, spatial)` for
    /// each of the two separable terms.
    pub fn terms(self) -> [(f64, TemporalKind, SpatialPhase); 2] {
        use SpatialPhase::{Even, Odd};
        use TemporalKind::{Fast, Slow};
        match self {
            FilterId::Left1 => [(1.0, Fast, Odd), (1.0, Slow, Even)],
            FilterId::Left2 => [(-1.0, Slow, Odd), (1.0, Fast, Even)],
            FilterId::Right1 => [(-1.0, Fast, Odd), (1.0, Slow, Even)],
            FilterId::Right2 => [(1.0, Slow, Odd), (1.0, Fast, Even)],
        }
    }

    fn index(self) -> usize {
        match self {
            FilterId::Left1 => 0,
            FilterId::Left2 => 1,
            FilterId::Right1 => 2,
            FilterId::Right2 => 3,
        }
    }
}

impl fmt::Display for FilterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterId::Left1 => write!(f, "left_1"),
            FilterId::Left2 => write!(f, "left_2"),
            FilterId::Right1 => write!(f, "right_1"),
            FilterId::Right2 => write!(f, "right_2"),
        }
    }
}

/// One signed separable term `sign · temporal ⊗ spatial` of an oriented kernel.
#[derive(Debug, Clone, PartialEq)]
pub struct SeparableTerm {
    pub sign: f64,
    /// Column factor, length nt.
    pub temporal: Vec<f64>,
    /// Row factor, length nx.
    pub spatial: Vec<f64>,
}

/// A direction-selective space-time kernel.
#[derive(Debug, Clone, PartialEq)]
pub struct OrientedKernel {
    pub id: FilterId,
    /// Full [nt, nx] kernel (height = nt, width = nx).
    pub kernel: Image<f64>,
    /// The two separable terms summing to `kernel`.
    pub terms: [SeparableTerm; 2],
}

impl OrientedKernel {
    pub fn shape(&self) -> KernelShape {
        KernelShape {
            time: self.kernel.height(),
            space: self.kernel.width(),
        }
    }
}

/// The four separable base kernels.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseKernels {
    pub se_ts: Image<f64>,
    pub se_tf: Image<f64>,
    pub so_ts: Image<f64>,
    pub so_tf: Image<f64>,
}

/// Left and right quadrature pairs built from one spatial and one temporal bank.
#[derive(Debug, Clone, PartialEq)]
pub struct OrientedFilterSet {
    pub base: BaseKernels,
    kernels: [OrientedKernel; 4],
}

impl OrientedFilterSet {
    /// Outer-product the filter banks and combine into oriented kernels.
    pub fn new(spatial: &SpatialFilterBank, temporal: &TemporalFilterBank) -> Self {
        let base = BaseKernels {
            se_ts: Image::outer(&temporal.slow, &spatial.even),
            se_tf: Image::outer(&temporal.fast, &spatial.even),
            so_ts: Image::outer(&temporal.slow, &spatial.odd),
            so_tf: Image::outer(&temporal.fast, &spatial.odd),
        };

        let kernels = FilterId::ALL.map(|id| build_kernel(id, &base, spatial, temporal));

        debug!(
            shape = %kernels[0].shape(),
            "built oriented quadrature filters"
        );
        OrientedFilterSet { base, kernels }
    }

    /// Shape shared by all four kernels.
    pub fn shape(&self) -> KernelShape {
        self.kernels[0].shape()
    }

    pub fn get(&self, id: FilterId) -> &OrientedKernel {
        &self.kernels[id.index()]
    }

    /// All four kernels in `FilterId::ALL` order.
    pub fn kernels(&self) -> &[OrientedKernel; 4] {
        &self.kernels
    }
}

fn build_kernel(
    id: FilterId,
    base: &BaseKernels,
    spatial: &SpatialFilterBank,
    temporal: &TemporalFilterBank,
) -> OrientedKernel {
    let [(s0, t0, p0), (s1, t1, p1)] = id.terms();
    let kernel = base
        .pick(t0, p0)
        .linear_combination(s0, base.pick(t1, p1), s1);
    let term = |sign: f64, t: TemporalKind, p: SpatialPhase| SeparableTerm {
        sign,
        temporal: match t {
            TemporalKind::Slow => temporal.slow.clone(),
            TemporalKind::Fast => temporal.fast.clone(),
        },
        spatial: match p {
            SpatialPhase::Even => spatial.even.clone(),
            SpatialPhase::Odd => spatial.odd.clone(),
        },
    };
    OrientedKernel {
        id,
        kernel,
        terms: [term(s0, t0, p0), term(s1, t1, p1)],
    }
}

impl BaseKernels {
    pub fn pick(&self, temporal: TemporalKind, phase: SpatialPhase) -> &Image<f64> {
        match (temporal, phase) {
            (TemporalKind::Slow, SpatialPhase::Even) => &self.se_ts,
            (TemporalKind::Fast, SpatialPhase::Even) => &self.se_tf,
            (TemporalKind::Slow, SpatialPhase::Odd) => &self.so_ts,
            (TemporalKind::Fast, SpatialPhase::Odd) => &self.so_tf,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_set() -> OrientedFilterSet {
        let spatial = SpatialFilterBank::new(80, 2.0, 0.5, 1.1);
        let temporal = TemporalFilterBank::new(100, 0.5, 100.0, 0.9, 9, 6);
        OrientedFilterSet::new(&spatial, &temporal)
    }

    #[test]
    fn test_shape_is_time_by_space() {
        let set = default_set();
        assert_eq!(set.shape(), KernelShape { time: 100, space: 80 });
        for k in set.kernels() {
            assert_eq!(k.kernel.height(), 100);
            assert_eq!(k.kernel.width(), 80);
        }
    }

    #[test]
    fn test_combination_rule() {
        let set = default_set();
        let b = &set.base;
        for (x, y, _) in b.se_ts.pixels() {
            let (se_ts, se_tf) = (b.se_ts.get(x, y), b.se_tf.get(x, y));
            let (so_ts, so_tf) = (b.so_ts.get(x, y), b.so_tf.get(x, y));
            assert_eq!(set.get(FilterId::Left1).kernel.get(x, y), so_tf + se_ts);
            assert_eq!(set.get(FilterId::Left2).kernel.get(x, y), -so_ts + se_tf);
            assert_eq!(set.get(FilterId::Right1).kernel.get(x, y), -so_tf + se_ts);
            assert_eq!(set.get(FilterId::Right2).kernel.get(x, y), so_ts + se_tf);
        }
    }

    #[test]
    fn test_separable_terms_reconstruct_kernel() {
        let set = default_set();
        for k in set.kernels() {
            for (x, y, v) in k.kernel.pixels() {
                let sum: f64 = k
                    .terms
                    .iter()
                    .map(|t| t.sign * t.temporal[y] * t.spatial[x])
                    .sum();
                assert!((sum - v).abs() < 1e-15, "{} mismatch at ({x},{y})", k.id);
            }
        }
    }

    #[test]
    fn test_left_right_differ_only_in_odd_sign() {
        // left_1 + right_1 = 2·SE_TS and left_2 + right_2 = 2·SE_TF.
        let set = default_set();
        let l1 = &set.get(FilterId::Left1).kernel;
        let r1 = &set.get(FilterId::Right1).kernel;
        let sum = l1.linear_combination(1.0, r1, 1.0);
        for (x, y, v) in sum.pixels() {
            assert!((v - 2.0 * set.base.se_ts.get(x, y)).abs() < 1e-15);
        }
    }

    #[test]
    fn test_directions() {
        assert_eq!(FilterId::Left2.direction(), Direction::Left);
        assert_eq!(FilterId::Right1.direction(), Direction::Right);
        assert_eq!(FilterId::Right2.to_string(), "right_2");
    }
}
