// convolution.rs — "Valid" 2D convolution of a stimulus with space-time kernels.
//
// VALID MODE: an output sample exists only where the kernel fully overlaps
// the input. No padding, no clamping, no extrapolation. For an input of
// H×W and a kernel of KH×KW the output is (H−KH+1)×(W−KW+1):
//
//   out(x, y) = Σ_{ky, kx} K(kx, ky) · S(x + KW−1 − kx, y + KH−1 − ky)
//
// Both kernel axes are REVERSED (true convolution, not correlation). Along
// time this makes kernel row 0 weigh the most recent input sample, which
// is what gives the temporal filters their causal meaning. Along space it
// fixes which sign of phase velocity the "right" filters prefer. Swapping to
// correlation would silently exchange left and right.
//
// Two ways to compute the same thing:
//   Direct:    full 2D kernel, O(KH·KW) per output sample.
//   Separable: each oriented kernel is a signed sum of two outer products
//              temporal ⊗ spatial, so it splits into a space pass along rows
//              followed by a time pass along columns, O(KH+KW) per output
//              sample per term. Linearity makes the results equal up to
//              floating-point rounding.
//
// The four oriented kernels are independent, so their responses are
// computed in parallel with rayon. Each map is produced by exactly the same
// arithmetic whichever thread runs it, so the result does not depend on
// scheduling.

use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, trace};

use crate::error::{Axis, MotionError, Result};
use crate::image::Image;
use crate::oriented::{FilterId, KernelShape, OrientedFilterSet, OrientedKernel};
use crate::stimulus::Stimulus;

/// How the engine evaluates each oriented kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConvolutionStrategy {
    /// Convolve with the full 2D kernel.
    Direct,
    /// Convolve with each separable term as two 1D passes and sum.
    #[default]
    Separable,
}

/// Output shape of a valid convolution, as (width, height).
///
/// Fails with `MotionError::Shape` for an empty kernel, and with
/// `MotionError::Boundary` if the input is smaller than the kernel along
/// either axis. Time is checked first.
pub fn valid_output_size(input: &Image<f64>, kernel: KernelShape) -> Result<(usize, usize)> {
    if kernel.time == 0 || kernel.space == 0 {
        return Err(MotionError::Shape(format!("kernel {kernel} is empty")));
    }
    if input.height() < kernel.time {
        return Err(MotionError::Boundary {
            axis: Axis::Time,
            stimulus: input.height(),
            kernel: kernel.time,
        });
    }
    if input.width() < kernel.space {
        return Err(MotionError::Boundary {
            axis: Axis::Space,
            stimulus: input.width(),
            kernel: kernel.space,
        });
    }
    Ok((
        input.width() - kernel.space + 1,
        input.height() - kernel.time + 1,
    ))
}

/// Full 2D valid convolution.
pub fn convolve_valid(src: &Image<f64>, kernel: &Image<f64>) -> Result<Image<f64>> {
    let shape = KernelShape {
        time: kernel.height(),
        space: kernel.width(),
    };
    let (out_w, out_h) = valid_output_size(src, shape)?;
    let (kw, kh) = (kernel.width(), kernel.height());
    let mut out = vec![0.0f64; out_w * out_h];

    for y in 0..out_h {
        let out_row = &mut out[y * out_w..(y + 1) * out_w];
        for ky in 0..kh {
            // Kernel row ky meets input row y + KH−1 − ky.
            let src_row = src.row(y + kh - 1 - ky);
            let k_row = kernel.row(ky);
            for (x, acc) in out_row.iter_mut().enumerate() {
                // Kernel column kx meets input column x + KW−1 − kx.
                let window = &src_row[x..x + kw];
                let mut sum = 0.0;
                for (kv, sv) in k_row.iter().zip(window.iter().rev()) {
                    sum += kv * sv;
                }
                *acc += sum;
            }
        }
    }
    Ok(Image::from_vec(out_w, out_h, out))
}

/// Valid 1D convolution of every row with `kernel` (space pass).
///
/// Output width is `width − kernel.len() + 1`; height is unchanged.
pub fn convolve_rows_valid(src: &Image<f64>, kernel: &[f64]) -> Result<Image<f64>> {
    let shape = KernelShape {
        time: 1,
        space: kernel.len(),
    };
    let (out_w, _) = valid_output_size(src, shape)?;
    let k = kernel.len();
    let mut out = Vec::with_capacity(out_w * src.height());

    for y in 0..src.height() {
        let row = src.row(y);
        for x in 0..out_w {
            let window = &row[x..x + k];
            out.push(
                kernel
                    .iter()
                    .zip(window.iter().rev())
                    .map(|(kv, sv)| kv * sv)
                    .sum::<f64>(),
            );
        }
    }
    Ok(Image::from_vec(out_w, src.height(), out))
}

/// Valid 1D convolution of every column with `kernel` (time pass).
///
/// Output height is `height − kernel.len() + 1`; width is unchanged.
pub fn convolve_cols_valid(src: &Image<f64>, kernel: &[f64]) -> Result<Image<f64>> {
    let shape = KernelShape {
        time: kernel.len(),
        space: 1,
    };
    let (_, out_h) = valid_output_size(src, shape)?;
    let k = kernel.len();
    let w = src.width();
    let mut out = vec![0.0f64; w * out_h];

    for y in 0..out_h {
        let out_row = &mut out[y * w..(y + 1) * w];
        for (ki, &kv) in kernel.iter().enumerate() {
            // Kernel tap ki meets input row y + K−1 − ki.
            let src_row = src.row(y + k - 1 - ki);
            for (acc, &sv) in out_row.iter_mut().zip(src_row) {
                *acc += kv * sv;
            }
        }
    }
    Ok(Image::from_vec(w, out_h, out))
}

/// Valid convolution with the separable kernel `kernel_col ⊗ kernel_row`:
/// space pass along rows, then time pass along columns.
pub fn convolve_separable_valid(
    src: &Image<f64>,
    kernel_row: &[f64],
    kernel_col: &[f64],
) -> Result<Image<f64>> {
    // Check the full 2D footprint up front so the error names the right axis.
    valid_output_size(
        src,
        KernelShape {
            time: kernel_col.len(),
            space: kernel_row.len(),
        },
    )?;
    let intermediate = convolve_rows_valid(src, kernel_row)?;
    convolve_cols_valid(&intermediate, kernel_col)
}

/// Responses of one stimulus to the four oriented kernels.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseMaps {
    pub left_1: Image<f64>,
    pub left_2: Image<f64>,
    pub right_1: Image<f64>,
    pub right_2: Image<f64>,
}

impl ResponseMaps {
    pub fn get(&self, id: FilterId) -> &Image<f64> {
        match id {
            FilterId::Left1 => &self.left_1,
            FilterId::Left2 => &self.left_2,
            FilterId::Right1 => &self.right_1,
            FilterId::Right2 => &self.right_2,
        }
    }

    /// Shape shared by all four maps, as (width, height).
    pub fn size(&self) -> (usize, usize) {
        (self.left_1.width(), self.left_1.height())
    }
}

/// Convolves a stimulus against an `OrientedFilterSet`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvolutionEngine {
    strategy: ConvolutionStrategy,
}

impl ConvolutionEngine {
    pub fn new(strategy: ConvolutionStrategy) -> Self {
        ConvolutionEngine { strategy }
    }

    pub fn strategy(&self) -> ConvolutionStrategy {
        self.strategy
    }

    /// Compute all four response maps.
    ///
    /// Fails with `MotionError::Boundary` before any work is done if the
    /// stimulus is smaller than the kernels.
    pub fn respond(&self, stimulus: &Stimulus, filters: &OrientedFilterSet) -> Result<ResponseMaps> {
        let src = stimulus.image();
        let (out_w, out_h) = valid_output_size(src, filters.shape())?;
        debug!(
            stimulus_time = stimulus.time_len(),
            stimulus_space = stimulus.space_len(),
            kernel = %filters.shape(),
            out_time = out_h,
            out_space = out_w,
            strategy = ?self.strategy,
            "convolving stimulus"
        );

        // Indexed collect keeps FilterId::ALL order.
        let maps: Vec<Image<f64>> = FilterId::ALL
            .par_iter()
            .map(|&id| self.convolve_one(src, filters.get(id)))
            .collect::<Result<Vec<_>>>()?;
        let [left_1, left_2, right_1, right_2] = <[Image<f64>; 4]>::try_from(maps)
            .map_err(|m| MotionError::Shape(format!("expected 4 response maps, got {}", m.len())))?;

        Ok(ResponseMaps {
            left_1,
            left_2,
            right_1,
            right_2,
        })
    }

    fn convolve_one(&self, src: &Image<f64>, kernel: &OrientedKernel) -> Result<Image<f64>> {
        let start = Instant::now();
        let out = match self.strategy {
            ConvolutionStrategy::Direct => convolve_valid(src, &kernel.kernel)?,
            ConvolutionStrategy::Separable => {
                let [a, b] = &kernel.terms;
                let ra = convolve_separable_valid(src, &a.spatial, &a.temporal)?;
                let rb = convolve_separable_valid(src, &b.spatial, &b.temporal)?;
                ra.linear_combination(a.sign, &rb, b.sign)
            }
        };
        trace!(filter = %kernel.id, elapsed_us = start.elapsed().as_micros() as u64, "response map done");
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_kernel() {
        // A 1×1 kernel [1] reproduces the input.
        let data: Vec<f64> = (0..12).map(|v| v as f64).collect();
        let img = Image::from_vec(4, 3, data);
        let k = Image::from_vec(1, 1, vec![1.0]);
        let out = convolve_valid(&img, &k).unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn test_output_shrinks_by_kernel_minus_one() {
        let img: Image<f64> = Image::new(10, 7);
        let k: Image<f64> = Image::new(3, 4);
        let out = convolve_valid(&img, &k).unwrap();
        assert_eq!(out.width(), 8);
        assert_eq!(out.height(), 4);
    }

    #[test]
    fn test_convolution_not_correlation_in_space() {
        // Input [1, 2, 3], kernel [1, 0]: convolution gives out[x] = in[x+1]·k[0] + in[x]·k[1]
        // = [2, 3]. Correlation would give [1, 2].
        let img = Image::from_vec(3, 1, vec![1.0, 2.0, 3.0]);
        let k = Image::from_vec(2, 1, vec![1.0, 0.0]);
        let out = convolve_valid(&img, &k).unwrap();
        assert_eq!(out.as_slice(), &[2.0, 3.0]);
    }

    #[test]
    fn test_convolution_not_correlation_in_time() {
        // Column input [1, 2, 3] over time, kernel [1, 0] over time:
        // kernel row 0 meets the latest sample.
        let img = Image::from_vec(1, 3, vec![1.0, 2.0, 3.0]);
        let k = Image::from_vec(1, 2, vec![1.0, 0.0]);
        let out = convolve_valid(&img, &k).unwrap();
        assert_eq!(out.as_slice(), &[2.0, 3.0]);
        let cols = convolve_cols_valid(&img, &[1.0, 0.0]).unwrap();
        assert_eq!(cols.as_slice(), &[2.0, 3.0]);
    }

    #[test]
    fn test_known_2d_value() {
        // 3×3 input, 2×2 kernel; hand-computed with both axes flipped.
        let img = Image::from_vec(3, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        let k = Image::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]);
        let out = convolve_valid(&img, &k).unwrap();
        // out(0,0) = 1·5 + 2·4 + 3·2 + 4·1 = 23
        assert_eq!(out.get(0, 0), 23.0);
        // out(1,1) = 1·9 + 2·8 + 3·6 + 4·5 = 63
        assert_eq!(out.get(1, 1), 63.0);
    }

    #[test]
    fn test_separable_matches_direct() {
        let img = Image::from_fn(12, 9, |x, y| ((x * 7 + y * 3) % 5) as f64 - 2.0);
        let col = [0.5, -1.0, 2.0, 0.25];
        let row = [1.0, 3.0, -2.0];
        let k = Image::outer(&col, &row);
        let direct = convolve_valid(&img, &k).unwrap();
        let sep = convolve_separable_valid(&img, &row, &col).unwrap();
        assert_eq!(direct.width(), sep.width());
        assert_eq!(direct.height(), sep.height());
        for (x, y, v) in direct.pixels() {
            assert!((v - sep.get(x, y)).abs() < 1e-12, "mismatch at ({x},{y})");
        }
    }

    #[test]
    fn test_boundary_error_time_first() {
        let img: Image<f64> = Image::new(60, 90);
        let k: Image<f64> = Image::new(80, 100);
        let err = convolve_valid(&img, &k).unwrap_err();
        assert_eq!(
            err,
            MotionError::Boundary {
                axis: Axis::Time,
                stimulus: 90,
                kernel: 100
            }
        );
    }

    #[test]
    fn test_boundary_error_space() {
        let img: Image<f64> = Image::new(60, 120);
        let k: Image<f64> = Image::new(80, 100);
        let err = convolve_valid(&img, &k).unwrap_err();
        assert!(matches!(
            err,
            MotionError::Boundary {
                axis: Axis::Space,
                ..
            }
        ));
        let err = convolve_separable_valid(&img, &[0.0; 80], &[0.0; 100]).unwrap_err();
        assert!(matches!(
            err,
            MotionError::Boundary {
                axis: Axis::Space,
                ..
            }
        ));
    }

    #[test]
    fn test_empty_kernel_is_shape_error() {
        let img: Image<f64> = Image::new(10, 10);
        let err = convolve_rows_valid(&img, &[]).unwrap_err();
        assert!(matches!(err, MotionError::Shape(_)), "{err}");
        let err = convolve_cols_valid(&img, &[]).unwrap_err();
        assert!(err.to_string().contains("empty"), "{err}");
        let k: Image<f64> = Image::new(0, 3);
        assert!(matches!(
            convolve_valid(&img, &k),
            Err(MotionError::Shape(_))
        ));
    }

    #[test]
    fn test_exact_fit_gives_single_sample() {
        let img = Image::from_vec(2, 2, vec![1.0, 1.0, 1.0, 1.0]);
        let k = Image::from_vec(2, 2, vec![0.25, 0.25, 0.25, 0.25]);
        let out = convolve_valid(&img, &k).unwrap();
        assert_eq!(out.width(), 1);
        assert_eq!(out.height(), 1);
        assert!((out.get(0, 0) - 1.0).abs() < 1e-15);
    }
}
