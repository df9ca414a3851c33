// error.rs — Error taxonomy for the motion-energy pipeline.
//
// Every failure is fatal to a run: the computation is deterministic, so the
// caller has to change the configuration or the stimulus before retrying.
// Each variant carries the offending parameter / axis / size so the message
// alone is enough to fix the input.
//
// Out-of-bounds pixel access on `Image` is NOT represented here. That is a
// programming error and panics with a descriptive message (see image.rs).

use std::fmt;

use thiserror::Error;

/// Named axis of a time × space array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Rows of a time-major array.
    Time,
    /// Columns of a time-major array.
    Space,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Time => write!(f, "time"),
            Axis::Space => write!(f, "space"),
        }
    }
}

/// Errors raised while building filters, validating input, or pooling energy.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MotionError {
    /// A filter parameter is out of its valid range.
    #[error("invalid configuration: `{parameter}` = {value} ({reason})")]
    Configuration {
        parameter: &'static str,
        value: String,
        reason: &'static str,
    },

    /// The stimulus is smaller than the oriented kernels along `axis`,
    /// so a "valid" convolution has no output positions.
    #[error(
        "stimulus too small along {axis} axis: {stimulus} samples, kernel needs at least {kernel}"
    )]
    Boundary {
        axis: Axis,
        stimulus: usize,
        kernel: usize,
    },

    /// Total response energy is zero (or not finite), so no normalization
    /// is possible.
    #[error("degenerate stimulus: total motion energy is {total_energy}, cannot normalize")]
    DegenerateInput { total_energy: f64 },

    /// Stimulus or kernel data does not describe a rectangular, non-empty array.
    #[error("malformed input: {0}")]
    Shape(String),
}

impl MotionError {
    /// Shorthand for a configuration error on a numeric parameter.
    pub(crate) fn config<V: fmt::Display>(
        parameter: &'static str,
        value: V,
        reason: &'static str,
    ) -> Self {
        MotionError::Configuration {
            parameter,
            value: value.to_string(),
            reason,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MotionError>;
