// motion-energy: space-time motion-energy detector
// CPU reference implementation of quadrature motion-energy filtering
//
// Reference: Adelson & Bergen, "Spatiotemporal energy models for the
// perception of motion" (JOSA A, 1985)

pub mod error;
pub mod image;
pub mod config;
pub mod spatial;
pub mod temporal;
pub mod oriented;
pub mod stimulus;
pub mod convolution;
pub mod energy;
pub mod model;
pub mod convert;

pub use config::MotionEnergyConfig;
pub use convolution::{ConvolutionEngine, ConvolutionStrategy, ResponseMaps};
pub use energy::{EnergyPool, MotionEnergy, NetMotion};
pub use error::{Axis, MotionError, Result};
pub use image::Image;
pub use model::MotionEnergyModel;
pub use oriented::{FilterId, KernelShape, OrientedFilterSet};
pub use spatial::SpatialFilterBank;
pub use stimulus::{AxisOrder, Drift, Grating, Stimulus};
pub use temporal::TemporalFilterBank;
