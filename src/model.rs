// model.rs — Top-level motion-energy pipeline.
//
// Ties every stage together in dependency order:
//
//   1. Validate the configuration
//   2. Build spatial and temporal filter banks
//   3. Combine them into the oriented filter set
//   4. Per stimulus: convolve (ConvolutionEngine), then pool (EnergyPool)
//
// Steps 1–3 run once in `new`; `analyze` only does step 4, so one model can
// score many stimuli. Nothing is mutated after construction: `analyze`
// takes `&self` and the model can be shared across threads.

use tracing::{debug, info_span};

use crate::config::MotionEnergyConfig;
use crate::convolution::{ConvolutionEngine, ConvolutionStrategy, ResponseMaps};
use crate::energy::{EnergyPool, MotionEnergy};
use crate::error::Result;
use crate::oriented::{KernelShape, OrientedFilterSet};
use crate::spatial::SpatialFilterBank;
use crate::stimulus::Stimulus;
use crate::temporal::TemporalFilterBank;

/// A configured motion-energy detector.
#[derive(Debug, Clone)]
pub struct MotionEnergyModel {
    config: MotionEnergyConfig,
    spatial: SpatialFilterBank,
    temporal: TemporalFilterBank,
    filters: OrientedFilterSet,
    engine: ConvolutionEngine,
    pool: EnergyPool,
}

impl MotionEnergyModel {
    /// Validate `config` and build all filters, using the default
    /// (separable) convolution strategy.
    pub fn new(config: MotionEnergyConfig) -> Result<Self> {
        Self::with_strategy(config, ConvolutionStrategy::default())
    }

    /// Like `new`, with an explicit convolution strategy.
    pub fn with_strategy(config: MotionEnergyConfig, strategy: ConvolutionStrategy) -> Result<Self> {
        config.validate()?;

        let spatial = SpatialFilterBank::from_config(&config);
        let temporal = TemporalFilterBank::from_config(&config);
        let filters = OrientedFilterSet::new(&spatial, &temporal);
        debug!(kernel = %filters.shape(), ?strategy, "motion-energy model ready");

        Ok(MotionEnergyModel {
            config,
            spatial,
            temporal,
            filters,
            engine: ConvolutionEngine::new(strategy),
            pool: EnergyPool,
        })
    }

    /// Convolve and pool one stimulus.
    pub fn analyze(&self, stimulus: &Stimulus) -> Result<MotionEnergy> {
        let _span = info_span!(
            "analyze",
            time = stimulus.time_len(),
            space = stimulus.space_len()
        )
        .entered();
        let responses = self.responses(stimulus)?;
        self.pool.pool(&responses)
    }

    /// Only the convolution stage, for callers that want raw responses.
    pub fn responses(&self, stimulus: &Stimulus) -> Result<ResponseMaps> {
        self.engine.respond(stimulus, &self.filters)
    }

    pub fn config(&self) -> &MotionEnergyConfig {
        &self.config
    }

    pub fn spatial(&self) -> &SpatialFilterBank {
        &self.spatial
    }

    pub fn temporal(&self) -> &TemporalFilterBank {
        &self.temporal
    }

    pub fn filters(&self) -> &OrientedFilterSet {
        &self.filters
    }

    pub fn kernel_shape(&self) -> KernelShape {
        self.filters.shape()
    }

    pub fn strategy(&self) -> ConvolutionStrategy {
        self.engine.strategy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MotionError;

    #[test]
    fn test_invalid_config_rejected_at_construction() {
        let cfg = MotionEnergyConfig {
            nt: 0,
            ..Default::default()
        };
        let err = MotionEnergyModel::new(cfg).unwrap_err();
        assert!(matches!(
            err,
            MotionError::Configuration { parameter: "nt", .. }
        ));
    }

    #[test]
    fn test_kernel_shape_follows_config() {
        let cfg = MotionEnergyConfig {
            nx: 9,
            nt: 7,
            ..Default::default()
        };
        let model = MotionEnergyModel::new(cfg).unwrap();
        assert_eq!(model.kernel_shape(), KernelShape { time: 7, space: 9 });
        assert_eq!(model.spatial().len(), 9);
        assert_eq!(model.temporal().len(), 7);
        assert_eq!(model.strategy(), ConvolutionStrategy::Separable);
    }
}
