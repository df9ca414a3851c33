// temporal.rs — Fast/slow biphasic temporal impulse responses.
//
// Both filters come from one family, differing only in order n:
//
//   filter_n(t) = (k·t)^n · exp(-k·t) · (1/n! − beta·(k·t)²/(n+2)!)
//
// The first term is a gamma-like positive lobe peaking near t = n/k; the
// second subtracts a later, beta-weighted lobe, giving a biphasic response.
//
// The slow filter (higher n) lags the fast one. In the frequency domain the
// ratio slow/fast is exactly (k / (k + iω))^(slow_n − fast_n), so with the
// default orders (9 and 6) the pair is in temporal quadrature at
// ω = k·tan(π/6). That is the frequency the oriented filters prefer.

use tracing::debug;

use crate::config::{linspace, MotionEnergyConfig};

/// Temporal sample positions, uniformly spaced over [0, max_t].
#[derive(Debug, Clone, PartialEq)]
pub struct TemporalAxis(Vec<f64>);

impl TemporalAxis {
    pub fn new(nt: usize, max_t: f64) -> Self {
        TemporalAxis(linspace(0.0, max_t, nt))
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

/// Fast and slow temporal filters sampled on a `TemporalAxis`.
#[derive(Debug, Clone, PartialEq)]
pub struct TemporalFilterBank {
    pub axis: TemporalAxis,
    pub slow: Vec<f64>,
    pub fast: Vec<f64>,
    pub k: f64,
    pub beta: f64,
    pub slow_n: u32,
    pub fast_n: u32,
}

impl TemporalFilterBank {
    /// Build both filters from raw parameters.
    ///
    /// Parameters are assumed valid (see `MotionEnergyConfig::validate`).
    pub fn new(nt: usize, max_t: f64, k: f64, beta: f64, slow_n: u32, fast_n: u32) -> Self {
        let axis = TemporalAxis::new(nt, max_t);
        let slow = impulse_response(axis.as_slice(), k, beta, slow_n);
        let fast = impulse_response(axis.as_slice(), k, beta, fast_n);

        debug!(nt, max_t, k, beta, slow_n, fast_n, "built temporal filter pair");
        TemporalFilterBank {
            axis,
            slow,
            fast,
            k,
            beta,
            slow_n,
            fast_n,
        }
    }

    /// Build from a (validated) configuration.
    pub fn from_config(config: &MotionEnergyConfig) -> Self {
        Self::new(
            config.nt,
            config.max_t,
            config.k,
            config.beta,
            config.slow_n,
            config.fast_n,
        )
    }

    pub fn len(&self) -> usize {
        self.axis.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axis.is_empty()
    }
}

/// Sample `filter_n` at each time in `ts`.
///
/// Both terms are evaluated in log space: `(kt)^m e^{-kt} / m!` is bounded
/// by 1 for every order, whereas its factors overflow and underflow
/// separately once `kt` or `m` gets large.
pub fn impulse_response(ts: &[f64], k: f64, beta: f64, n: u32) -> Vec<f64> {
    let ln_fact_n = ln_factorial(n);
    let ln_fact_n2 = ln_factorial(n + 2);
    let order = n as f64;

    ts.iter()
        .map(|&t| {
            let kt = k * t;
            if kt <= 0.0 {
                // A validated config never gives kt < 0. At kt = 0 only the
                // order-0 leading term survives.
                return if n == 0 { 1.0 } else { 0.0 };
            }
            let ln_kt = kt.ln();
            let lead = (order * ln_kt - kt - ln_fact_n).exp();
            let tail = ((order + 2.0) * ln_kt - kt - ln_fact_n2).exp();
            lead - beta * tail
        })
        .collect()
}

/// ln(n!), summed term by term.
pub fn ln_factorial(n: u32) -> f64 {
    (2..=n).map(|i| (i as f64).ln()).sum()
}
