// tests/test_filters.rs — Integration tests for filter construction.

use motion_energy::config::MotionEnergyConfig;
use motion_energy::oriented::{FilterId, KernelShape, OrientedFilterSet};
use motion_energy::spatial::SpatialFilterBank;
use motion_energy::temporal::TemporalFilterBank;
use motion_energy::{MotionEnergyModel, MotionError};

// ===== Determinism =====

#[test]
fn filter_banks_are_bit_identical_across_builds() {
    let cfg = MotionEnergyConfig::default();
    let a = MotionEnergyModel::new(cfg.clone()).unwrap();
    let b = MotionEnergyModel::new(cfg).unwrap();

    assert_eq!(a.spatial(), b.spatial());
    assert_eq!(a.temporal(), b.temporal());
    for id in FilterId::ALL {
        let ka = &a.filters().get(id).kernel;
        let kb = &b.filters().get(id).kernel;
        // Compare bit patterns, not just values.
        for (va, vb) in ka.as_slice().iter().zip(kb.as_slice()) {
            assert_eq!(va.to_bits(), vb.to_bits(), "{id} differs between builds");
        }
    }
}

// ===== Spatial =====

#[test]
fn quadrature_identity_holds_for_other_parameters() {
    for (sx, sf) in [(0.3, 0.5), (1.0, 2.0), (0.5, 1.1)] {
        let bank = SpatialFilterBank::new(101, 3.0, sx, sf);
        for i in 0..bank.len() {
            let lhs = bank.even[i].powi(2) + bank.odd[i].powi(2);
            let rhs = bank.gaussian[i].powi(2);
            assert!(
                (lhs - rhs).abs() <= 1e-14 * rhs.max(1e-300),
                "sx={sx} sf={sf} i={i}: {lhs} vs {rhs}"
            );
        }
    }
}

// ===== Temporal =====

#[test]
fn fast_and_slow_share_dc_gain() {
    // Both filters integrate to (1 − beta)/k in continuous time; sampled
    // sums (scaled by dt) come out very close.
    let cfg = MotionEnergyConfig::default();
    let bank = TemporalFilterBank::from_config(&cfg);
    let dt = cfg.dt();
    let slow: f64 = bank.slow.iter().sum::<f64>() * dt;
    let fast: f64 = bank.fast.iter().sum::<f64>() * dt;
    let expected = (1.0 - cfg.beta) / cfg.k;
    assert!((slow - expected).abs() < 1e-8, "slow {slow} vs {expected}");
    assert!((fast - expected).abs() < 1e-8, "fast {fast} vs {expected}");
}

// ===== Oriented =====

#[test]
fn oriented_kernels_match_config_shape() {
    let cfg = MotionEnergyConfig {
        nx: 33,
        nt: 17,
        ..Default::default()
    };
    let spatial = SpatialFilterBank::from_config(&cfg);
    let temporal = TemporalFilterBank::from_config(&cfg);
    let set = OrientedFilterSet::new(&spatial, &temporal);

    assert_eq!(set.shape(), cfg.kernel_shape());
    assert_eq!(set.shape(), KernelShape { time: 17, space: 33 });
    for k in set.kernels() {
        assert_eq!(k.kernel.width(), 33, "{} width", k.id);
        assert_eq!(k.kernel.height(), 17, "{} height", k.id);
    }
}

#[test]
fn left_and_right_pairs_are_mirror_images_in_space() {
    // Mirroring x flips the odd filter's sign and leaves the even filter
    // unchanged, which turns left_1 into right_1 and left_2 into right_2.
    let model = MotionEnergyModel::new(MotionEnergyConfig::default()).unwrap();
    let f = model.filters();
    let pairs = [
        (FilterId::Left1, FilterId::Right1),
        (FilterId::Left2, FilterId::Right2),
    ];
    for (l, r) in pairs {
        let kl = &f.get(l).kernel;
        let kr = &f.get(r).kernel;
        let w = kl.width();
        for (x, y, v) in kl.pixels() {
            assert!(
                (v - kr.get(w - 1 - x, y)).abs() < 1e-12,
                "{l} vs mirrored {r} at ({x},{y})"
            );
        }
    }
}

#[test]
fn fast_rate_with_high_order_keeps_filters_finite() {
    let cfg = MotionEnergyConfig {
        k: 1e5,
        slow_n: 160,
        fast_n: 150,
        ..Default::default()
    };
    let model = MotionEnergyModel::new(cfg).unwrap();

    let temporal = model.temporal();
    let bad_slow = temporal.slow.iter().filter(|v| !v.is_finite()).count();
    let bad_fast = temporal.fast.iter().filter(|v| !v.is_finite()).count();
    assert_eq!(bad_slow, 0, "non-finite slow samples");
    assert_eq!(bad_fast, 0, "non-finite fast samples");
    for id in FilterId::ALL {
        let kernel = &model.filters().get(id).kernel;
        assert!(kernel.as_slice().iter().all(|v| v.is_finite()), "{id}");
    }
}

// ===== Configuration errors =====

#[test]
fn configuration_errors_name_the_parameter() {
    let cases: Vec<(MotionEnergyConfig, &str)> = vec![
        (MotionEnergyConfig { nx: 0, ..Default::default() }, "nx"),
        (MotionEnergyConfig { nt: 0, ..Default::default() }, "nt"),
        (MotionEnergyConfig { sx: 0.0, ..Default::default() }, "sx"),
        (MotionEnergyConfig { k: -1.0, ..Default::default() }, "k"),
        (MotionEnergyConfig { max_x: -2.0, ..Default::default() }, "max_x"),
        (MotionEnergyConfig { fast_n: 500, ..Default::default() }, "fast_n"),
    ];
    for (cfg, name) in cases {
        match MotionEnergyModel::new(cfg) {
            Err(MotionError::Configuration { parameter, .. }) => assert_eq!(parameter, name),
            other => panic!("expected configuration error for {name}, got {other:?}"),
        }
    }
}
