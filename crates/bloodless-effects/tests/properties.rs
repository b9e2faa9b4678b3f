//! Property-based tests for the signal chain.
//!
//! Bypass must be an exact identity, processing must be reproducible, and
//! no parameter combination may produce non-finite output or meter readings.

use std::sync::Arc;

use bloodless_effects::{ChainConfig, ParameterStore, SignalChain};
use proptest::prelude::*;

fn new_chain(threshold_db: f32, cutoff_hz: f32, bypass: bool) -> (SignalChain, Arc<ParameterStore>) {
    let params = Arc::new(ParameterStore::new());
    params.set_threshold_db(threshold_db);
    params.set_cutoff_hz(cutoff_hz);
    params.set_bypass(bypass);
    let (chain, _taps) = SignalChain::new(ChainConfig::new(48000.0), Arc::clone(&params))
        .expect("default config is valid");
    (chain, params)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn bypass_output_equals_input(
        left in prop::collection::vec(-1.0f32..=1.0, 1..2048),
        threshold in -60.0f32..=36.0,
        cutoff in 20.0f32..=20000.0,
    ) {
        let right: Vec<f32> = left.iter().map(|x| -x * 0.5).collect();
        let (mut chain, _params) = new_chain(threshold, cutoff, true);

        let (mut l, mut r) = (left.clone(), right.clone());
        chain.process(&mut l, &mut r);
        prop_assert_eq!(l, left);
        prop_assert_eq!(r, right);
    }

    #[test]
    fn processing_is_deterministic(
        left in prop::collection::vec(-1.0f32..=1.0, 1..1024),
        threshold in -60.0f32..=36.0,
        cutoff in 20.0f32..=20000.0,
    ) {
        let (mut a, _pa) = new_chain(threshold, cutoff, false);
        let (mut b, _pb) = new_chain(threshold, cutoff, false);

        let (mut l1, mut r1) = (left.clone(), left.clone());
        let (mut l2, mut r2) = (left.clone(), left.clone());
        a.process(&mut l1, &mut r1);
        b.process(&mut l2, &mut r2);
        prop_assert_eq!(l1, l2);
        prop_assert_eq!(r1, r2);
    }

    #[test]
    fn output_and_meters_stay_finite(
        left in prop::collection::vec(-1.0f32..=1.0, 0..1024),
        threshold in -60.0f32..=36.0,
        cutoff in 20.0f32..=20000.0,
    ) {
        let (mut chain, _params) = new_chain(threshold, cutoff, false);
        let (mut l, mut r) = (left.clone(), left.clone());
        chain.process(&mut l, &mut r);

        prop_assert!(l.iter().chain(r.iter()).all(|s| s.is_finite()));
        for db in [chain.dry_rms_db(), chain.wet_rms_db()] {
            prop_assert!(db.is_finite());
            prop_assert!((-60.0..=36.0).contains(&db));
        }
    }

    #[test]
    fn compression_never_raises_wet_level(
        amplitude in 0.01f32..=1.0,
        threshold in -60.0f32..=36.0,
    ) {
        let (mut chain, _params) = new_chain(threshold, 20.0, false);
        let mut l: Vec<f32> = (0..2048)
            .map(|i| amplitude * libm::sinf(i as f32 * 0.05))
            .collect();
        let mut r = l.clone();
        chain.process(&mut l, &mut r);
        prop_assert!(chain.wet_rms_db() <= chain.dry_rms_db() + 1e-4);
    }
}
