//! Fuzz target for model validation and the inference entry points.
//!
//! Arbitrary parameters either fail validation or yield a model on which
//! forward-backward, Viterbi and a short Baum-Welch run must not panic.

#![no_main]

use arbitrary::Arbitrary;
use hmm_core::distributions::Categorical;
use hmm_core::{decode, fit, forward_backward, FitConfig, Hmm};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    initial: Vec<f64>,
    transition: Vec<Vec<f64>>,
    emissions: Vec<Vec<f64>>,
    observations: Vec<u8>,
}

fuzz_target!(|input: Input| {
    let Ok(emissions) = input
        .emissions
        .into_iter()
        .take(8)
        .map(Categorical::new)
        .collect::<Result<Vec<_>, _>>()
    else {
        return;
    };
    let Ok(hmm) = Hmm::new(input.initial, input.transition, emissions) else {
        return;
    };
    let observations: Vec<usize> = input.observations.iter().take(256).map(|&b| b as usize).collect();

    if let Ok(fb) = forward_backward(&hmm, &observations) {
        assert_eq!(fb.n_steps(), observations.len());
        if !fb.is_degenerate() {
            for row in fb.posteriors() {
                let sum: f64 = row.iter().sum();
                assert!((sum - 1.0).abs() < 1e-6);
            }
        }
    }
    if let Ok(decoded) = decode(&hmm, &observations) {
        assert_eq!(decoded.path.len(), observations.len());
    }
    let _ = fit(&hmm, &observations, &FitConfig::new(3, 1e-6));
});
