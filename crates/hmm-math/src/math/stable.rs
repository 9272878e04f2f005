//! Numerically stable primitives for log-domain recursions.

use std::f64::consts::PI;

pub(crate) const LOG_SQRT_2PI: f64 = 0.918_938_533_204_672_8; // 0.5 * ln(2*pi)
const LANCZOS_G: f64 = 7.0;
#[allow(clippy::excessive_precision)] // These are published numerical constants
const LANCZOS_COEFFS: [f64; 9] = [
    0.999_999_999_999_809_93,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_59,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_571_6e-6,
    1.505_632_735_149_311_6e-7,
];

/// Stable log(sum(exp(values))).
///
/// Returns NEG_INFINITY for empty input or all -inf inputs.
pub fn log_sum_exp(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NEG_INFINITY;
    }
    if values.iter().any(|v| v.is_nan()) {
        return f64::NAN;
    }
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }
    if max == f64::INFINITY {
        return f64::INFINITY;
    }
    let mut sum = 0.0;
    for v in values {
        sum += (*v - max).exp();
    }
    max + sum.ln()
}

/// log(exp(a) + exp(b)) for two terms.
pub fn log_add_exp(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        return f64::NAN;
    }
    let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
    if lo == f64::NEG_INFINITY || hi == f64::INFINITY {
        return hi;
    }
    hi + (lo - hi).exp().ln_1p()
}

/// Single-pass log(sum(exp(values))) over an iterator.
///
/// Keeps a running maximum and rescales the partial sum whenever a larger
/// term arrives, so the recursions can reduce over a state index without
/// allocating a scratch buffer.
pub fn log_sum_exp_iter<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    for v in values {
        if v.is_nan() {
            return f64::NAN;
        }
        if v == f64::NEG_INFINITY {
            continue;
        }
        if v == f64::INFINITY {
            return f64::INFINITY;
        }
        if v <= max {
            sum += (v - max).exp();
        } else {
            sum = sum * (max - v).exp() + 1.0;
            max = v;
        }
    }
    if max == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }
    max + sum.ln()
}

/// Index and value of the largest entry.
///
/// Ties resolve to the lowest index. NaN entries are skipped; an empty slice
/// or one made only of NaN/-inf entries yields `(0, -inf)`.
pub fn argmax(values: &[f64]) -> (usize, f64) {
    let mut best_idx = 0;
    let mut best_val = f64::NEG_INFINITY;
    for (i, &v) in values.iter().enumerate() {
        if v > best_val {
            best_val = v;
            best_idx = i;
        }
    }
    (best_idx, best_val)
}

/// Normalize log-weights in place so that they exponentiate to a
/// probability vector. Returns the log normalizer that was subtracted.
///
/// When every weight is -inf the slice is left untouched and -inf returned.
pub fn normalize_log(values: &mut [f64]) -> f64 {
    let norm = log_sum_exp(values);
    if norm.is_finite() {
        for v in values.iter_mut() {
            *v -= norm;
        }
    }
    norm
}

/// Natural log of the Gamma function (log |Gamma(z)|).
///
/// Uses a Lanczos approximation with reflection for z < 0.5.
pub fn log_gamma(z: f64) -> f64 {
    if z.is_nan() {
        return f64::NAN;
    }
    if z == f64::INFINITY {
        return f64::INFINITY;
    }
    if z == f64::NEG_INFINITY {
        return f64::NAN;
    }
    if z <= 0.0 {
        let z_round = z.round();
        if (z - z_round).abs() < 1e-15 {
            return f64::NAN;
        }
    }
    if z < 0.5 {
        let sin_pi = (PI * z).sin();
        if sin_pi == 0.0 {
            return f64::NAN;
        }
        return PI.ln() - sin_pi.abs().ln() - log_gamma(1.0 - z);
    }

    let z_minus = z - 1.0;
    let mut x = LANCZOS_COEFFS[0];
    for (i, coeff) in LANCZOS_COEFFS.iter().enumerate().skip(1) {
        x += coeff / (z_minus + i as f64);
    }
    let t = z_minus + LANCZOS_G + 0.5;
    LOG_SQRT_2PI + (z_minus + 0.5) * t.ln() - t + x.ln()
}

/// log(n!) using the Gamma function.
pub fn log_factorial(n: u64) -> f64 {
    if n <= 1 {
        return 0.0;
    }
    log_gamma((n as f64) + 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_add_exp_edges() {
        assert_eq!(log_add_exp(f64::NEG_INFINITY, -3.0), -3.0);
        assert_eq!(log_add_exp(f64::NEG_INFINITY, f64::NEG_INFINITY), f64::NEG_INFINITY);
        assert!(log_add_exp(f64::NAN, 0.0).is_nan());
        assert!((log_add_exp(0.0, 0.0) - 2f64.ln()).abs() < 1e-15);
        assert!((log_add_exp(-1000.0, -1000.0) - (-1000.0 + 2f64.ln())).abs() < 1e-12);
    }

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        if a.is_nan() || b.is_nan() {
            return false;
        }
        (a - b).abs() <= tol
    }

    #[test]
    fn log_sum_exp_basic() {
        let v = [0.0, 0.0];
        let out = log_sum_exp(&v);
        assert!(approx_eq(out, 2.0f64.ln(), 1e-12));
    }

    #[test]
    fn log_sum_exp_dominance() {
        let v = [-1000.0, 0.0];
        let out = log_sum_exp(&v);
        assert!(approx_eq(out, 0.0, 1e-12));
    }

    #[test]
    fn log_sum_exp_all_neg_inf() {
        let v = [f64::NEG_INFINITY, f64::NEG_INFINITY];
        let out = log_sum_exp(&v);
        assert!(out.is_infinite() && out.is_sign_negative());
    }

    #[test]
    fn log_sum_exp_nan_propagates() {
        let out = log_sum_exp(&[0.0, f64::NAN]);
        assert!(out.is_nan());
    }

    #[test]
    fn streaming_matches_two_pass() {
        let v = [-3.5, 12.0, 0.25, -700.0, 11.5];
        let a = log_sum_exp(&v);
        let b = log_sum_exp_iter(v.iter().copied());
        assert!(approx_eq(a, b, 1e-12));
    }

    #[test]
    fn streaming_handles_increasing_sequence() {
        // every new term is a new maximum, forcing a rescale each step
        let v: Vec<f64> = (0..50).map(|i| i as f64 * 20.0).collect();
        let a = log_sum_exp(&v);
        let b = log_sum_exp_iter(v.iter().copied());
        assert!(approx_eq(a, b, 1e-9));
    }

    #[test]
    fn streaming_edge_cases() {
        assert_eq!(log_sum_exp_iter(std::iter::empty()), f64::NEG_INFINITY);
        assert_eq!(
            log_sum_exp_iter([f64::NEG_INFINITY, f64::NEG_INFINITY]),
            f64::NEG_INFINITY
        );
        assert!(approx_eq(
            log_sum_exp_iter([f64::NEG_INFINITY, 1.5]),
            1.5,
            1e-15
        ));
        assert!(log_sum_exp_iter([0.0, f64::NAN]).is_nan());
        assert_eq!(log_sum_exp_iter([0.0, f64::INFINITY]), f64::INFINITY);
    }

    #[test]
    fn argmax_prefers_lowest_index_on_ties() {
        assert_eq!(argmax(&[1.0, 3.0, 3.0, 2.0]), (1, 3.0));
        assert_eq!(argmax(&[-2.0, -2.0]), (0, -2.0));
    }

    #[test]
    fn argmax_all_neg_inf_is_first_state() {
        let (idx, val) = argmax(&[f64::NEG_INFINITY; 3]);
        assert_eq!(idx, 0);
        assert_eq!(val, f64::NEG_INFINITY);
        assert_eq!(argmax(&[]), (0, f64::NEG_INFINITY));
    }

    #[test]
    fn argmax_skips_nan() {
        assert_eq!(argmax(&[f64::NAN, 0.5, 0.1]), (1, 0.5));
    }

    #[test]
    fn normalize_log_yields_probabilities() {
        let mut v = [1.0f64.ln(), 3.0f64.ln()];
        let norm = normalize_log(&mut v);
        assert!(approx_eq(norm, 4.0f64.ln(), 1e-12));
        assert!(approx_eq(v[0].exp(), 0.25, 1e-12));
        assert!(approx_eq(v[1].exp(), 0.75, 1e-12));
    }

    #[test]
    fn normalize_log_all_neg_inf_untouched() {
        let mut v = [f64::NEG_INFINITY; 2];
        assert_eq!(normalize_log(&mut v), f64::NEG_INFINITY);
        assert!(v.iter().all(|x| *x == f64::NEG_INFINITY));
    }

    #[test]
    fn log_gamma_known_values() {
        let lg1 = log_gamma(1.0);
        assert!(approx_eq(lg1, 0.0, 1e-12));

        let lg_half = log_gamma(0.5);
        let expected = 0.5 * PI.ln();
        assert!(approx_eq(lg_half, expected, 1e-10));

        let lg5 = log_gamma(5.0); // Gamma(5)=24
        assert!(approx_eq(lg5, 24.0f64.ln(), 1e-10));
    }

    #[test]
    fn log_factorial_small_values() {
        assert_eq!(log_factorial(0), 0.0);
        assert_eq!(log_factorial(1), 0.0);
        assert!(approx_eq(log_factorial(5), 120.0f64.ln(), 1e-12));
    }

    #[test]
    fn log_gamma_negative_integer_is_nan() {
        let out = log_gamma(-2.0);
        assert!(out.is_nan());
    }
}
