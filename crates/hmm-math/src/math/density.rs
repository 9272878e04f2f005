//! Log-density kernels for the common emission families.
//!
//! Invalid parameters yield NaN; points outside the support yield -inf.

use super::stable::{log_factorial, LOG_SQRT_2PI};

/// log N(x; mean, std_dev^2).
pub fn log_normal_pdf(x: f64, mean: f64, std_dev: f64) -> f64 {
    if x.is_nan() || mean.is_nan() || std_dev.is_nan() || std_dev <= 0.0 {
        return f64::NAN;
    }
    let z = (x - mean) / std_dev;
    -0.5 * z * z - std_dev.ln() - LOG_SQRT_2PI
}

/// log Exp(x; rate) with density rate * exp(-rate * x) on x >= 0.
pub fn log_exponential_pdf(x: f64, rate: f64) -> f64 {
    if x.is_nan() || rate.is_nan() || rate <= 0.0 {
        return f64::NAN;
    }
    if x < 0.0 {
        return f64::NEG_INFINITY;
    }
    rate.ln() - rate * x
}

/// log Poisson(k; rate).
pub fn log_poisson_pmf(k: u64, rate: f64) -> f64 {
    if rate.is_nan() || rate < 0.0 {
        return f64::NAN;
    }
    if rate == 0.0 {
        return if k == 0 { 0.0 } else { f64::NEG_INFINITY };
    }
    (k as f64) * rate.ln() - rate - log_factorial(k)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn normal_standard_at_zero() {
        let expected = -0.5 * (2.0 * std::f64::consts::PI).ln();
        assert!(approx_eq(log_normal_pdf(0.0, 0.0, 1.0), expected, 1e-12));
    }

    #[test]
    fn normal_is_symmetric_and_scaled() {
        let a = log_normal_pdf(12.0, 10.0, 2.0);
        let b = log_normal_pdf(8.0, 10.0, 2.0);
        assert!(approx_eq(a, b, 1e-12));
        // one standard deviation away, sd = 2
        let expected = -0.5 - 2.0f64.ln() - LOG_SQRT_2PI;
        assert!(approx_eq(a, expected, 1e-12));
    }

    #[test]
    fn normal_rejects_bad_scale() {
        assert!(log_normal_pdf(0.0, 0.0, 0.0).is_nan());
        assert!(log_normal_pdf(0.0, 0.0, -1.0).is_nan());
    }

    #[test]
    fn exponential_support() {
        assert_eq!(log_exponential_pdf(-0.1, 2.0), f64::NEG_INFINITY);
        assert!(approx_eq(log_exponential_pdf(0.0, 2.0), 2.0f64.ln(), 1e-12));
        assert!(approx_eq(
            log_exponential_pdf(1.5, 2.0),
            2.0f64.ln() - 3.0,
            1e-12
        ));
        assert!(log_exponential_pdf(1.0, 0.0).is_nan());
    }

    #[test]
    fn poisson_known_values() {
        // P(k=2; 3) = 9/2 * e^-3
        let expected = (4.5f64).ln() - 3.0;
        assert!(approx_eq(log_poisson_pmf(2, 3.0), expected, 1e-10));
        assert_eq!(log_poisson_pmf(0, 0.0), 0.0);
        assert_eq!(log_poisson_pmf(3, 0.0), f64::NEG_INFINITY);
        assert!(log_poisson_pmf(1, -1.0).is_nan());
    }
}
