//! Descriptive statistics and distribution approximations.
//!
//! Shared by the quality checker and the causality methods. Tail
//! probabilities use closed-form approximations that are accurate enough for
//! reporting p-values to four decimals.

/// Arithmetic mean. Returns NaN for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance (n - 1 denominator). Returns NaN for fewer than 2 values.
#[must_use]
pub fn sample_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64
}

/// Pearson correlation coefficient between two equal-length series.
///
/// Returns `None` when the lengths differ, fewer than 2 points are given, or
/// either series has zero spread.
#[must_use]
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }

    let mean_x = mean(x);
    let mean_y = mean(y);

    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;

    for (xi, yi) in x.iter().zip(y.iter()) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        covariance += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denominator = (var_x * var_y).sqrt();
    if denominator < f64::EPSILON {
        return None;
    }

    Some(covariance / denominator)
}

/// Value range (max - min) over finite values; 0.0 when none are finite.
#[must_use]
pub fn finite_range(values: &[f64]) -> f64 {
    let (lo, hi) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if lo > hi {
        0.0
    } else {
        hi - lo
    }
}

/// `forward / reverse`, with +inf when only `reverse` is zero and NaN when
/// both are zero (or `forward` is negative against a zero reverse).
#[must_use]
pub fn directional_ratio(forward: f64, reverse: f64) -> f64 {
    if reverse == 0.0 {
        if forward > 0.0 {
            f64::INFINITY
        } else {
            f64::NAN
        }
    } else {
        forward / reverse
    }
}

/// Empirical quantile with linear interpolation between order statistics.
///
/// `sorted` must be sorted ascending and non-empty; `q` is clamped to [0, 1].
#[must_use]
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let q = q.clamp(0.0, 1.0);
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Standard normal CDF approximation (Abramowitz and Stegun 26.2.17).
#[must_use]
pub fn standard_normal_cdf(x: f64) -> f64 {
    if x < 0.0 {
        return 1.0 - standard_normal_cdf(-x);
    }

    let b1 = 0.319_381_530;
    let b2 = -0.356_563_782;
    let b3 = 1.781_477_937;
    let b4 = -1.821_255_978;
    let b5 = 1.330_274_429;
    let p = 0.231_641_9;

    let t = 1.0 / (1.0 + p * x);
    let t2 = t * t;
    let t3 = t2 * t;
    let t4 = t3 * t;
    let t5 = t4 * t;

    let pdf = (-x * x / 2.0).exp() / (2.0 * std::f64::consts::PI).sqrt();
    1.0 - pdf * (b1 * t + b2 * t2 + b3 * t3 + b4 * t4 + b5 * t5)
}

/// Upper-tail probability P(F > f) for an F(df1, df2) variate.
///
/// Uses Paulson's normal approximation to the cube root of F, which holds up
/// well once `df2` exceeds a handful of degrees of freedom.
#[must_use]
pub fn f_test_p_value(f: f64, df1: f64, df2: f64) -> f64 {
    if !f.is_finite() {
        return if f > 0.0 { 0.0 } else { 1.0 };
    }
    if f <= 0.0 || df1 <= 0.0 || df2 <= 0.0 {
        return 1.0;
    }

    let a = 2.0 / (9.0 * df1);
    let b = 2.0 / (9.0 * df2);
    let cube = f.cbrt();
    let z = ((1.0 - b) * cube - (1.0 - a)) / (a + cube * cube * b).sqrt();

    (1.0 - standard_normal_cdf(z)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variance_of_constant_is_zero() {
        assert_eq!(sample_variance(&[3.0; 10]), 0.0);
    }

    #[test]
    fn variance_uses_sample_denominator() {
        // mean 2.5, squared deviations sum to 5.0, n - 1 = 3
        let v = sample_variance(&[1.0, 2.0, 3.0, 4.0]);
        assert!((v - 5.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn correlation_perfect_positive() {
        let x: Vec<f64> = (0..20).map(f64::from).collect();
        let y: Vec<f64> = x.iter().map(|v| 2.0 * v + 1.0).collect();
        let r = pearson_correlation(&x, &y).unwrap();
        assert!((r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn correlation_undefined_for_constant_series() {
        let x = vec![1.0; 10];
        let y: Vec<f64> = (0..10).map(f64::from).collect();
        assert!(pearson_correlation(&x, &y).is_none());
    }

    #[test]
    fn finite_range_ignores_non_finite() {
        let r = finite_range(&[1.0, f64::INFINITY, -2.0, f64::NAN, 4.0]);
        assert_eq!(r, 6.0);
        assert_eq!(finite_range(&[f64::NAN]), 0.0);
    }

    #[test]
    fn directional_ratio_edge_cases() {
        assert_eq!(directional_ratio(3.0, 1.5), 2.0);
        assert_eq!(directional_ratio(0.1, 0.0), f64::INFINITY);
        assert!(directional_ratio(0.0, 0.0).is_nan());
    }

    #[test]
    fn quantile_interpolates() {
        let sorted = [0.0, 10.0, 20.0, 30.0, 40.0];
        assert_eq!(quantile_sorted(&sorted, 0.5), 20.0);
        assert_eq!(quantile_sorted(&sorted, 0.125), 5.0);
        assert_eq!(quantile_sorted(&sorted, 1.5), 40.0);
    }

    #[test]
    fn normal_cdf_reference_points() {
        assert!((standard_normal_cdf(0.0) - 0.5).abs() < 1e-6);
        assert!((standard_normal_cdf(1.96) - 0.975).abs() < 1e-3);
        assert!((standard_normal_cdf(-1.96) - 0.025).abs() < 1e-3);
    }

    #[test]
    fn f_test_critical_value_is_near_five_percent() {
        // F(3, 100) 95th percentile is about 2.696
        let p = f_test_p_value(2.696, 3.0, 100.0);
        assert!((p - 0.05).abs() < 0.01, "p was {p}");
    }

    #[test]
    fn f_test_degenerate_inputs() {
        assert_eq!(f_test_p_value(0.0, 2.0, 50.0), 1.0);
        assert_eq!(f_test_p_value(f64::INFINITY, 2.0, 50.0), 0.0);
        assert!(f_test_p_value(100.0, 2.0, 200.0) < 1e-6);
    }
}
