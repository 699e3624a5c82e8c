//! Numerical inversion of Laplace-domain solutions.

/// Number of Stehfest terms, must be even
pub const STEHFEST_TERMS: usize = 12;

fn factorial(n: usize) -> f64 {
    (1..=n).map(|i| i as f64).product()
}

/// Stehfest weights V_1..V_N for `n` terms
pub fn stehfest_weights(n: usize) -> Vec<f64> {
    let half = n / 2;
    (1..=n)
        .map(|i| {
            let sign = if (i + half) % 2 == 0 { 1.0 } else { -1.0 };
            let sum: f64 = ((i + 1) / 2..=i.min(half))
                .map(|k| {
                    (k as f64).powi(half as i32) * factorial(2 * k)
                        / (factorial(half - k)
                            * factorial(k)
                            * factorial(k - 1)
                            * factorial(i - k)
                            * factorial(2 * k - i))
                })
                .sum();
            sign * sum
        })
        .collect()
}

/// Returns f(t) for the Laplace-domain function `f_s` using the Gaver-Stehfest algorithm
///
/// # Arguments
/// * `f_s` - Laplace transform F(s)
/// * `t` - time at which to evaluate, must be positive
/// * `weights` - output of [stehfest_weights]
pub fn stehfest_invert<F: Fn(f64) -> f64>(f_s: F, t: f64, weights: &[f64]) -> f64 {
    let ln2_t = std::f64::consts::LN_2 / t;
    weights
        .iter()
        .enumerate()
        .map(|(i, v)| v * f_s((i + 1) as f64 * ln2_t))
        .sum::<f64>()
        * ln2_t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_sum_to_zero() {
        let weights = stehfest_weights(STEHFEST_TERMS);
        assert_eq!(weights.len(), STEHFEST_TERMS);
        assert!(weights.iter().sum::<f64>().abs() < 1e-6);
    }

    #[test]
    fn test_known_transforms() {
        let weights = stehfest_weights(STEHFEST_TERMS);
        let step = stehfest_invert(|s| 1.0 / s, 2.0, &weights);
        assert!((step - 1.0).abs() < 1e-6, "{step}");
        let decay = stehfest_invert(|s| 1.0 / (s + 1.0), 1.0, &weights);
        assert!((decay - (-1.0f64).exp()).abs() < 1e-3, "{decay}");
        // erfc(1 / (2 sqrt(t))) has transform exp(-sqrt(s)) / s
        let erfc = stehfest_invert(|s| (-s.sqrt()).exp() / s, 0.25, &weights);
        assert!((erfc - super::super::erfc(1.0)).abs() < 1e-3, "{erfc}");
    }
}
