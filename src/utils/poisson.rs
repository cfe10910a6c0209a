/// Probability of exactly `k` goals when goals arrive at Poisson rate `lambda`
///
/// P(k; λ) = e^(-λ) · λ^k / k!
///
/// λ^k and k! are built up together one factor at a time so neither overflows for large `k`.
/// With `lambda == 0.0` every mass sits on zero goals: P(0; 0) = 1 and P(k; 0) = 0 for k > 0.
pub fn poisson_probability(k: u32, lambda: f64) -> f64 {
    (1..=k).fold((-lambda).exp(), |p, i| p * lambda / i as f64)
}

/// Probabilities for 0..=max_k goals at rate `lambda`, via p(k) = p(k-1) · λ / k
pub fn poisson_distribution(lambda: f64, max_k: u32) -> Vec<f64> {
    let mut out = Vec::with_capacity(max_k as usize + 1);
    let mut p = (-lambda).exp();
    out.push(p);
    for k in 1..=max_k {
        p *= lambda / k as f64;
        out.push(p);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_terms_match_closed_form() {
        // k = 0 and k = 1 both divide by 1
        assert_eq!(poisson_probability(0, 2.0), (-2.0f64).exp());
        assert!((poisson_probability(1, 2.0) - 2.0 * (-2.0f64).exp()).abs() < 1e-15);
        // 6! = 720
        let expected = (-1.2f64).exp() * 1.2f64.powi(6) / 720.0;
        assert!((poisson_probability(6, 1.2) - expected).abs() < 1e-15);
    }

    #[test]
    fn test_distribution_matches_single_terms() {
        let dist = poisson_distribution(1.7, 6);
        assert_eq!(dist.len(), 7);
        for (k, p) in dist.iter().enumerate() {
            assert!((p - poisson_probability(k as u32, 1.7)).abs() < 1e-15);
        }
    }

    #[test]
    fn test_large_rate_and_count_stay_finite() {
        let p = poisson_probability(171, 120.0);
        assert!(p.is_finite() && (0.0..=1.0).contains(&p), "p = {p}");

        let dist = poisson_distribution(120.0, 400);
        assert!(dist.iter().all(|p| p.is_finite() && *p >= 0.0));
        assert!((dist.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_rate_puts_all_mass_on_zero_goals() {
        assert_eq!(poisson_probability(0, 0.0), 1.0);
        for k in 1..=6 {
            assert_eq!(poisson_probability(k, 0.0), 0.0);
        }
    }

    #[test]
    fn test_known_values() {
        // P(0; 1.5) = e^-1.5
        assert!((poisson_probability(0, 1.5) - 0.223_130_160_148_429_8).abs() < 1e-12);
        // P(2; 1.5) = e^-1.5 * 2.25 / 2
        assert!((poisson_probability(2, 1.5) - 0.251_021_430_166_983_5).abs() < 1e-12);
    }

    #[test]
    fn test_probabilities_stay_in_unit_interval() {
        for lambda in [0.0, 0.1, 0.5, 1.0, 1.35, 2.75, 4.0, 8.0] {
            for k in 0..=6 {
                let p = poisson_probability(k, lambda);
                assert!((0.0..=1.0).contains(&p), "P({k}; {lambda}) = {p}");
            }
        }
    }

    #[test]
    fn test_truncated_mass_approaches_one_for_small_rates() {
        let mass = |lambda: f64| poisson_distribution(lambda, 6).iter().sum::<f64>();

        assert!(mass(4.0) < mass(2.0));
        assert!(mass(2.0) < mass(0.5));
        assert!((mass(0.5) - 1.0).abs() < 1e-5);
        assert_eq!(mass(0.0), 1.0);
    }
}
