use std::f64::consts::PI;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::debug;

use super::growth::{MONTHS_PER_YEAR, apply_month};
use super::types::{SimulationConfig, SimulationOutcome, SimulationSummary};

/// Percentile reported as the near-worst case.
pub const NEAR_WORST_PERCENTILE: f64 = 0.5;

/// Terminal portfolio values for `num_trials` independent trials drawn from
/// `rng`.
///
/// Monthly returns are normal with mean `avg_annual_return / 12` and standard
/// deviation `std_dev_annual_return / sqrt(12)`. Values are never clamped, so
/// a bad enough path can end below zero.
pub fn simulate<R: Rng + ?Sized>(
    initial_investment: f64,
    monthly_contribution: f64,
    years: u32,
    num_trials: u32,
    avg_annual_return: f64,
    std_dev_annual_return: f64,
    rng: &mut R,
) -> SimulationOutcome {
    let params = TrialParams::new(
        initial_investment,
        monthly_contribution,
        years,
        avg_annual_return,
        std_dev_annual_return,
    );
    (0..num_trials).map(|_| params.run(&mut *rng)).collect()
}

/// Seeded variant of [`simulate`] where every trial owns its own stream,
/// derived from `config.seed` and the trial index. The outcome does not depend
/// on `config.parallel`.
pub fn run_simulation(
    initial_investment: f64,
    monthly_contribution: f64,
    years: u32,
    avg_annual_return: f64,
    std_dev_annual_return: f64,
    config: &SimulationConfig,
) -> SimulationOutcome {
    let params = TrialParams::new(
        initial_investment,
        monthly_contribution,
        years,
        avg_annual_return,
        std_dev_annual_return,
    );
    debug!(
        trials = config.trials,
        years,
        parallel = config.parallel,
        "running monte carlo simulation"
    );

    let run_trial = |trial_id: u32| {
        let mut rng = ChaCha8Rng::seed_from_u64(derive_seed(config.seed, trial_id));
        params.run(&mut rng)
    };

    if config.parallel {
        (0..config.trials).into_par_iter().map(run_trial).collect()
    } else {
        (0..config.trials).map(run_trial).collect()
    }
}

#[derive(Debug, Clone, Copy)]
struct TrialParams {
    initial_investment: f64,
    monthly_contribution: f64,
    months: u64,
    monthly_mean: f64,
    monthly_std_dev: f64,
}

impl TrialParams {
    fn new(
        initial_investment: f64,
        monthly_contribution: f64,
        years: u32,
        avg_annual_return: f64,
        std_dev_annual_return: f64,
    ) -> Self {
        let months_per_year = MONTHS_PER_YEAR as f64;
        Self {
            initial_investment,
            monthly_contribution,
            months: u64::from(years) * u64::from(MONTHS_PER_YEAR),
            monthly_mean: avg_annual_return / months_per_year,
            monthly_std_dev: std_dev_annual_return / months_per_year.sqrt(),
        }
    }

    fn run<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let mut sampler = NormalSampler::new(self.monthly_mean, self.monthly_std_dev);
        let mut value = self.initial_investment;
        for _ in 0..self.months {
            let monthly_return = sampler.sample(rng);
            value = apply_month(value, monthly_return, self.monthly_contribution);
        }
        value
    }
}

/// Box-Muller normal draws. The second variate of each pair is kept for the
/// next call.
struct NormalSampler {
    mean: f64,
    std_dev: f64,
    cached: Option<f64>,
}

impl NormalSampler {
    fn new(mean: f64, std_dev: f64) -> Self {
        Self {
            mean,
            std_dev,
            cached: None,
        }
    }

    fn sample<R: Rng + ?Sized>(&mut self, rng: &mut R) -> f64 {
        self.mean + self.std_dev * self.standard_normal(rng)
    }

    fn standard_normal<R: Rng + ?Sized>(&mut self, rng: &mut R) -> f64 {
        if let Some(z) = self.cached.take() {
            return z;
        }

        // (0, 1] keeps the logarithm finite.
        let u1 = 1.0 - rng.random::<f64>();
        let u2 = rng.random::<f64>();
        let r = (-2.0 * u1.ln()).sqrt();
        let theta = 2.0 * PI * u2;

        self.cached = Some(r * theta.sin());
        r * theta.cos()
    }
}

fn derive_seed(base_seed: u64, trial_id: u32) -> u64 {
    splitmix64(base_seed ^ ((u64::from(trial_id) << 32) | u64::from(trial_id)))
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// Near-worst, mean, median, 10th and 90th percentile of an outcome. An empty
/// outcome summarizes to zeros.
pub fn summarize(outcome: &[f64]) -> SimulationSummary {
    if outcome.is_empty() {
        return SimulationSummary {
            near_worst: 0.0,
            mean: 0.0,
            median: 0.0,
            p10: 0.0,
            p90: 0.0,
        };
    }

    let mut sorted = outcome.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    SimulationSummary {
        near_worst: percentile_sorted(&sorted, NEAR_WORST_PERCENTILE),
        mean: sorted.iter().sum::<f64>() / sorted.len() as f64,
        median: percentile_sorted(&sorted, 50.0),
        p10: percentile_sorted(&sorted, 10.0),
        p90: percentile_sorted(&sorted, 90.0),
    }
}

/// Percentile `p` with linear interpolation between ranks. `p` is clamped
/// to 0-100.
pub fn percentile(values: &mut [f64], p: f64) -> f64 {
    values.sort_by(|a, b| a.total_cmp(b));
    percentile_sorted(values, p)
}

fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }

    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }

    let rank = (p.clamp(0.0, 100.0) / 100.0) * (n as f64 - 1.0);
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;

    if lower == upper {
        sorted[lower]
    } else {
        let w = rank - lower as f64;
        sorted[lower] * (1.0 - w) + sorted[upper] * w
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::growth::project_growth;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    fn config(trials: u32, seed: u64, parallel: bool) -> SimulationConfig {
        SimulationConfig {
            trials,
            seed,
            parallel,
        }
    }

    #[test]
    fn zero_volatility_collapses_to_deterministic_projection() {
        let deterministic = project_growth(25_000.0, 800.0, 0.07, 20);
        let expected = *deterministic.last().expect("twenty years projected");

        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let outcome = simulate(25_000.0, 800.0, 20, 50, 0.07, 0.0, &mut rng);
        assert_eq!(outcome.len(), 50);
        for value in outcome {
            assert_approx_tol(value, expected, 0.01);
        }

        let seeded = run_simulation(25_000.0, 800.0, 20, 0.07, 0.0, &config(20, 3, true));
        for value in seeded {
            assert_approx_tol(value, expected, 0.01);
        }
    }

    #[test]
    fn zero_years_returns_initial_investment() {
        let outcome = run_simulation(12_345.0, 500.0, 0, 0.07, 0.15, &config(10, 1, false));
        assert_eq!(outcome, vec![12_345.0; 10]);
    }

    #[test]
    fn zero_trials_is_empty() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(simulate(1_000.0, 10.0, 5, 0, 0.07, 0.15, &mut rng).is_empty());
        assert!(run_simulation(1_000.0, 10.0, 5, 0.07, 0.15, &config(0, 1, true)).is_empty());
    }

    #[test]
    fn same_seed_reruns_are_identical() {
        let cfg = config(200, 123, false);
        let a = run_simulation(10_000.0, 300.0, 15, 0.08, 0.18, &cfg);
        let b = run_simulation(10_000.0, 300.0, 15, 0.08, 0.18, &cfg);
        assert_eq!(a, b);

        let other = run_simulation(10_000.0, 300.0, 15, 0.08, 0.18, &config(200, 124, false));
        assert_ne!(a, other);
    }

    #[test]
    fn parallel_and_sequential_runs_agree() {
        let sequential = run_simulation(50_000.0, 1_000.0, 25, 0.07, 0.15, &config(300, 42, false));
        let parallel = run_simulation(50_000.0, 1_000.0, 25, 0.07, 0.15, &config(300, 42, true));
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn injected_rng_drives_the_outcome() {
        let mut a = ChaCha8Rng::seed_from_u64(77);
        let mut b = ChaCha8Rng::seed_from_u64(77);
        let left = simulate(5_000.0, 200.0, 10, 40, 0.06, 0.2, &mut a);
        let right = simulate(5_000.0, 200.0, 10, 40, 0.06, 0.2, &mut b);
        assert_eq!(left, right);
    }

    #[test]
    fn volatile_outcomes_centre_near_the_deterministic_path() {
        let deterministic = *project_growth(10_000.0, 500.0, 0.06, 10)
            .last()
            .expect("ten years projected");
        let outcome = run_simulation(10_000.0, 500.0, 10, 0.06, 0.15, &config(4_000, 5, true));
        let summary = summarize(&outcome);
        assert!(
            (summary.mean - deterministic).abs() / deterministic < 0.03,
            "mean {} vs deterministic {deterministic}",
            summary.mean
        );
        assert!(summary.near_worst < summary.p10);
        assert!(summary.p10 < summary.median);
        assert!(summary.median < summary.p90);
    }

    #[test]
    fn extreme_volatility_is_not_clamped() {
        let outcome = run_simulation(1_000.0, 0.0, 30, 0.0, 1.0, &config(500, 8, true));
        assert!(
            outcome.iter().any(|v| *v < 0.0),
            "expected some trials to finish below zero"
        );
    }

    #[test]
    fn normal_sampler_matches_moments() {
        let mut rng = ChaCha8Rng::seed_from_u64(2024);
        let mut sampler = NormalSampler::new(0.01, 0.05);
        let draws: Vec<f64> = (0..50_000).map(|_| sampler.sample(&mut rng)).collect();
        let mean = draws.iter().sum::<f64>() / draws.len() as f64;
        let var = draws.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / draws.len() as f64;
        assert_approx_tol(mean, 0.01, 0.001);
        assert_approx_tol(var.sqrt(), 0.05, 0.001);
    }

    #[test]
    fn percentile_interpolates_between_points() {
        let mut values = vec![4.0, 1.0, 3.0, 2.0];
        assert_approx(percentile(&mut values, 25.0), 1.75);
        assert_approx(percentile(&mut values, 50.0), 2.5);
        assert_approx(percentile(&mut values, 0.5), 1.015);
        assert_approx(percentile(&mut values, 100.0), 4.0);
    }

    #[test]
    fn percentile_clamps_out_of_range_requests() {
        let mut values = vec![4.0, 1.0, 3.0, 2.0];
        assert_approx(percentile(&mut values, 150.0), 4.0);
        assert_approx(percentile(&mut values, -20.0), 1.0);
    }

    #[test]
    fn summarize_reports_all_statistics() {
        let outcome: Vec<f64> = (1..=11).map(f64::from).collect();
        let summary = summarize(&outcome);
        assert_approx(summary.near_worst, 1.05);
        assert_approx(summary.mean, 6.0);
        assert_approx(summary.median, 6.0);
        assert_approx(summary.p10, 2.0);
        assert_approx(summary.p90, 10.0);
    }

    #[test]
    fn summarize_empty_and_single_outcomes() {
        let empty = summarize(&[]);
        assert_eq!(empty.mean, 0.0);
        assert_eq!(empty.near_worst, 0.0);

        let single = summarize(&[42.0]);
        assert_eq!(single.near_worst, 42.0);
        assert_eq!(single.median, 42.0);
        assert_eq!(single.p90, 42.0);
    }

    #[test]
    fn derive_seed_changes_per_trial() {
        let a = derive_seed(42, 0);
        let b = derive_seed(42, 1);
        let c = derive_seed(43, 0);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(24))]

        #[test]
        fn prop_outcome_size_equals_trial_count(
            trials in 0_u32..300,
            years in 0_u32..15,
            seed in proptest::prelude::any::<u64>(),
            sd in 0.0_f64..0.4,
        ) {
            let outcome = run_simulation(1_000.0, 50.0, years, 0.06, sd, &config(trials, seed, true));
            prop_assert_eq!(outcome.len(), trials as usize);

            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let injected = simulate(1_000.0, 50.0, years, trials, 0.06, sd, &mut rng);
            prop_assert_eq!(injected.len(), trials as usize);
        }

        #[test]
        fn prop_summary_is_ordered(
            values in proptest::collection::vec(-1e6_f64..1e7, 1..200),
        ) {
            let summary = summarize(&values);
            prop_assert!(summary.near_worst <= summary.p10 + 1e-9);
            prop_assert!(summary.p10 <= summary.median + 1e-9);
            prop_assert!(summary.median <= summary.p90 + 1e-9);
        }
    }
}
