pub const MONTHS_PER_YEAR: u32 = 12;

/// Year-end balances from monthly compounding at `annual_return_rate / 12`
/// with the contribution added after each month's growth.
///
/// Reported balances are rounded to cents; the running balance is not.
pub fn project_growth(
    current_savings: f64,
    monthly_contribution: f64,
    annual_return_rate: f64,
    years: u32,
) -> Vec<f64> {
    let monthly_rate = annual_return_rate / MONTHS_PER_YEAR as f64;
    let mut balance = current_savings;
    let mut balances = Vec::with_capacity(years as usize);

    for _ in 0..years {
        for _ in 0..MONTHS_PER_YEAR {
            balance = apply_month(balance, monthly_rate, monthly_contribution);
        }
        balances.push(round_cents(balance));
    }

    balances
}

pub(crate) fn apply_month(balance: f64, monthly_return: f64, monthly_contribution: f64) -> f64 {
    balance * (1.0 + monthly_return) + monthly_contribution
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    #[test]
    fn zero_years_is_empty() {
        assert!(project_growth(10_000.0, 500.0, 0.07, 0).is_empty());
    }

    #[test]
    fn contributions_only_accumulate_linearly() {
        let balances = project_growth(1_000.0, 100.0, 0.0, 3);
        assert_eq!(balances, vec![2_200.0, 3_400.0, 4_600.0]);
    }

    #[test]
    fn one_year_matches_hand_calculation() {
        // 12% a year is 1% a month: 10_000 * 1.01^12 plus a 100/month annuity-immediate.
        let balances = project_growth(10_000.0, 100.0, 0.12, 1);
        let growth = 1.01_f64.powi(12);
        let expected = 10_000.0 * growth + 100.0 * (growth - 1.0) / 0.01;
        assert_eq!(balances.len(), 1);
        assert_approx_tol(balances[0], expected, 0.01);
    }

    #[test]
    fn reported_balances_are_rounded_to_cents() {
        let balances = project_growth(1_000.0, 0.0, 0.05, 2);
        for balance in balances {
            assert_approx_tol(balance * 100.0, (balance * 100.0).round(), 1e-6);
        }
    }

    #[test]
    fn running_balance_is_not_rounded_between_years() {
        let two_years = project_growth(1_000.0, 0.0, 0.05, 2);
        let unrounded = 1_000.0 * (1.0 + 0.05 / 12.0_f64).powi(24);
        assert_approx_tol(two_years[1], unrounded, 0.01);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_no_return_no_contribution_is_constant(
            savings in 0.0_f64..5_000_000.0,
            years in 0_u32..60,
        ) {
            let savings = round_cents(savings);
            let balances = project_growth(savings, 0.0, 0.0, years);
            prop_assert_eq!(balances.len(), years as usize);
            for balance in balances {
                prop_assert_eq!(balance, savings);
            }
        }

        #[test]
        fn prop_length_matches_horizon_and_balances_never_fall(
            savings in 0.0_f64..1_000_000.0,
            contribution in 0.0_f64..10_000.0,
            rate in 0.0_f64..0.2,
            years in 0_u32..50,
        ) {
            let balances = project_growth(savings, contribution, rate, years);
            prop_assert_eq!(balances.len(), years as usize);
            for pair in balances.windows(2) {
                prop_assert!(pair[1] >= pair[0], "{} then {}", pair[0], pair[1]);
            }
        }
    }
}
