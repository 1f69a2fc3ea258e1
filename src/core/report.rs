use tracing::debug;

use super::allocation::recommend;
use super::corpus::{compute_required_corpus, future_value_with_inflation};
use super::growth::project_growth;
use super::monte_carlo::{run_simulation, summarize};
use super::types::{
    GapAnalysis, GapStatus, RetirementInputs, RetirementReport, SimulationConfig,
    YearlyProjection,
};

impl GapAnalysis {
    pub fn between(projected_savings: f64, required_corpus: f64) -> Self {
        let difference = projected_savings - required_corpus;
        let status = if difference > 0.0 {
            GapStatus::Surplus
        } else if difference < 0.0 {
            GapStatus::Shortfall
        } else {
            GapStatus::Neutral
        };
        Self {
            status,
            difference: difference.abs(),
        }
    }
}

/// Runs every component against one set of validated inputs.
pub fn build_report(inputs: &RetirementInputs, config: &SimulationConfig) -> RetirementReport {
    let years_to_retirement = inputs.years_to_retirement();
    let years_in_retirement = inputs.years_in_retirement();
    let horizon = u32::try_from(years_to_retirement.max(0)).unwrap_or(u32::MAX);

    let required_corpus = compute_required_corpus(
        inputs.desired_annual_income_today,
        inputs.retirement_age,
        inputs.current_age,
        inputs.life_expectancy,
        inputs.inflation_rate,
        inputs.post_retirement_return_rate,
    );

    let projected_savings_by_year = YearlyProjection::from_balances(project_growth(
        inputs.current_savings,
        inputs.monthly_contribution,
        inputs.avg_annual_return,
        horizon,
    ));
    let projected_savings_at_retirement = projected_savings_by_year
        .final_balance()
        .unwrap_or(inputs.current_savings);

    let outcome = run_simulation(
        inputs.current_savings,
        inputs.monthly_contribution,
        horizon,
        inputs.avg_annual_return,
        inputs.std_dev_annual_return,
        config,
    );
    let monte_carlo = summarize(&outcome);

    let gap = GapAnalysis::between(projected_savings_at_retirement, required_corpus);
    debug!(
        required_corpus,
        projected_savings_at_retirement,
        gap = ?gap.status,
        "readiness report assembled"
    );

    RetirementReport {
        years_to_retirement,
        years_in_retirement,
        income_at_retirement: future_value_with_inflation(
            inputs.desired_annual_income_today,
            inputs.inflation_rate,
            years_to_retirement,
        ),
        annual_yield_on_corpus: required_corpus * inputs.post_retirement_return_rate,
        required_corpus,
        projected_savings_by_year,
        projected_savings_at_retirement,
        monte_carlo,
        asset_allocation: recommend(inputs.current_age, inputs.retirement_age),
        gap,
    }
}
