use serde::Serialize;

/// Validated scalar inputs for one readiness estimate.
///
/// Rates are decimal fractions (`0.07` for 7%). Callers are responsible for
/// enforcing `0 < current_age < retirement_age < life_expectancy` before
/// handing a value to the engine.
#[derive(Debug, Clone)]
pub struct RetirementInputs {
    pub current_age: u32,
    pub retirement_age: u32,
    pub life_expectancy: u32,
    pub current_savings: f64,
    pub monthly_contribution: f64,
    pub desired_annual_income_today: f64,
    pub avg_annual_return: f64,
    pub std_dev_annual_return: f64,
    pub post_retirement_return_rate: f64,
    pub inflation_rate: f64,
}

impl RetirementInputs {
    pub fn years_to_retirement(&self) -> i64 {
        i64::from(self.retirement_age) - i64::from(self.current_age)
    }

    pub fn years_in_retirement(&self) -> i64 {
        i64::from(self.life_expectancy) - i64::from(self.retirement_age)
    }
}

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub trials: u32,
    pub seed: u64,
    pub parallel: bool,
}

pub const DEFAULT_TRIALS: u32 = 1_000;
pub const DEFAULT_SEED: u64 = 42;

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            trials: DEFAULT_TRIALS,
            seed: DEFAULT_SEED,
            parallel: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearBalance {
    pub year: u32,
    pub balance: f64,
}

/// Year-end balances, year 1 first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct YearlyProjection(Vec<YearBalance>);

impl YearlyProjection {
    pub fn from_balances(balances: Vec<f64>) -> Self {
        Self(
            balances
                .into_iter()
                .zip(1_u32..)
                .map(|(balance, year)| YearBalance { year, balance })
                .collect(),
        )
    }

    pub fn years(&self) -> &[YearBalance] {
        &self.0
    }

    pub fn final_balance(&self) -> Option<f64> {
        self.0.last().map(|row| row.balance)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Terminal portfolio values, one per trial. Order carries no meaning.
pub type SimulationOutcome = Vec<f64>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationSummary {
    /// 0.5th percentile.
    pub near_worst: f64,
    pub mean: f64,
    pub median: f64,
    pub p10: f64,
    pub p90: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationRecommendation {
    pub equity_pct: u8,
    pub debt_pct: u8,
    pub note: &'static str,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GapStatus {
    Surplus,
    Shortfall,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GapAnalysis {
    pub status: GapStatus,
    /// Absolute distance between projected savings and the required corpus.
    pub difference: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetirementReport {
    pub years_to_retirement: i64,
    pub years_in_retirement: i64,
    pub income_at_retirement: f64,
    pub annual_yield_on_corpus: f64,
    pub required_corpus: f64,
    pub projected_savings_by_year: YearlyProjection,
    pub projected_savings_at_retirement: f64,
    pub monte_carlo: SimulationSummary,
    pub asset_allocation: AllocationRecommendation,
    pub gap: GapAnalysis,
}
