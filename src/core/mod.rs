mod allocation;
mod corpus;
mod growth;
mod monte_carlo;
mod report;
mod types;

pub use allocation::recommend;
pub use corpus::{compute_required_corpus, future_value_with_inflation};
pub use growth::project_growth;
pub use monte_carlo::{NEAR_WORST_PERCENTILE, percentile, run_simulation, simulate, summarize};
pub use report::build_report;
pub use types::{
    AllocationRecommendation, DEFAULT_SEED, DEFAULT_TRIALS, GapAnalysis, GapStatus,
    RetirementInputs, RetirementReport, SimulationConfig, SimulationOutcome, SimulationSummary,
    YearBalance, YearlyProjection,
};
