use super::types::AllocationRecommendation;

/// Equity/debt split by years left until retirement.
pub fn recommend(current_age: u32, retirement_age: u32) -> AllocationRecommendation {
    let years_to_retirement = i64::from(retirement_age) - i64::from(current_age);

    match years_to_retirement {
        i64::MIN..=0 => AllocationRecommendation {
            equity_pct: 20,
            debt_pct: 80,
            note: "Highly conservative, focus on capital preservation during retirement.",
        },
        1..=9 => AllocationRecommendation {
            equity_pct: 40,
            debt_pct: 60,
            note: "Moderately conservative, shifting towards capital preservation as retirement nears.",
        },
        10..=19 => AllocationRecommendation {
            equity_pct: 60,
            debt_pct: 40,
            note: "Balanced approach, aiming for growth with moderate risk.",
        },
        _ => AllocationRecommendation {
            equity_pct: 75,
            debt_pct: 25,
            note: "Aggressive, maximizing growth potential for a long investment horizon.",
        },
    }
}
