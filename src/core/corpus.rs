/// Value of `amount` after `years` of inflation. Negative horizons leave the
/// amount untouched.
pub fn future_value_with_inflation(amount: f64, inflation_rate: f64, years: i64) -> f64 {
    if years < 0 {
        return amount;
    }
    amount * (1.0 + inflation_rate).powf(years as f64)
}

/// Capital needed at retirement to pay the inflated desired income at the end
/// of every retirement year, discounted at the post-retirement return.
///
/// Degenerate horizons (retirement already behind, or no retirement years
/// left) yield zero instead of an error.
pub fn compute_required_corpus(
    desired_annual_income_today: f64,
    retirement_age: u32,
    current_age: u32,
    life_expectancy: u32,
    inflation_rate: f64,
    post_retirement_return_rate: f64,
) -> f64 {
    let years_to_retirement = i64::from(retirement_age) - i64::from(current_age);
    let years_in_retirement = i64::from(life_expectancy) - i64::from(retirement_age);

    if years_to_retirement < 0 || years_in_retirement <= 0 {
        return 0.0;
    }

    let income_at_retirement =
        future_value_with_inflation(desired_annual_income_today, inflation_rate, years_to_retirement);

    income_at_retirement * annuity_factor(post_retirement_return_rate, years_in_retirement)
}

/// Present value of 1 paid at the end of each of `years` periods.
fn annuity_factor(rate: f64, years: i64) -> f64 {
    if rate == 0.0 {
        return years as f64;
    }
    (1.0 - (1.0 + rate).powf(-(years as f64))) / rate
}
