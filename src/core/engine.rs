use super::types::{ScenarioEvaluation, ScenarioInputs, YearRow};

pub fn monthly_loan_payment(principal: f64, annual_rate_percent: f64, term_years: u32) -> f64 {
    let payments = u64::from(term_years) * 12;
    if !(principal > 0.0) || payments == 0 {
        return 0.0;
    }

    let payments = payments as f64;
    let monthly_rate = annual_rate_percent / 100.0 / 12.0;
    if monthly_rate == 0.0 {
        // The amortization formula divides by zero at r = 0; split evenly instead.
        return principal / payments;
    }

    principal * monthly_rate / (1.0 - (1.0 + monthly_rate).powf(-payments))
}

pub fn evaluate_scenario(scenario: &ScenarioInputs) -> ScenarioEvaluation {
    let loan_monthly = resolve_loan_monthly(scenario);

    let net_monthly = scenario.rent_per_month - scenario.monthly_expenses - loan_monthly;
    let net_yearly = net_monthly * 12.0;
    let initial_investment = scenario.own_money + scenario.extra_costs;

    let profitable = net_yearly > 0.0 && initial_investment > 0.0;
    let roi_percent = if profitable {
        net_yearly / initial_investment * 100.0
    } else {
        0.0
    };
    let payback_years = profitable.then(|| initial_investment / net_yearly);

    let yearly_table = build_yearly_table(net_yearly, scenario.years);
    let total_profit = net_yearly * f64::from(scenario.years);

    ScenarioEvaluation {
        loan_monthly,
        net_monthly,
        net_yearly,
        initial_investment,
        roi_percent,
        payback_years,
        total_profit,
        yearly_table,
    }
}

fn resolve_loan_monthly(scenario: &ScenarioInputs) -> f64 {
    if !scenario.has_loan {
        return 0.0;
    }
    // A manual override only wins when it is actually usable; a zero or
    // negative override falls back to the amortized payment.
    if scenario.use_manual_loan_payment && scenario.loan_monthly_payment > 0.0 {
        return scenario.loan_monthly_payment;
    }
    monthly_loan_payment(
        scenario.loan_amount,
        scenario.loan_annual_rate,
        scenario.loan_years,
    )
}

fn build_yearly_table(net_yearly: f64, years: u32) -> Vec<YearRow> {
    let mut rows = Vec::with_capacity(years as usize);
    let mut cumulative = 0.0;
    for year in 1..=years {
        cumulative += net_yearly;
        rows.push(YearRow {
            year,
            net_yearly,
            cumulative,
        });
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
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

    fn sample_scenario() -> ScenarioInputs {
        ScenarioInputs {
            has_loan: false,
            loan_amount: 0.0,
            loan_annual_rate: 0.0,
            loan_years: 0,
            use_manual_loan_payment: false,
            loan_monthly_payment: 0.0,
            rent_per_month: 20_000.0,
            monthly_expenses: 5_000.0,
            own_money: 300_000.0,
            extra_costs: 50_000.0,
            years: 5,
        }
    }

    #[test]
    fn payment_matches_amortization_formula_at_nonzero_rate() {
        let payment = monthly_loan_payment(100_000.0, 12.0, 10);
        assert_approx_tol(payment, 1_434.71, 0.01);
    }

    #[test]
    fn payment_splits_evenly_at_zero_rate() {
        // 60 000 over 5 years * 12 months = exactly 1 000 per month.
        let payment = monthly_loan_payment(60_000.0, 0.0, 5);
        assert_approx(payment, 1_000.0);
    }

    #[test]
    fn payment_is_zero_for_degenerate_principal_or_term() {
        assert_approx(monthly_loan_payment(0.0, 12.0, 10), 0.0);
        assert_approx(monthly_loan_payment(-5_000.0, 12.0, 10), 0.0);
        assert_approx(monthly_loan_payment(100_000.0, 12.0, 0), 0.0);
    }

    #[test]
    fn oracle_no_loan_scenario() {
        // Hand calculation:
        // netMonthly = 20 000 - 5 000 = 15 000
        // netYearly = 15 000 * 12 = 180 000
        // initialInvestment = 300 000 + 50 000 = 350 000
        // roiPercent = 180 000 / 350 000 * 100 ~= 51.43
        // paybackYears = 350 000 / 180 000 ~= 1.94
        let result = evaluate_scenario(&sample_scenario());

        assert_approx(result.loan_monthly, 0.0);
        assert_approx(result.net_monthly, 15_000.0);
        assert_approx(result.net_yearly, 180_000.0);
        assert_approx(result.initial_investment, 350_000.0);
        assert_approx_tol(result.roi_percent, 51.43, 0.01);
        assert_approx_tol(result.payback_years.expect("profitable"), 1.94, 0.01);

        assert_eq!(result.yearly_table.len(), 5);
        assert_eq!(
            result.yearly_table[0],
            YearRow {
                year: 1,
                net_yearly: 180_000.0,
                cumulative: 180_000.0,
            }
        );
        assert_approx(result.yearly_table[4].cumulative, 900_000.0);
        assert_approx(result.total_profit, 900_000.0);
    }

    #[test]
    fn oracle_amortized_loan_scenario() {
        // Hand calculation:
        // payment(100k, 12%, 10y) ~= 1 434.71
        // netMonthly ~= 15 000 - 4 000 - 1 434.71 = 9 565.29
        // netYearly ~= 114 783.48
        let mut scenario = sample_scenario();
        scenario.has_loan = true;
        scenario.loan_amount = 100_000.0;
        scenario.loan_annual_rate = 12.0;
        scenario.loan_years = 10;
        scenario.rent_per_month = 15_000.0;
        scenario.monthly_expenses = 4_000.0;

        let result = evaluate_scenario(&scenario);
        assert_approx_tol(result.loan_monthly, 1_434.71, 0.01);
        assert_approx_tol(result.net_monthly, 9_565.29, 0.01);
        assert_approx_tol(result.net_yearly, 114_783.48, 0.1);
    }

    #[test]
    fn manual_payment_overrides_loan_terms() {
        let mut scenario = sample_scenario();
        scenario.has_loan = true;
        scenario.use_manual_loan_payment = true;
        scenario.loan_monthly_payment = 3_000.0;
        scenario.loan_amount = 100_000.0;
        scenario.loan_annual_rate = 12.0;
        scenario.loan_years = 10;
        scenario.rent_per_month = 15_000.0;
        scenario.monthly_expenses = 4_000.0;

        let result = evaluate_scenario(&scenario);
        assert_approx(result.loan_monthly, 3_000.0);
        assert_approx(result.net_monthly, 8_000.0);
    }

    #[test]
    fn non_positive_manual_payment_falls_back_to_amortization() {
        let mut scenario = sample_scenario();
        scenario.has_loan = true;
        scenario.use_manual_loan_payment = true;
        scenario.loan_monthly_payment = 0.0;
        scenario.loan_amount = 60_000.0;
        scenario.loan_annual_rate = 0.0;
        scenario.loan_years = 5;

        let result = evaluate_scenario(&scenario);
        assert_approx(result.loan_monthly, 1_000.0);
    }

    #[test]
    fn loan_payment_is_zero_when_loan_disabled() {
        let mut scenario = sample_scenario();
        scenario.has_loan = false;
        scenario.loan_amount = 500_000.0;
        scenario.loan_annual_rate = 15.0;
        scenario.loan_years = 20;

        let result = evaluate_scenario(&scenario);
        assert_approx(result.loan_monthly, 0.0);
    }

    #[test]
    fn unprofitable_scenario_has_no_roi_and_no_payback() {
        let mut scenario = sample_scenario();
        scenario.rent_per_month = 5_000.0;
        scenario.monthly_expenses = 7_000.0;
        scenario.own_money = 100_000.0;
        scenario.extra_costs = 0.0;
        scenario.years = 2;

        let result = evaluate_scenario(&scenario);
        assert!(result.net_yearly <= 0.0);
        assert_approx(result.roi_percent, 0.0);
        assert_eq!(result.payback_years, None);
        assert_approx(result.total_profit, -48_000.0);
    }

    #[test]
    fn zero_investment_base_has_no_roi_and_no_payback() {
        let mut scenario = sample_scenario();
        scenario.own_money = 0.0;
        scenario.extra_costs = 0.0;

        let result = evaluate_scenario(&scenario);
        assert!(result.net_yearly > 0.0);
        assert_approx(result.roi_percent, 0.0);
        assert_eq!(result.payback_years, None);
    }

    #[test]
    fn zero_year_horizon_yields_empty_table_and_zero_profit() {
        let mut scenario = sample_scenario();
        scenario.years = 0;

        let result = evaluate_scenario(&scenario);
        assert!(result.yearly_table.is_empty());
        assert_approx(result.total_profit, 0.0);
        assert_approx(result.net_yearly, 180_000.0);
    }

    #[test]
    fn evaluation_is_deterministic() {
        let scenario = sample_scenario();
        let first = evaluate_scenario(&scenario);
        let second = evaluate_scenario(&scenario);
        assert_eq!(first, second);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_payment_is_positive_and_finite(
            principal in 1u32..5_000_000,
            rate_bp in 0u32..4_000,
            term_years in 1u32..41
        ) {
            let payment = monthly_loan_payment(
                f64::from(principal),
                f64::from(rate_bp) / 100.0,
                term_years,
            );
            prop_assert!(payment.is_finite());
            prop_assert!(payment > 0.0);
        }

        #[test]
        fn prop_zero_rate_payment_is_straight_line(
            principal in 1u32..5_000_000,
            term_years in 1u32..41
        ) {
            let payment = monthly_loan_payment(f64::from(principal), 0.0, term_years);
            let expected = f64::from(principal) / (f64::from(term_years) * 12.0);
            prop_assert!((payment - expected).abs() <= EPS);
        }

        #[test]
        fn prop_payment_grows_with_rate(
            principal in 1_000u32..5_000_000,
            rate_bp in 1u32..4_000,
            term_years in 1u32..41
        ) {
            let at_rate = monthly_loan_payment(
                f64::from(principal),
                f64::from(rate_bp) / 100.0,
                term_years,
            );
            let at_zero = monthly_loan_payment(f64::from(principal), 0.0, term_years);
            prop_assert!(at_rate > at_zero);
        }
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_yearly_table_accumulates_net_yearly(
            rent in 0u32..200_000,
            expenses in 0u32..200_000,
            own in 0u32..5_000_000,
            extra in 0u32..1_000_000,
            years in 0u32..51
        ) {
            let mut scenario = sample_scenario();
            scenario.rent_per_month = f64::from(rent);
            scenario.monthly_expenses = f64::from(expenses);
            scenario.own_money = f64::from(own);
            scenario.extra_costs = f64::from(extra);
            scenario.years = years;

            let result = evaluate_scenario(&scenario);
            prop_assert_eq!(result.yearly_table.len(), years as usize);

            for (index, row) in result.yearly_table.iter().enumerate() {
                prop_assert_eq!(row.year, index as u32 + 1);
                prop_assert!((row.net_yearly - result.net_yearly).abs() <= EPS);
                let expected = result.net_yearly * f64::from(row.year);
                prop_assert!((row.cumulative - expected).abs() <= 1e-3);
            }

            let expected_total = result.net_yearly * f64::from(years);
            prop_assert!((result.total_profit - expected_total).abs() <= 1e-3);
        }

        #[test]
        fn prop_payback_inverts_roi_when_profitable(
            rent in 1u32..200_000,
            expenses in 0u32..200_000,
            own in 1u32..5_000_000,
            extra in 0u32..1_000_000
        ) {
            let mut scenario = sample_scenario();
            scenario.rent_per_month = f64::from(rent);
            scenario.monthly_expenses = f64::from(expenses);
            scenario.own_money = f64::from(own);
            scenario.extra_costs = f64::from(extra);

            let result = evaluate_scenario(&scenario);
            if result.net_yearly > 0.0 && result.initial_investment > 0.0 {
                let payback = result.payback_years.expect("profitable scenario");
                prop_assert!((payback * result.net_yearly - result.initial_investment).abs() <= 1e-3);
                prop_assert!(result.roi_percent > 0.0);
                // roi% and payback are reciprocal views of the same ratio.
                prop_assert!((result.roi_percent * payback - 100.0).abs() <= 1e-6 * 100.0);
            } else {
                prop_assert_eq!(result.payback_years, None);
                prop_assert!((result.roi_percent - 0.0).abs() <= EPS);
            }
        }
    }
}
