use serde::Serialize;

#[derive(Debug, Clone)]
pub struct ScenarioInputs {
    pub has_loan: bool,
    pub loan_amount: f64,
    pub loan_annual_rate: f64,
    pub loan_years: u32,
    pub use_manual_loan_payment: bool,
    pub loan_monthly_payment: f64,
    pub rent_per_month: f64,
    pub monthly_expenses: f64,
    pub own_money: f64,
    pub extra_costs: f64,
    pub years: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearRow {
    pub year: u32,
    pub net_yearly: f64,
    pub cumulative: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioEvaluation {
    pub loan_monthly: f64,
    pub net_monthly: f64,
    pub net_yearly: f64,
    pub initial_investment: f64,
    pub roi_percent: f64,
    pub payback_years: Option<f64>,
    pub total_profit: f64,
    pub yearly_table: Vec<YearRow>,
}
