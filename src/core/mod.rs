mod engine;
mod types;

pub use engine::{evaluate_scenario, monthly_loan_payment};
pub use types::{ScenarioEvaluation, ScenarioInputs, YearRow};
