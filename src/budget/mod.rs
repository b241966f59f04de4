//! Per-category budgets and the evaluation of spending against them.

mod check;
mod core;

pub use check::{
    APPROACHING_THRESHOLD_PERCENT, BudgetStatus, BudgetUsage, EXCEEDED_THRESHOLD_PERCENT,
    ThresholdBand, budget_summary, check_budget, get_spent_in_window,
};
pub use core::{
    Budget, BudgetPeriod, NewBudget, add_budget, create_budget_table, get_budget, list_budgets,
    remove_budget,
};
