//! Renders ledger data as text for the terminal.
//!
//! Renderers return strings rather than printing so the command line binary
//! decides where the output goes.

use std::{fmt::Write, sync::OnceLock};

use numfmt::{Formatter, Precision};

use crate::{
    aggregation::{Balance, CategoryBreakdown},
    budget::{Budget, BudgetStatus, BudgetUsage, ThresholdBand},
    category::CategoryName,
    transaction::{Transaction, TransactionKind},
};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

/// How many categories are listed under the top expenses.
pub const TOP_CATEGORY_COUNT: usize = 3;

const RATIO_BAR_WIDTH: usize = 30;

/// Format `number` as dollars with two decimal places, e.g. "-$12.50".
pub fn format_currency(number: f64) -> String {
    static FMT: OnceLock<Formatter> = OnceLock::new();

    let fmt = FMT.get_or_init(|| {
        Formatter::currency("$")
            .expect("\"$\" is a valid currency prefix")
            .precision(Precision::Decimals(2))
    });

    // Zero is rendered as "0", so it needs its own string.
    if number == 0.0 {
        return "$0.00".to_owned();
    }

    let mut formatted_string = fmt.fmt_string(number.abs());

    // numfmt drops trailing zeros, e.g. "12.30" is rendered as "12.3".
    match formatted_string.rfind('.') {
        None => formatted_string.push_str(".00"),
        Some(index) if formatted_string.len() - index == 2 => formatted_string.push('0'),
        Some(_) => {}
    }

    if number < 0.0 {
        format!("-{formatted_string}")
    } else {
        formatted_string
    }
}

/// Render transactions as a table, one row per transaction.
///
/// Expense amounts are shown with a leading minus sign.
pub fn render_transactions(transactions: &[Transaction]) -> String {
    if transactions.is_empty() {
        return "No transactions found.\n".to_owned();
    }

    let mut output = format!(
        "{:<4} {:<10} {:<8} {:>12}  {:<20} {}\n",
        "ID", "Date", "Kind", "Amount", "Category", "Description"
    );
    output.push_str(&"-".repeat(70));
    output.push('\n');

    for transaction in transactions {
        let amount = match transaction.kind {
            TransactionKind::Income => transaction.amount,
            TransactionKind::Expense => -transaction.amount,
        };

        let _ = writeln!(
            output,
            "{:<4} {:<10} {:<8} {:>12}  {:<20} {}",
            transaction.id,
            transaction.date.to_string(),
            transaction.kind.as_str(),
            format_currency(amount),
            transaction.category,
            transaction.description.as_deref().unwrap_or_default()
        );
    }

    output
}

/// Render the income, expenses and balance for a period along with how the
/// expenses split across categories.
pub fn render_statistics(balance: &Balance, breakdown: &CategoryBreakdown) -> String {
    let mut output = format!("\n{BOLD}=== FINANCIAL STATISTICS ==={RESET}\n\n");

    let net = balance.net();
    let balance_color = if net < 0.0 { RED } else { GREEN };
    let _ = writeln!(
        output,
        "{BOLD}Total Income:{RESET}   {}",
        format_currency(balance.income)
    );
    let _ = writeln!(
        output,
        "{BOLD}Total Expenses:{RESET} {}",
        format_currency(balance.expense)
    );
    let _ = writeln!(
        output,
        "{BOLD}Balance:{RESET}        {balance_color}{}{RESET}",
        format_currency(net)
    );

    let ranked = breakdown.ranked();

    if ranked.is_empty() {
        let _ = writeln!(output, "\n{YELLOW}No expense data available{RESET}");
    } else {
        let _ = writeln!(output, "\n{BOLD}Expenses by Category:{RESET}");

        for (category, total) in &ranked {
            let _ = writeln!(
                output,
                " - {CYAN}{:<20}{RESET}: {YELLOW}{}{RESET} ({GREEN}{:.1}%{RESET})",
                category,
                format_currency(*total),
                breakdown.percentage_of_total(*total)
            );
        }

        output.push_str(&render_top_categories(&ranked));
    }

    if balance.income > 0.0 && balance.expense > 0.0 {
        let _ = writeln!(
            output,
            "\n{BOLD}Expense/Income Ratio:{RESET} {}",
            ratio_bar(balance.expense / balance.income)
        );
    }

    let _ = writeln!(
        output,
        "{BOLD}Expense Categories:{RESET} {}",
        breakdown.totals.len()
    );

    output
}

fn render_top_categories(ranked: &[(&CategoryName, f64)]) -> String {
    let top = &ranked[..ranked.len().min(TOP_CATEGORY_COUNT)];
    let mut output = format!("\n{BOLD}Top {} Expenses:{RESET}\n", top.len());

    for (rank, (category, total)) in top.iter().enumerate() {
        let _ = writeln!(
            output,
            "{}. {CYAN}{category}{RESET} ({YELLOW}{}{RESET})",
            rank + 1,
            format_currency(*total)
        );
    }

    output
}

/// Draw `ratio` as a bar of [RATIO_BAR_WIDTH] cells followed by the ratio as a
/// percentage. Ratios above 1.0 fill the whole bar.
pub fn ratio_bar(ratio: f64) -> String {
    let filled = (ratio * RATIO_BAR_WIDTH as f64).round().max(0.0) as usize;
    let filled = filled.min(RATIO_BAR_WIDTH);

    format!(
        "[{}{}] {:.1}%",
        "█".repeat(filled),
        " ".repeat(RATIO_BAR_WIDTH - filled),
        ratio * 100.0
    )
}

/// Render the configured budgets as a table.
pub fn render_budgets(budgets: &[Budget]) -> String {
    if budgets.is_empty() {
        return "No budgets configured.\n".to_owned();
    }

    let mut output = format!(
        "{:<20} {:>12}  {:<8} {:<10} {:<10}\n",
        "Category", "Amount", "Period", "Start", "End"
    );
    output.push_str(&"-".repeat(64));
    output.push('\n');

    for budget in budgets {
        let _ = writeln!(
            output,
            "{:<20} {:>12}  {:<8} {:<10} {:<10}",
            budget.category,
            format_currency(budget.amount),
            budget.period.as_str(),
            budget
                .start_date
                .map(|date| date.to_string())
                .unwrap_or_default(),
            budget
                .end_date
                .map(|date| date.to_string())
                .unwrap_or_default(),
        );
    }

    output
}

fn band_color(band: ThresholdBand) -> &'static str {
    match band {
        ThresholdBand::WithinBudget => GREEN,
        ThresholdBand::Approaching => YELLOW,
        ThresholdBand::Exceeded => RED,
    }
}

fn band_label(band: ThresholdBand) -> &'static str {
    match band {
        ThresholdBand::WithinBudget => "within budget",
        ThresholdBand::Approaching => "approaching limit",
        ThresholdBand::Exceeded => "over budget",
    }
}

/// Render the spending for a single category against its budget.
pub fn render_budget_usage(category: &CategoryName, usage: &BudgetUsage) -> String {
    let band = usage.band();
    let color = band_color(band);

    format!(
        "{CYAN}{category}{RESET}: {} of {} spent ({color}{:.1}%, {}{RESET}), {} remaining\n",
        format_currency(usage.spent),
        format_currency(usage.allotted),
        usage.percent_used(),
        band_label(band),
        format_currency(usage.remaining())
    )
}

/// Render every budget with the spending over its own period.
pub fn render_budget_summary(statuses: &[BudgetStatus]) -> String {
    if statuses.is_empty() {
        return "No budgets configured.\n".to_owned();
    }

    let mut output = format!("\n{BOLD}=== BUDGET STATUS ==={RESET}\n\n");

    for status in statuses {
        let _ = write!(output, "[{}] ", status.budget.period);
        output.push_str(&render_budget_usage(&status.budget.category, &status.usage));
    }

    output
}

#[cfg(test)]
mod format_currency_tests {
    use super::format_currency;

    #[test]
    fn formats_zero() {
        assert_eq!(format_currency(0.0), "$0.00");
    }

    #[test]
    fn pads_to_two_decimal_places() {
        assert_eq!(format_currency(12.5), "$12.50");
    }

    #[test]
    fn formats_negative_amounts() {
        assert_eq!(format_currency(-3.25), "-$3.25");
    }
}
