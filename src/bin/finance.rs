use std::{error::Error, path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use rusqlite::Connection;
use serde::Serialize;
use time::Date;
use tracing_subscriber::EnvFilter;

use finance_rs::{
    Balance, BudgetUsage, CategoryBreakdown, CategoryName, NewBudget, Period, PeriodQuery,
    ThresholdBand, TransactionBuilder, TransactionKind, TransactionQuery, TransactionUpdate,
    add_budget, budget_summary, check_budget, create_transaction, delete_transaction, get_balance,
    get_category_breakdown, list_budgets, list_transactions, open_db, parse_date, remove_budget,
    report, reset_db, today_in_timezone, update_transaction,
};

/// Track income, expenses and budgets from the command line.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
struct Args {
    /// File path to the SQLite database, created if it does not exist.
    #[arg(long, env = "FINANCE_DB_PATH", default_value = "./finance.db")]
    db_path: PathBuf,

    /// The canonical timezone used to work out today's date, e.g. "Pacific/Auckland".
    #[arg(long, env = "FINANCE_TIMEZONE", default_value = "Etc/UTC")]
    timezone: String,

    /// Print results as JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    /// Log debug messages to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record a new transaction
    Add {
        /// Either "income" or "expense"
        kind: String,
        /// The category, e.g. "Food"
        category: String,
        /// The amount, must be greater than zero
        #[arg(allow_negative_numbers = true)]
        amount: f64,
        /// What the transaction was for
        #[arg(short, long)]
        description: Option<String>,
        /// When the transaction happened (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
    },

    /// List transactions, most recent first
    List {
        /// Only show "income" or "expense" transactions
        #[arg(short, long)]
        kind: Option<String>,
        /// Only show transactions in this category
        #[arg(short, long)]
        category: Option<String>,
        /// Only show transactions on or after this date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,
        /// Only show transactions on or before this date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,
        /// Show at most this many transactions, 0 shows all
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Change the fields of a transaction
    Update {
        /// The ID of the transaction to change
        id: i64,
        /// The new kind, "income" or "expense"
        #[arg(short, long)]
        kind: Option<String>,
        /// The new category
        #[arg(short, long)]
        category: Option<String>,
        /// The new amount, a negative amount such as -1 keeps the current one
        #[arg(short, long, allow_negative_numbers = true)]
        amount: Option<f64>,
        /// The new description
        #[arg(short, long)]
        description: Option<String>,
        /// The new date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },

    /// Delete a transaction
    Delete {
        /// The ID of the transaction to delete
        id: i64,
    },

    /// Show income, expenses and spending per category
    Stats {
        /// One of "day", "week", "month", "year", "custom" or "all"
        #[arg(short, long, default_value = "all")]
        period: String,
        /// The first date of a custom period (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,
        /// The last date of a custom period (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,
    },

    /// Budget management commands
    #[command(subcommand)]
    Budget(BudgetCommand),

    /// Delete all transactions and budgets
    Reset {
        /// Confirm that all data should be deleted
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
enum BudgetCommand {
    /// Set a budget for a category
    Add {
        /// The category to budget for
        category: String,
        /// The amount that may be spent per period
        #[arg(allow_negative_numbers = true)]
        amount: f64,
        /// One of "monthly", "weekly" or "yearly"
        #[arg(short, long, default_value = "monthly")]
        period: String,
        /// The first date the budget applies to (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,
        /// The last date the budget applies to (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,
    },

    /// List all budgets
    List,

    /// Remove the budget for a category
    Remove {
        /// The category to remove the budget for
        category: String,
    },

    /// Compare the spending in a category to its budget
    Check {
        /// The category to check
        category: String,
        /// One of "day", "week", "month", "year" or "all"
        #[arg(short, long, default_value = "month")]
        period: String,
    },

    /// Compare the spending in every category to its budget over the budget's period
    Status,
}

fn main() -> ExitCode {
    let args = Args::parse();
    setup_logging(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            print_error(error);
            ExitCode::FAILURE
        }
    }
}

fn setup_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let today = today_in_timezone(&args.timezone)?;
    let connection = open_db(&args.db_path)?;
    tracing::debug!("Opened database at {:?}", args.db_path);

    let json = args.json;

    match args.command {
        Command::Add {
            kind,
            category,
            amount,
            description,
            date,
        } => {
            let date = date.unwrap_or_else(|| today.to_string());
            let builder = TransactionBuilder::parse(
                &kind,
                &category,
                amount,
                description.as_deref(),
                &date,
            )?;
            let transaction = create_transaction(builder, &connection)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&transaction)?);
            } else {
                println!("Transaction #{} added.", transaction.id);
            }
        }
        Command::List {
            kind,
            category,
            start,
            end,
            limit,
        } => {
            let query = TransactionQuery {
                kind: kind
                    .as_deref()
                    .map(str::parse::<TransactionKind>)
                    .transpose()?,
                category: category.as_deref().map(CategoryName::new).transpose()?,
                start_date: parse_optional_date(start.as_deref())?,
                end_date: parse_optional_date(end.as_deref())?,
                limit,
            };
            let transactions = list_transactions(&query, &connection)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&transactions)?);
            } else {
                print!("{}", report::render_transactions(&transactions));
            }
        }
        Command::Update {
            id,
            kind,
            category,
            amount,
            description,
            date,
        } => {
            let update = TransactionUpdate {
                kind: kind
                    .as_deref()
                    .map(str::parse::<TransactionKind>)
                    .transpose()?,
                category: category.as_deref().map(CategoryName::new).transpose()?,
                amount: amount_to_update(amount),
                description,
                date: parse_optional_date(date.as_deref())?,
            };
            update_transaction(id, &update, &connection)?;
            println!("Transaction #{id} updated.");
        }
        Command::Delete { id } => {
            if delete_transaction(id, &connection)? == 0 {
                print_warning(format!("there is no transaction with the ID {id}"));
            } else {
                println!("Transaction #{id} deleted.");
            }
        }
        Command::Stats { period, start, end } => {
            let query = PeriodQuery {
                period: Period::from_token(&period),
                start: parse_optional_date(start.as_deref())?,
                end: parse_optional_date(end.as_deref())?,
            };
            print_statistics(&query, today, json, &connection)?;
        }
        Command::Budget(command) => run_budget_command(command, today, json, &connection)?,
        Command::Reset { yes } => {
            if yes {
                reset_db(&connection)?;
                println!("All transactions and budgets deleted.");
            } else {
                print_warning("this deletes all transactions and budgets, pass --yes to confirm");
            }
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct Statistics<'a> {
    period: &'static str,
    balance: &'a Balance,
    net: f64,
    categories: &'a CategoryBreakdown,
}

fn print_statistics(
    query: &PeriodQuery,
    today: Date,
    json: bool,
    connection: &Connection,
) -> Result<(), Box<dyn Error>> {
    let balance = get_balance(query, today, connection)?;
    let breakdown = get_category_breakdown(query, today, connection)?;

    if json {
        let statistics = Statistics {
            period: query.period.as_token(),
            balance: &balance,
            net: balance.net(),
            categories: &breakdown,
        };
        println!("{}", serde_json::to_string_pretty(&statistics)?);
    } else {
        print!("{}", report::render_statistics(&balance, &breakdown));
    }

    Ok(())
}

#[derive(Serialize)]
struct BudgetCheck<'a> {
    category: &'a CategoryName,
    #[serde(flatten)]
    usage: BudgetUsage,
    percent_used: f64,
    band: ThresholdBand,
}

fn run_budget_command(
    command: BudgetCommand,
    today: Date,
    json: bool,
    connection: &Connection,
) -> Result<(), Box<dyn Error>> {
    match command {
        BudgetCommand::Add {
            category,
            amount,
            period,
            start,
            end,
        } => {
            let new_budget = NewBudget::parse(
                &category,
                amount,
                &period,
                start.as_deref(),
                end.as_deref(),
            )?;
            let budget = add_budget(new_budget, connection)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&budget)?);
            } else {
                println!("Budget for {} added.", budget.category);
            }
        }
        BudgetCommand::List => {
            let budgets = list_budgets(connection)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&budgets)?);
            } else {
                print!("{}", report::render_budgets(&budgets));
            }
        }
        BudgetCommand::Remove { category } => {
            let category = CategoryName::new(&category)?;
            remove_budget(&category, connection)?;
            println!("Budget for {category} removed.");
        }
        BudgetCommand::Check { category, period } => {
            let category = CategoryName::new(&category)?;
            let period = Period::from_token(&period);

            match check_budget(&category, period, today, connection)? {
                None => print_warning(format!("there is no budget for {category}")),
                Some(usage) if json => {
                    let check = BudgetCheck {
                        category: &category,
                        usage,
                        percent_used: usage.percent_used(),
                        band: usage.band(),
                    };
                    println!("{}", serde_json::to_string_pretty(&check)?);
                }
                Some(usage) => print!("{}", report::render_budget_usage(&category, &usage)),
            }
        }
        BudgetCommand::Status => {
            let statuses = budget_summary(today, connection)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&statuses)?);
            } else {
                print!("{}", report::render_budget_summary(&statuses));
            }
        }
    }

    Ok(())
}

/// A negative amount on the command line means "keep the current amount".
fn amount_to_update(amount: Option<f64>) -> Option<f64> {
    amount.filter(|amount| !amount.is_sign_negative())
}

fn parse_optional_date(text: Option<&str>) -> Result<Option<Date>, finance_rs::Error> {
    text.map(parse_date).transpose()
}

fn print_error(error: impl ToString) {
    eprintln!(
        "\x1b[31;1m{}\x1b[0m",
        capitalise_first_char(&error.to_string())
    )
}

fn print_warning(warning: impl ToString) {
    eprintln!(
        "\x1b[33;1m{}\x1b[0m",
        capitalise_first_char(&warning.to_string())
    )
}

fn capitalise_first_char(string: &str) -> String {
    let mut chars = string.chars();
    let Some(first) = chars.next() else {
        return String::with_capacity(0);
    };
    first.to_uppercase().chain(chars).collect()
}
