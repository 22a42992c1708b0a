use comfy_table::{Cell, CellAlignment, Color, Table, TableComponent};
use crate::store::QueryResult;
use crate::transaction::{Category, Transaction};
use crate::util::format_date;

pub(crate) const NO_TRANSACTIONS: &str = "No transactions found in the given date range.";

/// Income, expense and their difference over a set of transactions
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Summary {
    pub(crate) income: f64,
    pub(crate) expense: f64,
}

impl Summary {
    pub(crate) fn of(transactions: &[Transaction]) -> Summary {
        let mut summary = Summary { income: 0.0, expense: 0.0 };
        for t in transactions {
            match t.category {
                Category::Income => summary.income += t.amount,
                Category::Expense => summary.expense += t.amount,
            }
        }
        summary
    }

    pub(crate) fn net(&self) -> f64 {
        self.income - self.expense
    }
}

/// One line notice telling the user what the query found
pub(crate) fn notice(result: &QueryResult, date_format: &str) -> String {
    match result {
        QueryResult::NoTransactions => NO_TRANSACTIONS.to_string(),
        QueryResult::Found { start, end, .. } => format!(
            "Transactions from {} to {}", format_date(*start, date_format), format_date(*end, date_format)
        ),
    }
}

fn new_table() -> Table {
    let mut table = Table::new();
    table.remove_style(TableComponent::HorizontalLines);
    table.remove_style(TableComponent::MiddleIntersections);
    table.remove_style(TableComponent::LeftBorderIntersections);
    table.remove_style(TableComponent::RightBorderIntersections);
    table
}

pub(crate) fn transactions_table(transactions: &[Transaction], date_format: &str) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Date", "Category", "Description", "Amount"]);

    for t in transactions {
        let colour = match t.category {
            Category::Income => Color::Green,
            Category::Expense => Color::Red,
        };
        table.add_row(vec![
            Cell::new(format_date(t.date, date_format)),
            Cell::new(t.category.label()).fg(colour),
            Cell::new(t.description.as_str()),
            Cell::new(format_amount(t.amount)).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

pub(crate) fn summary_table(summary: &Summary) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Total Income", "Total Expense", "Net"]);
    table.add_row(vec![
        Cell::new(format_amount(summary.income)).set_alignment(CellAlignment::Right),
        Cell::new(format_amount(summary.expense)).set_alignment(CellAlignment::Right),
        Cell::new(format_amount(summary.net())).set_alignment(CellAlignment::Right),
    ]);
    table
}

/// Print the query notice, then the rows and their totals if there are any
pub(crate) fn print_result(result: &QueryResult, date_format: &str) {
    println!("{}", notice(result, date_format));
    if result.is_empty() {
        return;
    }

    let transactions = result.transactions();
    println!("{}", transactions_table(transactions, date_format));
    println!("{}", summary_table(&Summary::of(transactions)));
}

/// Format $ amount
fn format_amount(amount: f64) -> String {
    format!("{amount:.2}")
}
