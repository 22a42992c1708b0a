use std::collections::BTreeMap;
use chrono::NaiveDate;
use comfy_table::{Cell, CellAlignment, Color, Table, TableComponent};
use crate::transaction::{Category, Transaction};

/// Income and expense totals for every day between the first and last transaction
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct DailySeries {
    pub(crate) days: Vec<NaiveDate>,
    pub(crate) income: Vec<f64>,
    pub(crate) expense: Vec<f64>,
}

impl DailySeries {
    fn max_value(&self) -> f64 {
        self.income.iter().chain(self.expense.iter()).cloned().fold(0.0, f64::max)
    }
}

/// Sum amounts per day and category. Days without transactions get zero for both series.
pub(crate) fn daily_totals(transactions: &[Transaction]) -> DailySeries {
    let mut totals: BTreeMap<NaiveDate, (f64, f64)> = BTreeMap::new();
    for t in transactions {
        let entry = totals.entry(t.date).or_insert((0.0, 0.0));
        match t.category {
            Category::Income => entry.0 += t.amount,
            Category::Expense => entry.1 += t.amount,
        }
    }

    let (first, last) = match (totals.keys().next(), totals.keys().next_back()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return DailySeries::default(),
    };

    let mut series = DailySeries::default();
    for day in first.iter_days().take_while(|d| *d <= last) {
        let (income, expense) = totals.get(&day).cloned().unwrap_or((0.0, 0.0));
        series.days.push(day);
        series.income.push(income);
        series.expense.push(expense);
    }
    series
}

/// Horizontal bar of `width` characters for the largest value, scaled down for smaller ones
fn bar(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    // Anything non-zero gets at least one block so it is visible
    let len = ((value / max) * width as f64).round().max(1.0) as usize;
    "█".repeat(len)
}

/// Draw income (green) and expense (red) per day as a table of bars
pub(crate) fn render(series: &DailySeries, width: usize, date_format: &str) -> Table {
    let mut table = Table::new();
    table.remove_style(TableComponent::HorizontalLines);
    table.remove_style(TableComponent::MiddleIntersections);
    table.remove_style(TableComponent::LeftBorderIntersections);
    table.remove_style(TableComponent::RightBorderIntersections);
    table.set_header(vec!["Date", "Income", "", "Expense", ""]);

    let max = series.max_value();
    for (i, day) in series.days.iter().enumerate() {
        let income = series.income[i];
        let expense = series.expense[i];
        table.add_row(vec![
            Cell::new(day.format(date_format)),
            Cell::new(format!("{income:.2}")).set_alignment(CellAlignment::Right),
            Cell::new(bar(income, max, width)).fg(Color::Green),
            Cell::new(format!("{expense:.2}")).set_alignment(CellAlignment::Right),
            Cell::new(bar(expense, max, width)).fg(Color::Red),
        ]);
    }

    table
}
