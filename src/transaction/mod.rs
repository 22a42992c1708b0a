use std::fmt;
use std::str::FromStr;
use chrono::NaiveDate;

/// Whether money came in or went out. Stored in the ledger by its full label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Category {
    Income,
    Expense,
}

impl Category {
    pub(crate) fn label(&self) -> &'static str {
        match self {
            Category::Income => "Income",
            Category::Expense => "Expense",
        }
    }

    /// Map the single character typed at the prompt, `I` or `E`, to a category.
    pub(crate) fn from_shorthand(s: &str) -> Option<Category> {
        match s {
            "I" => Some(Category::Income),
            "E" => Some(Category::Expense),
            _ => None
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Income" => Ok(Category::Income),
            "Expense" => Ok(Category::Expense),
            _ => Err(format!("unknown category '{s}'"))
        }
    }
}

/// One ledger row
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Transaction {
    pub(crate) date: NaiveDate,
    pub(crate) amount: f64,
    pub(crate) category: Category,
    pub(crate) description: String,
}

impl Transaction {
    pub(crate) fn new(date: NaiveDate, amount: f64, category: Category, description: &str) -> Transaction {
        // Keep one transaction on one line of the ledger
        let description = description.replace(['\n', '\r'], " ");
        Transaction {
            date,
            amount,
            category,
            description,
        }
    }
}

/// Format an amount the way the ledger stores it: a plain decimal literal that always
/// carries a fractional part, e.g. `100.0` or `12.5`.
pub(crate) fn format_amount(amount: f64) -> String {
    format!("{amount:?}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_shorthand() {
        assert_eq!(Category::from_shorthand("I"), Some(Category::Income));
        assert_eq!(Category::from_shorthand("E"), Some(Category::Expense));
        assert_eq!(Category::from_shorthand("i"), None);
        assert_eq!(Category::from_shorthand("Income"), None);
        assert_eq!(Category::from_shorthand(""), None);
    }

    #[test]
    fn test_category_label() {
        assert_eq!("Income".parse::<Category>(), Ok(Category::Income));
        assert_eq!("Expense".parse::<Category>(), Ok(Category::Expense));
        assert!("I".parse::<Category>().is_err());
        assert_eq!(Category::Expense.to_string(), "Expense");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(100.0), "100.0");
        assert_eq!(format_amount(12.5), "12.5");
        assert_eq!(format_amount(0.1), "0.1");
    }

    #[test]
    fn test_description_single_line() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let t = Transaction::new(date, 5.0, Category::Expense, "coffee\nand cake");
        assert_eq!(t.description, "coffee and cake");
    }
}
