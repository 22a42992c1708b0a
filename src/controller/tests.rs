use std::fs;
use chrono::NaiveDate;
use crate::command::Period;
use crate::config::Config;
use crate::controller::{Controller, EntryFields, Presentation};
use crate::entry::ScriptedSource;
use crate::store::QueryResult;
use crate::transaction::{Category, Transaction};

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn temp_controller() -> (Controller, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        file: dir.path().join("finance_data.csv"),
        ..Config::default()
    };
    (Controller::new(&config).unwrap(), dir)
}

fn fields(date: &str, amount: &str, category: &str, description: &str) -> EntryFields {
    EntryFields {
        date: Some(date.to_string()),
        amount: Some(amount.to_string()),
        category: Some(category.to_string()),
        description: Some(description.to_string()),
    }
}

#[test]
fn test_add_from_fields_initialises_ledger() {
    let (controller, _dir) = temp_controller();
    let mut source = ScriptedSource::new(Vec::<String>::new());

    let t = controller.add(&mut source, &fields("01-03-2024", "100", "I", "Salary")).unwrap();
    assert_eq!(t, Transaction::new(ymd(2024, 3, 1), 100.0, Category::Income, "Salary"));
    assert_eq!(
        fs::read_to_string(controller.store().file_path()).unwrap(),
        "date,amount,category,description\n01-03-2024,100.0,Income,Salary\n"
    );
}

#[test]
fn test_add_keeps_description_as_typed() {
    let (controller, _dir) = temp_controller();
    let mut source = ScriptedSource::new(Vec::<String>::new());

    controller.add(&mut source, &fields("01-03-2024", "12", "E", " Rent, March ")).unwrap();
    let stored = controller.store().all_transactions().unwrap();
    assert_eq!(stored[0].description, " Rent, March ");
}

#[test]
fn test_new_rejects_unusable_date_format() {
    let config = Config {
        date_format: "%d-%m-%Q".to_string(),
        ..Config::default()
    };
    assert!(Controller::new(&config).is_err());
}

#[test]
fn test_add_prompts_for_invalid_and_missing_fields() {
    let (controller, _dir) = temp_controller();
    let given = EntryFields {
        date: Some("2024-03-01".to_string()),
        amount: Some("-10".to_string()),
        category: None,
        description: Some("Gift".to_string()),
    };
    let mut source = ScriptedSource::new(["02-03-2024", "10", "E"]);

    let t = controller.add(&mut source, &given).unwrap();
    assert_eq!(t, Transaction::new(ymd(2024, 3, 2), 10.0, Category::Expense, "Gift"));
}

#[test]
fn test_add_fully_interactive() {
    let (controller, _dir) = temp_controller();
    let mut source = ScriptedSource::new(["05-03-2024", "zero", "7.5", "Q", "E", "Lunch"]);

    let t = controller.add(&mut source, &EntryFields::default()).unwrap();
    assert_eq!(t, Transaction::new(ymd(2024, 3, 5), 7.5, Category::Expense, "Lunch"));
}

#[test]
fn test_add_cancelled_writes_nothing() {
    let (controller, _dir) = temp_controller();
    let mut source = ScriptedSource::new(["05-03-2024"]);

    assert!(controller.add(&mut source, &EntryFields::default()).is_err());
    assert_eq!(controller.store().all_transactions().unwrap(), vec![]);
}

#[test]
fn test_query_periods() {
    let (controller, _dir) = temp_controller();
    let mut source = ScriptedSource::new(Vec::<String>::new());
    controller.add(&mut source, &fields("01-03-2024", "100", "I", "Salary")).unwrap();
    controller.add(&mut source, &fields("15-06-2023", "20", "E", "Cinema")).unwrap();

    let result = controller.query(&mut source, &Period::Between("01-03-2024".into(), "01-03-2024".into())).unwrap();
    assert_eq!(result.transactions().len(), 1);

    let result = controller.query(&mut source, &Period::Year(2023)).unwrap();
    assert_eq!(result.transactions()[0].description, "Cinema");

    let result = controller.query(&mut source, &Period::All).unwrap();
    match result {
        QueryResult::Found { start, end, transactions } => {
            assert_eq!(start, ymd(2023, 6, 15));
            assert_eq!(end, ymd(2024, 3, 1));
            assert_eq!(transactions.len(), 2);
        }
        QueryResult::NoTransactions => panic!("Unexpected results"),
    }

    assert!(controller.query(&mut source, &Period::Month(13)).is_err());
}

#[test]
fn test_query_prompts_for_dates() {
    let (controller, _dir) = temp_controller();
    let mut source = ScriptedSource::new(Vec::<String>::new());
    controller.add(&mut source, &fields("01-03-2024", "100", "I", "Salary")).unwrap();

    let mut source = ScriptedSource::new(["bad", "02-03-2024", "05-03-2024"]);
    let result = controller.query(&mut source, &Period::Prompt).unwrap();
    assert_eq!(result, QueryResult::NoTransactions);
}

#[test]
fn test_view_asks_about_plot_only_when_rows_found() {
    let (controller, _dir) = temp_controller();
    let mut source = ScriptedSource::new(Vec::<String>::new());
    controller.add(&mut source, &fields("01-03-2024", "100", "I", "Salary")).unwrap();

    // Nothing found: no plot question, so the empty source is never read
    let result = controller.view(&mut source, &Period::Year(2020), Presentation::ListAskPlot).unwrap();
    assert!(result.is_empty());

    let mut source = ScriptedSource::new(["y"]);
    let result = controller.view(&mut source, &Period::Year(2024), Presentation::ListAskPlot).unwrap();
    assert_eq!(result.transactions().len(), 1);
}

#[test]
fn test_view_on_empty_ledger() {
    let (controller, _dir) = temp_controller();
    let mut source = ScriptedSource::new(Vec::<String>::new());
    let result = controller.view(&mut source, &Period::All, Presentation::ListAndPlot).unwrap();
    assert_eq!(result, QueryResult::NoTransactions);
}
