use std::path::PathBuf;
use anyhow::Context;
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{info, warn};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;

use crate::command::{Command, Period, HELP};
use crate::config::Config;
use crate::controller::{Controller, EntryFields, Presentation};
use crate::editor::LedgerHelper;

mod chart;
mod command;
mod config;
mod controller;
mod editor;
mod entry;
mod report;
mod store;
mod transaction;
mod util;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    /// Ledger file path, overrides the one in the config file
    #[clap(short, long)]
    file: Option<PathBuf>,

    /// Config file path, defaults to <config dir>/fintrack/config.toml
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Runs the interactive shell when omitted
    #[clap(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the ledger file if it does not exist
    Init,

    /// Record a transaction. Fields not given here are asked for.
    Add {
        /// Transaction date (dd-mm-yyyy)
        #[clap(long)]
        date: Option<String>,

        /// Positive amount
        #[clap(long, allow_hyphen_values = true)]
        amount: Option<String>,

        /// I for Income, E for Expense
        #[clap(long)]
        category: Option<String>,

        #[clap(long)]
        description: Option<String>,
    },

    /// List transactions in a date range, both ends inclusive
    View {
        /// Start date (dd-mm-yyyy)
        #[clap(long, requires = "end")]
        start: Option<String>,

        /// End date (dd-mm-yyyy)
        #[clap(long, requires = "start")]
        end: Option<String>,

        /// Most recent occurrence of this month, 1-12
        #[clap(long, conflicts_with_all = ["start", "year", "all"])]
        month: Option<u32>,

        /// A whole calendar year
        #[clap(long, conflicts_with_all = ["start", "all"])]
        year: Option<i32>,

        /// Every transaction in the ledger
        #[clap(long, conflicts_with = "start")]
        all: bool,

        /// Also chart daily income and expense
        #[clap(long)]
        plot: bool,
    },
}

static COMMAND_HISTORY_FILE: &str = ".fintrack_history";
static PROMPT: &str = "fintrack> ";

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli: Cli = Cli::parse();

    let config_path = cli.config.or_else(Config::default_path);
    let mut config = match &config_path {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };
    if let Some(file) = cli.file {
        config.file = file;
    }
    let controller = Controller::new(&config)?;
    info!("Using ledger {}", controller.store().file_path().display());

    match cli.command {
        None => run_shell(&controller),
        Some(Commands::Init) => controller.init(),
        Some(Commands::Add { date, amount, category, description }) => {
            let mut rl = Editor::<(), DefaultHistory>::new()?;
            let fields = EntryFields { date, amount, category, description };
            controller.add(&mut rl, &fields).map(|_| ())
        }
        Some(Commands::View { start, end, month, year, all, plot }) => {
            let period = match (start, end, month, year) {
                (Some(start), Some(end), _, _) => Period::Between(start, end),
                (_, _, Some(month), _) => Period::Month(month),
                (_, _, _, Some(year)) => Period::Year(year),
                _ if all => Period::All,
                _ => Period::Prompt,
            };
            let presentation = if plot { Presentation::ListAndPlot } else { Presentation::List };
            let mut rl = Editor::<(), DefaultHistory>::new()?;
            controller.view(&mut rl, &period, presentation).map(|_| ())
        }
    }
}

fn history_file() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join(COMMAND_HISTORY_FILE),
        None => PathBuf::from(COMMAND_HISTORY_FILE),
    }
}

fn run_shell(controller: &Controller) -> anyhow::Result<()> {
    let mut rl = Editor::<LedgerHelper, DefaultHistory>::new()?;
    rl.set_helper(Some(LedgerHelper::new(PROMPT)));
    let history = history_file();
    if rl.load_history(&history).is_err() {
        println!("No previous history.");
    }
    println!("Finance Tracker. Type 'help' for commands.");

    loop {
        let readline = rl.readline(PROMPT);
        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if let Err(e) = rl.add_history_entry(line) {
                    warn!("Unable to record history: {e}");
                }

                let command = match command::parse(line) {
                    Ok(command) => command,
                    Err(e) => {
                        println!("{e}");
                        continue;
                    }
                };

                let result = match command {
                    Command::Exit => break,
                    Command::Help => {
                        println!("{HELP}");
                        Ok(())
                    }
                    Command::Add => controller.add(&mut rl, &EntryFields::default()).map(|_| ()),
                    Command::View(period) => controller.view(&mut rl, &period, Presentation::ListAskPlot).map(|_| ()),
                    Command::Plot(period) => controller.view(&mut rl, &period, Presentation::PlotOnly).map(|_| ()),
                };
                if let Err(e) = result {
                    report_error(&e);
                }
            },
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break
            },
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break
            },
            Err(err) => {
                println!("Error: {:?}", err);
                break
            }
        }
    }

    rl.save_history(&history).with_context(|| format!("Unable to save history to {}", history.display()))
}

/// Errors inside the shell are printed and the shell keeps going
fn report_error(e: &anyhow::Error) {
    match e.downcast_ref::<ReadlineError>() {
        Some(ReadlineError::Interrupted) | Some(ReadlineError::Eof) => println!("Cancelled"),
        _ => println!("Error: {e:#}"),
    }
}
