use nom::branch::alt;
use nom::bytes::complete::{is_not, tag_no_case};
use nom::character::complete::{i32 as parse_i32, multispace0, multispace1, u32 as parse_u32};
use nom::combinator::{all_consuming, success, value};
use nom::sequence::{delimited, preceded};
use nom::IResult;

/// A line typed into the interactive shell
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Command {
    /// ADD, prompts for every field
    Add,
    /// VIEW period, prints the transactions in the period
    View(Period),
    /// PLOT period, charts the transactions in the period without listing them
    Plot(Period),
    Help,
    Exit,
}

/// The date range a VIEW or PLOT applies to
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Period {
    /// No range given, ask for start and end dates
    Prompt,
    /// Start and end dates as typed, both inclusive
    Between(String, String),
    Month(u32),
    Year(i32),
    All,
}

pub(crate) const HELP: &str = "\
Commands:
  add                        record a transaction
  view [<start> <end>]       list transactions between two dates (dd-mm-yyyy), both inclusive
  view month <1-12>          list transactions in the most recent such month
  view year <yyyy>           list transactions in a year
  view all                   list every transaction
  plot [<start> <end>]       chart daily income and expense (also accepts month, year and all)
  help                       show this message
  exit                       leave";

pub(crate) fn parse(line: &str) -> Result<Command, String> {
    let result = all_consuming(delimited(
        multispace0,
        alt((add, view, plot, help, exit)),
        multispace0,
    ))(line);

    match result {
        Ok((_, command)) => Ok(command),
        Err(e) => Err(format!("Unable to parse '{}': {e}", line.trim())),
    }
}

fn add(input: &str) -> IResult<&str, Command> {
    value(Command::Add, tag_no_case("add"))(input)
}

fn view(input: &str) -> IResult<&str, Command> {
    let (input, _) = tag_no_case("view")(input)?;
    let (input, period) = period(input)?;
    Ok((input, Command::View(period)))
}

fn plot(input: &str) -> IResult<&str, Command> {
    let (input, _) = tag_no_case("plot")(input)?;
    let (input, period) = period(input)?;
    Ok((input, Command::Plot(period)))
}

fn help(input: &str) -> IResult<&str, Command> {
    value(Command::Help, alt((tag_no_case("help"), tag_no_case("?"))))(input)
}

fn exit(input: &str) -> IResult<&str, Command> {
    value(Command::Exit, alt((tag_no_case("exit"), tag_no_case("quit"))))(input)
}

fn period(input: &str) -> IResult<&str, Period> {
    alt((month, year, all, between, success(Period::Prompt)))(input)
}

/// `month 3`
fn month(input: &str) -> IResult<&str, Period> {
    let (input, _) = preceded(multispace1, tag_no_case("month"))(input)?;
    let (input, month) = preceded(multispace1, parse_u32)(input)?;
    Ok((input, Period::Month(month)))
}

/// `year 2024`
fn year(input: &str) -> IResult<&str, Period> {
    let (input, _) = preceded(multispace1, tag_no_case("year"))(input)?;
    let (input, year) = preceded(multispace1, parse_i32)(input)?;
    Ok((input, Period::Year(year)))
}

fn all(input: &str) -> IResult<&str, Period> {
    value(Period::All, preceded(multispace1, tag_no_case("all")))(input)
}

/// Two dates separated by whitespace. They are checked against the date format later.
fn between(input: &str) -> IResult<&str, Period> {
    let (input, start) = preceded(multispace1, non_space)(input)?;
    let (input, end) = preceded(multispace1, non_space)(input)?;
    Ok((input, Period::Between(start.to_string(), end.to_string())))
}

fn non_space(input: &str) -> IResult<&str, &str> {
    is_not(" \t\r\n")(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_commands() {
        assert_eq!(parse("add"), Ok(Command::Add));
        assert_eq!(parse("  ADD  "), Ok(Command::Add));
        assert_eq!(parse("help"), Ok(Command::Help));
        assert_eq!(parse("?"), Ok(Command::Help));
        assert_eq!(parse("exit"), Ok(Command::Exit));
        assert_eq!(parse("Quit"), Ok(Command::Exit));
    }

    #[test]
    fn test_view() {
        assert_eq!(parse("view"), Ok(Command::View(Period::Prompt)));
        assert_eq!(parse("view 01-03-2024 31-03-2024"),
                   Ok(Command::View(Period::Between("01-03-2024".to_string(), "31-03-2024".to_string()))));
        assert_eq!(parse("VIEW month 3"), Ok(Command::View(Period::Month(3))));
        assert_eq!(parse("view year 2024"), Ok(Command::View(Period::Year(2024))));
        assert_eq!(parse("view all"), Ok(Command::View(Period::All)));
    }

    #[test]
    fn test_plot() {
        assert_eq!(parse("plot"), Ok(Command::Plot(Period::Prompt)));
        assert_eq!(parse("plot   01-03-2024\t05-03-2024 "),
                   Ok(Command::Plot(Period::Between("01-03-2024".to_string(), "05-03-2024".to_string()))));
        assert_eq!(parse("plot month 12"), Ok(Command::Plot(Period::Month(12))));
    }

    #[test]
    fn test_rejects() {
        assert!(parse("").is_err());
        assert!(parse("address").is_err());
        assert!(parse("view 01-03-2024").is_err());
        assert!(parse("view a b c").is_err());
        assert!(parse("delete 3").is_err());
    }
}
