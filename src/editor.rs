use std::borrow::Cow::{self, Borrowed, Owned};

use rustyline::completion::{Completer, Pair};
use rustyline::highlight::{Highlighter, MatchingBracketHighlighter};
use rustyline::hint::HistoryHinter;
use rustyline::{Completer, Context, Helper, Hinter, Validator};

const COMMANDS: [&str; 5] = ["add", "view", "plot", "help", "exit"];
const PERIODS: [&str; 3] = ["month", "year", "all"];

/// Completes shell command names, and the period keyword after `view` or `plot`
pub(crate) struct CommandCompleter;

impl Completer for CommandCompleter {
    type Candidate = Pair;

    fn complete(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<Pair>)> {
        let typed = &line[..pos];
        let words: Vec<&str> = typed.split_whitespace().collect();
        let starting_new_word = typed.is_empty() || typed.ends_with(char::is_whitespace);
        let word_start = if starting_new_word { pos } else { typed.rfind(char::is_whitespace).map(|i| i + 1).unwrap_or(0) };
        let word = &typed[word_start..];

        let candidates: &[&str] = match (words.len(), starting_new_word) {
            (0, _) | (1, false) => &COMMANDS,
            (1, true) | (2, false) if matches!(words[0].to_ascii_lowercase().as_str(), "view" | "plot") => &PERIODS,
            _ => &[],
        };

        let pairs = candidates.iter()
            .filter(|c| c.starts_with(&word.to_ascii_lowercase()))
            .map(|c| Pair { display: c.to_string(), replacement: c.to_string() })
            .collect();
        Ok((word_start, pairs))
    }
}

#[derive(Helper, Completer, Hinter, Validator)]
pub(crate) struct LedgerHelper {
    #[rustyline(Completer)]
    pub(crate) completer: CommandCompleter,
    pub(crate) highlighter: MatchingBracketHighlighter,
    #[rustyline(Hinter)]
    pub(crate) hinter: HistoryHinter,
    pub(crate) colored_prompt: String,
}

impl LedgerHelper {
    pub(crate) fn new(prompt: &str) -> LedgerHelper {
        LedgerHelper {
            completer: CommandCompleter,
            highlighter: MatchingBracketHighlighter::new(),
            hinter: HistoryHinter {},
            colored_prompt: format!("\x1b[1;32m{prompt}\x1b[0m"),
        }
    }
}

impl Highlighter for LedgerHelper {
    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(
        &'s self,
        prompt: &'p str,
        default: bool,
    ) -> Cow<'b, str> {
        if default {
            Borrowed(&self.colored_prompt)
        } else {
            Borrowed(prompt)
        }
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Owned("\x1b[2m".to_owned() + hint + "\x1b[m")
    }

    fn highlight<'l>(&self, line: &'l str, pos: usize) -> Cow<'l, str> {
        self.highlighter.highlight(line, pos)
    }

    fn highlight_char(&self, line: &str, pos: usize, forced: bool) -> bool {
        self.highlighter.highlight_char(line, pos, forced)
    }
}
