//! Card browsing mode of the REPL.

use anyhow::Result;
use colored::Colorize;
use rustyline::error::ReadlineError;
use whatnext_core::cards::{CardStackController, SwipeDirection, SwipeOutcome};
use whatnext_core::location::{Coordinates, Location};

use crate::helper::LineEditor;
use crate::presenter::{TerminalPresenter, summary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BrowseCommand {
    Swipe(SwipeDirection),
    /// 1-based rank; the frontmost card when absent.
    Open(Option<usize>),
    List,
    Done,
}

impl BrowseCommand {
    fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let command = match words.next()? {
            "l" | "left" => BrowseCommand::Swipe(SwipeDirection::Left),
            "r" | "right" => BrowseCommand::Swipe(SwipeDirection::Right),
            "o" | "open" => match words.next() {
                Some(n) => BrowseCommand::Open(Some(n.parse().ok().filter(|n| *n > 0)?)),
                None => BrowseCommand::Open(None),
            },
            "list" | "ls" => BrowseCommand::List,
            "done" | "q" | "/quit" => BrowseCommand::Done,
            _ => return None,
        };
        words.next().is_none().then_some(command)
    }
}

/// Runs the browse loop until the user types `done` or closes the input.
pub fn run(
    rl: &mut LineEditor,
    stack: &mut CardStackController<Location>,
    origin: Coordinates,
) -> Result<()> {
    let presenter = TerminalPresenter::new(origin);

    println!(
        "{}",
        format!("{} places to browse.", stack.len()).bright_magenta().bold()
    );
    println!(
        "{}",
        "'r' next, 'l' previous, 'open [n]' details, 'list' all cards, 'done' to leave."
            .bright_black()
    );
    print_front(stack, &origin);

    loop {
        let line = match tokio::task::block_in_place(|| rl.readline("browse> ")) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'done' to leave.".yellow());
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(trimmed);

        match BrowseCommand::parse(trimmed) {
            Some(BrowseCommand::Swipe(direction)) => {
                if let Some(front) = stack.frontmost_id().map(str::to_string) {
                    if let SwipeOutcome::Ignored(reason) = stack.swipe(&front, direction) {
                        tracing::debug!("[Browse] swipe ignored: {:?}", reason);
                    }
                }
                print_front(stack, &origin);
            }
            Some(BrowseCommand::Open(None)) => {
                if let Some(front) = stack.frontmost_id().map(str::to_string) {
                    stack.tap(&front, &presenter);
                }
            }
            Some(BrowseCommand::Open(Some(n))) => {
                match stack.cards().get(n - 1).map(|card| card.business_id.clone()) {
                    Some(id) => {
                        stack.tap(&id, &presenter);
                    }
                    None => println!("{}", format!("No card #{}", n).yellow()),
                }
            }
            Some(BrowseCommand::List) => print_list(stack, &origin),
            Some(BrowseCommand::Done) => break,
            None => println!("{}", "Unknown command".bright_black()),
        }
    }

    Ok(())
}

fn print_front(stack: &CardStackController<Location>, origin: &Coordinates) {
    if let Some(front) = stack.frontmost() {
        println!("{} {}", "▶".bright_green(), summary(front, origin).bold());
    }
}

fn print_list(stack: &CardStackController<Location>, origin: &Coordinates) {
    let front = stack.frontmost_id();
    for (rank, card) in stack.cards().iter().enumerate() {
        let marker = if Some(card.business_id.as_str()) == front {
            "▶".bright_green().to_string()
        } else {
            " ".to_string()
        };
        println!("{} {:>2}. {}", marker, rank + 1, summary(card, origin));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_browse_commands() {
        assert_eq!(
            BrowseCommand::parse("r"),
            Some(BrowseCommand::Swipe(SwipeDirection::Right))
        );
        assert_eq!(
            BrowseCommand::parse("left"),
            Some(BrowseCommand::Swipe(SwipeDirection::Left))
        );
        assert_eq!(BrowseCommand::parse("open"), Some(BrowseCommand::Open(None)));
        assert_eq!(BrowseCommand::parse("open 3"), Some(BrowseCommand::Open(Some(3))));
        assert_eq!(BrowseCommand::parse("list"), Some(BrowseCommand::List));
        assert_eq!(BrowseCommand::parse("done"), Some(BrowseCommand::Done));
    }

    #[test]
    fn rejects_malformed_commands() {
        assert_eq!(BrowseCommand::parse("open 0"), None);
        assert_eq!(BrowseCommand::parse("open two"), None);
        assert_eq!(BrowseCommand::parse("right now"), None);
        assert_eq!(BrowseCommand::parse("sideways"), None);
    }
}
