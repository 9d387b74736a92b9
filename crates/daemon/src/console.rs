// Copyright (C) 2025 Ryan Daum <ryan.daum@gmail.com> This program is free
// software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, version
// 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Line-oriented programmer console.

use eyre::eyre;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use serde::Serialize;
use tracing::{debug, info};
use warren_common::tasks::BufferedSession;
use warren_db::Store;
use warren_kernel::{ProgrammerController, World};

const HELP: &str = "\
Commands:
  eval <code>           evaluate code as the player (also: ; <code>)
  search <query>        find verbs and functions by name
  @verb <obj>.<name>    show a verb
  @function <obj>.<name>
                        show a function
  @json <request>       send a raw request, e.g. {\"op\": \"eval\", \"code\": \"1 + 1\"}
  help                  show this text
  quit                  leave the console";

const COMMAND_WORDS: &[&str] = &["eval", "search", "@verb", "@function", "@json", "help", "quit"];

/// The command word closest to a mistyped one, if any is close enough to be a likely typo.
fn suggest(word: &str) -> Option<&'static str> {
    COMMAND_WORDS
        .iter()
        .map(|candidate| (strsim::jaro_winkler(word, candidate), *candidate))
        .filter(|(similarity, _)| *similarity >= 0.8)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, candidate)| candidate)
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConsoleCommand<'a> {
    Eval(&'a str),
    Search(&'a str),
    GetVerb { object_id: &'a str, name: &'a str },
    GetFunction { object_id: &'a str, name: &'a str },
    Json(&'a str),
    Help,
    Quit,
    Empty,
    Invalid(String),
}

fn member_ref<'a>(
    line: &'a str,
    make: fn(&'a str, &'a str) -> ConsoleCommand<'a>,
) -> ConsoleCommand<'a> {
    match line.trim().split_once('.') {
        Some((object_id, name)) if !object_id.is_empty() && !name.is_empty() => {
            make(object_id, name)
        }
        _ => ConsoleCommand::Invalid(format!("Expected <object>.<name>, got '{}'", line.trim())),
    }
}

pub fn parse_command(line: &str) -> ConsoleCommand<'_> {
    let line = line.trim();
    if line.is_empty() {
        return ConsoleCommand::Empty;
    }
    if let Some(code) = line.strip_prefix(';') {
        return ConsoleCommand::Eval(code.trim());
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    match word {
        "eval" => ConsoleCommand::Eval(rest),
        "search" => ConsoleCommand::Search(rest),
        "@verb" => member_ref(rest, |object_id, name| ConsoleCommand::GetVerb {
            object_id,
            name,
        }),
        "@function" => member_ref(rest, |object_id, name| ConsoleCommand::GetFunction {
            object_id,
            name,
        }),
        "@json" => ConsoleCommand::Json(rest),
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "@quit" => ConsoleCommand::Quit,
        _ => match suggest(word) {
            Some(close) => {
                ConsoleCommand::Invalid(format!("Unknown command '{word}'. Did you mean '{close}'?"))
            }
            None => ConsoleCommand::Invalid(format!("Unknown command '{word}'. Try 'help'.")),
        },
    }
}

fn pretty<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("<unprintable: {e}>"))
}

/// Carry out one command, returning the text to show, or `None` when the console should close.
pub fn execute<W: World, S: Store>(
    controller: &ProgrammerController<W, S>,
    command: ConsoleCommand<'_>,
) -> Option<String> {
    let text = match command {
        ConsoleCommand::Eval(code) => controller.eval(code),
        ConsoleCommand::Search(query) => controller
            .search(query)
            .iter()
            .map(|r| format!("{} ({})", r.search_str, r.object_id))
            .collect::<Vec<_>>()
            .join("\n"),
        ConsoleCommand::GetVerb { object_id, name } => {
            pretty(&controller.get_verb(object_id, name))
        }
        ConsoleCommand::GetFunction { object_id, name } => {
            pretty(&controller.get_function(object_id, name))
        }
        ConsoleCommand::Json(request) => pretty(&controller.dispatch(request)),
        ConsoleCommand::Help => HELP.to_string(),
        ConsoleCommand::Quit => return None,
        ConsoleCommand::Empty => String::new(),
        ConsoleCommand::Invalid(message) => message,
    };
    Some(text)
}

fn drain_output(session: &BufferedSession, player: &warren_var::Obj) {
    for line in session.take_output(player) {
        println!("{line}");
    }
}

pub fn console_loop<W: World, S: Store>(
    controller: &ProgrammerController<W, S>,
    session: &BufferedSession,
) -> Result<(), eyre::Report> {
    let mut rl = DefaultEditor::new().map_err(|e| eyre!("Unable to start line editor: {e}"))?;
    let prompt = format!("{}> ", controller.player());
    info!(player = %controller.player(), "Console ready");
    println!("Type 'help' for commands.");
    loop {
        drain_output(session, controller.player());
        let line = match rl.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Eof) => break,
            Err(ReadlineError::Interrupted) => continue,
            Err(e) => return Err(eyre!("Error reading line: {e}")),
        };
        if !line.trim().is_empty() {
            let _ = rl.add_history_entry(line.as_str());
        }
        let command = parse_command(&line);
        debug!(?command, "Console command");
        let Some(text) = execute(controller, command) else {
            break;
        };
        if !text.is_empty() {
            println!("{text}");
        }
    }
    drain_output(session, controller.player());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;
    use warren_kernel::testing::TestWorld;

    #[test_case("eval 1 + 1", ConsoleCommand::Eval("1 + 1"); "eval")]
    #[test_case(";  root.name ", ConsoleCommand::Eval("root.name"); "semicolon")]
    #[test_case("search gre", ConsoleCommand::Search("gre"); "search")]
    #[test_case("@verb root.echo", ConsoleCommand::GetVerb { object_id: "root", name: "echo" }; "verb")]
    #[test_case("@function  root.greet", ConsoleCommand::GetFunction { object_id: "root", name: "greet" }; "function")]
    #[test_case("@json {\"op\":\"eval\"}", ConsoleCommand::Json("{\"op\":\"eval\"}"); "json")]
    #[test_case("quit", ConsoleCommand::Quit; "quit")]
    #[test_case("   ", ConsoleCommand::Empty; "empty")]
    fn test_parse(line: &str, expected: ConsoleCommand<'_>) {
        assert_eq!(parse_command(line), expected);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(parse_command("@verb root"), ConsoleCommand::Invalid(_)));
        assert!(matches!(parse_command("frobnicate"), ConsoleCommand::Invalid(_)));
    }

    #[test_case("serch gre", "Unknown command 'serch'. Did you mean 'search'?"; "search typo")]
    #[test_case("@verbb root.echo", "Unknown command '@verbb'. Did you mean '@verb'?"; "verb typo")]
    #[test_case("frobnicate", "Unknown command 'frobnicate'. Try 'help'."; "nothing close")]
    fn test_unknown_command_suggestions(line: &str, message: &str) {
        assert_eq!(parse_command(line), ConsoleCommand::Invalid(message.to_string()));
    }

    #[test]
    fn test_execute() {
        let world = TestWorld::new();
        let controller = world.controller();
        assert_eq!(
            execute(&controller, parse_command("eval 1 + 1")),
            Some("2".to_string())
        );
        assert_eq!(
            execute(&controller, parse_command("@function root.nope")),
            Some("null".to_string())
        );
        let shown = execute(&controller, parse_command("@function root.greet")).unwrap();
        assert!(shown.contains("\"objectId\": \"root\""));
        let found = execute(&controller, parse_command("search greet")).unwrap();
        assert!(found.starts_with("root.greet (root)"));
        assert_eq!(execute(&controller, parse_command("quit")), None);
    }
}
