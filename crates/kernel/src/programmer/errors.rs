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

use colored::Colorize;
use warren_common::tasks::ScriptError;

use crate::print::{Detached, format_value};

/// The plain text of an error as the programmer sees it. Thrown values render like results,
/// one level deep, without looking into the world.
pub fn error_text(error: &ScriptError) -> String {
    match error {
        ScriptError::Raised(e) => e.to_string(),
        ScriptError::Thrown(value) => format!("Uncaught {}", format_value(&Detached, value, 1)),
    }
}

/// Turn error highlighting on or off for the whole process, whatever the terminal says.
/// Errors go to the programmer's session rather than our own stdout, so hosts call this once at
/// startup.
pub fn highlight_errors(on: bool) {
    colored::control::set_override(on);
}

/// `error_text`, highlighted for the programmer's session when highlighting is on.
pub fn format_error(error: &ScriptError) -> String {
    error_text(error).white().on_red().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use warren_var::{Error, Obj, v_int, v_list, v_obj, v_str};

    #[test]
    fn test_raised() {
        let e = ScriptError::Raised(Error::not_defined("asdf"));
        assert_eq!(error_text(&e), "ReferenceError: asdf is not defined");
    }

    #[test]
    fn test_thrown() {
        assert_eq!(
            error_text(&ScriptError::Thrown(v_str("boom"))),
            "Uncaught 'boom'"
        );
        let thrown = v_list(&[v_int(1), v_obj(Obj::mk_id("root"))]);
        assert_eq!(
            error_text(&ScriptError::Thrown(thrown)),
            "Uncaught [ 1,\n  [object root] ]"
        );
    }

    #[test]
    fn test_highlighting_follows_the_process_setting() {
        let e = ScriptError::Raised(Error::type_error("x is not a function"));

        highlight_errors(false);
        assert_eq!(format_error(&e), "TypeError: x is not a function");

        highlight_errors(true);
        let formatted = format_error(&e);
        assert!(formatted.starts_with("\u{1b}["));
        assert!(formatted.contains("TypeError: x is not a function"));
    }
}
