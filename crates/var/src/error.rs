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

use strum::{Display, EnumString};

/// The classes of error a script can raise, named the way they are reported to programmers.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Display, EnumString)]
pub enum ErrorKind {
    SyntaxError,
    ReferenceError,
    TypeError,
    RangeError,
    /// A domain rule of the world was violated (destroying an online player, etc).
    Error,
}

/// A structured error raised from script execution.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("{kind}: {msg}")]
pub struct Error {
    pub kind: ErrorKind,
    pub msg: String,
}

impl Error {
    pub fn new(kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            msg: msg.into(),
        }
    }

    pub fn syntax(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::SyntaxError, msg)
    }

    pub fn not_defined(name: &str) -> Self {
        Self::new(ErrorKind::ReferenceError, format!("{name} is not defined"))
    }

    pub fn type_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeError, msg)
    }

    pub fn range(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::RangeError, msg)
    }

    pub fn domain(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Error, msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_display() {
        assert_eq!(
            Error::not_defined("asdf").to_string(),
            "ReferenceError: asdf is not defined"
        );
        assert_eq!(
            Error::domain("test is a player and is online").to_string(),
            "Error: test is a player and is online"
        );
    }

    #[test]
    fn test_kind_round_trip() {
        assert_eq!(ErrorKind::from_str("TypeError"), Ok(ErrorKind::TypeError));
        assert!(ErrorKind::from_str("BogusError").is_err());
    }
}
