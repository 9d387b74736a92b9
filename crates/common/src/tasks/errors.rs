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

use std::fmt::{Display, Formatter};
use thiserror::Error;
use warren_var::{Error, ErrorKind, Var};

/// What a script raised: either a structured error from the evaluator, or an arbitrary value
/// handed to `throw`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScriptError {
    #[error(transparent)]
    Raised(#[from] Error),
    #[error("Uncaught {0:?}")]
    Thrown(Var),
}

impl ScriptError {
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ScriptError::Raised(e) => Some(e.kind),
            ScriptError::Thrown(_) => None,
        }
    }
}

/// A script error together with where it happened. Kept for the operator log; callers only
/// ever see the formatted error.
#[derive(Debug, Clone, PartialEq)]
pub struct Exception {
    pub error: ScriptError,
    pub label: String,
    pub backtrace: Vec<String>,
}

impl Exception {
    pub fn new(error: ScriptError, label: &str) -> Self {
        Self {
            error,
            label: label.to_string(),
            backtrace: vec![],
        }
    }
}

impl Display for Exception {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.error, self.label)?;
        for frame in &self.backtrace {
            write!(f, "\n    at {frame}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Exception {}

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum SchedulerError {
    #[error("Scheduler not responding")]
    SchedulerNotResponding,
    #[error("Scheduler is shutting down")]
    ShuttingDown,
    #[error("Turn aborted: {0}")]
    TurnAborted(String),
}
