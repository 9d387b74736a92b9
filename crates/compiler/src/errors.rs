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

use thiserror::Error;
use warren_var::Error;

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum CompileError {
    #[error("Unexpected input at line {line}, column {col}: {message}")]
    ParseError {
        line: usize,
        col: usize,
        context: String,
        message: String,
    },
    #[error("Invalid left-hand side in assignment at line {line}, column {col}")]
    InvalidAssignmentTarget { line: usize, col: usize },
    #[error("Invalid string literal at line {line}: {message}")]
    InvalidString { line: usize, message: String },
    #[error("Expected a single expression")]
    NotAnExpression,
}

impl CompileError {
    pub fn line_col(&self) -> Option<(usize, usize)> {
        match self {
            CompileError::ParseError { line, col, .. }
            | CompileError::InvalidAssignmentTarget { line, col } => Some((*line, *col)),
            CompileError::InvalidString { line, .. } => Some((*line, 1)),
            CompileError::NotAnExpression => None,
        }
    }
}

impl From<CompileError> for Error {
    fn from(e: CompileError) -> Self {
        Error::syntax(e.to_string())
    }
}
