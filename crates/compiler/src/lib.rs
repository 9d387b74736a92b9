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

//! Compilation of world script source into the syntax tree the evaluator walks.

#[macro_use]
extern crate pest_derive;

mod errors;
mod parse;
mod rewrite;

pub use crate::errors::CompileError;
pub use crate::parse::{CompileOptions, compile, compile_expr, unquote_str};
pub use crate::rewrite::{EVAL_LABEL_PREFIX, EvalUnit, RewriteError, rewrite_eval};
