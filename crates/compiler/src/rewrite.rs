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

//! Turning raw programmer input into something the world can execute on their behalf.

use thiserror::Error;
use warren_var::Obj;
use warren_var::program::Program;

use crate::errors::CompileError;
use crate::parse::{CompileOptions, compile};

pub const EVAL_LABEL_PREFIX: &str = "Eval::";

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum RewriteError {
    #[error("Malformed identity: {0:?}")]
    MalformedIdentity(String),
}

/// Caller input bound to the identity it runs as. The source is not checked here; it is compiled
/// when the unit runs, so syntax errors are reported like any other script error.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct EvalUnit {
    pub source: String,
    /// The object `this` refers to while the unit runs.
    pub player: Obj,
    /// Names the unit in traces, as `Eval::<identity>`.
    pub label: String,
    pub options: CompileOptions,
}

impl EvalUnit {
    pub fn compile(&self) -> Result<Program, CompileError> {
        compile(&self.source, self.options.clone())
    }
}

pub fn rewrite_eval(input: &str, identity: &str) -> Result<EvalUnit, RewriteError> {
    if !Obj::is_valid_id(identity) {
        return Err(RewriteError::MalformedIdentity(identity.to_string()));
    }
    Ok(EvalUnit {
        source: input.to_string(),
        player: Obj::mk_id(identity),
        label: format!("{EVAL_LABEL_PREFIX}{identity}"),
        options: CompileOptions {
            implicit_return: true,
        },
    })
}
