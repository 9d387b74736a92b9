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

use crate::argspec::VerbArgsSpec;
use crate::obj::Obj;
use crate::program::LambdaBody;
use crate::var::Var;
use arcstr::ArcStr;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// A native operation exposed to scripts by the host, optionally bound to the object it was
/// looked up on (`root.new`, `player.send`).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Builtin {
    pub name: ArcStr,
    pub receiver: Option<Obj>,
}

/// A closure created by evaluating an arrow function.
#[derive(Clone)]
pub struct Lambda {
    pub params: Vec<ArcStr>,
    pub body: Arc<LambdaBody>,
    pub source: ArcStr,
    /// Variables visible where the lambda was created, captured by value.
    pub captured: Vec<(ArcStr, Var)>,
    pub this: Var,
}

impl PartialEq for Lambda {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.body, &other.body) && self.this == other.this
    }
}

impl Debug for Lambda {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Lambda(({}))", self.params.join(", "))
    }
}

/// A named helper routine stored on an object as source text.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Function {
    pub source: ArcStr,
}

impl Function {
    pub fn new(source: &str) -> Self {
        Self {
            source: ArcStr::from(source),
        }
    }
}

/// A command verb stored on an object.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Verb {
    pub name: ArcStr,
    pub code: ArcStr,
    pub pattern: ArcStr,
    pub args: VerbArgsSpec,
}
