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

use crate::list::List;
use crate::map::Map;
use crate::obj::Obj;
use crate::program::{Builtin, Function, Lambda, Verb};
use arcstr::ArcStr;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Our series of types
#[derive(Clone)]
pub enum Variant {
    Undefined,
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(ArcStr),
    List(List),
    Map(Map),
    Obj(Obj),
    Lambda(Arc<Lambda>),
    Builtin(Arc<Builtin>),
    Function(Arc<Function>),
    Verb(Arc<Verb>),
}

impl Debug for Variant {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Variant::Undefined => write!(f, "Undefined"),
            Variant::Null => write!(f, "Null"),
            Variant::Bool(b) => write!(f, "{}", *b),
            Variant::Int(i) => write!(f, "Integer({i})"),
            Variant::Float(fl) => write!(f, "Float({fl})"),
            Variant::Str(s) => write!(f, "String({:?})", s.as_str()),
            Variant::List(l) => {
                let i: Vec<_> = l.iter().collect();
                write!(f, "List([size = {}, items = {:?}])", l.len(), i)
            }
            Variant::Map(m) => {
                let i: Vec<_> = m.iter().collect();
                write!(f, "Map([size = {}, items = {:?}])", m.len(), i)
            }
            Variant::Obj(o) => write!(f, "Object({o})"),
            Variant::Lambda(l) => write!(f, "{l:?}"),
            Variant::Builtin(b) => write!(f, "Builtin({})", b.name),
            Variant::Function(_) => write!(f, "Function"),
            Variant::Verb(v) => write!(f, "Verb({})", v.name),
        }
    }
}

impl PartialEq for Variant {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Variant::Undefined, Variant::Undefined) => true,
            (Variant::Null, Variant::Null) => true,
            (Variant::Bool(l), Variant::Bool(r)) => l == r,
            (Variant::Int(l), Variant::Int(r)) => l == r,
            (Variant::Float(l), Variant::Float(r)) => l == r,
            // Numbers compare by value regardless of representation.
            (Variant::Int(l), Variant::Float(r)) => (*l as f64) == *r,
            (Variant::Float(l), Variant::Int(r)) => *l == (*r as f64),
            (Variant::Str(l), Variant::Str(r)) => l == r,
            (Variant::List(l), Variant::List(r)) => l == r,
            (Variant::Map(l), Variant::Map(r)) => l == r,
            (Variant::Obj(l), Variant::Obj(r)) => l == r,
            (Variant::Lambda(l), Variant::Lambda(r)) => l == r,
            (Variant::Builtin(l), Variant::Builtin(r)) => l == r,
            (Variant::Function(l), Variant::Function(r)) => Arc::ptr_eq(l, r),
            (Variant::Verb(l), Variant::Verb(r)) => Arc::ptr_eq(l, r),
            _ => false,
        }
    }
}
