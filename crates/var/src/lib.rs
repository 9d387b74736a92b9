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

//! Values manipulated by world scripts: the dynamically typed `Var`, object references, script
//! errors, verb argument specifications and the syntax tree that lambdas carry around with them.

mod argspec;
mod error;
mod list;
mod map;
mod obj;
pub mod program;
#[allow(clippy::module_inception)]
mod var;
mod variant;

pub use argspec::{ArgSpec, PrepSpec, Preposition, VerbArgsSpec};
pub use error::{Error, ErrorKind};
pub use list::List;
pub use map::Map;
pub use obj::Obj;
pub use program::{Builtin, Function, Lambda, Verb};
pub use var::{
    Var, v_bool, v_builtin, v_empty_list, v_empty_map, v_float, v_int, v_list, v_list_iter,
    v_map, v_null, v_obj, v_str, v_string, v_undefined,
};
pub use variant::Variant;
